// Excel roster import (xlsx, xls, xlsb, ods)

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};

use rollcall_recon::config::ExcelConfig;
use rollcall_recon::SourceRow;

use crate::error::LoadError;

/// Rows of the roster sheet keyed by header text.
#[derive(Debug, Clone, Default)]
pub struct RosterSheet {
    pub sheet: String,
    /// Kept headers in sheet order.
    pub columns: Vec<String>,
    pub rows: Vec<SourceRow>,
}

/// Render a cell as text. Integral numbers lose their fraction so that
/// numeric ID cells compare equal to API strings.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => format!("{}", n),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{:?}", e),
        // Date serials stay numeric; rosters only need them as text.
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Pick unique names for the kept headers, pandas style (`name`, `name.1`).
fn dedupe_headers(headers: Vec<(usize, String)>) -> Vec<(usize, String)> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|(col, name)| {
            let n = seen.entry(name.clone()).or_insert(0);
            let unique = if *n == 0 { name } else { format!("{name}.{n}") };
            *n += 1;
            (col, unique)
        })
        .collect()
}

/// Import the roster sheet.
///
/// Rows above `header_row` (a title banner) are skipped, columns with a
/// blank header are dropped, and fully blank data rows are ignored.
pub fn load_roster(path: &Path, config: &ExcelConfig) -> Result<RosterSheet, LoadError> {
    if !path.exists() {
        return Err(LoadError::MissingFile {
            path: path.to_path_buf(),
        });
    }

    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| LoadError::parse(path, format!("failed to open Excel file: {}", e)))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match &config.sheet {
        Some(name) => sheet_names
            .iter()
            .find(|s| *s == name)
            .cloned()
            .ok_or_else(|| LoadError::parse(path, format!("sheet '{}' not found", name)))?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| LoadError::parse(path, "Excel file contains no sheets"))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| LoadError::parse(path, format!("failed to read sheet '{}': {}", sheet_name, e)))?;

    // Range start offset (data may not begin at A1)
    let (start_row, start_col) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let grid: Vec<&[Data]> = range.rows().collect();
    let header_idx = config
        .header_row
        .checked_sub(start_row)
        .filter(|i| *i < grid.len())
        .ok_or_else(|| {
            LoadError::parse(
                path,
                format!("sheet '{}' has no header row {}", sheet_name, config.header_row),
            )
        })?;

    let headers: Vec<(usize, String)> = grid[header_idx]
        .iter()
        .enumerate()
        .filter_map(|(i, cell)| {
            let name = cell_to_string(cell).trim().to_string();
            (!name.is_empty()).then_some((i, name))
        })
        .collect();
    let dropped = grid[header_idx].len() - headers.len();
    if dropped > 0 {
        log::debug!("{}: dropping {} unnamed columns", path.display(), dropped);
    }
    let headers = dedupe_headers(headers);

    let mut rows = Vec::new();
    for cells in &grid[header_idx + 1..] {
        let row: SourceRow = headers
            .iter()
            .map(|(i, name)| {
                let value = cells.get(*i).map(cell_to_string).unwrap_or_default();
                (name.clone(), value)
            })
            .collect();
        if row.values().all(|v| v.trim().is_empty()) {
            continue;
        }
        rows.push(row);
    }

    log::info!(
        "{}: sheet '{}' (data from column {}), {} rows, {} columns",
        path.display(),
        sheet_name,
        start_col,
        rows.len(),
        headers.len()
    );

    Ok(RosterSheet {
        sheet: sheet_name,
        columns: headers.into_iter().map(|(_, name)| name).collect(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_render_without_fraction() {
        assert_eq!(cell_to_string(&Data::Float(123456789.0)), "123456789");
        assert_eq!(cell_to_string(&Data::Float(7.25)), "7.25");
        assert_eq!(cell_to_string(&Data::Int(42)), "42");
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::Bool(true)), "TRUE");
        assert_eq!(cell_to_string(&Data::String("שם".into())), "שם");
    }

    #[test]
    fn duplicate_headers_get_suffixes() {
        let out = dedupe_headers(vec![
            (0, "שם".into()),
            (1, "טלפון".into()),
            (2, "שם".into()),
            (3, "שם".into()),
        ]);
        let names: Vec<&str> = out.iter().map(|(_, n)| n.as_str()).collect();
        assert_eq!(names, vec!["שם", "טלפון", "שם.1", "שם.2"]);
    }
}
