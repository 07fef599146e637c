// API employee export (JSON)

use std::path::Path;

use rollcall_recon::SourceRow;

use crate::error::LoadError;
use crate::json::{data_array, object_to_row, read_document};

/// Load every employee object of the API export as a row.
pub fn load_employees(path: &Path) -> Result<Vec<SourceRow>, LoadError> {
    let doc = read_document(path)?;
    let rows: Vec<SourceRow> = data_array(&doc, path)?
        .into_iter()
        .map(object_to_row)
        .collect();
    log::info!("{}: {} employee rows", path.display(), rows.len());
    Ok(rows)
}
