//! Console summary of a comparison run.

use std::fmt::Write;
use std::path::Path;

use rollcall_recon::model::{MatchGroup, ReconResult, Source, SourceSummary};

/// Loader figures that live outside the engine result.
pub struct InputInfo {
    /// Worksheet the roster was read from.
    pub sheet: String,
    pub attendance_rows: usize,
    pub attendance_skipped: usize,
}

pub fn render(result: &ReconResult, info: &InputInfo, output: &Path) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, result, info, output);
    out
}

fn write_report(
    out: &mut String,
    result: &ReconResult,
    info: &InputInfo,
    output: &Path,
) -> std::fmt::Result {
    let s = &result.summary;

    writeln!(out, "Comparison Results Summary:")?;
    writeln!(out, "Number of matching IDs: {}", s.matching_ids_count)?;
    writeln!(out, "Number of IDs only in {}: {}", Source::Api.label(), s.api_only_count)?;
    writeln!(out, "Number of IDs only in {}: {}", Source::Excel.label(), s.excel_only_count)?;

    write_source(out, &result.sources.api, None)?;
    write_source(out, &result.sources.excel, Some(&info.sheet))?;

    writeln!(out)?;
    writeln!(
        out,
        "Attendance records: {} ({} skipped, {} shifts used)",
        info.attendance_rows, info.attendance_skipped, s.total_shifts
    )?;

    writeln!(out)?;
    writeln!(out, "Attendance Statistics:")?;
    for group in MatchGroup::ALL {
        let stats = result.attendance_summary.get(group);
        writeln!(out)?;
        writeln!(out, "{}:", group.label())?;
        writeln!(out, "Total shifts: {}", stats.total_shifts)?;
        writeln!(out, "Average shifts per employee: {:.2}", stats.avg_shifts_per_employee)?;
        writeln!(out, "Average hours per shift: {:.2}", stats.avg_hours_per_shift)?;
        writeln!(
            out,
            "Employees with bank account details: {} out of {} ({:.0}%)",
            stats.employees_with_bank_account,
            stats.total_employees,
            stats.bank_details_ratio * 100.0
        )?;
        writeln!(
            out,
            "Employees with at least one shift: {} out of {}",
            stats.employees_with_shifts, stats.total_employees
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Verification:")?;
    writeln!(out, "Total unique IDs compared: {}", s.total_compared)?;
    writeln!(out, "Total unique IDs in {}: {}", Source::Api.label(), s.total_api)?;
    writeln!(out, "Total unique IDs in {}: {}", Source::Excel.label(), s.total_excel)?;
    writeln!(out, "Appear in both: {}", s.matching_ids_count)?;
    writeln!(out, "Only in {}: {}", Source::Api.label(), s.api_only_count)?;
    writeln!(out, "Only in {}: {}", Source::Excel.label(), s.excel_only_count)?;

    writeln!(out)?;
    writeln!(out, "Detailed results have been saved to {}", output.display())?;
    Ok(())
}

fn write_source(out: &mut String, summary: &SourceSummary, sheet: Option<&str>) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "{} File Summary:", summary.source.label())?;
    if let Some(sheet) = sheet {
        writeln!(out, "Sheet: {sheet}")?;
    }
    writeln!(out, "Total rows: {}", summary.total_rows)?;
    writeln!(out, "Empty IDs: {}", summary.empty_ids)?;
    if summary.duplicate_ids.is_empty() {
        writeln!(out, "Duplicate IDs: 0")?;
    } else {
        let listed: Vec<String> = summary
            .duplicate_ids
            .iter()
            .map(|d| format!("{} x{}", d.id, d.occurrences))
            .collect();
        writeln!(
            out,
            "Duplicate IDs: {} ({}), {} rows removed",
            summary.duplicate_ids.len(),
            listed.join(", "),
            summary.duplicates_removed
        )?;
    }
    writeln!(out, "Final unique IDs: {}", summary.final_unique)?;
    Ok(())
}
