// Attendance export (JSON)

use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Map, Value};

use rollcall_recon::config::AttendanceConfig;
use rollcall_recon::Shift;

use crate::error::LoadError;
use crate::json::{data_array, read_document, value_to_string};

/// Parsed shifts plus how many rows could not be used.
#[derive(Debug, Default)]
pub struct AttendanceLoad {
    pub shifts: Vec<Shift>,
    pub total_rows: usize,
    pub skipped: usize,
}

/// A timestamp as written in the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stamp {
    /// Time of day only (`HH:MM`).
    Clock(NaiveTime),
    /// Calendar date and time.
    Full(NaiveDateTime),
}

const CLOCK_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];
const FULL_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

fn parse_stamp(raw: &str) -> Option<Stamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in CLOCK_FORMATS {
        if let Ok(t) = NaiveTime::parse_from_str(raw, fmt) {
            return Some(Stamp::Clock(t));
        }
    }
    for fmt in FULL_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Stamp::Full(dt));
        }
    }
    None
}

/// Build a shift from two stamps.
///
/// Clock times are placed on `date` (or the full stamp's date). A clock end
/// earlier than the start crosses midnight. Two full timestamps out of order
/// are rejected.
fn resolve_shift(employee: &str, date: Option<NaiveDate>, start: Stamp, end: Stamp) -> Option<Shift> {
    let base = date
        .or(match (start, end) {
            (Stamp::Full(dt), _) | (_, Stamp::Full(dt)) => Some(dt.date()),
            _ => None,
        })
        .unwrap_or_default();

    let start_at = match start {
        Stamp::Clock(t) => base.and_time(t),
        Stamp::Full(dt) => dt,
    };
    let end_at = match end {
        Stamp::Clock(t) => {
            let at = start_at.date().and_time(t);
            if at < start_at {
                at + Duration::days(1)
            } else {
                at
            }
        }
        Stamp::Full(dt) => dt,
    };

    Shift::new(employee, start_at, end_at)
}

fn field(obj: &Map<String, Value>, name: &str) -> Option<String> {
    obj.get(name)
        .map(value_to_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse one attendance record. `None` when it cannot become a shift.
fn parse_record(obj: &Map<String, Value>, config: &AttendanceConfig) -> Option<Shift> {
    let employee = field(obj, &config.employee_field)?;
    let start = parse_stamp(&field(obj, &config.start_field)?)?;
    let end = parse_stamp(&field(obj, &config.end_field)?)?;
    let date = field(obj, &config.date_field)
        .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok());
    resolve_shift(&employee, date, start, end)
}

/// Load all usable shifts from the attendance export.
pub fn load_shifts(path: &Path, config: &AttendanceConfig) -> Result<AttendanceLoad, LoadError> {
    let doc = read_document(path)?;
    let records = data_array(&doc, path)?;

    let mut load = AttendanceLoad {
        total_rows: records.len(),
        ..Default::default()
    };

    for (i, obj) in records.into_iter().enumerate() {
        match parse_record(obj, config) {
            Some(shift) => load.shifts.push(shift),
            None => {
                load.skipped += 1;
                log::debug!("{}: skipping attendance record {i}", path.display());
            }
        }
    }

    log::info!(
        "{}: {} shifts ({} records skipped)",
        path.display(),
        load.shifts.len(),
        load.skipped
    );
    Ok(load)
}
