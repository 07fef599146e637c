use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single raw row from any source, field name → string value.
pub type SourceRow = BTreeMap<String, String>;

/// Which export a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Api,
    Excel,
}

impl Source {
    /// Human label used in the console report.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Api => "JSON (API)",
            Self::Excel => "Excel (Manual)",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Api => write!(f, "api"),
            Self::Excel => write!(f, "excel"),
        }
    }
}

/// One worked shift. `start <= end` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shift {
    employee: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl Shift {
    /// Returns `None` when the shift ends before it starts.
    pub fn new(employee: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Option<Self> {
        if end < start {
            return None;
        }
        Some(Self {
            employee: employee.into(),
            start,
            end,
        })
    }

    /// Attendance key of the employee who worked the shift.
    pub fn employee(&self) -> &str {
        &self.employee
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Duration in fractional hours.
    pub fn hours(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 3600.0
    }
}

/// Pre-loaded rows from both sources plus the attendance shifts.
#[derive(Debug, Default)]
pub struct ReconInput {
    pub api_rows: Vec<SourceRow>,
    pub excel_rows: Vec<SourceRow>,
    /// Spreadsheet header order; the first entry is the default ID column.
    pub excel_columns: Vec<String>,
    pub shifts: Vec<Shift>,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// A deduplicated employee row with its standardized identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeRecord {
    pub id: String,
    pub source: Source,
    /// Zero-based position of the kept row in the source.
    pub row: usize,
    pub fields: BTreeMap<String, String>,
}

impl EmployeeRecord {
    /// Trimmed, non-empty value of a field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Non-fatal per-record anomaly found while normalizing a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityWarning {
    EmptyId { source: Source, row: usize },
    DuplicateId { source: Source, id: String, occurrences: usize },
}

impl std::fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId { source, row } => write!(f, "{source}: row {row} has an empty ID"),
            Self::DuplicateId { source, id, occurrences } => {
                write!(f, "{source}: ID '{id}' appears {occurrences} times")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateId {
    pub id: String,
    pub occurrences: usize,
}

/// Counts reported per input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    pub source: Source,
    pub total_rows: usize,
    pub empty_ids: usize,
    pub duplicate_ids: Vec<DuplicateId>,
    pub duplicates_removed: usize,
    pub final_unique: usize,
}

#[derive(Debug, Clone)]
pub struct NormalizedSource {
    pub records: BTreeMap<String, EmployeeRecord>,
    pub summary: SourceSummary,
    pub warnings: Vec<IntegrityWarning>,
}

impl NormalizedSource {
    /// Raw rows of the kept records, in identifier order.
    pub fn rows(&self) -> Vec<SourceRow> {
        self.records.values().map(|r| r.fields.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchGroup {
    Matches,
    ApiOnly,
    ExcelOnly,
}

impl MatchGroup {
    pub const ALL: [MatchGroup; 3] = [Self::Matches, Self::ApiOnly, Self::ExcelOnly];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Matches => "Matches (Appear in both sources)",
            Self::ApiOnly => "JSON (API) Only",
            Self::ExcelOnly => "Excel (Manual) Only",
        }
    }
}

impl std::fmt::Display for MatchGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Matches => write!(f, "matches"),
            Self::ApiOnly => write!(f, "api_only"),
            Self::ExcelOnly => write!(f, "excel_only"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchedEmployee {
    pub api: EmployeeRecord,
    pub excel: EmployeeRecord,
}

#[derive(Debug, Default)]
pub struct MatchOutput {
    pub matches: Vec<MatchedEmployee>,
    pub api_only: Vec<EmployeeRecord>,
    pub excel_only: Vec<EmployeeRecord>,
}

impl MatchOutput {
    pub fn len(&self, group: MatchGroup) -> usize {
        match group {
            MatchGroup::Matches => self.matches.len(),
            MatchGroup::ApiOnly => self.api_only.len(),
            MatchGroup::ExcelOnly => self.excel_only.len(),
        }
    }

    pub fn ids(&self, group: MatchGroup) -> Vec<&str> {
        match group {
            MatchGroup::Matches => self.matches.iter().map(|m| m.api.id.as_str()).collect(),
            MatchGroup::ApiOnly => self.api_only.iter().map(|r| r.id.as_str()).collect(),
            MatchGroup::ExcelOnly => self.excel_only.iter().map(|r| r.id.as_str()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// The parts of a group member the aggregator needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupMember<'a> {
    pub id: &'a str,
    pub attendance_key: Option<&'a str>,
    pub has_bank_account: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupStats {
    pub total_employees: usize,
    pub total_shifts: usize,
    pub avg_shifts_per_employee: f64,
    pub avg_hours_per_shift: f64,
    pub employees_with_shifts: usize,
    pub employees_with_bank_account: usize,
    pub bank_details_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmployeeAttendance {
    pub number_of_shifts: usize,
    /// Rounded to two decimals.
    pub average_shift_hours: f64,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub matching_ids_count: usize,
    pub api_only_count: usize,
    pub excel_only_count: usize,
    pub total_compared: usize,
    pub total_api: usize,
    pub total_excel: usize,
    pub empty_ids_api: usize,
    pub empty_ids_excel: usize,
    pub total_shifts: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceSummaries {
    pub api: SourceSummary,
    pub excel: SourceSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceSummary {
    pub matches: GroupStats,
    pub api_only: GroupStats,
    pub excel_only: GroupStats,
}

impl AttendanceSummary {
    pub fn get(&self, group: MatchGroup) -> &GroupStats {
        match group {
            MatchGroup::Matches => &self.matches,
            MatchGroup::ApiOnly => &self.api_only,
            MatchGroup::ExcelOnly => &self.excel_only,
        }
    }
}

/// One entry of the detailed listings.
#[derive(Debug, Clone, Serialize)]
pub struct ListedEmployee {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excel: Option<BTreeMap<String, String>>,
    pub attendance: EmployeeAttendance,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub dedup: crate::config::DedupPolicy,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub sources: SourceSummaries,
    pub attendance_summary: AttendanceSummary,
    pub matches: Vec<ListedEmployee>,
    pub api_only: Vec<ListedEmployee>,
    pub excel_only: Vec<ListedEmployee>,
    #[serde(skip)]
    pub warnings: Vec<IntegrityWarning>,
}

impl ReconResult {
    pub fn listing(&self, group: MatchGroup) -> &[ListedEmployee] {
        match group {
            MatchGroup::Matches => &self.matches,
            MatchGroup::ApiOnly => &self.api_only,
            MatchGroup::ExcelOnly => &self.excel_only,
        }
    }
}
