use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::model::EmployeeRecord;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Run configuration. Every section is optional; an empty document yields the
/// defaults for the standard roster exports.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    pub name: String,
    pub dedup: DedupPolicy,
    pub inputs: InputsConfig,
    pub output: OutputConfig,
    pub api: SourceConfig,
    pub excel: ExcelConfig,
    pub attendance: AttendanceConfig,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: "Roster comparison".into(),
            dedup: DedupPolicy::default(),
            inputs: InputsConfig::default(),
            output: OutputConfig::default(),
            api: SourceConfig::api_defaults(),
            excel: ExcelConfig::default(),
            attendance: AttendanceConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dedup policy
// ---------------------------------------------------------------------------

/// Which row survives when an identifier appears more than once in a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Keep the first occurrence.
    #[default]
    First,
    /// Keep the last occurrence.
    Last,
    /// Keep the first occurrence, filling its empty fields from later ones.
    Merge,
}

impl std::fmt::Display for DedupPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => write!(f, "first"),
            Self::Last => write!(f, "last"),
            Self::Merge => write!(f, "merge"),
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputsConfig {
    pub api: String,
    pub excel: String,
    pub attendance: String,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            api: "alfon-api-response.txt".into(),
            excel: "alfon-manual.xlsx".into(),
            attendance: "attendance-api-response.txt".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub json: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json: "comparison_results.json".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Source field mapping
// ---------------------------------------------------------------------------

/// Field names used to read an employee row. `None` means "not available".
///
/// Spreadsheet configs may spell the keys as columns (`id_column`, ...).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    #[serde(alias = "id_column")]
    pub id_field: Option<String>,
    #[serde(alias = "name_column")]
    pub name_field: Option<String>,
    /// Field joined against the attendance employee reference.
    #[serde(alias = "attendance_key_column")]
    pub attendance_key_field: Option<String>,
    #[serde(alias = "bank_column")]
    pub bank_field: Option<String>,
    /// Left-pad all-digit identifiers with zeros to this width.
    pub pad_width: Option<usize>,
}

impl SourceConfig {
    pub fn api_defaults() -> Self {
        Self {
            id_field: Some("id_number".into()),
            name_field: Some("name".into()),
            attendance_key_field: Some("employee_number".into()),
            bank_field: Some("bank_account".into()),
            pad_width: None,
        }
    }

    /// Fill unset fields from `defaults`.
    pub fn or_defaults(self, defaults: SourceConfig) -> Self {
        Self {
            id_field: self.id_field.or(defaults.id_field),
            name_field: self.name_field.or(defaults.name_field),
            attendance_key_field: self.attendance_key_field.or(defaults.attendance_key_field),
            bank_field: self.bank_field.or(defaults.bank_field),
            pad_width: self.pad_width.or(defaults.pad_width),
        }
    }

    pub fn name_of<'a>(&self, record: &'a EmployeeRecord) -> Option<&'a str> {
        self.name_field.as_deref().and_then(|f| record.field(f))
    }

    pub fn attendance_key_of<'a>(&self, record: &'a EmployeeRecord) -> Option<&'a str> {
        self.attendance_key_field.as_deref().and_then(|f| record.field(f))
    }

    pub fn has_bank_account(&self, record: &EmployeeRecord) -> bool {
        self.bank_field
            .as_deref()
            .and_then(|f| record.field(f))
            .is_some()
    }

    fn validate(&self, section: &str) -> Result<(), ReconError> {
        let named = [
            ("id_field", &self.id_field),
            ("name_field", &self.name_field),
            ("attendance_key_field", &self.attendance_key_field),
            ("bank_field", &self.bank_field),
        ];
        for (key, value) in named {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "[{section}] {key} must not be empty"
                )));
            }
        }
        if let Some(width) = self.pad_width {
            if !(1..=32).contains(&width) {
                return Err(ReconError::ConfigValidation(format!(
                    "[{section}] pad_width must be between 1 and 32, got {width}"
                )));
            }
        }
        Ok(())
    }
}

/// Spreadsheet layout plus its field mapping.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExcelConfig {
    /// Worksheet name; the first sheet when unset.
    pub sheet: Option<String>,
    /// Zero-based row holding the column headers. Rows above it are skipped.
    pub header_row: usize,
    #[serde(flatten)]
    pub fields: SourceConfig,
}

impl Default for ExcelConfig {
    fn default() -> Self {
        Self {
            sheet: None,
            header_row: 1,
            fields: SourceConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AttendanceConfig {
    pub employee_field: String,
    pub start_field: String,
    pub end_field: String,
    /// Optional calendar date for clock-time shifts.
    pub date_field: String,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            employee_field: "employee_number".into(),
            start_field: "t_start".into(),
            end_field: "t_end".into(),
            date_field: "date".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let mut config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        // A partial [api] section keeps the export's standard field names.
        config.api = config.api.or_defaults(SourceConfig::api_defaults());
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.api.id_field.is_none() {
            return Err(ReconError::ConfigValidation(
                "[api] id_field is required".into(),
            ));
        }
        self.api.validate("api")?;
        self.excel.fields.validate("excel")?;

        let inputs = [
            ("api", &self.inputs.api),
            ("excel", &self.inputs.excel),
            ("attendance", &self.inputs.attendance),
        ];
        for (key, path) in inputs {
            if path.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "[inputs] {key} path must not be empty"
                )));
            }
        }
        if self.output.json.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "[output] json path must not be empty".into(),
            ));
        }

        let att = &self.attendance;
        for (key, value) in [
            ("employee_field", &att.employee_field),
            ("start_field", &att.start_field),
            ("end_field", &att.end_field),
        ] {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "[attendance] {key} must not be empty"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
