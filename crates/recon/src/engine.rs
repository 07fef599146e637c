use crate::aggregate::{employee_attendance, group_stats, ShiftIndex};
use crate::config::{ReconConfig, SourceConfig};
use crate::error::ReconError;
use crate::matcher::match_by_id;
use crate::model::{
    AttendanceSummary, EmployeeRecord, GroupMember, ListedEmployee, MatchOutput, ReconInput,
    ReconMeta, ReconResult, ReconSummary, Source, SourceRow, SourceSummaries,
};
use crate::normalize::normalize;

/// Run the comparison per config. Returns the partition, statistics and listings.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconResult, ReconError> {
    let api_id = api_id_field(config, &input.api_rows)?;
    let excel_id = excel_id_field(config, &input.excel_columns)?;

    let api = normalize(Source::Api, &input.api_rows, &api_id, &config.api, config.dedup);
    let excel = normalize(
        Source::Excel,
        &input.excel_rows,
        &excel_id,
        &config.excel.fields,
        config.dedup,
    );

    let matched = match_by_id(&api.records, &excel.records);
    let index = ShiftIndex::build(&input.shifts);

    let members = GroupMembers::collect(&matched, config);
    let attendance_summary = AttendanceSummary {
        matches: group_stats(&members.matches, &index),
        api_only: group_stats(&members.api_only, &index),
        excel_only: group_stats(&members.excel_only, &index),
    };

    let listed_matches = matched
        .matches
        .iter()
        .zip(&members.matches)
        .map(|(m, member)| ListedEmployee {
            id: m.api.id.clone(),
            name: config
                .api
                .name_of(&m.api)
                .or_else(|| config.excel.fields.name_of(&m.excel))
                .map(str::to_string),
            api: Some(m.api.fields.clone()),
            excel: Some(m.excel.fields.clone()),
            attendance: attendance_for(member, &index),
        })
        .collect();
    let listed_api_only = list_single(&matched.api_only, &members.api_only, &config.api, &index);
    let listed_excel_only = list_single(
        &matched.excel_only,
        &members.excel_only,
        &config.excel.fields,
        &index,
    );

    let summary = ReconSummary {
        matching_ids_count: matched.matches.len(),
        api_only_count: matched.api_only.len(),
        excel_only_count: matched.excel_only.len(),
        total_compared: matched.matches.len() + matched.api_only.len() + matched.excel_only.len(),
        total_api: api.summary.final_unique,
        total_excel: excel.summary.final_unique,
        empty_ids_api: api.summary.empty_ids,
        empty_ids_excel: excel.summary.empty_ids,
        total_shifts: input.shifts.len(),
    };

    let mut warnings = api.warnings;
    warnings.extend(excel.warnings);

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            dedup: config.dedup,
        },
        summary,
        sources: SourceSummaries {
            api: api.summary,
            excel: excel.summary,
        },
        attendance_summary,
        matches: listed_matches,
        api_only: listed_api_only,
        excel_only: listed_excel_only,
        warnings,
    })
}

/// The API export has no header row, so the ID field must appear in at
/// least one row (unless there are no rows at all).
fn api_id_field(config: &ReconConfig, rows: &[SourceRow]) -> Result<String, ReconError> {
    let field = config
        .api
        .id_field
        .clone()
        .ok_or_else(|| ReconError::ConfigValidation("[api] id_field is required".into()))?;
    if !rows.is_empty() && !rows.iter().any(|r| r.contains_key(&field)) {
        return Err(ReconError::MissingColumn {
            source: Source::Api.to_string(),
            column: field,
        });
    }
    Ok(field)
}

/// Configured ID column, or the first spreadsheet column.
fn excel_id_field(config: &ReconConfig, columns: &[String]) -> Result<String, ReconError> {
    match &config.excel.fields.id_field {
        Some(field) => {
            if !columns.is_empty() && !columns.contains(field) {
                return Err(ReconError::MissingColumn {
                    source: Source::Excel.to_string(),
                    column: field.clone(),
                });
            }
            Ok(field.clone())
        }
        None => columns.first().cloned().ok_or_else(|| ReconError::MissingColumn {
            source: Source::Excel.to_string(),
            column: "<first column>".into(),
        }),
    }
}

struct GroupMembers<'a> {
    matches: Vec<GroupMember<'a>>,
    api_only: Vec<GroupMember<'a>>,
    excel_only: Vec<GroupMember<'a>>,
}

impl<'a> GroupMembers<'a> {
    fn collect(matched: &'a MatchOutput, config: &ReconConfig) -> Self {
        let api = &config.api;
        let excel = &config.excel.fields;

        // Matched employees prefer API values and fall back to the spreadsheet.
        let matches = matched
            .matches
            .iter()
            .map(|m| GroupMember {
                id: &m.api.id,
                attendance_key: api
                    .attendance_key_of(&m.api)
                    .or_else(|| excel.attendance_key_of(&m.excel)),
                has_bank_account: api.has_bank_account(&m.api) || excel.has_bank_account(&m.excel),
            })
            .collect();

        Self {
            matches,
            api_only: single_members(&matched.api_only, api),
            excel_only: single_members(&matched.excel_only, excel),
        }
    }
}

fn single_members<'a>(records: &'a [EmployeeRecord], fields: &SourceConfig) -> Vec<GroupMember<'a>> {
    records
        .iter()
        .map(|r| GroupMember {
            id: &r.id,
            attendance_key: fields.attendance_key_of(r),
            has_bank_account: fields.has_bank_account(r),
        })
        .collect()
}

fn attendance_for(member: &GroupMember<'_>, index: &ShiftIndex<'_>) -> crate::model::EmployeeAttendance {
    match member.attendance_key {
        Some(key) => employee_attendance(index.for_employee(key)),
        None => Default::default(),
    }
}

fn list_single(
    records: &[EmployeeRecord],
    members: &[GroupMember<'_>],
    fields: &SourceConfig,
    index: &ShiftIndex<'_>,
) -> Vec<ListedEmployee> {
    records
        .iter()
        .zip(members)
        .map(|(r, member)| {
            let (api, excel) = match r.source {
                Source::Api => (Some(r.fields.clone()), None),
                Source::Excel => (None, Some(r.fields.clone())),
            };
            ListedEmployee {
                id: r.id.clone(),
                name: fields.name_of(r).map(str::to_string),
                api,
                excel,
                attendance: attendance_for(member, index),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DedupPolicy;
    use crate::model::{MatchGroup, Shift};
    use chrono::NaiveDate;

    fn row(pairs: &[(&str, &str)]) -> SourceRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn shift(employee: &str, start_h: u32, end_h: u32) -> Shift {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        Shift::new(
            employee,
            date.and_hms_opt(start_h, 0, 0).unwrap(),
            date.and_hms_opt(end_h, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn sample_input() -> ReconInput {
        ReconInput {
            api_rows: vec![
                row(&[("id_number", "1"), ("employee_number", "E1"), ("name", "Avi"), ("bank_account", "111")]),
                row(&[("id_number", "2"), ("employee_number", "E2"), ("name", "Bina"), ("bank_account", "")]),
                row(&[("id_number", "3"), ("employee_number", "E3"), ("name", "Gil"), ("bank_account", "333")]),
            ],
            excel_rows: vec![
                row(&[("מספר זהות", "2"), ("שם", "בינה")]),
                row(&[("מספר זהות", "3.0"), ("שם", "גיל")]),
                row(&[("מספר זהות", "4"), ("שם", "דן")]),
            ],
            excel_columns: vec!["מספר זהות".into(), "שם".into()],
            shifts: vec![shift("E2", 8, 16), shift("E2", 9, 15), shift("E3", 10, 14)],
        }
    }

    #[test]
    fn end_to_end_partition_and_stats() {
        let config = ReconConfig::default();
        let result = run(&config, &sample_input()).unwrap();

        assert_eq!(result.summary.matching_ids_count, 2);
        assert_eq!(result.summary.api_only_count, 1);
        assert_eq!(result.summary.excel_only_count, 1);
        assert_eq!(result.summary.total_compared, 4);
        assert_eq!(result.summary.total_shifts, 3);

        let ids: Vec<&str> = result.matches.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
        assert_eq!(result.api_only[0].id, "1");
        assert_eq!(result.excel_only[0].id, "4");

        let m = &result.attendance_summary.matches;
        assert_eq!(m.total_employees, 2);
        assert_eq!(m.total_shifts, 3);
        assert_eq!(m.avg_shifts_per_employee, 1.5);
        assert_eq!(m.employees_with_shifts, 2);
        assert_eq!(m.employees_with_bank_account, 1);
        assert_eq!(m.bank_details_ratio, 0.5);

        let excel_only = result.attendance_summary.get(MatchGroup::ExcelOnly);
        assert_eq!(excel_only.total_employees, 1);
        assert_eq!(excel_only.total_shifts, 0);
        assert_eq!(excel_only.bank_details_ratio, 0.0);
    }

    #[test]
    fn listings_carry_attendance_and_names() {
        let result = run(&ReconConfig::default(), &sample_input()).unwrap();
        let bina = &result.matches[0];
        assert_eq!(bina.name.as_deref(), Some("Bina"));
        assert_eq!(bina.attendance.number_of_shifts, 2);
        assert_eq!(bina.attendance.average_shift_hours, 7.0);
        assert!(bina.api.is_some() && bina.excel.is_some());

        let dan = &result.excel_only[0];
        assert!(dan.api.is_none());
        assert_eq!(dan.excel.as_ref().unwrap()["שם"], "דן");
        assert_eq!(dan.attendance.number_of_shifts, 0);
    }

    #[test]
    fn excel_name_column_used_when_configured() {
        let mut config = ReconConfig::default();
        config.excel.fields.name_field = Some("שם".into());
        let result = run(&config, &sample_input()).unwrap();
        assert_eq!(result.excel_only[0].name.as_deref(), Some("דן"));
    }

    fn roster_with_bank_and_keys() -> ReconInput {
        ReconInput {
            api_rows: vec![
                row(&[("id_number", "2"), ("employee_number", ""), ("bank_account", "")]),
                row(&[("id_number", "3"), ("employee_number", "E3"), ("bank_account", "333")]),
            ],
            excel_rows: vec![
                row(&[("מספר זהות", "2"), ("מספר עובד", "E2"), ("חשבון בנק", "12-222")]),
                row(&[("מספר זהות", "3"), ("מספר עובד", "X9"), ("חשבון בנק", "")]),
                row(&[("מספר זהות", "4"), ("מספר עובד", "E4"), ("חשבון בנק", "12-444")]),
            ],
            excel_columns: vec!["מספר זהות".into(), "מספר עובד".into(), "חשבון בנק".into()],
            shifts: vec![
                shift("E2", 8, 12),
                shift("E3", 10, 14),
                shift("X9", 6, 7),
                shift("E4", 9, 13),
            ],
        }
    }

    fn excel_mapped_config() -> ReconConfig {
        let mut config = ReconConfig::default();
        config.excel.fields.attendance_key_field = Some("מספר עובד".into());
        config.excel.fields.bank_field = Some("חשבון בנק".into());
        config
    }

    #[test]
    fn matched_employee_falls_back_to_spreadsheet_values() {
        let result = run(&excel_mapped_config(), &roster_with_bank_and_keys()).unwrap();

        let m = &result.attendance_summary.matches;
        assert_eq!(m.total_employees, 2);
        // Employee 2 has no API bank account or employee number; both come from Excel.
        assert_eq!(m.employees_with_bank_account, 2);
        assert_eq!(m.bank_details_ratio, 1.0);
        // Employee 3 keeps the API key E3, so the Excel key X9 is not counted.
        assert_eq!(m.total_shifts, 2);
        assert_eq!(m.employees_with_shifts, 2);

        assert_eq!(result.matches[0].attendance.number_of_shifts, 1);
        assert_eq!(result.matches[0].attendance.average_shift_hours, 4.0);
    }

    #[test]
    fn excel_only_attendance_uses_spreadsheet_key() {
        let result = run(&excel_mapped_config(), &roster_with_bank_and_keys()).unwrap();

        let excel_only = &result.attendance_summary.excel_only;
        assert_eq!(excel_only.total_employees, 1);
        assert_eq!(excel_only.total_shifts, 1);
        assert_eq!(excel_only.avg_hours_per_shift, 4.0);
        assert_eq!(excel_only.employees_with_bank_account, 1);
        assert_eq!(result.excel_only[0].attendance.number_of_shifts, 1);
    }

    #[test]
    fn excel_only_without_key_has_no_shifts() {
        let mut config = excel_mapped_config();
        config.excel.fields.attendance_key_field = None;
        let result = run(&config, &roster_with_bank_and_keys()).unwrap();
        assert_eq!(result.attendance_summary.excel_only.total_shifts, 0);
        // Employee 2 now has no attendance key from either source.
        assert_eq!(result.attendance_summary.matches.total_shifts, 1);
    }

    #[test]
    fn configured_excel_id_column_must_exist() {
        let mut config = ReconConfig::default();
        config.excel.fields.id_field = Some("ת.ז".into());
        let err = run(&config, &sample_input()).unwrap_err();
        assert!(matches!(err, ReconError::MissingColumn { .. }));
    }

    #[test]
    fn api_id_field_must_appear() {
        let mut config = ReconConfig::default();
        config.api.id_field = Some("tz".into());
        let err = run(&config, &sample_input()).unwrap_err();
        assert!(err.to_string().contains("'tz'"));
    }

    #[test]
    fn excel_without_columns_and_rows_is_an_error() {
        let mut input = sample_input();
        input.excel_rows.clear();
        input.excel_columns.clear();
        assert!(run(&ReconConfig::default(), &input).is_err());
    }

    #[test]
    fn empty_inputs_yield_zero_stats() {
        let mut config = ReconConfig::default();
        config.excel.fields.id_field = Some("id".into());
        let result = run(&config, &ReconInput::default()).unwrap();
        assert_eq!(result.summary.total_compared, 0);
        for group in MatchGroup::ALL {
            let stats = result.attendance_summary.get(group);
            assert_eq!(stats.total_shifts, 0);
            assert_eq!(stats.avg_shifts_per_employee, 0.0);
            assert_eq!(stats.avg_hours_per_shift, 0.0);
            assert_eq!(stats.bank_details_ratio, 0.0);
        }
    }

    #[test]
    fn duplicates_and_empties_surface_as_warnings() {
        let mut input = sample_input();
        input.api_rows.push(row(&[("id_number", "1"), ("name", "Avi again")]));
        input.api_rows.push(row(&[("id_number", " ")]));
        let mut config = ReconConfig::default();
        config.dedup = DedupPolicy::First;
        let result = run(&config, &input).unwrap();
        assert_eq!(result.sources.api.total_rows, 5);
        assert_eq!(result.sources.api.empty_ids, 1);
        assert_eq!(result.sources.api.duplicates_removed, 1);
        assert_eq!(result.summary.total_api, 3);
        assert_eq!(result.warnings.len(), 2);
        assert_eq!(result.api_only[0].name.as_deref(), Some("Avi"));
    }
}
