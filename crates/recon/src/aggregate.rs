use std::collections::HashMap;

use crate::model::{EmployeeAttendance, GroupMember, GroupStats, Shift};

/// Shifts grouped by attendance key.
#[derive(Debug, Default)]
pub struct ShiftIndex<'a> {
    by_employee: HashMap<&'a str, Vec<&'a Shift>>,
}

impl<'a> ShiftIndex<'a> {
    pub fn build(shifts: &'a [Shift]) -> Self {
        let mut by_employee: HashMap<&str, Vec<&Shift>> = HashMap::new();
        for shift in shifts {
            by_employee.entry(shift.employee()).or_default().push(shift);
        }
        Self { by_employee }
    }

    pub fn for_employee(&self, key: &str) -> &[&'a Shift] {
        self.by_employee.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    fn for_member(&self, member: &GroupMember<'_>) -> &[&'a Shift] {
        member
            .attendance_key
            .map(|key| self.for_employee(key))
            .unwrap_or(&[])
    }
}

/// Shift count and average hours for one employee.
pub fn employee_attendance(shifts: &[&Shift]) -> EmployeeAttendance {
    if shifts.is_empty() {
        return EmployeeAttendance::default();
    }
    let total: f64 = shifts.iter().map(|s| s.hours()).sum();
    EmployeeAttendance {
        number_of_shifts: shifts.len(),
        average_shift_hours: round2(total / shifts.len() as f64),
    }
}

/// Attendance and bank-detail statistics for one match group.
///
/// Members without an attendance key or without shifts contribute zero
/// shifts. All ratios are 0 for an empty group.
pub fn group_stats(members: &[GroupMember<'_>], index: &ShiftIndex<'_>) -> GroupStats {
    let mut total_shifts = 0;
    let mut total_hours = 0.0;
    let mut employees_with_shifts = 0;
    let mut employees_with_bank_account = 0;

    for member in members {
        let shifts = index.for_member(member);
        if !shifts.is_empty() {
            employees_with_shifts += 1;
        }
        total_shifts += shifts.len();
        total_hours += shifts.iter().map(|s| s.hours()).sum::<f64>();
        if member.has_bank_account {
            employees_with_bank_account += 1;
        }
    }

    GroupStats {
        total_employees: members.len(),
        total_shifts,
        avg_shifts_per_employee: ratio(total_shifts as f64, members.len()),
        avg_hours_per_shift: ratio(total_hours, total_shifts),
        employees_with_shifts,
        employees_with_bank_account,
        bank_details_ratio: ratio(employees_with_bank_account as f64, members.len()),
    }
}

fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn shift(employee: &str, day: u32, start_h: u32, end_h: u32) -> Shift {
        let date = NaiveDate::from_ymd_opt(2026, 3, day).unwrap();
        Shift::new(
            employee,
            date.and_hms_opt(start_h, 0, 0).unwrap(),
            date.and_hms_opt(end_h, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn member<'a>(id: &'a str, key: Option<&'a str>, bank: bool) -> GroupMember<'a> {
        GroupMember {
            id,
            attendance_key: key,
            has_bank_account: bank,
        }
    }

    #[test]
    fn average_hours_over_all_shifts() {
        let shifts = vec![shift("E2", 1, 8, 16), shift("E2", 2, 9, 15)];
        let index = ShiftIndex::build(&shifts);
        let stats = group_stats(&[member("2", Some("E2"), true)], &index);
        assert_eq!(stats.total_shifts, 2);
        assert_eq!(stats.avg_hours_per_shift, 7.0);
        assert_eq!(stats.avg_shifts_per_employee, 2.0);
        assert_eq!(stats.employees_with_shifts, 1);
        assert_eq!(stats.bank_details_ratio, 1.0);
    }

    #[test]
    fn empty_group_reports_zero() {
        let index = ShiftIndex::build(&[]);
        let stats = group_stats(&[], &index);
        assert_eq!(stats, GroupStats::default());
        assert!(!stats.avg_hours_per_shift.is_nan());
        assert!(!stats.bank_details_ratio.is_nan());
    }

    #[test]
    fn members_without_shifts_count_toward_size() {
        let shifts = vec![shift("E1", 1, 8, 12), shift("E1", 2, 8, 12), shift("E9", 1, 0, 8)];
        let index = ShiftIndex::build(&shifts);
        let members = [
            member("1", Some("E1"), true),
            member("2", Some("E2"), false),
            member("3", None, false),
            member("4", None, true),
        ];
        let stats = group_stats(&members, &index);
        assert_eq!(stats.total_employees, 4);
        assert_eq!(stats.total_shifts, 2);
        assert_eq!(stats.avg_shifts_per_employee, 0.5);
        assert_eq!(stats.avg_hours_per_shift, 4.0);
        assert_eq!(stats.employees_with_shifts, 1);
        assert_eq!(stats.employees_with_bank_account, 2);
        assert_eq!(stats.bank_details_ratio, 0.5);
    }

    #[test]
    fn group_without_any_shifts() {
        let index = ShiftIndex::build(&[]);
        let stats = group_stats(&[member("1", Some("E1"), false)], &index);
        assert_eq!(stats.total_shifts, 0);
        assert_eq!(stats.avg_shifts_per_employee, 0.0);
        assert_eq!(stats.avg_hours_per_shift, 0.0);
        assert_eq!(stats.bank_details_ratio, 0.0);
    }

    #[test]
    fn employee_attendance_rounds_to_two_decimals() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let a = Shift::new(
            "E1",
            date.and_hms_opt(8, 0, 0).unwrap(),
            date.and_hms_opt(8, 20, 0).unwrap(),
        )
        .unwrap();
        let shifts = vec![a];
        let index = ShiftIndex::build(&shifts);
        let att = employee_attendance(index.for_employee("E1"));
        assert_eq!(att.number_of_shifts, 1);
        assert_eq!(att.average_shift_hours, 0.33);

        assert_eq!(employee_attendance(index.for_employee("nobody")), EmployeeAttendance::default());
    }
}
