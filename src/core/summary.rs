use crate::core::rules::OfficeRules;
use crate::domain::model::{EmployeeSummary, EvaluatedDay};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Default)]
struct Totals {
    dates: BTreeSet<String>,
    full_day: f64,
    half_day: f64,
    deductions: f64,
    grace_violations: u32,
    short_hours: u32,
    partial_hours: u32,
    late_beyond_grace: u32,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Aggregates the days carrying a deduction per employee, sorted by
/// (employee id, name, designation).
pub fn summarize(days: &[EvaluatedDay], rules: &OfficeRules) -> Vec<EmployeeSummary> {
    let mut groups: BTreeMap<(String, String, String), Totals> = BTreeMap::new();

    for day in days
        .iter()
        .filter(|d| d.has_deduction() && !d.record.employee_id.is_empty())
    {
        let key = (
            day.record.employee_id.clone(),
            day.record.employee_name.clone(),
            day.record.designation.clone(),
        );
        let totals = groups.entry(key).or_default();

        if let Some(date) = day.date {
            totals.dates.insert(date.format("%d/%m/%Y").to_string());
        }
        totals.full_day += day.full_day;
        totals.half_day += day.half_day;
        totals.deductions += day.day_deduction;
        totals.grace_violations += u32::from(day.grace_violation);
        totals.short_hours += u32::from(rules.is_short_hours(day.working_hours));
        totals.partial_hours += u32::from(rules.is_partial_hours(day.working_hours));
        totals.late_beyond_grace += u32::from(day.late_beyond_grace);
    }

    groups
        .into_iter()
        .enumerate()
        .map(
            |(idx, ((employee_id, employee_name, designation), totals))| EmployeeSummary {
                sr_no: idx + 1,
                employee_id,
                employee_name,
                designation,
                deduction_dates: totals.dates.into_iter().collect::<Vec<_>>().join(", "),
                total_full_day_deductions: round1(totals.full_day),
                total_half_day_deductions: round1(totals.half_day),
                total_deductions: round1(totals.deductions),
                grace_violation_count: totals.grace_violations,
                working_hours_less8_count: totals.short_hours,
                working_hours_between8to9_count: totals.partial_hours,
                late_beyond_grace_count: totals.late_beyond_grace,
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules::evaluate;
    use crate::domain::model::{AttendanceRecord, AttendanceSheet};

    fn record(id: &str, name: &str, date: &str, punch_in: &str, punch_out: &str) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: id.to_string(),
            employee_name: name.to_string(),
            designation: "Analyst".to_string(),
            date_raw: date.to_string(),
            punch_in_raw: punch_in.to_string(),
            punch_out_raw: punch_out.to_string(),
            attendance_status: "P".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_summarize_groups_and_sorts() {
        let rules = OfficeRules::default();
        let sheet = AttendanceSheet {
            headers: vec![],
            records: vec![
                record("E2", "Ravi", "15/04/2024", "09:30", "17:00"),
                record("E1", "Meena", "12/04/2024", "09:30", "18:00"),
                record("E2", "Ravi", "02/05/2024", "09:30", "18:00"),
                record("E1", "Meena", "13/04/2024", "09:30", "19:00"),
                record("", "Unknown", "13/04/2024", "09:30", "12:00"),
            ],
        };
        let days = evaluate(sheet, &rules);
        let summary = summarize(&days, &rules);

        assert_eq!(summary.len(), 2);

        let meena = &summary[0];
        assert_eq!(meena.sr_no, 1);
        assert_eq!(meena.employee_id, "E1");
        assert_eq!(meena.deduction_dates, "12/04/2024");
        assert_eq!(meena.total_half_day_deductions, 1.0);
        assert_eq!(meena.total_deductions, 0.5);
        assert_eq!(meena.working_hours_between8to9_count, 1);

        let ravi = &summary[1];
        assert_eq!(ravi.sr_no, 2);
        // Dates are sorted as text.
        assert_eq!(ravi.deduction_dates, "02/05/2024, 15/04/2024");
        assert_eq!(ravi.total_full_day_deductions, 1.0);
        assert_eq!(ravi.total_half_day_deductions, 1.0);
        assert_eq!(ravi.total_deductions, 1.5);
        assert_eq!(ravi.working_hours_less8_count, 1);
        assert_eq!(ravi.late_beyond_grace_count, 0);
    }

    #[test]
    fn test_summarize_without_deductions() {
        let rules = OfficeRules::default();
        let sheet = AttendanceSheet {
            headers: vec![],
            records: vec![record("E1", "Meena", "12/04/2024", "09:30", "19:00")],
        };
        let days = evaluate(sheet, &rules);
        assert!(summarize(&days, &rules).is_empty());
    }
}
