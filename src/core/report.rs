use crate::core::xlsx::{Cell, Workbook};
use crate::domain::model::{AttendanceReport, EmployeeSummary, EvaluatedDay};
use crate::utils::error::Result;

pub const SHEET_FULL: &str = "Full_Attendance";
pub const SHEET_DEDUCTIONS: &str = "With_Deductions";
pub const SHEET_SUMMARY: &str = "Employee_Summary";

const DERIVED_COLUMNS: &[&str] = &[
    "month",
    "punch_in_time",
    "punch_out_time",
    "punch_in",
    "punch_out",
    "working_hours",
    "working_day",
    "within_grace",
    "late_beyond_grace",
    "grace_count",
    "grace_violation",
    "day_deduction",
    "payable_day",
    "deduction_reason",
    "full_day",
    "half_day",
];

pub const SUMMARY_COLUMNS: &[&str] = &[
    "sr_no",
    "employee_id",
    "employee_name",
    "designation",
    "deduction_dates",
    "total_full_day_deductions",
    "total_half_day_deductions",
    "total_deductions",
    "grace_violation_count",
    "working_hours_less8_count",
    "working_hours_between8to9_count",
    "late_beyond_grace_count",
];

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIME_FORMAT: &str = "%H:%M:%S";

fn day_headers(source_headers: &[String]) -> Vec<String> {
    std::iter::once("sr_no_fixed")
        .chain(source_headers.iter().map(String::as_str))
        .chain(DERIVED_COLUMNS.iter().copied())
        .map(str::to_string)
        .collect()
}

fn day_row(source_headers: &[String], day: &EvaluatedDay) -> Vec<Cell> {
    let mut row = Vec::with_capacity(1 + source_headers.len() + DERIVED_COLUMNS.len());
    row.push(Cell::Number(day.sr_no as f64));

    for (header, raw) in source_headers.iter().zip(&day.record.cells) {
        let cell = match header.as_str() {
            "date" => day.date.map(Cell::Date).unwrap_or(Cell::Empty),
            "attendance_status" => Cell::from(day.status.clone()),
            _ if raw.is_empty() => Cell::Empty,
            _ => Cell::from(raw.clone()),
        };
        row.push(cell);
    }

    row.extend([
        Cell::from(day.month.map(|m| m.to_string())),
        Cell::from(day.punch_in_time.map(|t| t.format(TIME_FORMAT).to_string())),
        Cell::from(day.punch_out_time.map(|t| t.format(TIME_FORMAT).to_string())),
        Cell::from(
            day.punch_in
                .map(|t| t.format(DATETIME_FORMAT).to_string())
                .unwrap_or_default(),
        ),
        Cell::from(
            day.punch_out
                .map(|t| t.format(DATETIME_FORMAT).to_string())
                .unwrap_or_default(),
        ),
        Cell::from(day.working_hours),
        Cell::from(day.working_day),
        Cell::from(day.within_grace),
        Cell::from(day.late_beyond_grace),
        Cell::from(day.grace_count.map(f64::from)),
        Cell::from(day.grace_violation),
        Cell::from(day.day_deduction),
        Cell::from(day.payable_day),
        Cell::from(day.deduction_reason.clone()),
        Cell::from(day.full_day),
        Cell::from(day.half_day),
    ]);
    row
}

fn summary_row(summary: &EmployeeSummary) -> Vec<Cell> {
    vec![
        Cell::Number(summary.sr_no as f64),
        Cell::from(summary.employee_id.clone()),
        Cell::from(summary.employee_name.clone()),
        Cell::from(summary.designation.clone()),
        Cell::from(summary.deduction_dates.clone()),
        Cell::from(summary.total_full_day_deductions),
        Cell::from(summary.total_half_day_deductions),
        Cell::from(summary.total_deductions),
        Cell::from(f64::from(summary.grace_violation_count)),
        Cell::from(f64::from(summary.working_hours_less8_count)),
        Cell::from(f64::from(summary.working_hours_between8to9_count)),
        Cell::from(f64::from(summary.late_beyond_grace_count)),
    ]
}

/// Lays the report out as `Full_Attendance`, `With_Deductions` (only when
/// some day has a deduction) and `Employee_Summary`.
pub fn build_workbook(report: &AttendanceReport) -> Result<Workbook> {
    let headers = day_headers(&report.headers);
    let mut workbook = Workbook::new();

    let all_rows = report
        .days
        .iter()
        .map(|day| day_row(&report.headers, day))
        .collect();
    workbook.add_sheet(SHEET_FULL, headers.clone(), all_rows)?;

    let deduction_rows: Vec<Vec<Cell>> = report
        .deduction_days()
        .map(|day| day_row(&report.headers, day))
        .collect();
    if !deduction_rows.is_empty() {
        workbook.add_sheet(SHEET_DEDUCTIONS, headers, deduction_rows)?;
    }

    workbook.add_sheet(
        SHEET_SUMMARY,
        SUMMARY_COLUMNS.iter().map(|c| c.to_string()).collect(),
        report.summary.iter().map(summary_row).collect(),
    )?;

    Ok(workbook)
}
