use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// One row of the attendance export after header normalization.
///
/// `cells` keeps every raw value in header order so unknown columns can be
/// written back out unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub cells: Vec<String>,
    pub employee_id: String,
    pub employee_name: String,
    pub designation: String,
    pub date_raw: String,
    pub punch_in_raw: String,
    pub punch_out_raw: String,
    pub worked_duration: String,
    pub attendance_status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSheet {
    pub headers: Vec<String>,
    pub records: Vec<AttendanceRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A record after the office rules have been applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatedDay {
    pub sr_no: usize,
    pub record: AttendanceRecord,
    pub status: String,
    pub date: Option<NaiveDate>,
    pub month: Option<Month>,
    pub punch_in_time: Option<NaiveTime>,
    pub punch_out_time: Option<NaiveTime>,
    pub punch_in: Option<NaiveDateTime>,
    pub punch_out: Option<NaiveDateTime>,
    pub working_hours: f64,
    pub working_day: bool,
    pub within_grace: bool,
    pub late_beyond_grace: bool,
    pub grace_count: Option<u32>,
    pub grace_violation: bool,
    pub day_deduction: f64,
    pub payable_day: f64,
    pub deduction_reason: String,
    pub full_day: f64,
    pub half_day: f64,
}

impl EvaluatedDay {
    pub fn has_deduction(&self) -> bool {
        self.day_deduction > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeSummary {
    pub sr_no: usize,
    pub employee_id: String,
    pub employee_name: String,
    pub designation: String,
    pub deduction_dates: String,
    pub total_full_day_deductions: f64,
    pub total_half_day_deductions: f64,
    pub total_deductions: f64,
    pub grace_violation_count: u32,
    pub working_hours_less8_count: u32,
    pub working_hours_between8to9_count: u32,
    pub late_beyond_grace_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceReport {
    pub headers: Vec<String>,
    pub days: Vec<EvaluatedDay>,
    pub summary: Vec<EmployeeSummary>,
}

impl AttendanceReport {
    pub fn deduction_days(&self) -> impl Iterator<Item = &EvaluatedDay> {
        self.days.iter().filter(|d| d.has_deduction())
    }
}
