//! Office attendance rules: grace window, monthly grace allowance and the
//! working-hours deduction ladder.

use crate::core::timeparse::{parse_date, parse_duration_hours, parse_time};
use crate::domain::model::{AttendanceSheet, EvaluatedDay, Month};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const STATUS_PRESENT: &str = "P";
pub const STATUS_ABSENT: &str = "A";
pub const STATUS_WEEKLY_OFF: &str = "WO";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OfficeRules {
    pub shift_start: NaiveTime,
    pub grace_limit: NaiveTime,
    pub max_grace_per_month: u32,
    pub min_full_day_hours: f64,
    pub min_half_day_hours: f64,
}

impl Default for OfficeRules {
    fn default() -> Self {
        Self {
            shift_start: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
            grace_limit: NaiveTime::from_hms_opt(10, 15, 0).unwrap_or_default(),
            max_grace_per_month: 4,
            min_full_day_hours: 9.0,
            min_half_day_hours: 8.0,
        }
    }
}

fn fmt_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{}", hours as i64)
    } else {
        format!("{}", hours)
    }
}

impl OfficeRules {
    pub fn is_within_grace(&self, punch_in: Option<NaiveTime>, working_day: bool) -> bool {
        working_day
            && punch_in.is_some_and(|t| self.shift_start < t && t <= self.grace_limit)
    }

    pub fn is_late_beyond_grace(&self, punch_in: Option<NaiveTime>, working_day: bool) -> bool {
        working_day && punch_in.is_some_and(|t| t > self.grace_limit)
    }

    fn hours_deduction(&self, working_hours: f64) -> f64 {
        if working_hours < self.min_half_day_hours {
            1.0
        } else if working_hours < self.min_full_day_hours {
            0.5
        } else {
            0.0
        }
    }

    /// Fraction of the day deducted. Repeated late arrivals past the
    /// monthly grace allowance tighten the hours rule.
    pub fn day_deduction(
        &self,
        working_day: bool,
        working_hours: f64,
        late_beyond_grace: bool,
        grace_violation: bool,
    ) -> f64 {
        if !working_day {
            return 0.0;
        }

        let base = self.hours_deduction(working_hours);
        if late_beyond_grace && grace_violation {
            if working_hours < self.min_full_day_hours {
                return 1.0;
            }
            return base.max(0.5);
        }
        base
    }

    pub fn payable_day(&self, status: &str, day_deduction: f64) -> f64 {
        let payable = match status {
            STATUS_WEEKLY_OFF => 1.0,
            STATUS_ABSENT => 0.0,
            STATUS_PRESENT => 1.0 - day_deduction,
            _ => 0.0,
        };
        payable.clamp(0.0, 1.0)
    }

    pub fn deduction_reason(
        &self,
        day_deduction: f64,
        working_hours: f64,
        late_beyond_grace: bool,
        grace_violation: bool,
    ) -> String {
        if day_deduction <= 0.0 {
            return String::new();
        }

        let mut reasons = Vec::new();
        if late_beyond_grace {
            reasons.push("Late beyond grace".to_string());
        }
        if working_hours < self.min_half_day_hours {
            reasons.push(format!(
                "Working hours < {}",
                fmt_hours(self.min_half_day_hours)
            ));
        } else if working_hours < self.min_full_day_hours {
            reasons.push(format!(
                "Working hours between {}\u{2013}{}",
                fmt_hours(self.min_half_day_hours),
                fmt_hours(self.min_full_day_hours)
            ));
        }
        if grace_violation {
            reasons.push(format!("Grace violation > {}", self.max_grace_per_month));
        }
        reasons.join(", ")
    }

    pub fn is_short_hours(&self, working_hours: f64) -> bool {
        working_hours < self.min_half_day_hours
    }

    pub fn is_partial_hours(&self, working_hours: f64) -> bool {
        working_hours >= self.min_half_day_hours && working_hours < self.min_full_day_hours
    }
}

fn combine(date: Option<NaiveDate>, time: Option<NaiveTime>) -> Option<NaiveDateTime> {
    Some(date?.and_time(time?))
}

fn span_hours(punch_in: Option<NaiveDateTime>, punch_out: Option<NaiveDateTime>) -> Option<f64> {
    let (start, end) = (punch_in?, punch_out?);
    Some((end - start).num_seconds() as f64 / 3600.0)
}

/// Applies the office rules to every row, in file order.
pub fn evaluate(sheet: AttendanceSheet, rules: &OfficeRules) -> Vec<EvaluatedDay> {
    let mut last_date: HashMap<String, NaiveDate> = HashMap::new();
    let mut grace_counts: HashMap<(String, Month), u32> = HashMap::new();

    sheet
        .records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            let status = record.attendance_status.trim().to_uppercase();
            let has_employee = !record.employee_id.is_empty();

            // Rows without a date inherit the employee's previous date.
            let date = match parse_date(&record.date_raw) {
                Some(date) => {
                    if has_employee {
                        last_date.insert(record.employee_id.clone(), date);
                    }
                    Some(date)
                }
                None if has_employee => last_date.get(&record.employee_id).copied(),
                None => None,
            };
            let month = date.map(|d| Month {
                year: d.year(),
                month: d.month(),
            });

            let punch_in_time = parse_time(&record.punch_in_raw);
            let punch_out_time = parse_time(&record.punch_out_raw);

            let punch_in = combine(date, punch_in_time);
            let mut punch_out = combine(date, punch_out_time);
            if let (Some(start), Some(end)) = (punch_in, punch_out) {
                if end < start {
                    punch_out = Some(end + Duration::days(1));
                }
            }

            let working_hours = span_hours(punch_in, punch_out)
                .or_else(|| parse_duration_hours(&record.worked_duration))
                .filter(|h| h.is_finite())
                .unwrap_or(0.0);

            let working_day = status == STATUS_PRESENT;
            let within_grace = rules.is_within_grace(punch_in_time, working_day);
            let late_beyond_grace = rules.is_late_beyond_grace(punch_in_time, working_day);

            let grace_count = match month {
                Some(month) if has_employee => {
                    let count = grace_counts
                        .entry((record.employee_id.clone(), month))
                        .or_insert(0);
                    if within_grace {
                        *count += 1;
                    }
                    Some(*count)
                }
                _ => None,
            };
            let grace_violation = grace_count.is_some_and(|c| c > rules.max_grace_per_month);

            let day_deduction =
                rules.day_deduction(working_day, working_hours, late_beyond_grace, grace_violation);
            let payable_day = rules.payable_day(&status, day_deduction);
            let deduction_reason = rules.deduction_reason(
                day_deduction,
                working_hours,
                late_beyond_grace,
                grace_violation,
            );

            EvaluatedDay {
                sr_no: idx + 1,
                record,
                status,
                date,
                month,
                punch_in_time,
                punch_out_time,
                punch_in,
                punch_out,
                working_hours,
                working_day,
                within_grace,
                late_beyond_grace,
                grace_count,
                grace_violation,
                day_deduction,
                payable_day,
                deduction_reason,
                full_day: if day_deduction == 1.0 { 1.0 } else { 0.0 },
                half_day: if day_deduction == 0.5 { 1.0 } else { 0.0 },
            }
        })
        .collect()
}
