//! Lenient parsing for the date, time and duration cells found in
//! biometric attendance exports. Everything here returns `Option`: a cell
//! that cannot be understood is treated as missing, never as an error.

use chrono::{Datelike, NaiveDate, NaiveTime};

/// Day-first formats, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d-%B-%Y",
    "%d %B %Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%y",
    "%d-%m-%y",
    "%d.%m.%y",
    "%d-%b-%y",
    "%d %b %y",
];

const TIME_FORMATS: &[&str] = &[
    "%H:%M:%S%.f",
    "%H:%M:%S",
    "%H:%M",
    "%I:%M:%S %p",
    "%I:%M %p",
    "%I:%M:%S%p",
    "%I:%M%p",
];

fn is_blank(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v.eq_ignore_ascii_case("nan") || v.eq_ignore_ascii_case("nat")
}

fn parse_date_exact(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(value, fmt)
            .ok()
            // "%Y" happily accepts two digit years; those belong to "%y".
            .filter(|d| d.year() >= 1000)
    })
}

/// Parses a day-first date, ignoring any trailing time component.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if is_blank(value) {
        return None;
    }
    let value = value.trim();

    if let Some(date) = parse_date_exact(value) {
        return Some(date);
    }

    if let Some((date_part, _)) = value.split_once('T') {
        if let Some(date) = parse_date_exact(date_part) {
            return Some(date);
        }
    }

    let tokens: Vec<&str> = value.split_whitespace().collect();
    // "01-03-2024 10:05" and "01 Mar 2024 10:05 AM"
    [1usize, 3]
        .iter()
        .filter(|&&n| tokens.len() > n)
        .find_map(|&n| parse_date_exact(&tokens[..n].join(" ")))
}

fn parse_time_exact(value: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
}

/// Extracts a wall-clock time from a bare time or a full date-time.
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    if is_blank(value) {
        return None;
    }
    let value = value.trim();

    if let Some(time) = parse_time_exact(value) {
        return Some(time);
    }

    if let Some((date_part, time_part)) = value.split_once('T') {
        if parse_date_exact(date_part).is_some() {
            return parse_time_exact(time_part);
        }
    }

    let tokens: Vec<&str> = value.split_whitespace().collect();
    (1..tokens.len()).find_map(|start| {
        parse_date(&tokens[..start].join(" "))?;
        parse_time_exact(&tokens[start..].join(" "))
    })
}

/// Parses `HH:MM[:SS]`, optionally prefixed with `N day(s)`, into hours.
pub fn parse_duration_hours(value: &str) -> Option<f64> {
    if is_blank(value) {
        return None;
    }
    let value = value.trim();

    let (days, clock) = match value.find("day") {
        Some(idx) => {
            let days: f64 = value[..idx].trim().parse().ok()?;
            let rest = value[idx..]
                .trim_start_matches("days")
                .trim_start_matches("day")
                .trim_start_matches(',')
                .trim();
            (days, rest)
        }
        None => (0.0, value),
    };

    if clock.is_empty() {
        return (days >= 0.0).then_some(days * 24.0);
    }

    let parts: Vec<&str> = clock.split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }

    let hours: f64 = parts[0].trim().parse().ok()?;
    let minutes: f64 = parts[1].trim().parse().ok()?;
    let seconds: f64 = match parts.get(2) {
        Some(s) => s.trim().parse().ok()?,
        None => 0.0,
    };

    if days < 0.0 || hours < 0.0 || !(0.0..60.0).contains(&minutes) || !(0.0..60.0).contains(&seconds)
    {
        return None;
    }

    let total = days * 24.0 + hours + minutes / 60.0 + seconds / 3600.0;
    total.is_finite().then_some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_parse_date_day_first() {
        assert_eq!(parse_date("03/04/2024"), Some(date(2024, 4, 3)));
        assert_eq!(parse_date("03-04-2024"), Some(date(2024, 4, 3)));
        assert_eq!(parse_date("03.04.2024"), Some(date(2024, 4, 3)));
        assert_eq!(parse_date("03/04/24"), Some(date(2024, 4, 3)));
        assert_eq!(parse_date("03-Apr-2024"), Some(date(2024, 4, 3)));
        assert_eq!(parse_date("03 Apr 2024"), Some(date(2024, 4, 3)));
    }

    #[test]
    fn test_parse_date_iso_and_datetime() {
        assert_eq!(parse_date("2024-04-03"), Some(date(2024, 4, 3)));
        assert_eq!(parse_date("2024-04-03T09:00:00"), Some(date(2024, 4, 3)));
        assert_eq!(parse_date("03/04/2024 10:05"), Some(date(2024, 4, 3)));
        assert_eq!(parse_date("03 Apr 2024 10:05 AM"), Some(date(2024, 4, 3)));
    }

    #[test]
    fn test_parse_date_invalid() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("nan"), None);
        assert_eq!(parse_date("31/02/2024"), None);
        assert_eq!(parse_date("Total"), None);
    }

    #[test]
    fn test_parse_time_variants() {
        assert_eq!(parse_time("10:05"), Some(time(10, 5, 0)));
        assert_eq!(parse_time("10:05:30"), Some(time(10, 5, 30)));
        assert_eq!(parse_time("07:45 PM"), Some(time(19, 45, 0)));
        assert_eq!(parse_time("07:45pm"), Some(time(19, 45, 0)));
        assert_eq!(parse_time("03/04/2024 10:12"), Some(time(10, 12, 0)));
        assert_eq!(parse_time("2024-04-03T18:30:00"), Some(time(18, 30, 0)));
        assert_eq!(parse_time("03-Apr-2024 09:59 AM"), Some(time(9, 59, 0)));
    }

    #[test]
    fn test_parse_time_placeholders() {
        assert_eq!(parse_time(""), None);
        assert_eq!(parse_time("--:--"), None);
        assert_eq!(parse_time("NaN"), None);
        assert_eq!(parse_time("absent"), None);
    }

    #[test]
    fn test_parse_duration_hours() {
        assert_eq!(parse_duration_hours("08:30:00"), Some(8.5));
        assert_eq!(parse_duration_hours("09:15"), Some(9.25));
        assert_eq!(parse_duration_hours("1 days 02:00:00"), Some(26.0));
        assert_eq!(parse_duration_hours("1 day"), Some(24.0));
        assert_eq!(parse_duration_hours("00:00"), Some(0.0));
        assert_eq!(parse_duration_hours(""), None);
        assert_eq!(parse_duration_hours("8h"), None);
        assert_eq!(parse_duration_hours("08:75"), None);
    }
}
