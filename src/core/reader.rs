use crate::domain::model::{AttendanceRecord, AttendanceSheet};
use crate::utils::error::{EtlError, Result};

/// Lines above the header row (report title and generation date).
pub const TITLE_ROWS: usize = 2;

/// Export header → canonical column name.
pub const COLUMN_RENAMES: &[(&str, &str)] = &[
    ("SR+A3:R24 NO", "sr_no"),
    ("ALPHA EMP CODE", "employee_id"),
    ("EMP FULL NAME", "employee_name"),
    ("DESIG NAME", "designation"),
    ("ON DATE", "date"),
    ("SHIFT START TIME", "shift_start"),
    ("SHIFT END TIME", "shift_end"),
    ("ACTUAL IN TIME", "punch_in_raw"),
    ("ACTUAL OUT TIME", "punch_out_raw"),
    ("DURATION", "worked_duration"),
    ("AB LEAVE", "attendance_status"),
];

pub const REQUIRED_COLUMNS: &[&str] = &[
    "employee_id",
    "date",
    "punch_in_raw",
    "punch_out_raw",
    "attendance_status",
];

/// Trims the header and drops any non-ASCII characters, then maps it to its
/// canonical name when known.
pub fn normalize_header(raw: &str) -> String {
    let cleaned: String = raw.trim().chars().filter(char::is_ascii).collect();
    let cleaned = cleaned.trim();

    COLUMN_RENAMES
        .iter()
        .find(|(from, _)| *from == cleaned)
        .map(|(_, to)| to.to_string())
        .unwrap_or_else(|| cleaned.to_string())
}

struct ColumnMap {
    employee_id: usize,
    employee_name: Option<usize>,
    designation: Option<usize>,
    date: usize,
    punch_in_raw: usize,
    punch_out_raw: usize,
    worked_duration: Option<usize>,
    attendance_status: usize,
}

impl ColumnMap {
    fn resolve(headers: &[String]) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| EtlError::MissingColumnError {
                column: name.to_string(),
            })
        };

        Ok(Self {
            employee_id: require("employee_id")?,
            employee_name: find("employee_name"),
            designation: find("designation"),
            date: require("date")?,
            punch_in_raw: require("punch_in_raw")?,
            punch_out_raw: require("punch_out_raw")?,
            worked_duration: find("worked_duration"),
            attendance_status: require("attendance_status")?,
        })
    }

    fn record(&self, cells: Vec<String>) -> AttendanceRecord {
        let get = |idx: usize| cells.get(idx).cloned().unwrap_or_default();
        let get_opt = |idx: Option<usize>| idx.map(get).unwrap_or_default();

        AttendanceRecord {
            employee_id: get(self.employee_id).trim().to_string(),
            employee_name: get_opt(self.employee_name).trim().to_string(),
            designation: get_opt(self.designation).trim().to_string(),
            date_raw: get(self.date),
            punch_in_raw: get(self.punch_in_raw),
            punch_out_raw: get(self.punch_out_raw),
            worked_duration: get_opt(self.worked_duration),
            attendance_status: get(self.attendance_status),
            cells,
        }
    }
}

fn skip_lines(content: &str, count: usize) -> Option<&str> {
    let mut rest = content;
    for _ in 0..count {
        let idx = rest.find('\n')?;
        rest = &rest[idx + 1..];
    }
    Some(rest)
}

/// Parses a raw attendance export into typed records.
pub fn read_attendance(data: &[u8]) -> Result<AttendanceSheet> {
    let content = String::from_utf8_lossy(data);
    let content = content.trim_start_matches('\u{feff}');

    let body = skip_lines(content, TITLE_ROWS)
        .filter(|rest| !rest.trim().is_empty())
        .ok_or_else(|| EtlError::validation("The file has no header row after the title lines"))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    let columns = ColumnMap::resolve(&headers)?;
    tracing::debug!("Resolved {} columns: {:?}", headers.len(), headers);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(|cell| cell.trim().is_empty()) && row.len() <= 1 {
            continue;
        }

        let mut cells: Vec<String> = row.iter().map(str::to_string).collect();
        cells.resize(headers.len(), String::new());
        records.push(columns.record(cells));
    }

    tracing::debug!("Read {} attendance rows", records.len());
    Ok(AttendanceSheet { headers, records })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Attendance Report\n\
        Generated on 01/05/2024\n\
        SR+A3:R24 NO,ALPHA EMP CODE,EMP FULL NAME,DESIG NAME,ON DATE,ACTUAL IN TIME,ACTUAL OUT TIME,DURATION,AB LEAVE,REMARKS\n\
        1,E001,Asha Rao,Engineer,01/04/2024,10:05,19:10,09:05,P,ok\n\
        2,E001,Asha Rao,Engineer,,10:20,18:00,07:40,p\n";

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header(" ALPHA EMP CODE "), "employee_id");
        assert_eq!(normalize_header("AB LEAVE\u{a0}"), "attendance_status");
        assert_eq!(normalize_header("DURATION\u{2013}"), "worked_duration");
        assert_eq!(normalize_header("REMARKS"), "REMARKS");
    }

    #[test]
    fn test_read_attendance_sample() {
        let sheet = read_attendance(SAMPLE.as_bytes()).unwrap();

        assert_eq!(sheet.headers[0], "sr_no");
        assert_eq!(sheet.headers[9], "REMARKS");
        assert_eq!(sheet.records.len(), 2);

        let first = &sheet.records[0];
        assert_eq!(first.employee_id, "E001");
        assert_eq!(first.employee_name, "Asha Rao");
        assert_eq!(first.date_raw, "01/04/2024");
        assert_eq!(first.worked_duration, "09:05");
        assert_eq!(first.cells[9], "ok");

        // Short rows are padded to the header width.
        let second = &sheet.records[1];
        assert_eq!(second.attendance_status, "p");
        assert_eq!(second.cells.len(), 10);
        assert_eq!(second.cells[9], "");
    }

    #[test]
    fn test_read_attendance_missing_column() {
        let csv = "title\nsubtitle\nALPHA EMP CODE,ON DATE,AB LEAVE\nE001,01/04/2024,P\n";
        let err = read_attendance(csv.as_bytes()).unwrap_err();
        match err {
            EtlError::MissingColumnError { column } => assert_eq!(column, "punch_in_raw"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_read_attendance_without_header() {
        assert!(read_attendance(b"only one line\n").is_err());
        assert!(read_attendance(b"").is_err());
    }

    #[test]
    fn test_read_attendance_strips_bom() {
        let csv = "\u{feff}title\nsubtitle\nALPHA EMP CODE,ON DATE,ACTUAL IN TIME,ACTUAL OUT TIME,AB LEAVE\nE7,02/04/2024,10:00,19:00,P\n";
        let sheet = read_attendance(csv.as_bytes()).unwrap();
        assert_eq!(sheet.records.len(), 1);
        assert_eq!(sheet.records[0].employee_name, "");
    }
}
