use crate::core::reader::read_attendance;
use crate::core::report::build_workbook;
use crate::core::rules::{evaluate, OfficeRules};
use crate::core::summary::summarize;
use crate::core::{AttendanceReport, AttendanceSheet, Pipeline, Storage};
use crate::utils::error::{EtlError, Result};
use std::sync::Arc;

/// Storage name for a fresh report: `attendance_<uuid>.xlsx`.
pub fn report_file_name() -> String {
    format!("attendance_{}.xlsx", uuid::Uuid::new_v4().simple())
}

/// Runs CPU-bound work off the async workers. A panic in `task` comes back
/// as a processing error.
pub async fn run_blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| EtlError::processing(format!("background task failed: {}", e)))?
}

pub struct AttendancePipeline<S: Storage> {
    storage: S,
    rules: OfficeRules,
    source: Arc<[u8]>,
    output_name: String,
}

impl<S: Storage> AttendancePipeline<S> {
    pub fn new(storage: S, rules: OfficeRules, source: Vec<u8>) -> Self {
        Self::with_output_name(storage, rules, source, report_file_name())
    }

    pub fn with_output_name(
        storage: S,
        rules: OfficeRules,
        source: Vec<u8>,
        output_name: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            rules,
            source: source.into(),
            output_name: output_name.into(),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for AttendancePipeline<S> {
    async fn extract(&self) -> Result<AttendanceSheet> {
        tracing::debug!("Parsing {} bytes of attendance CSV", self.source.len());
        let source = Arc::clone(&self.source);
        run_blocking(move || read_attendance(&source)).await
    }

    async fn transform(&self, sheet: AttendanceSheet) -> Result<AttendanceReport> {
        let rules = self.rules.clone();
        let report = run_blocking(move || {
            let headers = sheet.headers.clone();
            let days = evaluate(sheet, &rules);
            let summary = summarize(&days, &rules);
            Ok(AttendanceReport {
                headers,
                days,
                summary,
            })
        })
        .await?;

        tracing::debug!(
            "Evaluated {} days, {} with deductions, {} employees in summary",
            report.days.len(),
            report.deduction_days().count(),
            report.summary.len()
        );

        Ok(report)
    }

    async fn load(&self, report: AttendanceReport) -> Result<String> {
        let (data, sheets) = run_blocking(move || {
            let workbook = build_workbook(&report)?;
            let sheets: Vec<String> = workbook
                .sheet_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            Ok((workbook.to_bytes()?, sheets))
        })
        .await?;

        tracing::debug!(
            "Writing workbook {} ({} bytes, sheets: {:?})",
            self.output_name,
            data.len(),
            sheets
        );
        self.storage.write_file(&self.output_name, &data).await?;

        Ok(self.output_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files
                .get(path)
                .cloned()
                .ok_or_else(|| EtlError::NotFoundError {
                    resource: path.to_string(),
                })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn exists(&self, path: &str) -> bool {
            self.files.lock().await.contains_key(path)
        }
    }

    const CSV: &str = "Monthly Attendance\n\
        Branch: Head Office\n\
        ALPHA EMP CODE,EMP FULL NAME,DESIG NAME,ON DATE,ACTUAL IN TIME,ACTUAL OUT TIME,DURATION,AB LEAVE\n\
        E1,Asha,Engineer,01/04/2024,09:58,19:05,09:07,P\n\
        E1,Asha,Engineer,02/04/2024,10:40,18:10,07:30,P\n\
        E1,Asha,Engineer,03/04/2024,,,,WO\n";

    #[test]
    fn test_report_file_name() {
        let name = report_file_name();
        assert!(name.starts_with("attendance_"));
        assert!(name.ends_with(".xlsx"));
        assert_ne!(name, report_file_name());
    }

    #[tokio::test]
    async fn test_extract_and_transform() {
        let pipeline = AttendancePipeline::new(
            MockStorage::new(),
            OfficeRules::default(),
            CSV.as_bytes().to_vec(),
        );

        let sheet = pipeline.extract().await.unwrap();
        assert_eq!(sheet.records.len(), 3);

        let report = pipeline.transform(sheet).await.unwrap();
        assert_eq!(report.days.len(), 3);
        assert_eq!(report.days[0].day_deduction, 0.0);
        assert_eq!(report.days[1].day_deduction, 1.0);
        assert!(report.days[1].late_beyond_grace);
        assert_eq!(report.days[2].payable_day, 1.0);
        assert_eq!(report.summary.len(), 1);
        assert_eq!(report.summary[0].deduction_dates, "02/04/2024");
    }

    #[tokio::test]
    async fn test_load_writes_workbook() {
        let storage = MockStorage::new();
        let pipeline = AttendancePipeline::with_output_name(
            storage.clone(),
            OfficeRules::default(),
            CSV.as_bytes().to_vec(),
            "out.xlsx",
        );

        let sheet = pipeline.extract().await.unwrap();
        let report = pipeline.transform(sheet).await.unwrap();
        let name = pipeline.load(report).await.unwrap();

        assert_eq!(name, "out.xlsx");
        let data = storage.get_file("out.xlsx").await.unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();
        assert!(archive.file_names().any(|n| n == "xl/worksheets/sheet3.xml"));
    }

    #[tokio::test]
    async fn test_extract_invalid_csv() {
        let pipeline = AttendancePipeline::new(
            MockStorage::new(),
            OfficeRules::default(),
            b"a\nb\nfoo,bar\n1,2\n".to_vec(),
        );
        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, EtlError::MissingColumnError { .. }));
    }

    #[tokio::test]
    async fn test_run_blocking_maps_panic_to_processing_error() {
        let err = run_blocking::<(), _>(|| panic!("worksheet exploded"))
            .await
            .unwrap_err();
        assert!(matches!(err, EtlError::ProcessingError { .. }));

        assert_eq!(run_blocking(|| Ok(7)).await.unwrap(), 7);
    }
}
