use crate::domain::model::{AttendanceReport, AttendanceSheet};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<AttendanceSheet>;
    async fn transform(&self, sheet: AttendanceSheet) -> Result<AttendanceReport>;
    /// Returns the storage-relative name of the written workbook.
    async fn load(&self, report: AttendanceReport) -> Result<String>;
}
