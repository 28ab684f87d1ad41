use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs extract → transform → load and returns the stored file name.
    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting attendance processing");

        let sheet = self.pipeline.extract().await?;
        tracing::info!("Extracted {} rows", sheet.records.len());

        let report = self.pipeline.transform(sheet).await?;
        tracing::info!(
            "Evaluated {} days for {} employees with deductions",
            report.days.len(),
            report.summary.len()
        );

        let output = self.pipeline.load(report).await?;
        tracing::info!(
            "Report saved to {} in {:?}",
            output,
            started.elapsed()
        );

        Ok(output)
    }
}
