use crate::core::{Pipeline, ReportIndex};
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs extract, transform and load. Nothing is written unless all three succeed.
    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting report generation...");

        let index = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} record(s) in {} date bucket(s)",
            index.record_count(),
            index.bucket_count()
        );

        let output = self.pipeline.transform(index).await?;
        tracing::info!("Rendered {} table(s)", output.tables.len());

        let output_path = self.pipeline.load(output).await?;
        tracing::info!(
            "Report saved to: {} ({:?})",
            output_path,
            started.elapsed()
        );

        Ok(output_path)
    }

    /// Extract only, for dry runs.
    pub async fn preview(&self) -> Result<ReportIndex> {
        self.pipeline.extract().await
    }
}
