use crate::core::{ExportReport, Pipeline};
use crate::utils::error::Result;

/// Runs a pipeline's three stages back to back. Any stage error aborts the
/// run; nothing is loaded unless extract and transform both succeed.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<ExportReport> {
        tracing::info!("🚀 Starting listing export...");

        tracing::info!("Extracting listings...");
        let products = self.pipeline.extract().await?;
        tracing::info!("Extracted {} products", products.len());

        tracing::info!("Transforming listings...");
        let table = self.pipeline.transform(products).await?;
        tracing::info!("Transformed into {} rows", table.height());

        tracing::info!("Loading table...");
        let report = self.pipeline.load(table).await?;
        tracing::info!("🎉 Export finished: {}", report.destination);

        Ok(report)
    }
}
