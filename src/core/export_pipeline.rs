use crate::core::{ExportReport, NormalizedTable, Pipeline};
use crate::domain::ports::{ListingSource, TableSink};
use crate::domain::services::{flatten_all, ColumnNormalizer};
use crate::utils::error::Result;
use serde_json::Value;

pub const EXPORT_STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// token → product search → flatten → normalize → table + export stamp.
pub struct ExportPipeline<L: ListingSource, K: TableSink> {
    source: L,
    sink: K,
    normalizer: ColumnNormalizer,
}

impl<L: ListingSource, K: TableSink> ExportPipeline<L, K> {
    pub fn new(source: L, sink: K, normalizer: ColumnNormalizer) -> Self {
        Self {
            source,
            sink,
            normalizer,
        }
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }
}

#[async_trait::async_trait]
impl<L: ListingSource, K: TableSink> Pipeline for ExportPipeline<L, K> {
    async fn extract(&self) -> Result<Vec<Value>> {
        let token = self.source.fetch_token().await?;
        self.source.fetch_products(&token).await
    }

    async fn transform(&self, products: Vec<Value>) -> Result<NormalizedTable> {
        tracing::info!("📦 Flattening products...");
        let rows = flatten_all(&products);
        let table = self.normalizer.normalize(&rows);
        tracing::info!(
            "✅ {} rows built ({} columns, {} beyond the preferred layout)",
            table.height(),
            table.width(),
            table.width().saturating_sub(self.normalizer.preferred().len())
        );
        Ok(table)
    }

    async fn load(&self, table: NormalizedTable) -> Result<ExportReport> {
        let destination = self.sink.write_table(&table).await?;
        let exported_at = chrono::Local::now().format(EXPORT_STAMP_FORMAT).to_string();
        self.sink.write_export_stamp(&exported_at).await?;

        Ok(ExportReport {
            rows: table.height(),
            columns: table.width(),
            destination,
            exported_at,
        })
    }
}
