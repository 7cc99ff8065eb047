use crate::domain::model::{ExportReport, NormalizedTable};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Listing API: site token plus the bulk product search.
pub trait ListingSource: Send + Sync {
    fn fetch_token(&self) -> impl std::future::Future<Output = Result<String>> + Send;
    fn fetch_products(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Value>>> + Send;
}

/// Destination of the normalized table and of the export timestamp.
pub trait TableSink: Send + Sync {
    /// Replaces the destination content; returns a description of where it went.
    fn write_table(
        &self,
        table: &NormalizedTable,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
    fn write_export_stamp(
        &self,
        exported_at: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Value>>;
    async fn transform(&self, products: Vec<Value>) -> Result<NormalizedTable>;
    async fn load(&self, table: NormalizedTable) -> Result<ExportReport>;
}
