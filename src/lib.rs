pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{CsvTableSink, GoogleSheetsSink, ImmoApiClient, ServiceAccountTokens, StaticToken};
#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::ExportConfig;
pub use core::{etl::EtlEngine, export_pipeline::ExportPipeline};
pub use domain::services::ColumnNormalizer;
pub use utils::error::{EtlError, Result};
