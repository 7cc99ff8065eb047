pub mod etl;
pub mod export_pipeline;

pub use crate::domain::model::{ExportReport, FlatRecord, NormalizedTable};
pub use crate::domain::ports::{AccessTokenProvider, ListingSource, Pipeline, TableSink};
pub use crate::utils::error::Result;
