// Adapters layer: listing API client and table destinations (Google Sheets, local CSV).

pub mod csv_sink;
pub mod google_sheets;
pub mod immo_api;

pub use csv_sink::CsvTableSink;
pub use google_sheets::{GoogleSheetsSink, ServiceAccountTokens, StaticToken};
pub use immo_api::ImmoApiClient;
