pub mod columns;
pub mod date_format;
pub mod flatten;
pub mod json_access;

pub use columns::{ColumnNormalizer, PREFERRED_COLUMNS};
pub use date_format::{format_date, format_date_value};
pub use flatten::{flatten, flatten_all};
pub use json_access::JsonAccess;
