//! Storage for generated JSON-LD.
//!
//! - [`LocalStorage`]: atomic whole-document writes under a root directory
//! - [`ArrayFile`] / [`JsonArrayWriter`]: incremental JSON arrays
//! - [`MonthlyWriter`]: one array file per calendar month plus `index.json`

pub mod array;
pub mod local;
pub mod monthly;

// Re-export for convenience
pub use array::{ArrayFile, JsonArrayWriter};
pub use local::LocalStorage;
pub use monthly::{MonthlySummary, MonthlyWriter, month_key};
