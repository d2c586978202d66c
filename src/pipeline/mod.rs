//! Pipeline entry points.
//!
//! - `run_monthly`: stream events into per-month files and `index.json`
//! - `run_snapshot`: write every event into a single file
//! - `run_merge`: merge daily snapshots into all/upcoming files

pub mod merge;
pub mod monthly;
pub mod snapshot;

pub use merge::{MergeSummary, run_merge};
pub use monthly::run_monthly;
pub use snapshot::run_snapshot;
