// src/models/mod.rs

//! Domain models for the events pipeline.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod catalog;
mod config;
mod event;

use serde::{Deserialize, Serialize};

// Re-export all public types
pub use catalog::{Package, PackageShowResponse, Resource};
pub use config::{Config, FetchConfig, OutputConfig, SourceConfig, TransformConfig};
pub use event::{
    GeoCoordinates, NormalizedEvent, Offer, Organization, Place, PostalAddress, RawEvent,
};

/// Summary of the month files produced by a run, written as `index.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthIndex {
    /// Sorted `YYYY-MM` keys
    pub available: Vec<String>,
    /// Greatest key, or empty when no month was produced
    pub latest: String,
}

impl MonthIndex {
    /// Build an index from month keys in any order.
    pub fn from_months<I, S>(months: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut available: Vec<String> = months.into_iter().map(Into::into).collect();
        available.sort();
        available.dedup();
        let latest = available.last().cloned().unwrap_or_default();
        Self { available, latest }
    }
}

/// Per-record bookkeeping for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Raw records received from upstream
    pub fetched: usize,
    /// Records that failed to transform and were skipped
    pub transform_failures: usize,
}
