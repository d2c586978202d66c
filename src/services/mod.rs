//! Service layer for the events pipeline.
//!
//! This module contains the business logic for:
//! - Dataset download (`ResourceFetcher`)
//! - Record transformation (`EventTransformer`)
//! - Field extraction helpers (`parse_address`, `extract_geo`, `build_offer`)

pub mod address;
mod fetcher;
mod geo;
mod offers;
mod transformer;

pub use address::parse_address;
pub use fetcher::{ResourceFetcher, page_url};
pub use geo::extract_geo;
pub use offers::build_offer;
pub use transformer::EventTransformer;
