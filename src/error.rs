// src/error.rs

//! Unified error handling for the events pipeline.
//!
//! `AppError` covers everything that aborts a run. `TransformError` and
//! `DateParseError` are per-record and are recovered by the pipeline: the
//! record is logged, counted and skipped.

use std::fmt;

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed before a response was received
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// The catalog package has no directly downloadable resource
    #[error("No downloadable (non-datastore) resource found in package '{package}'")]
    ResourceNotFound { package: String },

    /// Upstream answered with a non-success status
    #[error("Fetch failed for {url}: HTTP {status}")]
    Fetch { url: String, status: u16 },

    /// Pagination ran past the configured safety cap
    #[error("Page cap of {max_pages} exceeded while paginating {url}")]
    PageCapExceeded { url: String, max_pages: usize },

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error from a URL and a non-success status.
    pub fn fetch(url: impl fmt::Display, status: reqwest::StatusCode) -> Self {
        Self::Fetch {
            url: url.to_string(),
            status: status.as_u16(),
        }
    }
}

/// A single raw record could not be turned into an event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// The record itself is not a JSON object
    #[error("record is not a JSON object (found {found})")]
    NotAnObject { found: &'static str },

    /// The `calEvent` wrapper is missing or not an object
    #[error("record has no 'calEvent' object")]
    MissingEvent,
}

/// An event's `startDate` cannot be mapped to a calendar month.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unparseable startDate: {value:?}")]
pub struct DateParseError {
    pub value: Option<String>,
}
