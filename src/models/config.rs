//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Upstream catalog and HTTP client settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Pagination behavior
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Record transformation settings
    #[serde(default)]
    pub transform: TransformConfig,

    /// Output locations
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        if self.source.package_id.trim().is_empty() {
            return Err(AppError::validation("source.package_id is empty"));
        }
        Url::parse(&self.source.catalog_base_url).map_err(|e| {
            AppError::validation(format!("source.catalog_base_url is not a URL: {e}"))
        })?;
        Url::parse(&self.transform.image_base_url).map_err(|e| {
            AppError::validation(format!("transform.image_base_url is not a URL: {e}"))
        })?;
        if self.fetch.batch_size == 0 {
            return Err(AppError::validation("fetch.batch_size must be > 0"));
        }
        if self.fetch.max_pages == 0 || self.fetch.snapshot_max_pages == 0 {
            return Err(AppError::validation("fetch page caps must be > 0"));
        }
        if !matches!(self.fetch.page_param.as_str(), "offset" | "start") {
            return Err(AppError::validation(format!(
                "fetch.page_param must be 'offset' or 'start', got '{}'",
                self.fetch.page_param
            )));
        }
        if self.output.storage_dir.as_os_str().is_empty() {
            return Err(AppError::validation("output.storage_dir is empty"));
        }
        Ok(())
    }
}

/// Upstream CKAN catalog and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the CKAN instance
    #[serde(default = "defaults::catalog_base_url")]
    pub catalog_base_url: String,

    /// CKAN package (dataset) name
    #[serde(default = "defaults::package_id")]
    pub package_id: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            catalog_base_url: defaults::catalog_base_url(),
            package_id: defaults::package_id(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Pagination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Records requested per page (`limit`)
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,

    /// Page cap for the streaming monthly run
    #[serde(default = "defaults::max_pages")]
    pub max_pages: usize,

    /// Page cap for the single-file snapshot run
    #[serde(default = "defaults::snapshot_max_pages")]
    pub snapshot_max_pages: usize,

    /// Query parameter carrying the record offset (`offset` or `start`)
    #[serde(default = "defaults::page_param")]
    pub page_param: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            batch_size: defaults::batch_size(),
            max_pages: defaults::max_pages(),
            snapshot_max_pages: defaults::snapshot_max_pages(),
            page_param: defaults::page_param(),
        }
    }
}

/// Event transformation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Base URL that relative image paths are resolved against
    #[serde(default = "defaults::image_base_url")]
    pub image_base_url: String,

    /// Split addresses into street/locality/postal code; when false the raw
    /// string becomes `streetAddress` with the default locality
    #[serde(default = "defaults::parse_addresses")]
    pub parse_addresses: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            image_base_url: defaults::image_base_url(),
            parse_addresses: defaults::parse_addresses(),
        }
    }
}

/// Output file layout, relative to `storage_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "defaults::storage_dir")]
    pub storage_dir: PathBuf,

    /// Directory holding `YYYY-MM.jsonld` files and `index.json`
    #[serde(default = "defaults::monthly_dir")]
    pub monthly_dir: String,

    /// Single-file output of the snapshot run
    #[serde(default = "defaults::snapshot_file")]
    pub snapshot_file: String,

    /// Directory of daily `*.jsonl` snapshots consumed by `merge`
    #[serde(default = "defaults::daily_dir")]
    pub daily_dir: String,

    #[serde(default = "defaults::all_file")]
    pub all_file: String,

    #[serde(default = "defaults::upcoming_file")]
    pub upcoming_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            storage_dir: defaults::storage_dir(),
            monthly_dir: defaults::monthly_dir(),
            snapshot_file: defaults::snapshot_file(),
            daily_dir: defaults::daily_dir(),
            all_file: defaults::all_file(),
            upcoming_file: defaults::upcoming_file(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Source defaults
    pub fn catalog_base_url() -> String {
        "https://ckan0.cf.opendata.inter.prod-toronto.ca".into()
    }
    pub fn package_id() -> String {
        "festivals-events".into()
    }
    pub fn user_agent() -> String {
        concat!("events-jsonld/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Fetch defaults
    pub fn batch_size() -> usize {
        500
    }
    pub fn max_pages() -> usize {
        2000
    }
    pub fn snapshot_max_pages() -> usize {
        20
    }
    pub fn page_param() -> String {
        "offset".into()
    }

    // Transform defaults
    pub fn image_base_url() -> String {
        "https://www.toronto.ca".into()
    }
    pub fn parse_addresses() -> bool {
        true
    }

    // Output defaults
    pub fn storage_dir() -> PathBuf {
        PathBuf::from("data")
    }
    pub fn monthly_dir() -> String {
        "events".into()
    }
    pub fn snapshot_file() -> String {
        "events.jsonld".into()
    }
    pub fn daily_dir() -> String {
        "daily_jsonl".into()
    }
    pub fn all_file() -> String {
        "all.jsonld".into()
    }
    pub fn upcoming_file() -> String {
        "upcoming.jsonld".into()
    }
}
