// src/storage/monthly.rs

//! Month-partitioned streaming output.
//!
//! Each calendar month (UTC) gets one lazily opened [`ArrayFile`]. The table
//! of open files is owned by [`MonthlyWriter`]; every entry is closed exactly
//! once, by [`MonthlyWriter::finish`] or, if the run aborts, on drop.
//!
//! A finished run owns the directory: month files and partials that are not
//! part of the new index are removed.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::error::{DateParseError, Result};
use crate::models::{MonthIndex, NormalizedEvent};
use crate::storage::{ArrayFile, LocalStorage};

pub const INDEX_FILE: &str = "index.json";

/// Naive timestamp layouts accepted in addition to RFC 3339, read as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Map a `startDate` to its UTC `YYYY-MM` key.
pub fn month_key(start_date: Option<&str>) -> std::result::Result<String, DateParseError> {
    let err = || DateParseError {
        value: start_date.map(str::to_string),
    };
    let raw = start_date.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(err)?;

    let utc: DateTime<Utc> = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        dt.with_timezone(&Utc)
    } else if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        dt.with_timezone(&Utc)
    } else if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        naive.and_utc()
    } else {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| err())?
            .and_hms_opt(0, 0, 0)
            .ok_or_else(err)?
            .and_utc()
    };

    Ok(utc.format("%Y-%m").to_string())
}

/// Month key of an event's raw `startDate`. Only strings can carry a date.
fn event_month(start_date: Option<&Value>) -> std::result::Result<String, DateParseError> {
    match start_date {
        Some(Value::String(s)) => month_key(Some(s)),
        other => Err(DateParseError {
            value: other.map(Value::to_string),
        }),
    }
}

/// The `YYYY-MM` key of a month file or its partial, if `path` is one.
fn month_file_key(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    let key = name
        .strip_suffix(".jsonld.partial")
        .or_else(|| name.strip_suffix(".jsonld"))?;
    if key.len() != 7 {
        return None;
    }
    NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d").ok()?;
    Some(key)
}

/// Outcome of a finished monthly run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlySummary {
    pub index: MonthIndex,
    /// Event count per month, in key order
    pub months: Vec<(String, usize)>,
    pub events_written: usize,
    /// Events dropped because their `startDate` had no usable month
    pub skipped_dates: usize,
    /// Month files and partials left over from earlier runs, now removed
    pub pruned: usize,
}

/// Streams events into `{dir}/{YYYY-MM}.jsonld` files.
pub struct MonthlyWriter {
    storage: LocalStorage,
    buckets: BTreeMap<String, ArrayFile>,
    events_written: usize,
    skipped_dates: usize,
}

impl MonthlyWriter {
    /// Create a writer whose month files live in `storage`'s root.
    pub fn new(storage: LocalStorage) -> Self {
        Self {
            storage,
            buckets: BTreeMap::new(),
            events_written: 0,
            skipped_dates: 0,
        }
    }

    /// Append an event to its month, opening the month file on first use.
    ///
    /// An unusable `startDate` is logged and counted, not returned as an
    /// error; only I/O failures are fatal.
    pub fn write(&mut self, event: &NormalizedEvent) -> Result<()> {
        let key = match event_month(event.start_date.as_ref()) {
            Ok(key) => key,
            Err(e) => {
                self.skipped_dates += 1;
                log::warn!("Skipping event '{}': {}", event.name, e);
                return Ok(());
            }
        };

        let bucket = match self.buckets.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let file = self.storage.create_array(&format!("{}.jsonld", entry.key()))?;
                log::debug!("Opened month file {}", file.target().display());
                entry.insert(file)
            }
        };

        bucket.push(event)?;
        self.events_written += 1;
        Ok(())
    }

    /// Close and commit every month file, write `index.json`, then remove
    /// stale month files.
    pub async fn finish(mut self) -> Result<MonthlySummary> {
        let buckets = std::mem::take(&mut self.buckets);
        let mut months = Vec::with_capacity(buckets.len());

        for (key, file) in buckets {
            let count = file.commit()?;
            log::info!("Month {}: {} events", key, count);
            months.push((key, count));
        }

        let index = MonthIndex::from_months(months.iter().map(|(key, _)| key.as_str()));
        self.storage.write_json(INDEX_FILE, &index).await?;
        let pruned = self.prune_stale(&index).await?;

        Ok(MonthlySummary {
            index,
            months,
            events_written: self.events_written,
            skipped_dates: self.skipped_dates,
            pruned,
        })
    }

    /// Remove month files missing from `index` and every leftover partial.
    /// Files not named like a month are never touched.
    async fn prune_stale(&self, index: &MonthIndex) -> Result<usize> {
        let mut pruned = 0;

        for extension in ["jsonld", "partial"] {
            for path in self.storage.list_files(".", extension).await? {
                let Some(key) = month_file_key(&path) else {
                    continue;
                };
                if extension == "jsonld" && index.available.iter().any(|m| m == key) {
                    continue;
                }
                tokio::fs::remove_file(&path).await?;
                log::info!("Removed stale month file {}", path.display());
                pruned += 1;
            }
        }

        Ok(pruned)
    }
}

impl Drop for MonthlyWriter {
    fn drop(&mut self) {
        if !self.buckets.is_empty() {
            log::warn!(
                "Monthly writer dropped before finish; closing {} partial month files",
                self.buckets.len()
            );
        }
    }
}
