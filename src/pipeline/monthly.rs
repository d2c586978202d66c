// src/pipeline/monthly.rs

//! Streaming pipeline: fetch → transform → per-month files.

use std::pin::pin;

use futures::TryStreamExt;
use reqwest::Client;

use crate::error::Result;
use crate::models::{Config, RunStats};
use crate::services::{EventTransformer, ResourceFetcher};
use crate::storage::{LocalStorage, MonthlySummary, MonthlyWriter};

/// Run the monthly partitioning pipeline.
///
/// Records are handled one at a time as pages arrive. A record that fails to
/// transform is logged and skipped; network and I/O errors abort the run,
/// in which case every open month file is still closed on the way out.
pub async fn run_monthly(
    config: &Config,
    client: &Client,
    storage: &LocalStorage,
) -> Result<(MonthlySummary, RunStats)> {
    let fetcher = ResourceFetcher::new(client.clone(), &config.source, &config.fetch)?;
    let transformer = EventTransformer::new(&config.transform)?;

    let resource_url = fetcher.resolve_resource_url().await?;
    let mut records = pin!(fetcher.records(&resource_url, config.fetch.max_pages));

    let mut writer = MonthlyWriter::new(storage.child(&config.output.monthly_dir));
    let mut stats = RunStats::default();

    while let Some(raw) = records.try_next().await? {
        stats.fetched += 1;
        match transformer.transform(&raw) {
            Ok(event) => writer.write(&event)?,
            Err(e) => {
                stats.transform_failures += 1;
                log::warn!("Skipping record #{}: {}", stats.fetched, e);
            }
        }
    }

    let summary = writer.finish().await?;

    log::info!(
        "Fetched {} records: {} written to {} month files, {} failed to transform, {} without a usable start date",
        stats.fetched,
        summary.events_written,
        summary.months.len(),
        stats.transform_failures,
        summary.skipped_dates
    );
    if summary.pruned > 0 {
        log::info!("Removed {} stale month files", summary.pruned);
    }

    Ok((summary, stats))
}
