// src/pipeline/snapshot.rs

//! Batch pipeline: every event in a single `events.jsonld` array.

use std::pin::pin;

use futures::TryStreamExt;
use reqwest::Client;

use crate::error::Result;
use crate::models::{Config, NormalizedEvent, RunStats};
use crate::services::{EventTransformer, ResourceFetcher};
use crate::storage::LocalStorage;

/// Fetch and transform the whole dataset, then write it in one piece.
///
/// Uses the smaller snapshot page cap, since the full result is held in
/// memory before writing.
pub async fn run_snapshot(
    config: &Config,
    client: &Client,
    storage: &LocalStorage,
) -> Result<(Vec<NormalizedEvent>, RunStats)> {
    let fetcher = ResourceFetcher::new(client.clone(), &config.source, &config.fetch)?;
    let transformer = EventTransformer::new(&config.transform)?;

    let resource_url = fetcher.resolve_resource_url().await?;
    let mut records = pin!(fetcher.records(&resource_url, config.fetch.snapshot_max_pages));

    let mut events = Vec::new();
    let mut stats = RunStats::default();

    while let Some(raw) = records.try_next().await? {
        stats.fetched += 1;
        match transformer.transform(&raw) {
            Ok(event) => events.push(event),
            Err(e) => {
                stats.transform_failures += 1;
                log::warn!("Skipping record #{}: {}", stats.fetched, e);
            }
        }
    }

    storage
        .write_json(&config.output.snapshot_file, &events)
        .await?;

    log::info!(
        "Saved {} events to {} ({} records failed to transform)",
        events.len(),
        storage.path(&config.output.snapshot_file).display(),
        stats.transform_failures
    );

    Ok((events, stats))
}
