// src/pipeline/merge.rs

//! Merge daily JSONL snapshots into `all.jsonld` and `upcoming.jsonld`.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::Result;
use crate::models::OutputConfig;
use crate::storage::{ArrayFile, LocalStorage};

/// Counts from a merge run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub files: usize,
    pub all: usize,
    pub upcoming: usize,
    /// Blank or undecodable lines
    pub skipped_lines: usize,
}

/// Current UTC time in the ISO-8601 form used for the upcoming cut-off,
/// e.g. `2025-07-04T12:00:00.000000+00:00`.
pub fn upcoming_cutoff(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// An event is upcoming when its `startDate` sorts at or after the cut-off.
pub fn is_upcoming(event: &Value, cutoff: &str) -> bool {
    event
        .get("startDate")
        .and_then(Value::as_str)
        .is_some_and(|start| start >= cutoff)
}

/// Stream every daily snapshot into the merged output files.
pub async fn run_merge(storage: &LocalStorage, output: &OutputConfig) -> Result<MergeSummary> {
    run_merge_at(storage, output, Utc::now()).await
}

/// [`run_merge`] with an explicit clock.
pub async fn run_merge_at(
    storage: &LocalStorage,
    output: &OutputConfig,
    now: DateTime<Utc>,
) -> Result<MergeSummary> {
    let cutoff = upcoming_cutoff(now);
    let files = storage.list_files(&output.daily_dir, "jsonl").await?;
    log::info!(
        "Merging {} daily snapshot files from {}",
        files.len(),
        storage.path(&output.daily_dir).display()
    );

    let mut all = storage.create_array(&output.all_file)?;
    let mut upcoming = storage.create_array(&output.upcoming_file)?;
    let mut summary = MergeSummary {
        files: files.len(),
        ..MergeSummary::default()
    };

    for path in &files {
        summary.skipped_lines += merge_file(path, &cutoff, &mut all, &mut upcoming).await?;
    }

    summary.all = all.commit()?;
    summary.upcoming = upcoming.commit()?;

    if summary.skipped_lines > 0 {
        log::warn!("Skipped {} undecodable snapshot lines", summary.skipped_lines);
    }
    log::info!(
        "Wrote {} events to {} and {} upcoming events to {}",
        summary.all,
        storage.path(&output.all_file).display(),
        summary.upcoming,
        storage.path(&output.upcoming_file).display()
    );

    Ok(summary)
}

/// Copy one JSONL file into the outputs, returning the number of lines skipped.
///
/// Lines are decoded from raw bytes, so invalid UTF-8 is skipped like any
/// other undecodable line.
async fn merge_file(
    path: &Path,
    cutoff: &str,
    all: &mut ArrayFile,
    upcoming: &mut ArrayFile,
) -> Result<usize> {
    let file = tokio::fs::File::open(path).await?;
    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    let mut skipped = 0;
    let mut line_no = 0;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        line_no += 1;

        let event: Value = match serde_json::from_slice(&line) {
            Ok(event) => event,
            Err(e) => {
                skipped += 1;
                log::debug!("{}:{}: skipping line: {}", path.display(), line_no, e);
                continue;
            }
        };

        all.push(&event)?;
        if is_upcoming(&event, cutoff) {
            upcoming.push(&event)?;
        }
    }

    Ok(skipped)
}
