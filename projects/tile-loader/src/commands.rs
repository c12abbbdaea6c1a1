use crate::cli::DatasetArgs;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;
use tile_loader::summary::{CountReport, DatasetSummary, DirectoryCount};
use tile_loader::DatasetConfig;

fn load_config(dataset: DatasetArgs) -> Result<DatasetConfig> {
    dataset
        .into_config()
        .context("Invalid dataset description")
}

/// Counts tiles per directory and renders the report as JSON.
pub fn count(dataset: DatasetArgs) -> Result<String> {
    let config = load_config(dataset)?;
    let counts = config
        .count_per_directory()
        .context("Failed to count tiles")?;

    let directories: Vec<DirectoryCount> = config
        .directories
        .iter()
        .zip(counts)
        .map(|(dir, tiles)| DirectoryCount {
            path: dir.path.clone(),
            label: dir.label,
            tiles,
        })
        .collect();
    let report = CountReport {
        total_tiles: directories.iter().map(|d| d.tiles).sum(),
        directories,
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

/// Drains the whole tile stream behind a progress bar sized by a counting
/// pass, then renders the collected statistics as JSON.
pub fn summarize(dataset: DatasetArgs) -> Result<String> {
    let config = load_config(dataset)?;
    let expected = config.count().context("Failed to count tiles")?;

    let pb = ProgressBar::new(expected as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec:.1.yellow} tiles, {eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let mut summary = DatasetSummary::default();
    for item in config.stream()? {
        let (tile, label) = item.context("Tile stream aborted")?;
        summary.record(&tile, &label);
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    tracing::info!(
        "Extracted {} tiles in {:.2}s",
        summary.total_tiles,
        start.elapsed().as_secs_f64()
    );

    if summary.total_tiles != expected {
        anyhow::bail!(
            "Counted {} tiles but the stream produced {}; the directories changed while reading",
            expected,
            summary.total_tiles
        );
    }

    Ok(serde_json::to_string_pretty(&summary)?)
}
