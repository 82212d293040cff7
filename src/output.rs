//! Output formatting and persistence for trend reports.
//!
//! Supports CSV files (optionally gzip-compressed), JSON logging and a
//! console summary of the top rows.

use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::Result;
use crate::trends::pipeline::TrendReport;
use crate::trends::types::{TopKRow, TrendScore};

pub const AGGREGATE_HEADERS: &[&str] = &[
    "hashtag",
    "window",
    "mentions_sum",
    "reach_sum",
    "sentiment_avg",
    "rows_count",
];

pub const SCORE_HEADERS: &[&str] = &[
    "hashtag",
    "window",
    "score",
    "mentions",
    "reach",
    "sentiment",
    "rows_count",
];

pub const TOP_K_HEADERS: &[&str] = &[
    "window",
    "hashtag",
    "score",
    "mentions",
    "reach",
    "sentiment",
    "rows_count",
];

/// File locations for the three result sets of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub aggregates: PathBuf,
    pub scores: PathBuf,
    pub top_k: PathBuf,
}

impl OutputPaths {
    /// `<prefix>_agg_counts.csv`, `<prefix>_trend_scores.csv` and
    /// `<prefix>_topk_per_window.csv`, with a `.gz` suffix when compressed.
    pub fn for_prefix(prefix: &str, gzip: bool) -> Self {
        let ext = if gzip { "csv.gz" } else { "csv" };
        OutputPaths {
            aggregates: PathBuf::from(format!("{prefix}_agg_counts.{ext}")),
            scores: PathBuf::from(format!("{prefix}_trend_scores.{ext}")),
            top_k: PathBuf::from(format!("{prefix}_topk_per_window.{ext}")),
        }
    }
}

/// Writes a header row followed by `rows` and hands the writer back.
///
/// The header is written even when `rows` is empty.
pub fn write_rows<W, T, I>(writer: W, headers: &[&str], rows: I) -> Result<W>
where
    W: Write,
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(headers)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;

    Ok(wtr.into_inner().map_err(|e| e.into_error())?)
}

/// Creates (or truncates) `path` and writes the rows, gzip-compressed if asked.
pub fn write_csv_file<T, I>(path: &Path, headers: &[&str], rows: I, gzip: bool) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    debug!(path = %path.display(), gzip, "Writing CSV");
    let file = File::create(path)?;

    if gzip {
        let encoder = write_rows(GzEncoder::new(file, Compression::default()), headers, rows)?;
        encoder.finish()?;
    } else {
        write_rows(file, headers, rows)?;
    }

    Ok(())
}

/// Writes the aggregates, scores and top-K files for `report`.
pub fn write_report(report: &TrendReport, prefix: &str, gzip: bool) -> Result<OutputPaths> {
    let paths = OutputPaths::for_prefix(prefix, gzip);

    write_csv_file(&paths.aggregates, AGGREGATE_HEADERS, &report.aggregates, gzip)?;
    info!(path = %paths.aggregates.display(), rows = report.aggregates.len(), "Wrote aggregated counts");

    write_csv_file(&paths.scores, SCORE_HEADERS, &report.scores, gzip)?;
    info!(path = %paths.scores.display(), rows = report.scores.len(), "Wrote trend scores");

    let top = report.top();
    write_csv_file(
        &paths.top_k,
        TOP_K_HEADERS,
        top.iter().copied().map(TopKRow::from),
        gzip,
    )?;
    info!(path = %paths.top_k.display(), rows = top.len(), "Wrote top-K per window");

    Ok(paths)
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Logs the first `limit` top-K rows.
pub fn print_top_rows(top: &[&TrendScore], limit: usize) {
    info!(shown = top.len().min(limit), total = top.len(), "Top results");
    for s in top.iter().take(limit) {
        info!(
            window = %s.window,
            hashtag = %s.hashtag,
            score = s.score,
            mentions = s.mentions,
            reach = s.reach,
            sentiment = s.sentiment,
            rows_count = s.rows_count,
            "Top-K"
        );
    }
}
