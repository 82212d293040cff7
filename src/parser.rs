//! CSV ingestion for post records and previously written aggregates.

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Result, TrendError};
use crate::output::AGGREGATE_HEADERS;
use crate::stats::IngestStats;
use crate::trends::types::{AggregatedWindow, RawRecord};
use crate::trends::window::parse_date;

/// Columns every posts CSV must carry. Others (e.g. `top_country`) are ignored.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "date",
    "hashtag",
    "mentions",
    "estimated_reach",
    "sentiment_score",
];

/// One posts CSV row before coercion.
#[derive(Debug, Deserialize)]
struct PostRow {
    date: String,
    hashtag: String,
    mentions: String,
    estimated_reach: String,
    sentiment_score: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Drop rows with an unparseable date instead of aborting.
    pub skip_invalid_dates: bool,
}

/// Fails with [`TrendError::MissingColumns`] listing every absent column.
pub fn check_columns(headers: &StringRecord, required: &[&str]) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(TrendError::MissingColumns(missing))
    }
}

/// Parses a non-negative count. Whole decimals such as `12.0` are truncated.
pub fn coerce_count(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<u64>() {
        return Some(n);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 => Some(f.trunc() as u64),
        _ => None,
    }
}

/// Parses a sentiment score; NaN counts as a failure.
pub fn coerce_sentiment(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|f| !f.is_nan())
}

/// Reads posts from CSV, coercing numeric fields and dropping rows with an
/// empty hashtag.
///
/// # Errors
///
/// Missing columns are reported before any row is read. An unparseable date
/// aborts unless [`ParseOptions::skip_invalid_dates`] is set.
pub fn read_posts<R: Read>(reader: R, options: ParseOptions) -> Result<(Vec<RawRecord>, IngestStats)> {
    let mut rdr = ReaderBuilder::new().trim(Trim::Headers).from_reader(reader);
    check_columns(rdr.headers()?, REQUIRED_COLUMNS)?;

    let mut stats = IngestStats::default();
    let mut posts = Vec::new();

    for result in rdr.deserialize() {
        let row: PostRow = result?;
        stats.rows_read += 1;

        let hashtag = row.hashtag.trim();
        if hashtag.is_empty() {
            stats.skipped_empty_hashtag += 1;
            continue;
        }

        let date = match parse_date(&row.date) {
            Ok(date) => date,
            Err(e) if options.skip_invalid_dates => {
                warn!(row = stats.rows_read, error = %e, "Skipping row with invalid date");
                stats.skipped_invalid_date += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        let mentions = coerce_count(&row.mentions).unwrap_or_else(|| {
            stats.coerced_mentions += 1;
            0
        });
        let estimated_reach = coerce_count(&row.estimated_reach).unwrap_or_else(|| {
            stats.coerced_reach += 1;
            0
        });
        let sentiment_score = coerce_sentiment(&row.sentiment_score).unwrap_or_else(|| {
            stats.coerced_sentiment += 1;
            0.0
        });

        posts.push(RawRecord {
            date,
            hashtag: hashtag.to_string(),
            mentions,
            estimated_reach,
            sentiment_score,
        });
    }

    stats.rows_kept = posts.len();
    debug!(rows_read = stats.rows_read, rows_kept = stats.rows_kept, "Posts CSV read");
    Ok((posts, stats))
}

/// Opens `path` and reads it with [`read_posts`].
pub fn read_posts_file(path: impl AsRef<Path>, options: ParseOptions) -> Result<(Vec<RawRecord>, IngestStats)> {
    read_posts(File::open(path)?, options)
}

/// Reads an aggregated-counts CSV written by an earlier run.
///
/// Window keys come back as labels; their order is recovered from the label.
pub fn read_aggregates<R: Read>(reader: R) -> Result<Vec<AggregatedWindow>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::Headers).from_reader(reader);
    check_columns(rdr.headers()?, AGGREGATE_HEADERS)?;

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let record: AggregatedWindow = result?;
        rows.push(record);
    }

    debug!(rows = rows.len(), "Aggregates CSV read");
    Ok(rows)
}
