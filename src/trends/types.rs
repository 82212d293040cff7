//! Data types used by the trend pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::trends::window::WindowKey;

/// A single post row after ingestion-side coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub date: NaiveDate,
    pub hashtag: String,
    pub mentions: u64,
    pub estimated_reach: u64,
    pub sentiment_score: f64,
}

/// Summary of every post for one hashtag within one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedWindow {
    pub hashtag: String,
    pub window: WindowKey,
    pub mentions_sum: u64,
    pub reach_sum: u64,
    #[serde(deserialize_with = "lenient_f64")]
    pub sentiment_avg: f64,
    pub rows_count: usize,
}

/// Growth-weighted score for one aggregated window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendScore {
    pub hashtag: String,
    pub window: WindowKey,
    pub score: f64,
    pub mentions: u64,
    pub reach: u64,
    pub sentiment: f64,
    pub rows_count: usize,
}

/// Borrowed row for the top-K file; puts the window column first.
#[derive(Debug, Serialize)]
pub struct TopKRow<'a> {
    pub window: &'a str,
    pub hashtag: &'a str,
    pub score: f64,
    pub mentions: u64,
    pub reach: u64,
    pub sentiment: f64,
    pub rows_count: usize,
}

impl<'a> From<&'a TrendScore> for TopKRow<'a> {
    fn from(s: &'a TrendScore) -> Self {
        TopKRow {
            window: s.window.label(),
            hashtag: &s.hashtag,
            score: s.score,
            mentions: s.mentions,
            reach: s.reach,
            sentiment: s.sentiment,
            rows_count: s.rows_count,
        }
    }
}

/// An empty or unparseable real is read back as NaN; the scorer treats it as 0.0.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().parse::<f64>().unwrap_or(f64::NAN))
}
