use serde::Serialize;

/// Counters collected while reading the posts CSV.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct IngestStats {
    pub rows_read: usize,
    pub rows_kept: usize,

    // dropped rows
    pub skipped_empty_hashtag: usize,
    pub skipped_invalid_date: usize,

    // fields replaced by 0 / 0.0
    pub coerced_mentions: usize,
    pub coerced_reach: usize,
    pub coerced_sentiment: usize,
}

impl IngestStats {
    pub fn rows_skipped(&self) -> usize {
        self.skipped_empty_hashtag + self.skipped_invalid_date
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    /// Share of read rows that made it into the pipeline.
    pub fn kept_pct(&self) -> f64 {
        Self::pct(self.rows_kept, self.rows_read)
    }
}
