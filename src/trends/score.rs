//! Period-over-period growth and the composite trend score.
//!
//! Each hashtag's windows are walked in chronological order with a
//! [`GrowthState`] carrying the previous window's mentions:
//!
//! ```text
//! growth = (mentions - prev) / (prev + 1)        0.0 for the first window
//! score  = growth * ln(reach + 1) * (1 + sentiment)
//! ```
//!
//! A non-finite score falls back to `growth`.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

use crate::trends::types::{AggregatedWindow, TrendScore};

/// Fold accumulator for one hashtag's chronological walk.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GrowthState {
    pub prev_mentions: Option<u64>,
}

impl GrowthState {
    /// Scores `window` against the previous one and returns the state for the
    /// next window. The state always advances to this window's mentions.
    pub fn step(self, window: &AggregatedWindow) -> (GrowthState, TrendScore) {
        let sentiment = if window.sentiment_avg.is_nan() {
            0.0
        } else {
            window.sentiment_avg
        };
        let g = growth(self.prev_mentions, window.mentions_sum);
        let score = trend_score(g, window.reach_sum, sentiment);

        let scored = TrendScore {
            hashtag: window.hashtag.clone(),
            window: window.window.clone(),
            score,
            mentions: window.mentions_sum,
            reach: window.reach_sum,
            sentiment,
            rows_count: window.rows_count,
        };

        (
            GrowthState {
                prev_mentions: Some(window.mentions_sum),
            },
            scored,
        )
    }
}

/// Smoothed fractional change in mentions. `None` means there is no earlier window.
pub fn growth(prev_mentions: Option<u64>, mentions: u64) -> f64 {
    match prev_mentions {
        None => 0.0,
        Some(prev) => (mentions as f64 - prev as f64) / (prev as f64 + 1.0),
    }
}

/// Combines growth with reach and sentiment; returns `growth` alone when the
/// product is undefined, NaN or infinite. A zero result is always `+0.0`.
pub fn trend_score(growth: f64, reach: u64, sentiment: f64) -> f64 {
    let log_base = reach as f64 + 1.0;
    if log_base <= 0.0 {
        return growth;
    }

    let score = growth * log_base.ln() * (1.0 + sentiment);
    if score == 0.0 {
        0.0
    } else if score.is_finite() {
        score
    } else {
        debug!(growth, reach, sentiment, "Non-finite trend score, using growth");
        growth
    }
}

/// Scores the windows of a single hashtag.
///
/// Windows are sorted chronologically (ties by label) before the growth walk,
/// whatever order they arrive in.
pub fn score_hashtag(mut windows: Vec<&AggregatedWindow>) -> Vec<TrendScore> {
    windows.sort_by(|a, b| a.window.cmp(&b.window));

    let capacity = windows.len();
    let (_, scored) = windows.into_iter().fold(
        (GrowthState::default(), Vec::with_capacity(capacity)),
        |(state, mut out), window| {
            let (next, score) = state.step(window);
            out.push(score);
            (next, out)
        },
    );
    scored
}

/// Scores every aggregated window and returns them in presentation order:
/// window label ascending, then score descending.
pub fn score_trends(aggregates: &[AggregatedWindow]) -> Vec<TrendScore> {
    let mut by_hashtag: BTreeMap<&str, Vec<&AggregatedWindow>> = BTreeMap::new();
    for agg in aggregates {
        by_hashtag.entry(agg.hashtag.as_str()).or_default().push(agg);
    }

    let hashtags = by_hashtag.len();
    let mut scores: Vec<TrendScore> = by_hashtag.into_values().flat_map(score_hashtag).collect();
    sort_for_presentation(&mut scores);

    debug!(hashtags, scores = scores.len(), "Computed trend scores");
    scores
}

/// Descending score order. Scores are finite, and `-0.0 == 0.0` ties.
pub fn by_score_desc(a: &TrendScore, b: &TrendScore) -> Ordering {
    b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal)
}

/// Stable sort by window label ascending, then score descending.
pub fn sort_for_presentation(scores: &mut [TrendScore]) {
    scores.sort_by(|a, b| {
        a.window
            .label()
            .cmp(b.window.label())
            .then_with(|| by_score_desc(a, b))
    });
}
