use std::collections::BTreeMap;

use crate::trends::score::by_score_desc;
use crate::trends::types::TrendScore;

/// Keeps at most `k` scores per window, highest first.
///
/// The result borrows from `scores`. Equal scores keep their relative input
/// order, and the output is ordered by window label, then score descending.
pub fn top_k_per_window(scores: &[TrendScore], k: usize) -> Vec<&TrendScore> {
    if k == 0 {
        return Vec::new();
    }

    let mut by_window: BTreeMap<&str, Vec<&TrendScore>> = BTreeMap::new();
    for score in scores {
        by_window.entry(score.window.label()).or_default().push(score);
    }

    by_window
        .into_values()
        .flat_map(|mut candidates| {
            candidates.sort_by(|a, b| by_score_desc(a, b));
            candidates.truncate(k);
            candidates
        })
        .collect()
}
