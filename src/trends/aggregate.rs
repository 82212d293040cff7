use std::collections::BTreeMap;
use tracing::debug;

use crate::trends::types::{AggregatedWindow, RawRecord};
use crate::trends::window::WindowKey;

#[derive(Default)]
struct WindowTotals {
    mentions: u64,
    reach: u64,
    sentiment: f64,
    rows: usize,
}

/// Groups window-annotated posts by `(hashtag, window)` and reduces each group
/// into an [`AggregatedWindow`].
///
/// Mentions and reach are summed, sentiment is the unweighted mean and
/// `rows_count` is the group size. Output is ordered by hashtag, then window.
pub fn aggregate_windows<'a, I>(posts: I) -> Vec<AggregatedWindow>
where
    I: IntoIterator<Item = (WindowKey, &'a RawRecord)>,
{
    let mut groups: BTreeMap<(String, WindowKey), WindowTotals> = BTreeMap::new();

    for (window, post) in posts {
        let totals = groups.entry((post.hashtag.clone(), window)).or_default();
        totals.mentions = totals.mentions.saturating_add(post.mentions);
        totals.reach = totals.reach.saturating_add(post.estimated_reach);
        totals.sentiment += post.sentiment_score;
        totals.rows += 1;
    }

    debug!(groups = groups.len(), "Aggregated posts into windows");

    groups
        .into_iter()
        .map(|((hashtag, window), totals)| AggregatedWindow {
            hashtag,
            window,
            mentions_sum: totals.mentions,
            reach_sum: totals.reach,
            sentiment_avg: totals.sentiment / totals.rows as f64,
            rows_count: totals.rows,
        })
        .collect()
}
