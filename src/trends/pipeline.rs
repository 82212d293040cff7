use tracing::info;

use crate::trends::aggregate::aggregate_windows;
use crate::trends::score::score_trends;
use crate::trends::topk::top_k_per_window;
use crate::trends::types::{AggregatedWindow, RawRecord, TrendScore};
use crate::trends::window::{Granularity, WindowKey};

/// The three result sets of one batch run.
#[derive(Debug)]
pub struct TrendReport {
    pub aggregates: Vec<AggregatedWindow>,
    pub scores: Vec<TrendScore>,
    pub top_k: usize,
}

impl TrendReport {
    /// Top-K view over [`TrendReport::scores`].
    pub fn top(&self) -> Vec<&TrendScore> {
        top_k_per_window(&self.scores, self.top_k)
    }

    pub fn window_count(&self) -> usize {
        let mut labels: Vec<&str> = self.scores.iter().map(|s| s.window.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        labels.len()
    }
}

/// Windows, aggregates and scores a full set of posts.
#[tracing::instrument(skip(posts, granularity), fields(posts = posts.len(), granularity = %granularity))]
pub fn run(posts: &[RawRecord], granularity: Granularity, top_k: usize) -> TrendReport {
    let aggregates =
        aggregate_windows(posts.iter().map(|p| (WindowKey::derive(p.date, granularity), p)));
    let scores = score_trends(&aggregates);

    let report = TrendReport {
        aggregates,
        scores,
        top_k,
    };
    info!(
        aggregates = report.aggregates.len(),
        windows = report.window_count(),
        "Trend pipeline complete"
    );
    report
}

/// Scores aggregates that were read back from an earlier run.
#[tracing::instrument(skip(aggregates), fields(aggregates = aggregates.len()))]
pub fn rescore(aggregates: Vec<AggregatedWindow>, top_k: usize) -> TrendReport {
    let scores = score_trends(&aggregates);
    let report = TrendReport {
        aggregates,
        scores,
        top_k,
    };
    info!(windows = report.window_count(), "Rescore complete");
    report
}
