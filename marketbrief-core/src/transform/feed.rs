//! Feed transform: most-recent window plus a daily article-count histogram.

use crate::rows::FeedRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedStats {
    /// Articles per publication day, over everything fetched (not just the
    /// retained window), so the histogram shows real feed activity.
    pub daily_counts: BTreeMap<NaiveDate, usize>,
    pub total_fetched: usize,
}

/// Sort entries newest-first and keep the most recent `window`.
pub fn summarize(mut rows: Vec<FeedRow>, window: usize) -> (FeedStats, Vec<FeedRow>) {
    let mut daily_counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for row in &rows {
        *daily_counts.entry(row.published.date_naive()).or_default() += 1;
    }
    let total_fetched = rows.len();

    rows.sort_by(|a, b| b.published.cmp(&a.published));
    rows.truncate(window);

    (
        FeedStats {
            daily_counts,
            total_fetched,
        },
        rows,
    )
}
