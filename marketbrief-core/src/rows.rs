//! Normalized row model shared by all source adapters.
//!
//! Every provider response is flattened into one of four record shapes before
//! any statistics are computed. The shapes are closed: a dataset's category
//! fixes its row type, and the transforms reject a mismatched batch.

use crate::registry::SourceCategory;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One daily OHLCV bar, tagged with the symbol it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// One observation of an economic or labor series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    pub series_id: String,
    pub date: NaiveDate,
    pub value: f64,
    pub title: String,
    pub units: String,
    pub frequency: String,
}

/// One entry from a news feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedRow {
    pub title: String,
    pub link: String,
    pub published: DateTime<Utc>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// One cell of a stress-test scenario table, melted from the published
/// wide layout (one column per variable) into long form.
///
/// `date` is the period label as published (e.g. "2025 Q1"), kept verbatim
/// because scenario tables mix quarterly and annual periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRow {
    pub year: i32,
    pub scenario: String,
    pub variable: String,
    pub date: String,
    pub value: f64,
}

/// A batch of normalized rows. The variant is fixed by the dataset's category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowBatch {
    Prices(Vec<PriceRow>),
    Series(Vec<SeriesRow>),
    Feed(Vec<FeedRow>),
    Scenarios(Vec<ScenarioRow>),
}

impl RowBatch {
    /// Empty batch of the right shape for a category.
    pub fn empty_for(category: SourceCategory) -> Self {
        match category {
            SourceCategory::PriceSeries => RowBatch::Prices(Vec::new()),
            SourceCategory::EconomicSeries | SourceCategory::LaborSeries => {
                RowBatch::Series(Vec::new())
            }
            SourceCategory::NewsFeed => RowBatch::Feed(Vec::new()),
            SourceCategory::ScenarioTable => RowBatch::Scenarios(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RowBatch::Prices(rows) => rows.len(),
            RowBatch::Series(rows) => rows.len(),
            RowBatch::Feed(rows) => rows.len(),
            RowBatch::Scenarios(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop duplicate records by each shape's natural key. Providers can
    /// return overlapping windows (e.g. a feed entry present in two feeds,
    /// or a re-requested bar); output documents must carry each record once.
    pub fn dedup(&mut self) {
        match self {
            RowBatch::Prices(rows) => {
                let mut seen = HashSet::new();
                rows.retain(|r| seen.insert((r.symbol.clone(), r.date)));
            }
            RowBatch::Series(rows) => {
                let mut seen = HashSet::new();
                rows.retain(|r| seen.insert((r.series_id.clone(), r.date)));
            }
            RowBatch::Feed(rows) => {
                let mut seen = HashSet::new();
                rows.retain(|r| seen.insert(r.link.clone()));
            }
            RowBatch::Scenarios(rows) => {
                let mut seen = HashSet::new();
                rows.retain(|r| {
                    seen.insert((r.year, r.scenario.clone(), r.variable.clone(), r.date.clone()))
                });
            }
        }
    }
}
