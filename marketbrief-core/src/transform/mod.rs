//! Per-category transforms: normalized rows in, display-ready document out.
//!
//! Each transform computes the statistics its category promises and returns
//! a `DatasetDocument` whose `record_count` always equals the length of the
//! data payload. Zero input rows produce a valid empty document — a dataset
//! can be "successfully empty", which is different from a fetch failure.

pub mod feed;
pub mod price;
pub mod scenario;
pub mod series;

use crate::registry::{DatasetDescriptor, SourceCategory};
use crate::rows::RowBatch;
use crate::sources::{FetchOutcome, PartialFailure};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use feed::FeedStats;
pub use price::PriceStats;
pub use scenario::ScenarioStats;
pub use series::SeriesStats;

/// Transform failures. Recorded per dataset; the run continues.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("dataset '{id}': expected {expected} rows, got a different shape")]
    RowShape { id: String, expected: SourceCategory },

    #[error("dataset '{id}': payload serialization failed: {reason}")]
    Serialize { id: String, reason: String },
}

/// Knobs that bound output size.
#[derive(Debug, Clone, Copy)]
pub struct TransformOptions {
    /// Maximum retained rows per symbol in price documents.
    pub max_rows_per_symbol: usize,
    /// Number of most-recent entries retained in feed documents.
    pub feed_window: usize,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            max_rows_per_symbol: 500,
            feed_window: 30,
        }
    }
}

/// Document metadata block, written verbatim into the JSON artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub name: String,
    pub category: SourceCategory,
    pub description: String,
    pub fetched_at: DateTime<Utc>,
    pub record_count: usize,
    /// blake3 of the serialized data payload; stable across runs when the
    /// provider returns identical rows.
    pub data_hash: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<PartialFailure>,
}

/// Category-specific statistics block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentStats {
    Price(PriceStats),
    Series(SeriesStats),
    Feed(FeedStats),
    Scenario(ScenarioStats),
}

/// The persisted output unit: `{metadata, stats, data}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetDocument {
    pub metadata: DocumentMeta,
    pub stats: DocumentStats,
    pub data: RowBatch,
}

impl DatasetDocument {
    fn assemble(
        descriptor: &DatasetDescriptor,
        fetched_at: DateTime<Utc>,
        notes: Vec<PartialFailure>,
        stats: DocumentStats,
        data: RowBatch,
    ) -> Result<Self, TransformError> {
        let payload = serde_json::to_vec(&data).map_err(|e| TransformError::Serialize {
            id: descriptor.id.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            metadata: DocumentMeta {
                name: descriptor.name.clone(),
                category: descriptor.category(),
                description: descriptor.description.clone(),
                fetched_at,
                record_count: data.len(),
                data_hash: blake3::hash(&payload).to_hex().to_string(),
                notes,
            },
            stats,
            data,
        })
    }
}

/// Route a fetch outcome to the matching transform.
pub fn transform(
    descriptor: &DatasetDescriptor,
    outcome: FetchOutcome,
    options: &TransformOptions,
) -> Result<DatasetDocument, TransformError> {
    let category = descriptor.category();
    let shape_error = || TransformError::RowShape {
        id: descriptor.id.clone(),
        expected: category,
    };

    let FetchOutcome { rows, meta } = outcome;

    let (stats, data) = match (category, rows) {
        (SourceCategory::PriceSeries, RowBatch::Prices(rows)) => {
            let (stats, rows) = price::summarize(rows, options.max_rows_per_symbol);
            (DocumentStats::Price(stats), RowBatch::Prices(rows))
        }
        (
            SourceCategory::EconomicSeries | SourceCategory::LaborSeries,
            RowBatch::Series(rows),
        ) => {
            let (stats, rows) = series::summarize(rows);
            (DocumentStats::Series(stats), RowBatch::Series(rows))
        }
        (SourceCategory::NewsFeed, RowBatch::Feed(rows)) => {
            let (stats, rows) = feed::summarize(rows, options.feed_window);
            (DocumentStats::Feed(stats), RowBatch::Feed(rows))
        }
        (SourceCategory::ScenarioTable, RowBatch::Scenarios(rows)) => {
            let (stats, rows) = scenario::summarize(rows);
            (DocumentStats::Scenario(stats), RowBatch::Scenarios(rows))
        }
        _ => return Err(shape_error()),
    };

    DatasetDocument::assemble(descriptor, meta.fetched_at, meta.partial_failures, stats, data)
}
