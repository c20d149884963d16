//! Source adapters and the fetch error taxonomy.
//!
//! One adapter per provider family, all behind the `Source` trait. Adapters
//! absorb per-item failures (one symbol, one series, one feed) into
//! `FetchMeta::partial_failures` and only return a `FetchError` when the
//! whole dataset is unfetchable (network down, bad credential, provider
//! rejected the request outright).

pub mod bls;
pub mod feeds;
pub mod fred;
pub mod http;
pub mod prices;
pub mod scenarios;

use crate::registry::{DatasetDescriptor, SourceConfig};
use crate::rows::RowBatch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub use http::HttpClient;

/// Whole-dataset fetch failures. Recorded per dataset; the run continues.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("missing credential: set {env_var} to fetch this dataset")]
    MissingCredential { env_var: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("provider error: {0}")]
    Provider(String),
}

impl FetchError {
    /// Credential and auth problems affect every sub-request of a dataset,
    /// so adapters escalate them instead of absorbing them per item.
    pub fn is_credential(&self) -> bool {
        matches!(
            self,
            FetchError::AuthenticationFailed(_) | FetchError::MissingCredential { .. }
        )
    }
}

/// One absorbed sub-item failure (a symbol, a series id, a feed URL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialFailure {
    /// Which sub-item failed (symbol, series id, feed name, year/scenario).
    pub item: String,
    pub reason: String,
}

/// Fetch metadata carried alongside the normalized rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchMeta {
    pub row_count: usize,
    pub fetched_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partial_failures: Vec<PartialFailure>,
}

/// Normalized rows plus fetch metadata for one dataset.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub rows: RowBatch,
    pub meta: FetchMeta,
}

impl FetchOutcome {
    /// Dedup the batch on its natural key and stamp the metadata.
    pub fn new(mut rows: RowBatch, partial_failures: Vec<PartialFailure>) -> Self {
        rows.dedup();
        let meta = FetchMeta {
            row_count: rows.len(),
            fetched_at: Utc::now(),
            partial_failures,
        };
        Self { rows, meta }
    }
}

/// A ready-to-fetch handle for one dataset.
pub trait Source: Send + Sync {
    /// Human-readable adapter name.
    fn name(&self) -> &str;

    /// Fetch and normalize the dataset's rows.
    fn fetch(&self) -> Result<FetchOutcome, FetchError>;
}

/// Builds `Source` handles from descriptors.
///
/// The factory is the only place that knows about concrete adapters; it is
/// constructed once per run and passed explicitly to the bridge, so tests
/// can substitute scripted sources. Construction may fail (e.g. a missing
/// credential), and that failure is per-dataset, not fatal.
pub trait SourceFactory: Send + Sync {
    fn create(&self, descriptor: &DatasetDescriptor) -> Result<Box<dyn Source>, FetchError>;
}

/// Production factory: one adapter per category, sharing an HTTP client.
pub struct StandardFactory {
    http: Arc<HttpClient>,
}

impl StandardFactory {
    pub fn new() -> Self {
        Self {
            http: Arc::new(HttpClient::new()),
        }
    }
}

impl Default for StandardFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceFactory for StandardFactory {
    fn create(&self, descriptor: &DatasetDescriptor) -> Result<Box<dyn Source>, FetchError> {
        // Explicit dispatch over the closed config enum: adding a category
        // without an adapter is a compile error, not a runtime surprise.
        let source: Box<dyn Source> = match &descriptor.config {
            SourceConfig::PriceSeries {
                symbols,
                period,
                interval,
            } => Box::new(prices::PriceSource::new(
                Arc::clone(&self.http),
                symbols.clone(),
                period.clone(),
                interval.clone(),
            )),
            SourceConfig::EconomicSeries { series } => Box::new(fred::FredSource::from_env(
                Arc::clone(&self.http),
                series.clone(),
                descriptor.incremental,
            )?),
            SourceConfig::LaborSeries {
                series,
                labels,
                units,
            } => Box::new(bls::BlsSource::from_env(
                Arc::clone(&self.http),
                series.clone(),
                labels.clone(),
                units.clone(),
            )),
            SourceConfig::NewsFeed { feeds } => Box::new(feeds::FeedSource::new(
                Arc::clone(&self.http),
                feeds.clone(),
            )),
            SourceConfig::ScenarioTable { years, scenarios } => {
                Box::new(scenarios::ScenarioSource::new(
                    Arc::clone(&self.http),
                    years.clone(),
                    scenarios.clone(),
                ))
            }
        };
        Ok(source)
    }
}
