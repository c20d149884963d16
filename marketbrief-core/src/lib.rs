//! MarketBrief Core — dataset registry, source adapters, bridge, transforms.
//!
//! This crate contains everything needed to turn a dataset descriptor into a
//! display-ready JSON document:
//! - Dataset registry (built-in defaults or `datasets.toml`)
//! - Normalized row model (price bars, economic series, feed entries, scenario tables)
//! - One source adapter per provider family, behind the `Source` trait
//! - Bridge that dispatches a descriptor to its adapter via a `SourceFactory`
//! - Per-category transforms producing summary statistics and capped row sets

pub mod bridge;
pub mod registry;
pub mod rows;
pub mod sources;
pub mod transform;

pub use bridge::Bridge;
pub use registry::{ConfigError, DatasetDescriptor, Registry, SourceCategory, SourceConfig};
pub use rows::{FeedRow, PriceRow, RowBatch, ScenarioRow, SeriesRow};
pub use sources::{
    FetchError, FetchMeta, FetchOutcome, PartialFailure, Source, SourceFactory, StandardFactory,
};
pub use transform::{transform, DatasetDocument, DocumentStats, TransformError, TransformOptions};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types that cross the rayon fetch boundary are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<DatasetDescriptor>();
        require_sync::<DatasetDescriptor>();
        require_send::<Registry>();
        require_sync::<Registry>();
        require_send::<RowBatch>();
        require_sync::<RowBatch>();
        require_send::<FetchOutcome>();
        require_sync::<FetchOutcome>();
        require_send::<FetchError>();
        require_sync::<FetchError>();
        require_send::<DatasetDocument>();
        require_sync::<DatasetDocument>();
        require_send::<StandardFactory>();
        require_sync::<StandardFactory>();
    }
}
