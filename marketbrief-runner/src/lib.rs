//! MarketBrief Runner — pipeline orchestration over `marketbrief-core`.
//!
//! This crate builds on the core to provide:
//! - The per-run state machine: fetch → transform → write, per dataset
//! - Bounded-parallel fetching with a total-run deadline
//! - Atomic JSON artifact writing (one document per dataset + `index.json`)
//! - Run summary accumulation and progress reporting

pub mod artifacts;
pub mod pipeline;
pub mod progress;

pub use artifacts::{document_path, summary_path};
pub use pipeline::{
    run_pipeline, DatasetOutcome, FailureStage, OutcomeStatus, RunOptions, RunSummary,
    SummaryEntry,
};
pub use progress::{RunProgress, SilentProgress, StdoutProgress};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn run_options_is_send_sync() {
        assert_send::<RunOptions>();
        assert_sync::<RunOptions>();
    }

    #[test]
    fn run_summary_is_send_sync() {
        assert_send::<RunSummary>();
        assert_sync::<RunSummary>();
    }

    #[test]
    fn dataset_outcome_is_send_sync() {
        assert_send::<DatasetOutcome>();
        assert_sync::<DatasetOutcome>();
    }
}
