//! Progress reporting for pipeline runs.

use crate::pipeline::{DatasetOutcome, RunSummary};

/// Callbacks for multi-dataset runs. Implementations must be thread-safe:
/// `on_start`/`on_complete` may fire from rayon worker threads.
pub trait RunProgress: Send + Sync {
    /// Called when a dataset's fetch begins.
    fn on_start(&self, id: &str, index: usize, total: usize);

    /// Called when a dataset reaches a terminal outcome.
    fn on_complete(&self, id: &str, outcome: &DatasetOutcome);

    /// Called once, after the summary artifact is written.
    fn on_run_complete(&self, summary: &RunSummary);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl RunProgress for StdoutProgress {
    fn on_start(&self, id: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {id}...", index + 1, total);
    }

    fn on_complete(&self, id: &str, outcome: &DatasetOutcome) {
        match outcome {
            DatasetOutcome::Success { record_count, .. } => {
                println!("  OK: {id} ({record_count} records)");
            }
            DatasetOutcome::Failed { stage, error } => {
                println!("  FAIL: {id} ({stage}): {error}");
            }
            DatasetOutcome::NotAttempted => {
                println!("  SKIP: {id} (run deadline reached)");
            }
        }
    }

    fn on_run_complete(&self, summary: &RunSummary) {
        println!(
            "\nRun complete: {}/{} succeeded, {} failed, {} not attempted",
            summary.succeeded, summary.total, summary.failed, summary.not_attempted
        );
    }
}

/// No-op reporter for tests and embedding.
pub struct SilentProgress;

impl RunProgress for SilentProgress {
    fn on_start(&self, _id: &str, _index: usize, _total: usize) {}
    fn on_complete(&self, _id: &str, _outcome: &DatasetOutcome) {}
    fn on_run_complete(&self, _summary: &RunSummary) {}
}
