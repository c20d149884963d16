//! Pipeline orchestrator — the per-run state machine.
//!
//! For each descriptor: fetch (via the bridge) → transform → write. A
//! dataset failure at any stage is recorded and the run moves on; only a
//! registry configuration error or an unwritable output directory aborts
//! the run. The summary index is written once, after every dataset has
//! reached a terminal outcome.

use anyhow::Result;
use chrono::{DateTime, Utc};
use marketbrief_core::bridge::Bridge;
use marketbrief_core::registry::{Registry, SourceCategory};
use marketbrief_core::sources::SourceFactory;
use marketbrief_core::transform::{transform, DatasetDocument, TransformOptions};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::artifacts;
use crate::progress::RunProgress;

/// Options for one pipeline invocation.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub output_dir: PathBuf,
    /// Total-run deadline. Datasets whose fetch has not started when the
    /// deadline passes are recorded as not attempted.
    pub timeout: Option<Duration>,
    /// Disable the bounded-parallel fetch phase.
    pub sequential: bool,
    pub transform: TransformOptions,
}

impl RunOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            timeout: None,
            sequential: false,
            transform: TransformOptions::default(),
        }
    }
}

/// Which stage a dataset failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Fetch,
    Transform,
    Write,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Fetch => f.write_str("fetch"),
            FailureStage::Transform => f.write_str("transform"),
            FailureStage::Write => f.write_str("write"),
        }
    }
}

/// Terminal outcome for one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DatasetOutcome {
    Success {
        record_count: usize,
        fetched_at: DateTime<Utc>,
    },
    Failed {
        stage: FailureStage,
        error: String,
    },
    NotAttempted,
}

/// Coarse outcome label for the summary index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    Failed,
    NotAttempted,
}

/// One line of the summary index, consumed by the landing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub id: String,
    pub category: SourceCategory,
    pub description: String,
    pub record_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
    pub success: bool,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate result of one pipeline invocation, persisted as `index.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub not_attempted: usize,
    pub datasets: Vec<SummaryEntry>,
}

impl RunSummary {
    /// An "every dataset failed" run is a build failure for the caller.
    pub fn all_failed(&self) -> bool {
        self.total > 0 && self.succeeded == 0
    }
}

/// Result of the fetch+transform phase, before any write.
enum Prepared {
    Document(Box<DatasetDocument>),
    Failed { stage: FailureStage, error: String },
    NotAttempted,
}

/// Run the full pipeline over a registry.
///
/// Returns the summary even when datasets failed; only an unwritable
/// output directory or summary is an `Err`. The caller decides whether an
/// all-failed run should fail the build.
pub fn run_pipeline(
    registry: &Registry,
    factory: &dyn SourceFactory,
    options: &RunOptions,
    progress: &dyn RunProgress,
) -> Result<RunSummary> {
    let bridge = Bridge::new(factory);
    let deadline = options.timeout.map(|t| Instant::now() + t);
    let descriptors = registry.list();
    let total = descriptors.len();

    let prepare = |(index, descriptor): (usize, &marketbrief_core::registry::DatasetDescriptor)| {
        // The deadline only gates work that hasn't started; a dataset that
        // began fetching is allowed to finish.
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Prepared::NotAttempted;
        }

        progress.on_start(&descriptor.id, index, total);

        let outcome = match bridge.fetch(descriptor) {
            Ok(outcome) => outcome,
            Err(err) => {
                return Prepared::Failed {
                    stage: FailureStage::Fetch,
                    error: err.to_string(),
                }
            }
        };

        match transform(descriptor, outcome, &options.transform) {
            Ok(document) => Prepared::Document(Box::new(document)),
            Err(err) => Prepared::Failed {
                stage: FailureStage::Transform,
                error: err.to_string(),
            },
        }
    };

    // Independent per-dataset fetches share no mutable state, so they can
    // run in parallel; collect preserves registry order either way.
    let prepared: Vec<Prepared> = if options.sequential {
        descriptors.iter().enumerate().map(prepare).collect()
    } else {
        descriptors.par_iter().enumerate().map(prepare).collect()
    };

    // Single append point: artifacts and summary entries accumulate here,
    // sequentially, after every dataset has a terminal fetch result.
    let mut entries = Vec::with_capacity(total);
    let mut succeeded = 0;
    let mut failed = 0;
    let mut not_attempted = 0;

    for (descriptor, step) in descriptors.iter().zip(prepared) {
        let outcome = match step {
            Prepared::Document(document) => {
                match artifacts::write_document(&options.output_dir, &descriptor.id, &document) {
                    Ok(_) => DatasetOutcome::Success {
                        record_count: document.metadata.record_count,
                        fetched_at: document.metadata.fetched_at,
                    },
                    Err(err) => DatasetOutcome::Failed {
                        stage: FailureStage::Write,
                        error: err.to_string(),
                    },
                }
            }
            Prepared::Failed { stage, error } => DatasetOutcome::Failed { stage, error },
            Prepared::NotAttempted => DatasetOutcome::NotAttempted,
        };

        progress.on_complete(&descriptor.id, &outcome);

        let (record_count, fetched_at, status, error) = match &outcome {
            DatasetOutcome::Success {
                record_count,
                fetched_at,
            } => (*record_count, Some(*fetched_at), OutcomeStatus::Success, None),
            DatasetOutcome::Failed { error, .. } => {
                (0, None, OutcomeStatus::Failed, Some(error.clone()))
            }
            DatasetOutcome::NotAttempted => (
                0,
                None,
                OutcomeStatus::NotAttempted,
                Some("not attempted: run deadline reached".into()),
            ),
        };

        match status {
            OutcomeStatus::Success => succeeded += 1,
            OutcomeStatus::Failed => failed += 1,
            OutcomeStatus::NotAttempted => not_attempted += 1,
        }

        entries.push(SummaryEntry {
            id: descriptor.id.clone(),
            category: descriptor.category(),
            description: descriptor.description.clone(),
            record_count,
            fetched_at,
            success: status == OutcomeStatus::Success,
            status,
            error,
        });
    }

    let summary = RunSummary {
        generated_at: Utc::now(),
        total,
        succeeded,
        failed,
        not_attempted,
        datasets: entries,
    };

    artifacts::write_summary(&options.output_dir, &summary)?;
    progress.on_run_complete(&summary);

    Ok(summary)
}
