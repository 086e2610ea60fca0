//! Per-model and cross-model result aggregation.
//!
//! Statistics are pure functions of the accumulated result sets; the
//! aggregator's only side effect is delegating to the report writer, and a
//! report-writing failure never rolls back task bookkeeping.

use crate::report::ReportWriter;
use crate::TaskResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info};

/// In-memory accumulation of one model's results for the current run.
///
/// Rebuilt from stored records for tasks skipped on resume, so the set is
/// complete regardless of how many process restarts occurred.
#[derive(Debug, Clone)]
pub struct ModelResultSet {
    /// Model name.
    pub model: String,
    /// Results in question order.
    pub results: Vec<TaskResult>,
}

impl ModelResultSet {
    /// An empty set for a model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            results: Vec::new(),
        }
    }

    /// Append a result.
    pub fn push(&mut self, result: TaskResult) {
        self.results.push(result);
    }

    /// Number of results accumulated so far.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of successful results.
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_error()).count()
    }

    /// Number of failed results.
    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_error()).count()
    }

    /// Statistics for this set.
    pub fn stats(&self) -> ModelStats {
        ModelStats {
            successes: self.success_count(),
            failures: self.failure_count(),
        }
    }
}

/// Success/failure counts for one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStats {
    /// Tasks that produced an answer.
    pub successes: usize,
    /// Tasks recorded as terminally failed.
    pub failures: usize,
}

impl ModelStats {
    /// Total tasks counted.
    pub fn total(&self) -> usize {
        self.successes + self.failures
    }

    /// Successes as a percentage of total tasks; 0 for an empty set.
    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.successes as f64 / self.total() as f64 * 100.0
        }
    }
}

/// The cross-model statistics artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatistics {
    /// When the statistics were computed.
    pub generated_at: DateTime<Utc>,
    /// Questions per model (largest set wins if a model was cut short).
    pub total_questions: usize,
    /// Number of models in the run.
    pub model_count: usize,
    /// Per-model counts, keyed by model name.
    pub models: BTreeMap<String, ModelStats>,
}

impl RunStatistics {
    /// Compute statistics from accumulated result sets.
    pub fn from_result_sets(sets: &[ModelResultSet]) -> Self {
        let models: BTreeMap<String, ModelStats> = sets
            .iter()
            .map(|set| (set.model.clone(), set.stats()))
            .collect();

        Self {
            generated_at: Utc::now(),
            total_questions: sets.iter().map(|s| s.len()).max().unwrap_or(0),
            model_count: sets.len(),
            models,
        }
    }
}

/// Forwards accumulated results to the report writer at autosave
/// checkpoints, at model completion, and at run completion.
pub struct Aggregator {
    writer: Arc<dyn ReportWriter>,
}

impl Aggregator {
    /// Create an aggregator delegating to the given writer.
    pub fn new(writer: Arc<dyn ReportWriter>) -> Self {
        Self { writer }
    }

    /// Flush a model's partial result set at an autosave checkpoint.
    pub fn flush_partial(&self, set: &ModelResultSet) {
        match self.writer.write_model_report(&set.model, &set.results) {
            Ok(path) => info!(
                model = %set.model,
                results = set.len(),
                path = %path.display(),
                "Autosaved partial results"
            ),
            Err(err) => error!(
                model = %set.model,
                error = %err,
                "Failed to write partial model report"
            ),
        }
    }

    /// Write a model's final report after its questions are exhausted.
    pub fn finalize_model(&self, set: &ModelResultSet) {
        match self.writer.write_model_report(&set.model, &set.results) {
            Ok(path) => info!(
                model = %set.model,
                successes = set.success_count(),
                failures = set.failure_count(),
                path = %path.display(),
                "Wrote model report"
            ),
            Err(err) => error!(
                model = %set.model,
                error = %err,
                "Failed to write model report"
            ),
        }
    }

    /// Produce the cross-model summary report and statistics artifact.
    ///
    /// Always returns the computed statistics, even when writing either
    /// artifact fails.
    pub fn finalize_run(&self, sets: &[ModelResultSet]) -> RunStatistics {
        match self.writer.write_summary_report(sets) {
            Ok(path) => info!(path = %path.display(), "Wrote summary report"),
            Err(err) => error!(error = %err, "Failed to write summary report"),
        }

        let stats = RunStatistics::from_result_sets(sets);

        match self.writer.write_statistics(&stats) {
            Ok(path) => info!(path = %path.display(), "Wrote statistics"),
            Err(err) => error!(error = %err, "Failed to write statistics"),
        }

        stats
    }
}
