//! Resumable batch execution engine for aiqa-monitor.
//!
//! Drives a (question x model) task matrix to completion across
//! long-running, rate-limited, sometimes-failing provider calls, surviving
//! process interruption without redoing completed work or losing partial
//! results.
//!
//! The engine is deliberately sequential: providers enforce
//! requests-per-minute ceilings, calls are network-latency dominated, and
//! ordered autosave checkpoints depend on a deterministic position. There is
//! exactly one logical thread of control; the only blocking points are the
//! provider call itself and the pacing sleeps.
//!
//! # Components
//!
//! - [`ProgressStore`] - durable record of task outcomes (JSON file,
//!   atomically replaced on every write), the authority for what is done
//! - [`RetryPolicy`] - bounded fixed-delay retries around a provider call,
//!   with terminal errors short-circuiting
//! - [`Pacer`] - fixed sleeps between questions and between models
//! - [`BatchRunner`] - the control loop tying it all together
//! - [`Aggregator`] - per-model and cross-model result collection,
//!   statistics, and report-writer flushes
//!
//! # Example
//!
//! ```rust,ignore
//! use batch::{BatchConfig, BatchRunner, MarkdownReportWriter, ProgressStore};
//! use llm::{ClientRegistry, ModelTarget};
//! use std::sync::Arc;
//!
//! let registry = ClientRegistry::from_targets(&targets)?;
//! let config = BatchConfig::new("You are a helpful industry assistant.")
//!     .with_target_models(vec!["deepseek-chat".into(), "gemini-flash".into()]);
//! let store = ProgressStore::load("batch_progress.json");
//! let writer = Arc::new(MarkdownReportWriter::new("outputs"));
//!
//! let mut runner = BatchRunner::new(registry, config, store, writer)?;
//! let summary = runner.run(&questions).await?;
//! ```

pub mod aggregate;
pub mod config;
pub mod pacing;
pub mod progress;
pub mod report;
pub mod retry;
pub mod runner;

use aiqa_core::ProviderError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use aggregate::{Aggregator, ModelResultSet, ModelStats, RunStatistics};
pub use config::BatchConfig;
pub use pacing::Pacer;
pub use progress::{ProgressState, ProgressStore, RunStatus};
pub use report::{MarkdownReportWriter, ReportWriter};
pub use retry::RetryPolicy;
pub use runner::{BatchRunner, CancelFlag, RunSummary};

/// Errors that can occur during batch execution.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Invalid run configuration, detected before the loop starts.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A provider call failed.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Progress store I/O failure.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Report artifact could not be written.
    #[error("Report error: {0}")]
    Report(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for batch operations.
pub type Result<T> = std::result::Result<T, BatchError>;

/// Lifecycle of a single (question, model) task.
///
/// Retries are invisible here; they live inside the
/// `InFlight -> {Success, Failed}` transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    /// Not yet attempted in any run.
    Pending,
    /// Provider call in progress.
    InFlight,
    /// Terminal: answer recorded.
    Success,
    /// Terminal: failure recorded.
    Failed,
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskState::Pending => write!(f, "pending"),
            TaskState::InFlight => write!(f, "in_flight"),
            TaskState::Success => write!(f, "success"),
            TaskState::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of one (question, model) task.
///
/// Failed tasks carry an error-marked result so they stay visible in reports
/// instead of being silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    /// 1-based question number.
    pub question_id: u32,
    /// The question text.
    pub question: String,
    /// Model name the engine uses for this panel entry.
    pub model: String,
    /// The model's answer; empty for failed tasks.
    pub answer: String,
    /// Error description when the task failed terminally.
    pub error: Option<String>,
    /// When the outcome was produced.
    pub timestamp: DateTime<Utc>,
}

impl TaskResult {
    /// A successful outcome.
    pub fn success(
        question_id: u32,
        question: impl Into<String>,
        model: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            question_id,
            question: question.into(),
            model: model.into(),
            answer: answer.into(),
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// A failed outcome.
    pub fn failure(
        question_id: u32,
        question: impl Into<String>,
        model: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            question_id,
            question: question.into(),
            model: model.into(),
            answer: String::new(),
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }

    /// Whether this result records a failure.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Stable identity of a (question, model) task.
pub fn task_key(question_id: u32, model: &str) -> String {
    format!("{}_{}", question_id, model)
}
