//! Durable progress tracking for resumable runs.
//!
//! One JSON document per session, rewritten atomically (write temp file,
//! rename over the target) after every state change. Membership in
//! `completed` is the sole authority for "already done": it is checked
//! before any provider call, which makes matrix execution idempotent across
//! restarts. A corrupt or unreadable store never blocks execution - it only
//! costs redone work.

use crate::{task_key, TaskResult, TaskState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Version of the persisted document layout.
///
/// Files written before versioning deserialize with version 0; they are
/// structurally identical to version 1.
pub const SCHEMA_VERSION: u32 = 1;

/// A successfully completed task, as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedRecord {
    /// Stable task identity (`"{question_id}_{model}"`).
    pub task_key: String,
    /// 1-based question number.
    pub question_id: u32,
    /// Model name.
    pub model: String,
    /// When the record was written.
    pub timestamp: DateTime<Utc>,
    /// The full result, reused verbatim when the task is skipped on resume.
    pub result: TaskResult,
}

/// A terminally failed task, as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedRecord {
    /// Stable task identity (`"{question_id}_{model}"`).
    pub task_key: String,
    /// 1-based question number.
    pub question_id: u32,
    /// Model name.
    pub model: String,
    /// The terminal error description.
    pub error: String,
    /// When the record was written.
    pub timestamp: DateTime<Utc>,
}

/// Run lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// The matrix has not been fully processed.
    Running,
    /// All tasks executed and all reports produced.
    Completed,
}

/// The persisted state of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressState {
    /// Document layout version.
    #[serde(default)]
    pub schema_version: u32,
    /// Creation-timestamp-derived id, stable for the run.
    pub session_id: String,
    /// When the session was created.
    pub start_time: DateTime<Utc>,
    /// Successfully completed tasks, in completion order.
    pub completed: Vec<CompletedRecord>,
    /// Terminally failed tasks, in failure order.
    pub failed: Vec<FailedRecord>,
    /// Informational cursor: last processed question id.
    pub current_question: u32,
    /// Informational cursor: index of the model being processed.
    pub current_model: usize,
    /// Number of questions in the matrix.
    pub total_questions: usize,
    /// Model panel for the run.
    pub target_models: Vec<String>,
    /// Refreshed on every write.
    pub last_update: DateTime<Utc>,
    /// Run lifecycle status.
    pub status: RunStatus,
}

impl ProgressState {
    /// A fresh state for a new session.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            schema_version: SCHEMA_VERSION,
            session_id: now.format("%Y%m%d_%H%M%S").to_string(),
            start_time: now,
            completed: Vec::new(),
            failed: Vec::new(),
            current_question: 0,
            current_model: 0,
            total_questions: 0,
            target_models: Vec::new(),
            last_update: now,
            status: RunStatus::Running,
        }
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::new()
    }
}

/// File-backed progress store.
///
/// The in-memory state is authoritative; every mutation is persisted
/// synchronously, and a persist failure is logged without failing the task
/// (a later successful persist reconciles).
pub struct ProgressStore {
    path: PathBuf,
    state: ProgressState,
}

impl ProgressStore {
    /// Load the store from `path`, falling back to a fresh state when the
    /// file is missing or unreadable.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let state = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<ProgressState>(&contents) {
                Ok(state) => {
                    info!(
                        path = %path.display(),
                        completed = state.completed.len(),
                        failed = state.failed.len(),
                        "Loaded progress file"
                    );
                    state
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "Progress file unreadable, starting fresh"
                    );
                    ProgressState::new()
                }
            },
            Err(_) => ProgressState::new(),
        };

        Self { path, state }
    }

    /// The persisted state.
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// The file path backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record the matrix shape at run start.
    pub fn begin_run(&mut self, total_questions: usize, target_models: &[String]) {
        self.state.total_questions = total_questions;
        self.state.target_models = target_models.to_vec();
        self.persist_best_effort();
    }

    /// Update the informational cursors. Not persisted on its own; the next
    /// outcome record carries it to disk.
    pub fn set_cursor(&mut self, question_id: u32, model_index: usize) {
        self.state.current_question = question_id;
        self.state.current_model = model_index;
    }

    /// Whether the task already has a success record.
    pub fn is_completed(&self, question_id: u32, model: &str) -> bool {
        let key = task_key(question_id, model);
        self.state.completed.iter().any(|r| r.task_key == key)
    }

    /// The terminal state of a task as far as the store knows.
    pub fn task_state(&self, question_id: u32, model: &str) -> TaskState {
        let key = task_key(question_id, model);
        if self.state.completed.iter().any(|r| r.task_key == key) {
            TaskState::Success
        } else if self.state.failed.iter().any(|r| r.task_key == key) {
            TaskState::Failed
        } else {
            TaskState::Pending
        }
    }

    /// The stored result of a completed task.
    pub fn completed_result(&self, question_id: u32, model: &str) -> Option<&TaskResult> {
        let key = task_key(question_id, model);
        self.state
            .completed
            .iter()
            .find(|r| r.task_key == key)
            .map(|r| &r.result)
    }

    /// The stored error of a failed task.
    pub fn failed_error(&self, question_id: u32, model: &str) -> Option<&str> {
        let key = task_key(question_id, model);
        self.state
            .failed
            .iter()
            .find(|r| r.task_key == key)
            .map(|r| r.error.as_str())
    }

    /// Append a success record and persist.
    ///
    /// A stale failed record for the same key (from an earlier run) is
    /// dropped so every key lives in at most one of the two lists; a key
    /// already completed is left untouched.
    pub fn record_success(&mut self, question_id: u32, model: &str, result: TaskResult) {
        let key = task_key(question_id, model);
        if self.state.completed.iter().any(|r| r.task_key == key) {
            return;
        }

        self.state.failed.retain(|r| r.task_key != key);
        self.state.completed.push(CompletedRecord {
            task_key: key,
            question_id,
            model: model.to_string(),
            timestamp: Utc::now(),
            result,
        });
        self.persist_best_effort();
    }

    /// Append a failure record and persist.
    ///
    /// A re-attempt that fails again replaces the earlier failed record for
    /// the key instead of duplicating it.
    pub fn record_failure(&mut self, question_id: u32, model: &str, error: &str) {
        let key = task_key(question_id, model);
        self.state.failed.retain(|r| r.task_key != key);
        self.state.failed.push(FailedRecord {
            task_key: key,
            question_id,
            model: model.to_string(),
            error: error.to_string(),
            timestamp: Utc::now(),
        });
        self.persist_best_effort();
    }

    /// Mark the run fully processed and persist.
    pub fn mark_completed(&mut self) {
        self.state.status = RunStatus::Completed;
        self.persist_best_effort();
    }

    /// Write the full state atomically: serialize to a sibling temp file,
    /// then rename over the target so a crash mid-write cannot leave a
    /// truncated store.
    pub fn persist(&mut self) -> crate::Result<()> {
        self.state.last_update = Utc::now();

        let contents = serde_json::to_string_pretty(&self.state)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    crate::BatchError::Persistence(format!(
                        "failed to create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, contents).map_err(|e| {
            crate::BatchError::Persistence(format!(
                "failed to write temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            crate::BatchError::Persistence(format!(
                "failed to rename temp file over {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Remove the store file. Used only after the operator confirms all
    /// work, including report generation, is complete.
    pub fn discard(&self) -> crate::Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                crate::BatchError::Persistence(format!(
                    "failed to remove {}: {}",
                    self.path.display(),
                    e
                ))
            })?;
            info!(path = %self.path.display(), "Progress file removed");
        }
        Ok(())
    }

    fn persist_best_effort(&mut self) {
        if let Err(err) = self.persist() {
            warn!(error = %err, "Failed to persist progress, continuing with in-memory state");
        }
    }
}
