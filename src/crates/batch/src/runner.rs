//! The task runner: the central control loop of the batch engine.
//!
//! Outer loop over the model panel, inner loop over the question list, both
//! in stable order. For each task the runner consults the progress store,
//! invokes the retry policy around the provider client, records the outcome
//! durably, triggers periodic autosave flushes and applies pacing. A single
//! task failure is never fatal to the batch.

use crate::aggregate::{Aggregator, ModelResultSet, RunStatistics};
use crate::pacing::Pacer;
use crate::progress::ProgressStore;
use crate::report::ReportWriter;
use crate::retry::RetryPolicy;
use crate::{BatchConfig, BatchError, Result, TaskResult, TaskState};
use aiqa_core::{ChatModel, ChatRequest, Message};
use llm::ClientRegistry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Cooperative cancellation handle.
///
/// The runner observes the flag only at task boundaries; a mid-call
/// interrupt is allowed to complete or time out naturally because the
/// underlying network call carries its own timeout.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A fresh, unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation at the next task boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What a run produced.
#[derive(Debug)]
pub struct RunSummary {
    /// One result set per processed model, in panel order.
    pub result_sets: Vec<ModelResultSet>,
    /// Cross-model statistics.
    pub statistics: RunStatistics,
    /// Whether the run stopped early at a cancellation point.
    pub cancelled: bool,
}

/// Drives the (question x model) matrix to completion.
pub struct BatchRunner {
    registry: ClientRegistry,
    config: BatchConfig,
    store: ProgressStore,
    retry: RetryPolicy,
    pacer: Pacer,
    aggregator: Aggregator,
    cancel: CancelFlag,
}

impl BatchRunner {
    /// Create a runner.
    ///
    /// Fails fast on invalid configuration; everything after `run()` starts
    /// is per-task error handling.
    pub fn new(
        registry: ClientRegistry,
        config: BatchConfig,
        store: ProgressStore,
        writer: Arc<dyn ReportWriter>,
    ) -> Result<Self> {
        config.validate()?;

        let retry = RetryPolicy::from_config(&config);
        let pacer = Pacer::from_config(&config);

        Ok(Self {
            registry,
            config,
            store,
            retry,
            pacer,
            aggregator: Aggregator::new(writer),
            cancel: CancelFlag::new(),
        })
    }

    /// A handle that can cancel this runner from elsewhere.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// The progress store backing this runner.
    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    /// Run the full matrix.
    ///
    /// Already-completed tasks are skipped without network I/O, making the
    /// run idempotent across restarts. Returns the accumulated result sets
    /// and statistics; the progress store is marked completed only after the
    /// whole matrix and all reports have been produced.
    pub async fn run(&mut self, questions: &[String]) -> Result<RunSummary> {
        let clients = self.resolve_clients()?;
        if questions.is_empty() {
            return Err(BatchError::Config("no questions loaded".to_string()));
        }

        self.store.begin_run(questions.len(), &self.config.target_models);

        info!(
            questions = questions.len(),
            models = clients.len(),
            session = %self.store.state().session_id,
            "Starting batch run"
        );

        let mut result_sets = Vec::new();
        let mut cancelled = false;

        for (model_index, (model_name, client)) in clients.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(model = %model_name, "Cancellation requested, stopping before model");
                cancelled = true;
                break;
            }

            info!(
                model = %model_name,
                position = model_index + 1,
                total = clients.len(),
                "Processing model"
            );

            let (set, model_cancelled) = self
                .process_single_model(model_index, model_name, client, questions)
                .await;
            result_sets.push(set);

            if model_cancelled {
                cancelled = true;
                break;
            }

            if model_index + 1 < clients.len() {
                self.pacer.pause_between_models().await;
            }
        }

        let statistics = self.aggregator.finalize_run(&result_sets);

        if cancelled {
            warn!("Batch run cancelled, partial results persisted and reported");
        } else {
            self.store.mark_completed();
            info!("Batch run completed");
        }

        Ok(RunSummary {
            result_sets,
            statistics,
            cancelled,
        })
    }

    /// Resolve the configured model panel against the registry, in order.
    ///
    /// A missing client is a configuration error discovered before the loop
    /// starts, not a per-task failure.
    fn resolve_clients(&self) -> Result<Vec<(String, Arc<dyn ChatModel>)>> {
        if self.config.target_models.is_empty() {
            return Err(BatchError::Config("no models configured".to_string()));
        }

        self.config
            .target_models
            .iter()
            .map(|name| {
                self.registry
                    .client_for(name)
                    .map(|client| (name.clone(), client))
                    .ok_or_else(|| {
                        BatchError::Config(format!("no client registered for model '{}'", name))
                    })
            })
            .collect()
    }

    /// Process all questions for one model.
    ///
    /// Returns the accumulated result set and whether cancellation was
    /// observed mid-model (in which case the partial set has already been
    /// flushed).
    async fn process_single_model(
        &mut self,
        model_index: usize,
        model_name: &str,
        client: &Arc<dyn ChatModel>,
        questions: &[String],
    ) -> (ModelResultSet, bool) {
        let mut set = ModelResultSet::new(model_name);

        for (i, question) in questions.iter().enumerate() {
            let question_id = (i + 1) as u32;

            if self.cancel.is_cancelled() {
                warn!(
                    model = %model_name,
                    question_id = question_id,
                    "Cancellation requested, flushing partial results"
                );
                self.aggregator.flush_partial(&set);
                return (set, true);
            }

            match self.store.task_state(question_id, model_name) {
                TaskState::Success => {
                    // Resume path: reuse the stored result, no delay, no I/O.
                    if let Some(result) = self.store.completed_result(question_id, model_name) {
                        debug!(
                            model = %model_name,
                            question_id = question_id,
                            "Skipping completed task"
                        );
                        set.push(result.clone());
                        continue;
                    }
                }
                TaskState::Failed if !self.config.retry_failed_on_resume => {
                    let error = self
                        .store
                        .failed_error(question_id, model_name)
                        .unwrap_or("unknown error")
                        .to_string();
                    debug!(
                        model = %model_name,
                        question_id = question_id,
                        "Skipping previously failed task"
                    );
                    set.push(TaskResult::failure(
                        question_id,
                        question.clone(),
                        model_name,
                        error,
                    ));
                    continue;
                }
                _ => {}
            }

            info!(
                model = %model_name,
                question_id = question_id,
                total = questions.len(),
                state = %TaskState::InFlight,
                "Processing question"
            );

            self.store.set_cursor(question_id, model_index);
            self.execute_task(model_name, client, question_id, question, &mut set)
                .await;

            if question_id as usize % self.config.autosave_interval == 0 {
                self.aggregator.flush_partial(&set);
            }

            if i + 1 < questions.len() {
                self.pacer.pause_between_questions().await;
            }
        }

        self.aggregator.finalize_model(&set);
        info!(
            model = %model_name,
            successes = set.success_count(),
            failures = set.failure_count(),
            "Model processing finished"
        );

        (set, false)
    }

    /// Execute one task to a terminal outcome and record it.
    async fn execute_task(
        &mut self,
        model_name: &str,
        client: &Arc<dyn ChatModel>,
        question_id: u32,
        question: &str,
        set: &mut ModelResultSet,
    ) {
        let operation = format!("{} Q{}", model_name, question_id);
        let system_prompt = self.config.system_prompt.clone();
        let question_text = question.to_string();
        let client = Arc::clone(client);

        let outcome = self
            .retry
            .run(&operation, || {
                let client = Arc::clone(&client);
                let request = ChatRequest::new(vec![
                    Message::system(system_prompt.clone()),
                    Message::human(question_text.clone()),
                ]);
                async move { client.chat(request).await }
            })
            .await;

        match outcome {
            Ok(response) => {
                let result = TaskResult::success(
                    question_id,
                    question,
                    model_name,
                    response.text(),
                );
                self.store
                    .record_success(question_id, model_name, result.clone());
                set.push(result);
                info!(
                    model = %model_name,
                    question_id = question_id,
                    state = %TaskState::Success,
                    "Task completed"
                );
            }
            Err(err) => {
                let error_msg = err.to_string();
                error!(
                    model = %model_name,
                    question_id = question_id,
                    state = %TaskState::Failed,
                    error = %error_msg,
                    "Task failed"
                );
                self.store
                    .record_failure(question_id, model_name, &error_msg);
                // Error-marked result so the failure stays visible in reports.
                set.push(TaskResult::failure(
                    question_id,
                    question,
                    model_name,
                    error_msg,
                ));
            }
        }
    }
}
