//! Scenario tests for the batch runner: resume, retry bounds, failure
//! isolation, autosave cadence and pacing.

use aiqa_core::{ChatModel, ChatRequest, ChatResponse, Message, MessageRole, ProviderError};
use async_trait::async_trait;
use batch::{
    task_key, BatchConfig, BatchError, BatchRunner, ProgressStore, ReportWriter, RunStatus,
    TaskResult,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;

#[derive(Clone)]
enum Behavior {
    /// Always answer with the given text.
    Answer(String),
    /// Fail terminally when the question matches, answer "ok" otherwise.
    FailOnQuestion(String),
    /// Always fail with a recoverable error.
    AlwaysRecoverable,
    /// Always fail with a terminal error.
    AlwaysTerminal,
}

/// Scripted stand-in for a provider client, counting every call.
#[derive(Clone)]
struct StubModel {
    calls: Arc<AtomicUsize>,
    behavior: Behavior,
}

impl StubModel {
    fn new(behavior: Behavior) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            behavior,
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatModel for StubModel {
    async fn chat(&self, request: ChatRequest) -> aiqa_core::Result<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let question = request
            .messages
            .iter()
            .find(|m| m.role == MessageRole::Human)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        let reply = |text: &str| ChatResponse {
            message: Message::ai(text),
            usage: None,
            metadata: HashMap::new(),
        };

        match &self.behavior {
            Behavior::Answer(text) => Ok(reply(text)),
            Behavior::FailOnQuestion(q) if *q == question => Err(ProviderError::InvalidResponse(
                "malformed payload".to_string(),
            )),
            Behavior::FailOnQuestion(_) => Ok(reply("ok")),
            Behavior::AlwaysRecoverable => Err(ProviderError::Timeout("simulated".to_string())),
            Behavior::AlwaysTerminal => Err(ProviderError::InvalidRequest("simulated".to_string())),
        }
    }

    fn clone_box(&self) -> Box<dyn ChatModel> {
        Box::new(self.clone())
    }
}

/// Report writer that records every flush instead of touching the disk.
#[derive(Default)]
struct RecordingReporter {
    model_reports: Mutex<Vec<(String, usize)>>,
    summary_writes: AtomicUsize,
    stats_writes: AtomicUsize,
}

impl RecordingReporter {
    fn model_report_sizes(&self, model: &str) -> Vec<usize> {
        self.model_reports
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == model)
            .map(|(_, n)| *n)
            .collect()
    }
}

impl ReportWriter for RecordingReporter {
    fn write_model_report(
        &self,
        model: &str,
        results: &[TaskResult],
    ) -> batch::Result<PathBuf> {
        self.model_reports
            .lock()
            .unwrap()
            .push((model.to_string(), results.len()));
        Ok(PathBuf::from("model.md"))
    }

    fn write_summary_report(
        &self,
        _sets: &[batch::ModelResultSet],
    ) -> batch::Result<PathBuf> {
        self.summary_writes.fetch_add(1, Ordering::SeqCst);
        Ok(PathBuf::from("summary.md"))
    }

    fn write_statistics(&self, _stats: &batch::RunStatistics) -> batch::Result<PathBuf> {
        self.stats_writes.fetch_add(1, Ordering::SeqCst);
        Ok(PathBuf::from("stats.json"))
    }
}

fn quick_config(models: &[&str]) -> BatchConfig {
    BatchConfig::new("You are a test assistant.")
        .with_target_models(models.iter().map(|s| s.to_string()).collect())
        .with_retry_delay(Duration::from_millis(10))
        .with_pause_between_questions(Duration::ZERO)
        .with_pause_between_models(Duration::ZERO)
}

fn runner_with(
    models: &[(&str, StubModel)],
    config: BatchConfig,
    store: ProgressStore,
    reporter: Arc<RecordingReporter>,
) -> BatchRunner {
    let mut registry = llm::ClientRegistry::new();
    for (name, stub) in models {
        registry.insert(*name, Arc::new(stub.clone()));
    }
    BatchRunner::new(registry, config, store, reporter).unwrap()
}

fn questions(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|s| s.to_string()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_two_questions_one_model_all_success() {
    let dir = tempdir().unwrap();
    let store = ProgressStore::load(dir.path().join("progress.json"));
    let stub = StubModel::new(Behavior::Answer("ok".to_string()));
    let reporter = Arc::new(RecordingReporter::default());

    let mut runner = runner_with(
        &[("m1", stub.clone())],
        quick_config(&["m1"]),
        store,
        reporter,
    );
    let summary = runner.run(&questions(&["Q1", "Q2"])).await.unwrap();

    assert!(!summary.cancelled);
    assert_eq!(summary.result_sets.len(), 1);
    assert_eq!(summary.result_sets[0].len(), 2);
    assert_eq!(stub.call_count(), 2);

    let stats = &summary.statistics.models["m1"];
    assert_eq!(stats.successes, 2);
    assert_eq!(stats.failures, 0);
    assert_eq!(stats.success_rate(), 100.0);

    let state = runner.store().state();
    assert_eq!(state.completed.len(), 2);
    assert!(state.failed.is_empty());
    assert_eq!(state.status, RunStatus::Completed);
    assert_eq!(state.total_questions, 2);
    assert_eq!(state.target_models, vec!["m1".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_idempotent_resume_makes_no_provider_calls() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("progress.json");
    let qs = questions(&["Q1", "Q2", "Q3"]);

    let first_stub = StubModel::new(Behavior::Answer("ok".to_string()));
    let mut runner = runner_with(
        &[("m1", first_stub.clone())],
        quick_config(&["m1"]),
        ProgressStore::load(&path),
        Arc::new(RecordingReporter::default()),
    );
    runner.run(&qs).await.unwrap();
    assert_eq!(first_stub.call_count(), 3);

    let keys_after_first: Vec<String> = runner
        .store()
        .state()
        .completed
        .iter()
        .map(|r| r.task_key.clone())
        .collect();
    drop(runner);

    // Second run against the same store: zero provider calls, identical set.
    let second_stub = StubModel::new(Behavior::Answer("different".to_string()));
    let mut runner = runner_with(
        &[("m1", second_stub.clone())],
        quick_config(&["m1"]),
        ProgressStore::load(&path),
        Arc::new(RecordingReporter::default()),
    );
    let summary = runner.run(&qs).await.unwrap();

    assert_eq!(second_stub.call_count(), 0);
    let keys_after_second: Vec<String> = runner
        .store()
        .state()
        .completed
        .iter()
        .map(|r| r.task_key.clone())
        .collect();
    assert_eq!(keys_after_first, keys_after_second);

    // Reused results come from the store, not the new stub.
    assert!(summary.result_sets[0]
        .results
        .iter()
        .all(|r| r.answer == "ok"));
}

#[tokio::test(start_paused = true)]
async fn test_resume_after_interrupt_skips_completed_task() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("progress.json");

    // Simulate a run interrupted after (Q1, m1) completed.
    let mut store = ProgressStore::load(&path);
    store.record_success(1, "m1", TaskResult::success(1, "Q1", "m1", "stored answer"));
    drop(store);

    let stub = StubModel::new(Behavior::Answer("fresh answer".to_string()));
    let mut runner = runner_with(
        &[("m1", stub.clone())],
        quick_config(&["m1"]),
        ProgressStore::load(&path),
        Arc::new(RecordingReporter::default()),
    );
    let summary = runner.run(&questions(&["Q1", "Q2"])).await.unwrap();

    // Q1 was never re-called; only Q2 hit the provider.
    assert_eq!(stub.call_count(), 1);

    let results = &summary.result_sets[0].results;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].answer, "stored answer");
    assert_eq!(results[1].answer, "fresh answer");

    let state = runner.store().state();
    let q1_count = state
        .completed
        .iter()
        .filter(|r| r.task_key == task_key(1, "m1"))
        .count();
    assert_eq!(q1_count, 1);
    assert_eq!(state.completed.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_bounded_retry_exhausts_attempt_budget() {
    let dir = tempdir().unwrap();
    let store = ProgressStore::load(dir.path().join("progress.json"));
    let stub = StubModel::new(Behavior::AlwaysRecoverable);

    let config = quick_config(&["m1"]).with_max_retries(3);
    let mut runner = runner_with(
        &[("m1", stub.clone())],
        config,
        store,
        Arc::new(RecordingReporter::default()),
    );
    let summary = runner.run(&questions(&["Q1"])).await.unwrap();

    assert_eq!(stub.call_count(), 3);
    assert_eq!(runner.store().state().failed.len(), 1);
    assert!(summary.result_sets[0].results[0].is_error());
}

#[tokio::test(start_paused = true)]
async fn test_terminal_error_short_circuits_retries() {
    let dir = tempdir().unwrap();
    let store = ProgressStore::load(dir.path().join("progress.json"));
    let stub = StubModel::new(Behavior::AlwaysTerminal);

    let config = quick_config(&["m1"]).with_max_retries(3);
    let mut runner = runner_with(
        &[("m1", stub.clone())],
        config,
        store,
        Arc::new(RecordingReporter::default()),
    );
    runner.run(&questions(&["Q1"])).await.unwrap();

    assert_eq!(stub.call_count(), 1);
    assert_eq!(runner.store().state().failed.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_partial_failure_isolation() {
    let dir = tempdir().unwrap();
    let store = ProgressStore::load(dir.path().join("progress.json"));
    let stub = StubModel::new(Behavior::FailOnQuestion("Q3".to_string()));

    let mut runner = runner_with(
        &[("m1", stub.clone())],
        quick_config(&["m1"]),
        store,
        Arc::new(RecordingReporter::default()),
    );
    let summary = runner
        .run(&questions(&["Q1", "Q2", "Q3", "Q4", "Q5"]))
        .await
        .unwrap();

    let set = &summary.result_sets[0];
    assert_eq!(set.len(), 5);
    assert_eq!(set.success_count(), 4);
    assert_eq!(set.failure_count(), 1);
    assert!(set.results[2].is_error());

    // The engine proceeded past the failure.
    assert!(!set.results[3].is_error());
    assert!(!set.results[4].is_error());

    let stats = &summary.statistics.models["m1"];
    assert_eq!(stats.successes, 4);
    assert_eq!(stats.failures, 1);
    assert_eq!(stats.success_rate(), 80.0);
}

#[tokio::test(start_paused = true)]
async fn test_autosave_cadence() {
    let dir = tempdir().unwrap();
    let store = ProgressStore::load(dir.path().join("progress.json"));
    let stub = StubModel::new(Behavior::Answer("ok".to_string()));
    let reporter = Arc::new(RecordingReporter::default());

    let config = quick_config(&["m1"]).with_autosave_interval(2);
    let mut runner = runner_with(
        &[("m1", stub)],
        config,
        store,
        Arc::clone(&reporter),
    );
    runner
        .run(&questions(&["Q1", "Q2", "Q3", "Q4", "Q5"]))
        .await
        .unwrap();

    // Partial flushes after Q2 and Q4, final flush after Q5.
    assert_eq!(reporter.model_report_sizes("m1"), vec![2, 4, 5]);
    assert_eq!(reporter.summary_writes.load(Ordering::SeqCst), 1);
    assert_eq!(reporter.stats_writes.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_pacing_sleeps_between_questions_only() {
    let dir = tempdir().unwrap();
    let store = ProgressStore::load(dir.path().join("progress.json"));
    let stub = StubModel::new(Behavior::Answer("ok".to_string()));

    let config = quick_config(&["m1"])
        .with_pause_between_questions(Duration::from_secs(2))
        .with_pause_between_models(Duration::from_secs(7));
    let mut runner = runner_with(
        &[("m1", stub)],
        config,
        store,
        Arc::new(RecordingReporter::default()),
    );

    let start = tokio::time::Instant::now();
    runner.run(&questions(&["Q1", "Q2", "Q3"])).await.unwrap();

    // 3 questions, 2 inter-question pauses, no inter-model pause.
    assert_eq!(start.elapsed(), Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn test_pacing_between_models() {
    let dir = tempdir().unwrap();
    let store = ProgressStore::load(dir.path().join("progress.json"));
    let stub_a = StubModel::new(Behavior::Answer("a".to_string()));
    let stub_b = StubModel::new(Behavior::Answer("b".to_string()));

    let config = quick_config(&["m1", "m2"])
        .with_pause_between_questions(Duration::from_secs(2))
        .with_pause_between_models(Duration::from_secs(5));
    let mut runner = runner_with(
        &[("m1", stub_a), ("m2", stub_b)],
        config,
        store,
        Arc::new(RecordingReporter::default()),
    );

    let start = tokio::time::Instant::now();
    runner.run(&questions(&["Q1", "Q2"])).await.unwrap();

    // Per model: 1 inter-question pause. Between models: 1 pause.
    assert_eq!(start.elapsed(), Duration::from_secs(9));
}

#[tokio::test(start_paused = true)]
async fn test_no_duplicate_keys_after_failure_then_success() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("progress.json");
    let qs = questions(&["Q1", "Q2"]);

    // First run: everything fails terminally.
    let failing = StubModel::new(Behavior::AlwaysTerminal);
    let mut runner = runner_with(
        &[("m1", failing)],
        quick_config(&["m1"]),
        ProgressStore::load(&path),
        Arc::new(RecordingReporter::default()),
    );
    runner.run(&qs).await.unwrap();
    assert_eq!(runner.store().state().failed.len(), 2);
    drop(runner);

    // Second run: failed tasks are re-attempted and succeed.
    let healthy = StubModel::new(Behavior::Answer("ok".to_string()));
    let mut runner = runner_with(
        &[("m1", healthy.clone())],
        quick_config(&["m1"]),
        ProgressStore::load(&path),
        Arc::new(RecordingReporter::default()),
    );
    runner.run(&qs).await.unwrap();

    assert_eq!(healthy.call_count(), 2);

    let state = runner.store().state();
    assert_eq!(state.completed.len(), 2);
    assert!(state.failed.is_empty());

    // Every key appears at most once across both lists.
    let mut keys: Vec<&str> = state
        .completed
        .iter()
        .map(|r| r.task_key.as_str())
        .chain(state.failed.iter().map(|r| r.task_key.as_str()))
        .collect();
    keys.sort_unstable();
    let before = keys.len();
    keys.dedup();
    assert_eq!(keys.len(), before);
}

#[tokio::test(start_paused = true)]
async fn test_failed_tasks_skipped_when_resume_retry_disabled() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("progress.json");

    let mut store = ProgressStore::load(&path);
    store.record_failure(1, "m1", "simulated outage");
    drop(store);

    let stub = StubModel::new(Behavior::Answer("ok".to_string()));
    let config = quick_config(&["m1"]).with_retry_failed_on_resume(false);
    let mut runner = runner_with(
        &[("m1", stub.clone())],
        config,
        ProgressStore::load(&path),
        Arc::new(RecordingReporter::default()),
    );
    let summary = runner.run(&questions(&["Q1"])).await.unwrap();

    // No network call; the stored failure is surfaced in the results.
    assert_eq!(stub.call_count(), 0);
    let result = &summary.result_sets[0].results[0];
    assert!(result.is_error());
    assert_eq!(result.error.as_deref(), Some("simulated outage"));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_before_run_keeps_store_running() {
    let dir = tempdir().unwrap();
    let store = ProgressStore::load(dir.path().join("progress.json"));
    let stub = StubModel::new(Behavior::Answer("ok".to_string()));

    let mut runner = runner_with(
        &[("m1", stub.clone())],
        quick_config(&["m1"]),
        store,
        Arc::new(RecordingReporter::default()),
    );
    runner.cancel_flag().cancel();
    let summary = runner.run(&questions(&["Q1"])).await.unwrap();

    assert!(summary.cancelled);
    assert!(summary.result_sets.is_empty());
    assert_eq!(stub.call_count(), 0);
    assert_eq!(runner.store().state().status, RunStatus::Running);
}

#[tokio::test(start_paused = true)]
async fn test_fatal_configuration_errors() {
    let dir = tempdir().unwrap();
    let stub = StubModel::new(Behavior::Answer("ok".to_string()));

    // No questions loaded.
    let store = ProgressStore::load(dir.path().join("p1.json"));
    let mut runner = runner_with(
        &[("m1", stub.clone())],
        quick_config(&["m1"]),
        store,
        Arc::new(RecordingReporter::default()),
    );
    let err = runner.run(&[]).await.unwrap_err();
    assert!(matches!(err, BatchError::Config(_)));

    // No models configured.
    let store = ProgressStore::load(dir.path().join("p2.json"));
    let mut runner = runner_with(
        &[("m1", stub.clone())],
        quick_config(&[]),
        store,
        Arc::new(RecordingReporter::default()),
    );
    let err = runner.run(&questions(&["Q1"])).await.unwrap_err();
    assert!(matches!(err, BatchError::Config(_)));

    // Configured model missing from the registry.
    let store = ProgressStore::load(dir.path().join("p3.json"));
    let mut runner = runner_with(
        &[("m1", stub)],
        quick_config(&["m1", "ghost-model"]),
        store,
        Arc::new(RecordingReporter::default()),
    );
    let err = runner.run(&questions(&["Q1"])).await.unwrap_err();
    assert!(matches!(err, BatchError::Config(_)));
}
