//! Batch run configuration.
//!
//! One immutable value constructed at startup and passed by reference into
//! the runner, retry policy and pacer. No component reads ambient global
//! state.

use crate::{BatchError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// System prompt sent with every question.
    pub system_prompt: String,

    /// Model panel, in execution order.
    pub target_models: Vec<String>,

    /// Total provider-call attempts per task before it is recorded failed.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between attempts.
    #[serde(default = "default_retry_delay")]
    pub retry_delay: Duration,

    /// Delay between consecutive questions of one model.
    #[serde(default = "default_pause_between_questions")]
    pub pause_between_questions: Duration,

    /// Delay between consecutive models.
    #[serde(default = "default_pause_between_models")]
    pub pause_between_models: Duration,

    /// Flush the in-flight model's results to the report writer every this
    /// many questions.
    #[serde(default = "default_autosave_interval")]
    pub autosave_interval: usize,

    /// Whether tasks that failed in an earlier run are re-attempted on
    /// resume. With `false`, a stored failure is surfaced as an error-marked
    /// result without a network call.
    #[serde(default = "default_retry_failed_on_resume")]
    pub retry_failed_on_resume: bool,
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_pause_between_questions() -> Duration {
    Duration::from_secs(2)
}

fn default_pause_between_models() -> Duration {
    Duration::from_secs(1)
}

fn default_autosave_interval() -> usize {
    5
}

fn default_retry_failed_on_resume() -> bool {
    true
}

impl BatchConfig {
    /// Create a configuration with the given system prompt and defaults for
    /// everything else.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            target_models: Vec::new(),
            max_retries: default_max_retries(),
            retry_delay: default_retry_delay(),
            pause_between_questions: default_pause_between_questions(),
            pause_between_models: default_pause_between_models(),
            autosave_interval: default_autosave_interval(),
            retry_failed_on_resume: default_retry_failed_on_resume(),
        }
    }

    /// Set the model panel.
    pub fn with_target_models(mut self, models: Vec<String>) -> Self {
        self.target_models = models;
        self
    }

    /// Set the attempt budget per task.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the inter-attempt delay.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the inter-question delay.
    pub fn with_pause_between_questions(mut self, pause: Duration) -> Self {
        self.pause_between_questions = pause;
        self
    }

    /// Set the inter-model delay.
    pub fn with_pause_between_models(mut self, pause: Duration) -> Self {
        self.pause_between_models = pause;
        self
    }

    /// Set the autosave interval.
    pub fn with_autosave_interval(mut self, interval: usize) -> Self {
        self.autosave_interval = interval;
        self
    }

    /// Set whether previously failed tasks are re-attempted on resume.
    pub fn with_retry_failed_on_resume(mut self, retry: bool) -> Self {
        self.retry_failed_on_resume = retry;
        self
    }

    /// Validate numeric sanity.
    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(BatchError::Config(
                "max_retries must be at least 1".to_string(),
            ));
        }

        if self.autosave_interval == 0 {
            return Err(BatchError::Config(
                "autosave_interval must be at least 1".to_string(),
            ));
        }

        if self.target_models.iter().any(|m| m.is_empty()) {
            return Err(BatchError::Config(
                "target model names must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
