//! Fixed delays between requests to stay under provider rate limits.
//!
//! Pacing is the simplest correct mechanism given the deliberately
//! sequential execution model. The runner never paces before the first item
//! of a loop or after the last one.

use crate::BatchConfig;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Inserts fixed delays between questions and between models.
#[derive(Debug, Clone)]
pub struct Pacer {
    /// Delay between consecutive questions of one model.
    pub between_questions: Duration,

    /// Delay between consecutive models.
    pub between_models: Duration,
}

impl Pacer {
    /// Create a pacer with explicit delays.
    pub fn new(between_questions: Duration, between_models: Duration) -> Self {
        Self {
            between_questions,
            between_models,
        }
    }

    /// Create a pacer from batch configuration.
    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(config.pause_between_questions, config.pause_between_models)
    }

    /// Pause before the next question.
    pub async fn pause_between_questions(&self) {
        debug!(delay_ms = self.between_questions.as_millis() as u64, "Pausing between questions");
        sleep(self.between_questions).await;
    }

    /// Pause before the next model.
    pub async fn pause_between_models(&self) {
        debug!(delay_ms = self.between_models.as_millis() as u64, "Pausing between models");
        sleep(self.between_models).await;
    }
}
