//! The core trait for chat-based language models.

use crate::error::Result;
use crate::llm::config::ChatRequest;
use crate::llm::response::ChatResponse;
use async_trait::async_trait;

/// Core trait for chat-based language models.
///
/// Implementations handle the specifics of converting messages, making the
/// API call, and parsing the response for their particular provider. The
/// batch engine only ever sees this trait.
///
/// # Errors
///
/// Implementations return [`crate::ProviderError`] with an accurate
/// recoverable/terminal classification - the retry policy relies on it to
/// decide whether another attempt is worth the rate-limit budget.
///
/// # Threading
///
/// Implementations must be `Send + Sync`; clients are shared as
/// `Arc<dyn ChatModel>`.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a complete chat response from messages.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Clone this model into a boxed trait object.
    fn clone_box(&self) -> Box<dyn ChatModel>;
}

impl Clone for Box<dyn ChatModel> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
