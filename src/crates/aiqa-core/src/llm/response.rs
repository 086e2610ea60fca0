//! Response types for chat models.

use crate::Message;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Token usage statistics reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetadata {
    /// Tokens consumed by the prompt.
    pub input_tokens: usize,
    /// Tokens generated in the response.
    pub output_tokens: usize,
    /// Total tokens for the call.
    pub total_tokens: usize,
}

impl UsageMetadata {
    /// Create usage metadata from input/output counts.
    pub fn new(input_tokens: usize, output_tokens: usize) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        }
    }
}

/// A complete response from a chat model.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// The assistant's reply.
    pub message: Message,

    /// Token usage, when the provider reports it.
    pub usage: Option<UsageMetadata>,

    /// Provider-specific metadata (model id, finish reason, ...).
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ChatResponse {
    /// The text content of the assistant's reply.
    pub fn text(&self) -> &str {
        self.message.text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_totals() {
        let usage = UsageMetadata::new(120, 40);
        assert_eq!(usage.total_tokens, 160);
    }

    #[test]
    fn test_response_text() {
        let response = ChatResponse {
            message: Message::ai("The answer is 42."),
            usage: None,
            metadata: HashMap::new(),
        };
        assert_eq!(response.text(), "The answer is 42.");
    }
}
