//! Google Gemini client implementation.
//!
//! Calls the Generative Language API directly (`models/{model}:generateContent`
//! with the API key as a query parameter). The monitor uses it for the Gemini
//! entries of its model panel that are not routed through OpenRouter.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::remote::GeminiClient;
//! use llm::config::RemoteLlmConfig;
//! use aiqa_core::{ChatModel, ChatRequest, Message};
//!
//! let config = RemoteLlmConfig::from_env(
//!     "GEMINI_API_KEY",
//!     "https://generativelanguage.googleapis.com/v1beta",
//!     "gemini-1.5-pro-latest",
//! )?;
//! let client = GeminiClient::new(config);
//!
//! let request = ChatRequest::new(vec![Message::human("Hello!")]);
//! let response = client.chat(request).await?;
//! ```

use crate::config::RemoteLlmConfig;
use crate::remote::{status_error, transport_error};
use aiqa_core::error::Result;
use aiqa_core::{
    ChatModel, ChatRequest, ChatResponse, Message, MessageRole, ProviderError, UsageMetadata,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Google Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    config: RemoteLlmConfig,
    client: Client,
}

impl GeminiClient {
    /// Create a new Gemini client with the given configuration.
    pub fn new(config: RemoteLlmConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Convert core messages to Gemini contents.
    ///
    /// Gemini has no system role in `contents`; system messages are folded
    /// into `user` turns, and assistant turns map to the `model` role.
    fn convert_messages(&self, messages: &[Message]) -> Vec<GeminiMessage> {
        messages
            .iter()
            .map(|msg| GeminiMessage {
                role: match msg.role {
                    MessageRole::System | MessageRole::Human => "user".to_string(),
                    MessageRole::Assistant => "model".to_string(),
                },
                parts: vec![GeminiPart {
                    text: msg.content.clone(),
                }],
            })
            .collect()
    }

    /// Convert a Gemini response to a ChatResponse.
    ///
    /// A response without candidates (e.g. fully safety-filtered) is
    /// malformed from the monitor's point of view and therefore terminal.
    fn convert_response(&self, gemini_resp: GeminiResponse) -> Result<ChatResponse> {
        let candidate = gemini_resp.candidates.first().ok_or_else(|| {
            ProviderError::InvalidResponse("response contained no candidates".to_string())
        })?;

        let content_text = candidate
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("");

        let message = Message::ai(content_text.trim());

        let usage = gemini_resp
            .usage_metadata
            .as_ref()
            .map(|u| UsageMetadata::new(u.prompt_token_count, u.candidates_token_count));

        let mut metadata = HashMap::new();
        metadata.insert(
            "model".to_string(),
            serde_json::Value::String(self.config.model.clone()),
        );
        metadata.insert(
            "finish_reason".to_string(),
            serde_json::Value::String(candidate.finish_reason.clone().unwrap_or_default()),
        );

        Ok(ChatResponse {
            message,
            usage,
            metadata,
        })
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        let req_body = GeminiRequest {
            contents: self.convert_messages(&request.messages),
            generation_config: Some(GeminiGenerationConfig {
                temperature: request.config.temperature,
                max_output_tokens: request.config.max_tokens,
            }),
        };

        debug!(model = %self.config.model, "Sending Gemini generateContent request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&req_body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_error(status, error_text));
        }

        let gemini_resp: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        self.convert_response(gemini_resp)
    }

    fn clone_box(&self) -> Box<dyn ChatModel> {
        Box::new(self.clone())
    }
}

// Gemini API types
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiMessage>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiMessage {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiUsageMetadata {
    #[serde(rename = "promptTokenCount")]
    prompt_token_count: usize,
    #[serde(rename = "candidatesTokenCount")]
    candidates_token_count: usize,
}
