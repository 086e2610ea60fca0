//! Client registry: one constructed client per configured model.
//!
//! The monitor's model panel is fixed per run. Each entry names a backend
//! and the provider-side model identifier; the registry builds the matching
//! client once at startup so the batch engine never dispatches on name
//! strings at call time.

use crate::config::RemoteLlmConfig;
use crate::remote::{GeminiClient, OpenRouterClient};
use aiqa_core::{ChatModel, ProviderError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Default OpenRouter endpoint.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default Gemini endpoint.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Which backend serves a model target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenRouter's unified OpenAI-compatible endpoint.
    OpenRouter,
    /// Google's Generative Language API.
    Gemini,
}

/// One entry of the model panel: a display name plus how to reach the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelTarget {
    /// Name the engine and reports use for this model.
    pub name: String,

    /// Backend that serves it.
    pub provider: ProviderKind,

    /// Model identifier as the provider knows it
    /// (e.g. "deepseek/deepseek-chat", "gemini-1.5-flash").
    pub model_id: String,

    /// API key for the backend.
    pub api_key: String,

    /// Endpoint override; the backend's default when `None`.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout override.
    #[serde(default)]
    pub timeout: Option<Duration>,
}

impl ModelTarget {
    /// A target served through OpenRouter.
    pub fn openrouter(
        name: impl Into<String>,
        model_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            provider: ProviderKind::OpenRouter,
            model_id: model_id.into(),
            api_key: api_key.into(),
            base_url: None,
            timeout: None,
        }
    }

    /// A target served by the Gemini API directly.
    pub fn gemini(
        name: impl Into<String>,
        model_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            provider: ProviderKind::Gemini,
            model_id: model_id.into(),
            api_key: api_key.into(),
            base_url: None,
            timeout: None,
        }
    }

    /// Override the endpoint base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn remote_config(&self) -> RemoteLlmConfig {
        let default_base = match self.provider {
            ProviderKind::OpenRouter => OPENROUTER_BASE_URL,
            ProviderKind::Gemini => GEMINI_BASE_URL,
        };
        let base_url = self.base_url.as_deref().unwrap_or(default_base);

        let mut config = RemoteLlmConfig::new(&self.api_key, base_url, &self.model_id);
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        config
    }
}

/// Holds one ready-to-use client per model name.
#[derive(Clone, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, Arc<dyn ChatModel>>,
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRegistry")
            .field("clients", &self.clients.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ClientRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configured targets, constructing one client per
    /// entry. Duplicate names and empty API keys are configuration errors.
    pub fn from_targets(targets: &[ModelTarget]) -> Result<Self, ProviderError> {
        let mut registry = Self::new();

        for target in targets {
            if target.api_key.is_empty() {
                return Err(ProviderError::Config(format!(
                    "empty API key for model '{}'",
                    target.name
                )));
            }
            if registry.clients.contains_key(&target.name) {
                return Err(ProviderError::Config(format!(
                    "duplicate model name '{}'",
                    target.name
                )));
            }

            let client: Arc<dyn ChatModel> = match target.provider {
                ProviderKind::OpenRouter => Arc::new(
                    OpenRouterClient::new(target.remote_config()).with_app_name("aiqa-monitor"),
                ),
                ProviderKind::Gemini => Arc::new(GeminiClient::new(target.remote_config())),
            };
            registry.clients.insert(target.name.clone(), client);
        }

        Ok(registry)
    }

    /// Register a client under a model name. Used by tests to install stubs
    /// and by callers with hand-built clients.
    pub fn insert(&mut self, name: impl Into<String>, client: Arc<dyn ChatModel>) {
        self.clients.insert(name.into(), client);
    }

    /// Look up the client for a model name.
    pub fn client_for(&self, name: &str) -> Option<Arc<dyn ChatModel>> {
        self.clients.get(name).cloned()
    }

    /// Whether a model name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.clients.contains_key(name)
    }

    /// Number of registered clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
