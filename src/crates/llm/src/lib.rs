//! LLM provider clients for aiqa-monitor.
//!
//! This crate provides concrete implementations of the `ChatModel` trait
//! from `aiqa-core` for the providers the monitor talks to.
//!
//! # Providers
//!
//! - **OpenRouter** - unified API routing to many models (DeepSeek, Claude,
//!   GPT, Llama, Mistral, Perplexity, Grok, ...) through one
//!   OpenAI-compatible endpoint
//! - **Gemini** - Google's Generative Language API, called directly
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::remote::OpenRouterClient;
//! use llm::config::RemoteLlmConfig;
//! use aiqa_core::{ChatModel, ChatRequest, Message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RemoteLlmConfig::from_env(
//!         "OPENROUTER_API_KEY",
//!         "https://openrouter.ai/api/v1",
//!         "deepseek/deepseek-chat",
//!     )?;
//!     let client = OpenRouterClient::new(config);
//!
//!     let request = ChatRequest::new(vec![Message::human("What is Rust?")]);
//!     let response = client.chat(request).await?;
//!     println!("Response: {}", response.text());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Building a panel of clients
//!
//! The monitor drives a fixed panel of models. [`ClientRegistry`] builds one
//! client per configured [`ModelTarget`] up front, so backend selection
//! happens once at construction rather than by name-string dispatch at every
//! call site:
//!
//! ```rust,ignore
//! use llm::registry::{ClientRegistry, ModelTarget};
//!
//! let targets = vec![
//!     ModelTarget::openrouter("deepseek-chat", "deepseek/deepseek-chat", key.clone()),
//!     ModelTarget::gemini("gemini-flash", "gemini-1.5-flash", gemini_key),
//! ];
//! let registry = ClientRegistry::from_targets(&targets)?;
//! let client = registry.client_for("deepseek-chat").unwrap();
//! ```

pub mod config;
pub mod registry;
pub mod remote;

// Re-export commonly used types
pub use config::RemoteLlmConfig;
pub use registry::{ClientRegistry, ModelTarget, ProviderKind};

// Re-export core types for convenience
pub use aiqa_core::{
    ChatConfig, ChatModel, ChatRequest, ChatResponse, Message, MessageRole, ProviderError,
    UsageMetadata,
};
