//! Core chat abstractions for aiqa-monitor.
//!
//! This crate defines the provider-agnostic pieces shared by the provider
//! clients (`llm`) and the batch execution engine (`batch`):
//!
//! - [`Message`] / [`MessageRole`] - role-tagged plain-text chat messages
//! - [`ChatModel`] - the trait every provider client implements
//! - [`ChatRequest`] / [`ChatResponse`] - request/response envelope types
//! - [`ProviderError`] - the classified error taxonomy
//!
//! # Error classification
//!
//! Every provider failure is classified as *recoverable* (timeouts, rate
//! limits, 5xx) or *terminal* (authentication, malformed requests, malformed
//! responses). The classification is carried by [`ProviderError`] across the
//! [`ChatModel`] boundary so the retry policy in the `batch` crate can decide
//! whether another attempt can possibly succeed.
//!
//! # Example
//!
//! ```rust,ignore
//! use aiqa_core::{ChatModel, ChatRequest, Message};
//!
//! let request = ChatRequest::new(vec![
//!     Message::system("You are a helpful assistant."),
//!     Message::human("What is Rust?"),
//! ])
//! .with_temperature(0.7)
//! .with_max_tokens(1024);
//!
//! let response = client.chat(request).await?;
//! println!("{}", response.text());
//! ```

pub mod error;
pub mod llm;
pub mod messages;

pub use error::{ProviderError, Result};
pub use llm::{ChatConfig, ChatModel, ChatRequest, ChatResponse, UsageMetadata};
pub use messages::{Message, MessageRole};
