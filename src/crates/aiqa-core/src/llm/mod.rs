//! LLM integration trait and request/response types.
//!
//! This module provides the [`ChatModel`] trait that provider clients
//! implement, plus the envelope types for requests and responses. The crate
//! contains no concrete provider implementations - those live in the `llm`
//! crate, one per backend.

pub mod config;
pub mod response;
pub mod traits;

pub use config::{ChatConfig, ChatRequest};
pub use response::{ChatResponse, UsageMetadata};
pub use traits::ChatModel;
