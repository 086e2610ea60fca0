//! Remote LLM provider implementations.
//!
//! These providers require API keys and are called over HTTPS. All clients
//! classify failures into the recoverable/terminal taxonomy of
//! `aiqa_core::ProviderError` so the batch engine's retry policy can act on
//! them.
//!
//! # Providers
//!
//! - **OpenRouter** - OpenAI-compatible unified endpoint for many models
//! - **Gemini** - Google Generative Language API

pub mod gemini;
pub mod openrouter;

pub use gemini::GeminiClient;
pub use openrouter::OpenRouterClient;

use aiqa_core::ProviderError;

/// Map a non-2xx HTTP status to a classified provider error.
///
/// Rate limits and 5xx are recoverable; authentication failures, unknown
/// models and other malformed-request statuses are terminal.
pub(crate) fn status_error(status: reqwest::StatusCode, detail: String) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationFailed(detail),
        404 => ProviderError::ModelNotFound(detail),
        429 => ProviderError::RateLimitExceeded(detail),
        400..=499 => ProviderError::InvalidRequest(format!("HTTP {}: {}", status, detail)),
        _ => ProviderError::ServiceUnavailable(format!("HTTP {}: {}", status, detail)),
    }
}

/// Map a transport-level reqwest failure, distinguishing timeouts.
pub(crate) fn transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(err.to_string())
    } else {
        ProviderError::Http(err)
    }
}
