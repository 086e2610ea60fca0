//! Classified error taxonomy for provider interactions.

use thiserror::Error;

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur when calling a language-model provider.
///
/// Each variant carries a fixed recoverable/terminal classification, exposed
/// through [`ProviderError::is_recoverable`]. Recoverable errors may succeed
/// on a later attempt; terminal errors will fail the same way every time and
/// retrying them only wastes rate-limit budget.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (connection refused, DNS, TLS, ...).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Provider returned 429.
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Provider returned a 5xx status.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Authentication rejected (401/403).
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// API key not found in the environment.
    #[error("API key not found: {0}")]
    ApiKeyNotFound(String),

    /// Model identifier not known to the provider.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Request rejected as structurally invalid (4xx other than 401/403/404/429).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Response payload was malformed or missing expected fields.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error discovered at client construction or call time.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    /// Whether a later attempt at the same call can possibly succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ProviderError::Http(err) => {
                // A transport error that never reached the server is worth
                // retrying; a body-decode error is a malformed response.
                !err.is_decode()
            }
            ProviderError::Timeout(_)
            | ProviderError::RateLimitExceeded(_)
            | ProviderError::ServiceUnavailable(_) => true,
            ProviderError::AuthenticationFailed(_)
            | ProviderError::ApiKeyNotFound(_)
            | ProviderError::ModelNotFound(_)
            | ProviderError::InvalidRequest(_)
            | ProviderError::InvalidResponse(_)
            | ProviderError::Config(_) => false,
        }
    }

    /// Whether this error ends retry attempts immediately.
    pub fn is_terminal(&self) -> bool {
        !self.is_recoverable()
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::InvalidResponse(err.to_string())
    }
}
