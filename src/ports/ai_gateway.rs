//! AI Gateway Port - Interface for language-model integrations.
//!
//! This port abstracts all interactions with the text-generation backend,
//! enabling the reflection domain to request completions without coupling
//! to a specific provider.
//!
//! # Design
//!
//! - A single operation: submit a prompt, receive generated text or a failure
//! - Provider-agnostic request/response types
//! - Error taxonomy distinguishing transient from terminal failures
//!
//! Retry/backoff is *not* part of this contract; it is implemented once in a
//! wrapper adapter so the domain stages never see retry mechanics.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for language-model interactions.
///
/// Implementations connect to an external text-generation service (or a test
/// double) and translate between the provider API and our domain types.
#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Generate a single completion for the given request.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, GatewayError>;

    /// Get gateway information (provider name, model).
    fn gateway_info(&self) -> GatewayInfo;
}

/// Request for a text completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// The prompt to complete.
    pub prompt: String,
    /// System prompt to guide model behavior.
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Temperature for response randomness (0.0 = deterministic).
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Creates a new completion request for a prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            max_tokens: None,
            temperature: None,
        }
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Sets the temperature.
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

/// Response from a completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated content, trimmed of surrounding whitespace.
    pub content: String,
    /// Model that generated the response.
    pub model: String,
    /// Why the model stopped generating.
    pub finish_reason: FinishReason,
}

impl CompletionResponse {
    /// Returns true if the model produced no usable text.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop (end of response).
    Stop,
    /// Hit max_tokens limit.
    Length,
    /// Content was filtered for safety.
    ContentFilter,
    /// An error occurred.
    Error,
}

/// Gateway information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayInfo {
    /// Provider name (e.g., "openai", "mock").
    pub name: String,
    /// Model identifier (e.g., "gpt-4o-mini").
    pub model: String,
}

impl GatewayInfo {
    /// Creates new gateway info.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Gateway errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },
}

impl GatewayError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::RateLimited { .. }
                | GatewayError::Unavailable { .. }
                | GatewayError::Network(_)
                | GatewayError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_request_builder_works() {
        let request = CompletionRequest::new("Hello")
            .with_system_prompt("Be helpful")
            .with_max_tokens(100)
            .with_temperature(0.7);

        assert_eq!(request.prompt, "Hello");
        assert_eq!(request.system_prompt, Some("Be helpful".to_string()));
        assert_eq!(request.max_tokens, Some(100));
        assert_eq!(request.temperature, Some(0.7));
    }

    #[test]
    fn completion_response_empty_detection() {
        let response = CompletionResponse {
            content: "   ".to_string(),
            model: "mock".to_string(),
            finish_reason: FinishReason::Stop,
        };
        assert!(response.is_empty());

        let response = CompletionResponse {
            content: "text".to_string(),
            model: "mock".to_string(),
            finish_reason: FinishReason::Stop,
        };
        assert!(!response.is_empty());
    }

    #[test]
    fn gateway_error_retryable_classification() {
        assert!(GatewayError::rate_limited(30).is_retryable());
        assert!(GatewayError::unavailable("down").is_retryable());
        assert!(GatewayError::network("timeout").is_retryable());
        assert!(GatewayError::Timeout { timeout_secs: 15 }.is_retryable());

        assert!(!GatewayError::AuthenticationFailed.is_retryable());
        assert!(!GatewayError::parse("bad json").is_retryable());
        assert!(!GatewayError::InvalidRequest("bad prompt".to_string()).is_retryable());
    }

    #[test]
    fn gateway_error_displays_correctly() {
        let err = GatewayError::rate_limited(30);
        assert_eq!(err.to_string(), "rate limited: retry after 30s");

        let err = GatewayError::Timeout { timeout_secs: 15 };
        assert_eq!(err.to_string(), "request timed out after 15s");
    }

    #[test]
    fn finish_reason_serializes_snake_case() {
        let json = serde_json::to_string(&FinishReason::ContentFilter).unwrap();
        assert_eq!(json, "\"content_filter\"");
    }
}
