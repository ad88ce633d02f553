//! # AI Error Types Module
//!
//! This module defines the error type returned by every AI backend.
//! It separates failures worth retrying (network, timeouts, rate limits,
//! server errors) from those that are not (missing key, bad input, a reply
//! that cannot be parsed).

/// Custom error types for AI service operations
#[derive(Debug, Clone, PartialEq)]
pub enum AiError {
    /// No API key configured for the selected provider
    MissingApiKey(String),
    /// Transport-level failure (connection refused, DNS, TLS...)
    Request(String),
    /// The service answered with a non-success status
    Api { status: u16, message: String },
    /// The request could not be built from the caller's input
    InvalidInput(String),
    /// The service answered but the payload was unusable
    InvalidResponse(String),
    /// The call did not finish within the operation timeout
    Timeout(String),
    /// The circuit breaker is open and the call was not attempted
    CircuitOpen,
}

impl AiError {
    /// Whether a retry has a chance of succeeding
    pub fn is_retryable(&self) -> bool {
        match self {
            AiError::Request(_) | AiError::Timeout(_) => true,
            AiError::Api { status, .. } => *status == 429 || *status >= 500,
            AiError::MissingApiKey(_)
            | AiError::InvalidInput(_)
            | AiError::InvalidResponse(_)
            | AiError::CircuitOpen => false,
        }
    }
}

impl std::fmt::Display for AiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiError::MissingApiKey(provider) => write!(f, "API key missing for {provider}"),
            AiError::Request(msg) => write!(f, "Request error: {msg}"),
            AiError::Api { status, message } => write!(f, "API error ({status}): {message}"),
            AiError::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            AiError::InvalidResponse(msg) => write!(f, "Invalid response: {msg}"),
            AiError::Timeout(msg) => write!(f, "Timeout error: {msg}"),
            AiError::CircuitOpen => write!(f, "AI service temporarily unavailable, try again later"),
        }
    }
}

impl std::error::Error for AiError {}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AiError::Timeout(err.to_string())
        } else {
            AiError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AiError {
    fn from(err: serde_json::Error) -> Self {
        AiError::InvalidResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(AiError::Request("reset".to_string()).is_retryable());
        assert!(AiError::Timeout("30s".to_string()).is_retryable());
        assert!(AiError::Api { status: 503, message: String::new() }.is_retryable());
        assert!(AiError::Api { status: 429, message: String::new() }.is_retryable());

        assert!(!AiError::Api { status: 400, message: String::new() }.is_retryable());
        assert!(!AiError::MissingApiKey("gemini".to_string()).is_retryable());
        assert!(!AiError::InvalidResponse("not json".to_string()).is_retryable());
        assert!(!AiError::InvalidInput("bad mime".to_string()).is_retryable());
        assert!(!AiError::CircuitOpen.is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            AiError::MissingApiKey("gemini".to_string()).to_string(),
            "API key missing for gemini"
        );
        assert_eq!(
            AiError::Api { status: 401, message: "bad key".to_string() }.to_string(),
            "API error (401): bad key"
        );
    }
}
