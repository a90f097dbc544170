//! Error types for WattBuddy
//!
//! Every failure the assistant can hit is one of these variants. Pipeline
//! stages return them and the orchestrator turns them into a single
//! terminal UI update, so none of them is fatal to the process.

use thiserror::Error;

/// Main error type for the energy assistant
#[derive(Error, Debug)]
pub enum AssistantError {
    /// Submitted query was blank after trimming
    #[error("Query is empty")]
    EmptyQuery,

    /// LLM service answered with a non-success status
    #[error("LLM service returned HTTP {status}: {body}")]
    ServiceError { status: u16, body: String },

    /// LLM response did not have the expected chat-completions shape
    #[error("Malformed LLM response: {0}")]
    MalformedResponse(String),

    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Pipeline state machine errors
    #[error("Invalid state transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Knowledge base construction errors
    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic errors with context
    #[error("Assistant error: {0}")]
    Generic(String),
}

impl AssistantError {
    /// Whether the error came from talking to the LLM service
    pub fn is_service_failure(&self) -> bool {
        matches!(
            self,
            AssistantError::ServiceError { .. }
                | AssistantError::MalformedResponse(_)
                | AssistantError::HttpError(_)
        )
    }
}

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

/// Convert anyhow errors to AssistantError
impl From<anyhow::Error> for AssistantError {
    fn from(err: anyhow::Error) -> Self {
        AssistantError::Generic(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_display() {
        let err = AssistantError::ServiceError {
            status: 503,
            body: "upstream unavailable".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("upstream unavailable"));
        assert!(err.is_service_failure());
    }

    #[test]
    fn test_invalid_transition_error() {
        let err = AssistantError::InvalidTransition {
            from: "Completed".to_string(),
            to: "Retrieving".to_string(),
            reason: "Run already finished".to_string(),
        };
        assert!(err.to_string().contains("Completed"));
        assert!(err.to_string().contains("Retrieving"));
        assert!(!err.is_service_failure());
    }

    #[test]
    fn test_empty_query_is_not_service_failure() {
        assert!(!AssistantError::EmptyQuery.is_service_failure());
        assert_eq!(AssistantError::EmptyQuery.to_string(), "Query is empty");
    }

    #[test]
    fn test_from_anyhow() {
        let err: AssistantError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, AssistantError::Generic(ref m) if m == "boom"));
    }
}
