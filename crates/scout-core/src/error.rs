//! Error types and result alias shared across scout components.
//!
//! The taxonomy mirrors the response contract: validation errors are
//! caller-recoverable, configuration and workflow-start errors are not.

/// The result type used throughout scout.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while initiating a search.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The inbound payload was malformed or incomplete.
    #[error("{0}")]
    Validation(String),

    /// Mandatory deployment configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The workflow orchestration service rejected or failed the
    /// start-execution call.
    #[error("workflow start failed: {0}")]
    WorkflowStart(String),

    /// An unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a validation error with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a configuration error with the given message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a workflow-start error with the given message.
    pub fn workflow_start(message: impl Into<String>) -> Self {
        Self::WorkflowStart(message.into())
    }

    /// Returns true when the error is caller-recoverable (validation).
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_verbatim() {
        let err = Error::validation("query is required");
        assert_eq!(err.to_string(), "query is required");
        assert!(err.is_validation());
    }

    #[test]
    fn workflow_start_is_not_validation() {
        let err = Error::workflow_start("duplicate execution name");
        assert!(!err.is_validation());
        assert!(err.to_string().contains("duplicate execution name"));
    }
}
