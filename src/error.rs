//! # Orchestration Error Types
//!
//! Structured error handling for remote task orchestration using thiserror.
//! Remote failures carry the already-translated, user-facing message; transport
//! failures carry enough context for the host scheduler to decide on a retry.

use thiserror::Error;

/// Errors raised while initiating, polling, or cancelling remote tasks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestrationError {
    /// A tracked task or task group reported an error payload
    #[error("{message}")]
    RemoteOperation { href: String, message: String },

    /// The remote backend could not be reached or answered garbage
    #[error("Transport error during {operation} for {href}: {message}")]
    Transport {
        operation: String,
        href: String,
        message: String,
    },

    /// The caller-supplied operation failed before producing any task
    #[error("Operation invocation failed: {operation}: {message}")]
    Invocation { operation: String, message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid unit transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },
}

impl OrchestrationError {
    /// Create a remote operation error
    pub fn remote_operation(href: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteOperation {
            href: href.into(),
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(
        operation: impl Into<String>,
        href: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Transport {
            operation: operation.into(),
            href: href.into(),
            message: message.into(),
        }
    }

    /// Create an invocation error
    pub fn invocation(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invocation {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid transition error
    pub fn invalid_transition(from: impl Into<String>, event: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            event: event.into(),
        }
    }

    /// Whether the error came from a remote task's own error payload
    pub fn is_remote_operation(&self) -> bool {
        matches!(self, Self::RemoteOperation { .. })
    }

    /// Whether a later poll may succeed where this one failed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

impl From<serde_json::Error> for OrchestrationError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<config::ConfigError> for OrchestrationError {
    fn from(err: config::ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}

pub type OrchestrationResult<T> = std::result::Result<T, OrchestrationError>;
