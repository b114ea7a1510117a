//! Custom error types for bedrock-flows
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for flow management operations
#[derive(Error, Debug)]
pub enum FlowError {
    /// Template is missing one or more required top-level fields
    #[error("Template missing required fields: {}", .0.join(", "))]
    MissingField(Vec<String>),

    /// Substituted template no longer parses as JSON
    #[error("Template substitution produced invalid JSON: {0}")]
    TemplateSubstitution(String),

    /// Input shape cannot be packaged for a multivalued input node
    #[error("Unsupported input type: {0}")]
    UnsupportedInputType(String),

    /// Flow finished with a completion reason the test loop does not handle
    #[error("Unexpected flow status: {0}")]
    UnexpectedStatus(String),

    /// A remote call failed; the source is kept verbatim
    #[error("{operation} failed: {source}")]
    Remote {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A remote call returned an error response without a typed source
    #[error("{operation} failed ({status}): {message}")]
    Service {
        operation: String,
        status: u16,
        message: String,
    },

    /// Template file does not exist
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// Interactive input ended before a value was supplied
    #[error("Input closed before a value was entered")]
    InputClosed,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for flow operations
pub type Result<T> = std::result::Result<T, FlowError>;

impl FlowError {
    /// Wrap a remote call failure
    pub fn remote<E>(operation: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Remote {
            operation: operation.into(),
            source: Box::new(error),
        }
    }

    /// Create a service error from a failed HTTP response
    pub fn service(operation: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Service {
            operation: operation.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a substitution error
    pub fn substitution(msg: impl Into<String>) -> Self {
        Self::TemplateSubstitution(msg.into())
    }

    /// True when the failure came from the remote service rather than local validation
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. } | Self::Service { .. } | Self::Http(_))
    }
}
