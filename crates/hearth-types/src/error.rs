//! Shared error types for the Hearth system.

use thiserror::Error;

/// Top-level error type for the Hearth system.
#[derive(Error, Debug)]
pub enum HearthError {
    /// A memory store error occurred.
    #[error("Memory error: {0}")]
    Memory(String),

    /// An LLM driver error occurred.
    #[error("LLM driver error: {0}")]
    LlmDriver(String),

    /// The backend rejected our credentials.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// The agent loop exceeded the maximum number of tool rounds for one turn.
    #[error("Max tool rounds exceeded: {0}")]
    MaxIterationsExceeded(u32),

    /// Invalid user input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Alias for Result with HearthError.
pub type HearthResult<T> = Result<T, HearthError>;

/// Failure reported by a tool collaborator (calendar, mail, contacts, ...).
///
/// The dispatcher never lets these escape: each one is rendered as
/// `"Error: <display>"` and handed back to the model as the tool result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    /// The collaborator lacks the permission it needs.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// An entity id could not be resolved.
    #[error("{0} not found")]
    NotFound(String),

    /// A tool parameter was missing or malformed.
    #[error("{0}")]
    InvalidInput(String),

    /// The upstream service returned a failure.
    #[error("API error {code}: {message}")]
    Api {
        /// Upstream status or error code.
        code: u16,
        /// Upstream message.
        message: String,
    },

    /// The upstream service could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// The upstream response had an unexpected shape.
    #[error("Could not parse response: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_display() {
        assert_eq!(
            ToolError::NotFound("Event abc".to_string()).to_string(),
            "Event abc not found"
        );
        assert_eq!(
            ToolError::Api {
                code: 503,
                message: "unavailable".to_string()
            }
            .to_string(),
            "API error 503: unavailable"
        );
        assert_eq!(
            ToolError::AccessDenied("calendar".to_string()).to_string(),
            "Access denied: calendar"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: HearthError = io.into();
        assert!(err.to_string().starts_with("IO error"));
    }
}
