//! Error types for Chatdesk
//!
//! This module defines all error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Chatdesk operations
///
/// Covers configuration problems, backend responses outside the 2xx range,
/// transport and decoding failures, and local cache errors.
#[derive(Error, Debug)]
pub enum ChatdeskError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backend answered with a non-2xx status
    #[error("{context} failed with status {status}")]
    Status {
        /// HTTP status code returned by the backend
        status: u16,
        /// What the client was trying to do
        context: String,
    },

    /// A response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Local cache errors (database operations)
    #[error("Cache error: {0}")]
    Cache(String),

    /// Invalid command input in the terminal front end
    #[error("Command error: {0}")]
    Command(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid backend URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ChatdeskError {
    /// Status code carried by a [`ChatdeskError::Status`] error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for Chatdesk operations
///
/// Uses `anyhow::Error` so call sites can attach context while
/// the typed [`ChatdeskError`] stays recoverable via `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = ChatdeskError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_status_error_display_contains_code() {
        let error = ChatdeskError::Status {
            status: 500,
            context: "Send message".to_string(),
        };
        assert_eq!(error.to_string(), "Send message failed with status 500");
        assert_eq!(error.status(), Some(500));
    }

    #[test]
    fn test_status_is_none_for_other_variants() {
        let error = ChatdeskError::Cache("locked".to_string());
        assert_eq!(error.status(), None);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: ChatdeskError = io_error.into();
        assert!(error.to_string().contains("IO error"));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let error: ChatdeskError = json_error.into();
        assert!(error.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_downcast_from_anyhow() {
        let result: Result<()> = Err(ChatdeskError::Status {
            status: 404,
            context: "Load messages".to_string(),
        }
        .into());
        let err = result.unwrap_err();
        let typed = err.downcast_ref::<ChatdeskError>().expect("typed error");
        assert_eq!(typed.status(), Some(404));
    }
}
