use core::result::Result as CoreResult;
use std::io::Error as IoError;

use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use toml::de::Error as TomlError;

/// Result type for core operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors that can occur in the core library.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] SerdeJsonError),

    /// TOML deserialization failed.
    #[error("TOML deserialization error: {0}")]
    Toml(#[from] TomlError),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A provider call failed at the transport layer.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A provider call exceeded its deadline.
    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// Required auth token could not be resolved.
    #[error("Auth token not found: {0}")]
    MissingAuthToken(String),

    /// A provider returned a body that could not be interpreted.
    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),

    /// A general error not covered by other variants.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Determines whether this error may succeed if retried.
    ///
    /// Returns `true` for transient failures at the provider-call boundary;
    /// these are exactly the failures the dispatcher answers with its
    /// one-shot fallback.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value as JsonValue, from_str};
    use std::io;

    #[test]
    fn test_error_display() {
        let error1 = Error::Config("invalid config".to_owned());
        assert_eq!(error1.to_string(), "Configuration error: invalid config");

        let error2 = Error::Transport("connection refused".to_owned());
        assert_eq!(error2.to_string(), "Transport error: connection refused");

        let error3 = Error::Timeout(5000);
        assert_eq!(error3.to_string(), "Timeout after 5000ms");
    }

    #[test]
    fn test_error_is_retryable() {
        assert!(Error::Transport("reset".to_owned()).is_retryable());
        assert!(Error::Timeout(100).is_retryable());

        assert!(!Error::Config("bad config".to_owned()).is_retryable());
        assert!(!Error::MissingAuthToken("TOKEN".to_owned()).is_retryable());
        assert!(!Error::InvalidResponse("not json".to_owned()).is_retryable());
    }

    #[test]
    fn test_error_from_io() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_error = from_str::<JsonValue>("invalid json").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }
}
