use std::result::Result as StdResult;

use courier_core::Error as CoreError;
use thiserror::Error;

/// Result type for routing operations.
pub type Result<T> = StdResult<T, RouteError>;

/// Errors surfaced by the routing layer.
///
/// Transport-level failures never appear here; they settle inside a
/// `DispatchOutcome` so that batch items stay isolated.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Core error: IO, serialization, configuration.
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// The catalog failed validation. Fatal at load time; the offending
    /// entry is named. Never retried.
    #[error("Catalog schema error at {entry}: {reason}")]
    Schema {
        /// The entry that failed validation (`services[n]` or the id).
        entry: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A caller named a service the registry does not contain. Never
    /// retried; the intent was explicit, so no fallback is attempted.
    #[error("Unknown service: {0}")]
    UnknownService(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_names_entry() {
        let error = RouteError::Schema {
            entry: "services[2]".to_owned(),
            reason: "duplicate id".to_owned(),
        };
        assert_eq!(
            error.to_string(),
            "Catalog schema error at services[2]: duplicate id"
        );
    }

    #[test]
    fn test_core_error_conversion() {
        let error: RouteError = CoreError::Config("missing".to_owned()).into();
        assert!(matches!(error, RouteError::Core(_)));
    }
}
