//! Typed error types for gomment-core.

use thiserror::Error;

use crate::model::CommentId;

/// Result type alias for engine operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in the store and service layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced parent comment does not exist in the target thread.
    #[error("Parent comment {parent_id} not found in thread '{thread_path}'")]
    ParentNotFound {
        parent_id: CommentId,
        thread_path: String,
    },

    /// A caller-supplied argument violates an operation precondition.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The underlying SQLite engine failed while executing a step.
    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// A filesystem operation around the database file failed.
    #[error("{context} {path}: {source}")]
    Io {
        context: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A schema migration failed. The store must not be used.
    #[error("Migration from schema version {from_version} failed: {reason}")]
    Migration { from_version: u32, reason: String },

    /// The engine configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The configuration file could not be read or parsed.
    #[error("Failed to load configuration from {path}: {reason}")]
    ConfigLoad { path: String, reason: String },
}

impl CoreError {
    /// True for errors a caller should surface as "not found".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ParentNotFound { .. })
    }

    /// True for errors caused by bad caller input.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

/// Reject a negative request parameter.
pub(crate) fn non_negative(name: &str, value: i64) -> CoreResult<i64> {
    if value < 0 {
        return Err(CoreError::InvalidArgument(format!(
            "{name} must be >= 0, was {value}"
        )));
    }
    Ok(value)
}

/// Attach a description of the failing step to a raw SQLite result.
pub trait StorageContext<T> {
    fn storage(self, context: &'static str) -> CoreResult<T>;
}

impl<T> StorageContext<T> for Result<T, rusqlite::Error> {
    fn storage(self, context: &'static str) -> CoreResult<T> {
        self.map_err(|source| CoreError::Storage { context, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_context_wraps_sqlite_error() {
        let raw: Result<(), rusqlite::Error> = Err(rusqlite::Error::QueryReturnedNoRows);
        let err = raw.storage("failed to load thread").unwrap_err();

        assert!(matches!(err, CoreError::Storage { context, .. } if context == "failed to load thread"));
        assert!(err.to_string().starts_with("failed to load thread: "));
    }

    #[test]
    fn test_error_kind_predicates() {
        let not_found = CoreError::ParentNotFound {
            parent_id: 7,
            thread_path: "/blog".to_string(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_invalid_argument());
        assert_eq!(
            not_found.to_string(),
            "Parent comment 7 not found in thread '/blog'"
        );

        let invalid = CoreError::InvalidArgument("limit must be >= 0".to_string());
        assert!(invalid.is_invalid_argument());
        assert!(!invalid.is_not_found());
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative("limit", 0).unwrap(), 0);
        let err = non_negative("limit", -3).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(err.to_string(), "Invalid argument: limit must be >= 0, was -3");
    }
}
