//! Error types and handling for doctree-core operations.
//!
//! Errors are categorized for easier handling: validation failures are
//! rejected before anything is persisted, not-found failures surface directly
//! to the caller, conflicts signal an in-flight build for the same document,
//! and storage failures propagate unmodified so the caller owns retry policy.

use thiserror::Error;

/// The main error type for doctree-core operations.
///
/// All public functions in doctree-core return `Result<T, Error>`. Every
/// failure carries enough context (document id, node id, or the offending
/// element index) to diagnose without inspecting internal state.
#[derive(Error, Debug)]
pub enum Error {
    /// A content element in the input sequence is malformed.
    ///
    /// Raised before any persistence; nothing partial is ever written.
    /// The index points at the offending element in the input sequence.
    #[error("Invalid element at index {index}: {message}")]
    Validation {
        /// Position of the offending element in the input sequence.
        index: usize,
        /// What was wrong with it.
        message: String,
    },

    /// A document or node with no stored structure was queried.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A build is already in progress for this document.
    ///
    /// The caller must retry after the in-flight build completes; the core
    /// never lets two builds for the same document race each other's save.
    #[error("Build already in progress for document '{0}'")]
    Conflict(String),

    /// The node store failed during a save, load, or delete.
    ///
    /// Propagated unmodified. The core performs no silent retries, but an
    /// incomplete save rolls back fully rather than being patched.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Source markup could not be tokenized into content elements.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization or deserialization of persisted structure failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Check if the error might be recoverable through retry logic.
    ///
    /// A conflict clears once the in-flight build finishes, and interrupted
    /// I/O may succeed on retry. Validation, not-found, and serialization
    /// failures are permanent.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Conflict(_) => true,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Get the error category as a static string identifier.
    ///
    /// Useful for grouping errors in logs or metrics.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Storage(_) => "storage",
            Self::Parse(_) => "parse",
            Self::Config(_) => "config",
            Self::Serialization(_) => "serialization",
            Self::Io(_) => "io",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display_formatting() {
        let err = Error::Validation {
            index: 3,
            message: "heading level 9 outside 1-6".into(),
        };
        let text = err.to_string();
        assert!(text.contains("index 3"));
        assert!(text.contains("heading level 9"));

        let err = Error::NotFound("document 'report'".into());
        assert!(err.to_string().contains("Not found"));

        let err = Error::Conflict("report".into());
        assert!(err.to_string().contains("already in progress"));
        assert!(err.to_string().contains("report"));
    }

    #[test]
    fn test_error_categories() {
        let cases = vec![
            (
                Error::Validation {
                    index: 0,
                    message: "bad".into(),
                },
                "validation",
            ),
            (Error::NotFound("x".into()), "not_found"),
            (Error::Conflict("x".into()), "conflict"),
            (Error::Storage("x".into()), "storage"),
            (Error::Parse("x".into()), "parse"),
            (Error::Config("x".into()), "config"),
            (Error::Serialization("x".into()), "serialization"),
            (Error::Io(io::Error::other("x")), "io"),
        ];

        for (error, expected) in cases {
            assert_eq!(error.category(), expected);
        }
    }

    #[test]
    fn test_error_recoverability() {
        assert!(Error::Conflict("doc".into()).is_recoverable());
        assert!(Error::Io(io::Error::new(io::ErrorKind::TimedOut, "t")).is_recoverable());
        assert!(!Error::Validation {
            index: 0,
            message: "bad".into()
        }
        .is_recoverable());
        assert!(!Error::NotFound("doc".into()).is_recoverable());
        assert!(!Error::Storage("disk full".into()).is_recoverable());
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert_eq!(err.category(), "serialization");
    }
}
