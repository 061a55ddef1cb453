//! Error types for Sheetcast.
//!
//! Library crates use [`SheetcastError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Sheetcast operations.
#[derive(Debug, thiserror::Error)]
pub enum SheetcastError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error talking to the external data source.
    #[error("network error: {0}")]
    Network(String),

    /// Response decoding error (malformed JSON, unexpected shape).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Object store error. Fatal to the owning transaction: an oversized
    /// payload must never fall back to inline delivery.
    #[error("object store error: {0}")]
    Store(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (out-of-range edit, invalid input shape).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SheetcastError>;

impl SheetcastError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the error came from the upstream data source rather than
    /// our own pipeline. The transaction recovers these locally.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Parse { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SheetcastError::config("missing source endpoint");
        assert_eq!(err.to_string(), "config error: missing source endpoint");

        let err = SheetcastError::validation("column 61 out of range");
        assert!(err.to_string().contains("column 61"));
    }

    #[test]
    fn upstream_classification() {
        assert!(SheetcastError::Network("timeout".into()).is_upstream());
        assert!(SheetcastError::parse("bad json").is_upstream());
        assert!(!SheetcastError::Store("put failed".into()).is_upstream());
        assert!(!SheetcastError::config("x").is_upstream());
    }
}
