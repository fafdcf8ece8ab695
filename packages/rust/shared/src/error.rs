//! Error types for LitContext.
//!
//! Library crates use [`LitContextError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all LitContext operations.
#[derive(Debug, thiserror::Error)]
pub enum LitContextError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while talking to a bibliographic source.
    #[error("network error: {0}")]
    Network(String),

    /// Remote payload could not be decoded into records.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A source adapter failed for a reason other than transport or decoding.
    #[error("source error ({source_id}): {message}")]
    Source { source_id: String, message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (malformed record, bad setting, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LitContextError>;

impl LitContextError {
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

    /// Create a source error tagged with the adapter that raised it.
    pub fn adapter(source_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Source {
            source_id: source_id.into(),
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = LitContextError::config("unknown source 'scopus'");
        assert_eq!(err.to_string(), "config error: unknown source 'scopus'");

        let err = LitContextError::adapter("arxiv", "HTTP 503");
        assert_eq!(err.to_string(), "source error (arxiv): HTTP 503");

        let err = LitContextError::validation("record has no title");
        assert!(err.to_string().contains("no title"));
    }
}
