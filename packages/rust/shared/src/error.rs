//! Error types for ldgraph.
//!
//! Library crates use [`LdGraphError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all ldgraph operations.
#[derive(Debug, thiserror::Error)]
pub enum LdGraphError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The tabular input could not be used at all (broken header contract, bad encoding).
    #[error("input error: {message}")]
    Input { message: String },

    /// Parse error for a value inside an otherwise readable input.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Network/HTTP error while talking to a collaborator.
    #[error("network error: {0}")]
    Network(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A single record could not be turned into an entity and was skipped.
    #[error("record {row}: {message}")]
    Record { row: usize, message: String },

    /// JSON serialization of the output document failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LdGraphError>;

impl LdGraphError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an input error from any displayable message.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a per-record error for the given 1-based source row.
    pub fn record(row: usize, msg: impl Into<String>) -> Self {
        Self::Record {
            row,
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
