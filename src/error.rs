//! Central error types for shipscan.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic
//! `Display` and `From` implementations.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Main error type for the library.
///
/// Resolution misses and unrenderable expressions are not errors: the
/// resolvers fall back to placeholder text instead. Only parser setup,
/// whole-file parse failure, and I/O surface here.
#[derive(Error, Debug)]
pub enum ScanError {
    /// IO operation failed (without path context - prefer IoWithPath when path is available)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// IO operation failed with path context for better error messages
    #[error("IO error at {path}: {error}")]
    IoWithPath {
        error: std::io::Error,
        path: PathBuf,
    },

    /// Failed to parse source file
    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },

    /// Tree-sitter grammar/version error
    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Convenience type alias for Results using ScanError.
pub type Result<T> = std::result::Result<T, ScanError>;

impl ScanError {
    /// Create an IO error with path context.
    ///
    /// Use this when reading files so the message names the file that failed.
    #[inline]
    pub fn io_with_path(error: std::io::Error, path: impl AsRef<Path>) -> Self {
        ScanError::IoWithPath {
            error,
            path: path.as_ref().to_path_buf(),
        }
    }
}
