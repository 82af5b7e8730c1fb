//! Error types for reference operations.

use thiserror::Error;

/// Errors that can occur during reference operations.
#[derive(Debug, Error)]
pub enum RefError {
    /// The branch name is invalid.
    #[error("invalid branch name: {name}: {reason}")]
    InvalidBranchName { name: String, reason: String },

    /// `HEAD` exists but is neither a symbolic branch ref nor an object id.
    #[error("malformed HEAD: {0:?}")]
    MalformedHead(String),

    /// A branch file does not hold a single object id.
    #[error("malformed ref {name}: {reason}")]
    MalformedRef { name: String, reason: String },

    /// I/O error during file-based ref operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for ref operations.
pub type Result<T> = std::result::Result<T, RefError>;
