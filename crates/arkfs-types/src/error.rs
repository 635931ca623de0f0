use thiserror::Error;

/// Errors from constructing or parsing foundation types.
#[derive(Debug, Error)]
pub enum TypeError {
    /// The logical path is malformed.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// An identifier string could not be parsed as a UUID.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A byte slice had the wrong length for an identifier.
    #[error("invalid identifier length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
