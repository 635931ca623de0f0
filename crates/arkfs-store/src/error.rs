use thiserror::Error;

/// Errors from namespace store operations.
///
/// Every multi-step operation runs inside one store transaction; on any
/// of these errors the transaction has been rolled back and the tree is
/// exactly as it was before the call.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A path segment does not exist.
    #[error("{path}: no such entry")]
    NotFound { path: String },

    /// The entry is a file where a directory was required.
    #[error("{path}: not a directory")]
    NotADirectory { path: String },

    /// The entry is a directory where a file was required.
    #[error("{path}: not a file")]
    NotAFile { path: String },

    /// An entry already occupies the path.
    #[error("{path}: already exists")]
    AlreadyExists { path: String },

    /// Directory removal was requested but children remain.
    #[error("{path}: directory not empty")]
    DirectoryNotEmpty { path: String },

    /// The operation lost a concurrent-creation race or would produce an
    /// inconsistent tree (e.g. moving a directory into its own subtree).
    #[error("{path}: conflict: {reason}")]
    Conflict { path: String, reason: String },

    /// A stored entry could not be decoded.
    #[error("{path}: corrupt entry: {reason}")]
    Corrupt { path: String, reason: String },

    /// The underlying store engine failed (transaction error, disk full,
    /// corruption).
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
