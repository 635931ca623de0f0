use thiserror::Error;

/// Errors from registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No archive is registered under this name.
    #[error("archive not found: {name}")]
    NotFound { name: String },

    /// An archive with this name already exists.
    #[error("archive already exists: {name}")]
    AlreadyExists { name: String },

    /// The archive name is invalid.
    #[error("invalid archive name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// A stored registry row could not be decoded.
    #[error("corrupt registry row for {name}: {reason}")]
    Corrupt { name: String, reason: String },

    /// An operation on the archive itself failed.
    #[error(transparent)]
    Archive(#[from] arkfs_blob::FsError),

    /// The registry store failed.
    #[error("registry store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// I/O error on the registry root directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
