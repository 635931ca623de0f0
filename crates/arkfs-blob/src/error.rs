use thiserror::Error;

pub use arkfs_store::StoreError;

/// Errors from blob filesystem operations.
///
/// Namespace failures pass through unchanged so the caller sees the full
/// store taxonomy; physical file failures surface as [`FsError::Io`].
/// Operations that span a metadata transaction and a physical file step
/// (`open`-create, `remove`) report the physical failure without rolling
/// the committed metadata back — see the crate docs for the accepted
/// asymmetry.
#[derive(Debug, Error)]
pub enum FsError {
    /// A namespace store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A physical file operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for blob filesystem operations.
pub type Result<T> = std::result::Result<T, FsError>;
