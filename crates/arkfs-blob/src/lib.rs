//! Blob-backed virtual filesystem for arkfs.
//!
//! This crate composes the transactional namespace of `arkfs-store` with
//! physical blob files in an archive working directory: callers address
//! data by logical path, while physical storage is a flat directory of
//! opaquely-named blob files.
//!
//! # Two-phase operations
//!
//! `open`-create and `remove` each span a metadata transaction and a
//! physical file operation. The metadata transaction commits first; if
//! the physical step then fails, the error is reported but the metadata
//! change stands. On `remove` this can orphan a blob file — a bounded
//! space leak, never a dangling namespace pointer.

pub mod error;
pub mod fs;
pub mod handle;

pub use error::{FsError, Result, StoreError};
pub use fs::{BlobFileSystem, STORE_FILE};
pub use handle::{FileHandle, FileInfo};
