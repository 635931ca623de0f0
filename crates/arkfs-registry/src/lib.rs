//! Per-host archive registry for arkfs.
//!
//! An archive is addressed internally by UUID; humans address it by
//! name. The [`Registry`] owns a host-level store file mapping names to
//! archive ids, creates and opens [`arkfs_blob::BlobFileSystem`]
//! instances on demand, and destroys them on removal.

pub mod error;
pub mod registry;

pub use error::{RegistryError, Result};
pub use registry::{Registry, REGISTRY_FILE};
