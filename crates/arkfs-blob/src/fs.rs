//! The archive filesystem: namespace entries composed with physical
//! blob files.
//!
//! Each archive owns a working directory `<root>/<archive-uuid>/`
//! holding the store file plus one flat blob file per file entry, named
//! by the entry's blob id. Logical nesting never touches the physical
//! layout.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use arkfs_store::{NamespaceStore, StoreError};
use arkfs_types::{ArchiveId, BlobId, DirEntry, NsPath};

use crate::error::{FsError, Result};
use crate::handle::{FileHandle, FileInfo};

/// Name of the namespace store file inside the working directory.
pub const STORE_FILE: &str = "ns.db";

/// One archive: an isolated namespace plus its blob files.
///
/// Cheap to clone; clones share the namespace store connection and the
/// working directory. The only consumers of this type's public surface
/// are the protocol adapter and the registry.
#[derive(Clone)]
pub struct BlobFileSystem {
    id: ArchiveId,
    workdir: PathBuf,
    ns: NamespaceStore,
}

impl BlobFileSystem {
    /// Create a brand-new archive under `root`: a fresh id, its working
    /// directory, and an empty namespace store.
    pub fn create(root: &Path) -> Result<Self> {
        let id = ArchiveId::generate();
        let workdir = root.join(id.to_string());
        fs::create_dir_all(&workdir)?;
        let ns = NamespaceStore::open(&workdir.join(STORE_FILE))?;
        debug!(archive = %id, dir = %workdir.display(), "created archive");
        Ok(Self { id, workdir, ns })
    }

    /// Reopen the existing archive `id` under `root`.
    pub fn open_existing(root: &Path, id: ArchiveId) -> Result<Self> {
        let workdir = root.join(id.to_string());
        if !workdir.is_dir() {
            return Err(FsError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("archive {id} has no working directory under {}", root.display()),
            )));
        }
        let ns = NamespaceStore::open(&workdir.join(STORE_FILE))?;
        Ok(Self { id, workdir, ns })
    }

    /// This archive's identifier.
    pub fn id(&self) -> ArchiveId {
        self.id
    }

    /// The archive's working directory.
    pub fn work_dir(&self) -> &Path {
        &self.workdir
    }

    fn blob_path(&self, id: BlobId) -> PathBuf {
        self.workdir.join(id.to_string())
    }

    /// Open the file at `path` for read/write, creating it (and any
    /// missing ancestor directories) if absent.
    ///
    /// Creation is atomic with respect to later resolution: the
    /// namespace entry is added by an atomic create-or-fail, and a caller
    /// that loses a concurrent-creation race retries as an open of the
    /// winner's entry instead of surfacing a spurious conflict. An
    /// existing blob is never truncated by re-open.
    pub fn open(&self, path: &NsPath) -> Result<FileHandle> {
        match self.ns.get(path) {
            Ok(id) => self.open_blob(path, id, false),
            Err(StoreError::NotFound { .. }) => {
                let id = BlobId::generate();
                match self.ns.add(path, id) {
                    Ok(()) => self.open_blob(path, id, true),
                    Err(StoreError::AlreadyExists { .. }) | Err(StoreError::Conflict { .. }) => {
                        // Lost the create race: someone else added the
                        // entry between our get and add. Open theirs.
                        debug!(path = %path, "open lost create race, reopening");
                        let id = self.ns.get(path)?;
                        self.open_blob(path, id, false)
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    fn open_blob(&self, path: &NsPath, id: BlobId, create: bool) -> Result<FileHandle> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(create)
            .open(self.blob_path(id))?;
        Ok(FileHandle::new(path.clone(), id, file, self.clone()))
    }

    /// Delete the file entry at `path`, then unlink its blob.
    ///
    /// Metadata goes first: once the entry deletion commits, the
    /// namespace no longer references the blob even if the unlink fails
    /// afterwards (the physical file becomes an orphan, a bounded space
    /// leak rather than a dangling pointer). An unlink failure is still
    /// reported; a blob that is already gone is not an error.
    pub fn remove(&self, path: &NsPath) -> Result<()> {
        let id = self.ns.remove(path)?;
        match fs::remove_file(self.blob_path(id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path, blob = %id, "blob file already missing on remove");
                Ok(())
            }
            Err(e) => {
                warn!(path = %path, blob = %id, error = %e, "blob unlink failed, orphaning");
                Err(e.into())
            }
        }
    }

    /// Create directories along `path`; see [`NamespaceStore::mkdir`].
    pub fn mkdir(&self, path: &NsPath) -> Result<()> {
        Ok(self.ns.mkdir(path)?)
    }

    /// Remove the empty directory at `path`.
    pub fn rmdir(&self, path: &NsPath) -> Result<()> {
        Ok(self.ns.rmdir(path)?)
    }

    /// List the directory at `path`, lexicographically by name.
    pub fn list(&self, path: &NsPath) -> Result<Vec<DirEntry>> {
        Ok(self.ns.list(path)?)
    }

    /// Move the entry (or subtree) at `from` to `to`, preserving blob
    /// ids and therefore all content.
    pub fn rename(&self, from: &NsPath, to: &NsPath) -> Result<()> {
        Ok(self.ns.rename(from, to)?)
    }

    /// Stat the file at `path`.
    ///
    /// The returned info carries the logical base name, never the
    /// physical blob filename; observers never see blob ids.
    pub fn stat(&self, path: &NsPath) -> Result<FileInfo> {
        let id = self.ns.get(path)?;
        let meta = fs::metadata(self.blob_path(id))?;
        let name = path
            .base_name()
            .unwrap_or("/") // unreachable: get() rejects the root
            .to_string();
        Ok(FileInfo {
            name,
            len: meta.len(),
            readonly: meta.permissions().readonly(),
            modified: meta.modified()?,
        })
    }

    /// Destroy the whole archive: close the store and recursively delete
    /// the working directory, blob files and store file included.
    /// Irreversible.
    pub fn destroy(self) -> Result<()> {
        let Self { id, workdir, ns } = self;
        drop(ns);
        fs::remove_dir_all(&workdir)?;
        debug!(archive = %id, "destroyed archive");
        Ok(())
    }
}

impl std::fmt::Debug for BlobFileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobFileSystem")
            .field("id", &self.id)
            .field("workdir", &self.workdir)
            .finish_non_exhaustive()
    }
}
