//! The archive registry.
//!
//! Maps human-chosen archive names to archive ids in a host-level store
//! file, and keeps a cache of the filesystem instances opened through
//! it. The registry is an explicit object with its own internal locks —
//! never global state — and is injected into whatever adapter sits above
//! it. The core engine stays one-instance-per-archive with no shared
//! mutable globals.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use arkfs_blob::BlobFileSystem;
use arkfs_types::ArchiveId;

use crate::error::{RegistryError, Result};

/// Name of the registry store file inside the root directory.
pub const REGISTRY_FILE: &str = "registry.db";

/// Per-host registry of named archives under one root directory.
pub struct Registry {
    root: PathBuf,
    conn: Mutex<Connection>,
    /// Archives opened through this registry, shared with callers.
    open_archives: Mutex<HashMap<String, Arc<BlobFileSystem>>>,
}

impl Registry {
    /// Open (or create) the registry rooted at `root`.
    pub fn open(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        let conn = Connection::open(root.join(REGISTRY_FILE))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS archives (
                name TEXT PRIMARY KEY,
                uuid BLOB NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            root: root.to_path_buf(),
            conn: Mutex::new(conn),
            open_archives: Mutex::new(HashMap::new()),
        })
    }

    /// The registry's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a new archive registered under `name`.
    pub fn create(&self, name: &str) -> Result<Arc<BlobFileSystem>> {
        validate_name(name)?;
        let mut conn = self.lock_conn();
        let tx = conn.transaction()?;

        let exists: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM archives WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(RegistryError::AlreadyExists {
                name: name.to_string(),
            });
        }

        let archive = BlobFileSystem::create(&self.root)?;
        if let Err(e) = tx
            .execute(
                "INSERT INTO archives (name, uuid) VALUES (?1, ?2)",
                params![name, &archive.id().as_bytes()[..]],
            )
            .and_then(|_| tx.commit())
        {
            // The row never landed; take the fresh working directory
            // back out with it.
            let _ = archive.destroy();
            return Err(e.into());
        }

        debug!(name, archive = %archive.id(), "registered archive");
        let archive = Arc::new(archive);
        self.cache().insert(name.to_string(), Arc::clone(&archive));
        Ok(archive)
    }

    /// Open the archive registered under `name`, reusing a cached
    /// instance when one exists.
    pub fn open_archive(&self, name: &str) -> Result<Arc<BlobFileSystem>> {
        if let Some(archive) = self.cache().get(name) {
            return Ok(Arc::clone(archive));
        }

        let id = self.lookup(name)?;
        let archive = Arc::new(BlobFileSystem::open_existing(&self.root, id)?);
        self.cache()
            .insert(name.to_string(), Arc::clone(&archive));
        Ok(archive)
    }

    /// Unregister `name` and destroy its archive: the registry row goes
    /// first, then the working directory is torn down. Irreversible.
    pub fn remove(&self, name: &str) -> Result<()> {
        let id = self.lookup(name)?;
        {
            let conn = self.lock_conn();
            conn.execute("DELETE FROM archives WHERE name = ?1", params![name])?;
        }
        self.cache().remove(name);

        // Row is gone; tear the archive down. A failure here orphans the
        // working directory rather than resurrecting the name.
        let archive = BlobFileSystem::open_existing(&self.root, id)?;
        archive.destroy()?;
        debug!(name, archive = %id, "removed archive");
        Ok(())
    }

    /// Registered archive names, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare("SELECT name FROM archives ORDER BY name")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }
        Ok(names)
    }

    fn lookup(&self, name: &str) -> Result<ArchiveId> {
        let conn = self.lock_conn();
        let bytes: Option<Vec<u8>> = conn
            .query_row(
                "SELECT uuid FROM archives WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        let bytes = bytes.ok_or_else(|| RegistryError::NotFound {
            name: name.to_string(),
        })?;
        ArchiveId::from_slice(&bytes).map_err(|e| RegistryError::Corrupt {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }

    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("registry store mutex poisoned")
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, Arc<BlobFileSystem>>> {
        self.open_archives
            .lock()
            .expect("registry cache mutex poisoned")
    }
}

/// Validate a human-chosen archive name.
///
/// Names become registry keys, not filesystem paths, so the rules are
/// light: non-empty, no separators, no NUL.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(RegistryError::InvalidName {
            name: name.to_string(),
            reason: "name must not be empty".into(),
        });
    }
    if name.contains('/') || name.contains('\0') {
        return Err(RegistryError::InvalidName {
            name: name.to_string(),
            reason: "name must not contain '/' or NUL".into(),
        });
    }
    Ok(())
}
