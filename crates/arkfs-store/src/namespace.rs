//! The transactional namespace tree.
//!
//! Every entry is one row keyed by `(parent, name)` where `parent` is the
//! normalized path of the containing directory. Each row carries the
//! 1-byte entry type tag and, for files, the 16-byte blob id. The root
//! directory is permanent and implicit: it has no row, always exists, and
//! can never be removed.
//!
//! Every public operation runs inside exactly one store transaction. The
//! connection lives behind a mutex, so writers are fully serialized; a
//! failing operation rolls back and leaves the tree untouched.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, OptionalExtension, Transaction};
use tracing::debug;

use arkfs_types::{BlobId, DirEntry, EntryKind, NsPath};

use crate::error::{Result, StoreError};

/// A resolved namespace entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Resolved {
    Directory,
    File(BlobId),
}

/// Hierarchical directory tree over one embedded store file.
///
/// Cheap to clone; clones share the same connection.
#[derive(Clone)]
pub struct NamespaceStore {
    conn: Arc<Mutex<Connection>>,
}

impl NamespaceStore {
    /// Open (or create) the store file at `db_path` and initialize the
    /// entry table.
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        conn.query_row("PRAGMA journal_mode=WAL", [], |_| Ok(()))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS entries (
                parent  TEXT NOT NULL,
                name    TEXT NOT NULL,
                kind    INTEGER NOT NULL,
                blob_id BLOB,
                PRIMARY KEY (parent, name)
            )",
            [],
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create every missing intermediate directory along `path`.
    ///
    /// Idempotent: existing directories along the way are left alone.
    /// Fails with [`StoreError::Conflict`] if any existing entry on the
    /// path is a file; in that case nothing is created (the whole chain
    /// commits or none of it does).
    pub fn mkdir(&self, path: &NsPath) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        ensure_dirs(&tx, path)?;
        tx.commit()?;
        debug!(path = %path, "mkdir");
        Ok(())
    }

    /// Create a file leaf at `path` referencing `blob_id`, auto-creating
    /// missing ancestor directories.
    ///
    /// Atomic create-or-fail: if any entry (file or directory) already
    /// occupies `path`, fails with [`StoreError::AlreadyExists`] and the
    /// tree is unchanged.
    pub fn add(&self, path: &NsPath, blob_id: BlobId) -> Result<()> {
        let (parent, base) = split(path).ok_or_else(|| StoreError::AlreadyExists {
            path: path.to_string(),
        })?;

        let mut conn = self.lock();
        let tx = conn.transaction()?;
        ensure_dirs(&tx, &parent)?;
        if lookup(&tx, parent.as_str(), base)?.is_some() {
            return Err(StoreError::AlreadyExists {
                path: path.to_string(),
            });
        }
        tx.execute(
            "INSERT INTO entries (parent, name, kind, blob_id) VALUES (?1, ?2, ?3, ?4)",
            params![
                parent.as_str(),
                base,
                EntryKind::File.type_tag(),
                &blob_id.as_bytes()[..]
            ],
        )
        .map_err(|e| map_constraint(e, path))?;
        tx.commit()?;
        debug!(path = %path, blob = %blob_id, "add");
        Ok(())
    }

    /// Resolve `path` to its file entry's blob id.
    pub fn get(&self, path: &NsPath) -> Result<BlobId> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        match resolve(&tx, path)? {
            Resolved::File(id) => Ok(id),
            Resolved::Directory => Err(StoreError::NotAFile {
                path: path.to_string(),
            }),
        }
    }

    /// Delete the file entry at `path`, returning its blob id so the
    /// caller can unlink the physical blob.
    ///
    /// Fails with [`StoreError::NotAFile`] if the entry is a directory
    /// (use [`NamespaceStore::rmdir`] for those).
    pub fn remove(&self, path: &NsPath) -> Result<BlobId> {
        let (parent, base) = split(path).ok_or_else(|| StoreError::NotAFile {
            path: path.to_string(),
        })?;

        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let id = match resolve(&tx, path)? {
            Resolved::File(id) => id,
            Resolved::Directory => {
                return Err(StoreError::NotAFile {
                    path: path.to_string(),
                })
            }
        };
        tx.execute(
            "DELETE FROM entries WHERE parent = ?1 AND name = ?2",
            params![parent.as_str(), base],
        )?;
        tx.commit()?;
        debug!(path = %path, blob = %id, "remove");
        Ok(id)
    }

    /// Delete the empty directory at `path`.
    ///
    /// The root can never be removed; `rmdir("/")` fails with
    /// [`StoreError::DirectoryNotEmpty`].
    pub fn rmdir(&self, path: &NsPath) -> Result<()> {
        let (parent, base) = split(path).ok_or_else(|| StoreError::DirectoryNotEmpty {
            path: path.to_string(),
        })?;

        let mut conn = self.lock();
        let tx = conn.transaction()?;
        match resolve(&tx, path)? {
            Resolved::Directory => {}
            Resolved::File(_) => {
                return Err(StoreError::NotADirectory {
                    path: path.to_string(),
                })
            }
        }
        if has_children(&tx, path.as_str())? {
            return Err(StoreError::DirectoryNotEmpty {
                path: path.to_string(),
            });
        }
        tx.execute(
            "DELETE FROM entries WHERE parent = ?1 AND name = ?2",
            params![parent.as_str(), base],
        )?;
        tx.commit()?;
        debug!(path = %path, "rmdir");
        Ok(())
    }

    /// List the immediate children of the directory at `path`, sorted
    /// lexicographically by name (the iteration order of the store).
    pub fn list(&self, path: &NsPath) -> Result<Vec<DirEntry>> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        match resolve(&tx, path)? {
            Resolved::Directory => {}
            Resolved::File(_) => {
                return Err(StoreError::NotADirectory {
                    path: path.to_string(),
                })
            }
        }
        let mut stmt =
            tx.prepare("SELECT name, kind FROM entries WHERE parent = ?1 ORDER BY name")?;
        let rows = stmt.query_map(params![path.as_str()], |row| {
            let name: String = row.get(0)?;
            let tag: i64 = row.get(1)?;
            Ok((name, tag))
        })?;
        let mut entries = Vec::new();
        for row in rows {
            let (name, tag) = row?;
            let kind =
                EntryKind::from_type_tag(tag as u8).ok_or_else(|| StoreError::Corrupt {
                    path: format!("{path}/{name}"),
                    reason: format!("unknown type tag {tag:#04x}"),
                })?;
            entries.push(DirEntry::new(name, kind));
        }
        Ok(entries)
    }

    /// Relocate the entry (and, for a directory, its entire subtree) from
    /// `from` to `to`, preserving every blob id.
    ///
    /// Atomic: either `to` ends up a full copy and `from` is gone, or the
    /// pre-operation tree is unchanged. The destination's parent must
    /// already exist; `rename` does not auto-create ancestors.
    pub fn rename(&self, from: &NsPath, to: &NsPath) -> Result<()> {
        if from.is_root() {
            return Err(StoreError::Conflict {
                path: from.to_string(),
                reason: "cannot move the root".into(),
            });
        }
        if to.is_root() {
            return Err(StoreError::Conflict {
                path: to.to_string(),
                reason: "cannot replace the root".into(),
            });
        }
        if from == to {
            return Ok(());
        }
        if from.is_ancestor_of(to) {
            return Err(StoreError::Conflict {
                path: to.to_string(),
                reason: format!("destination is inside the moved subtree {from}"),
            });
        }

        // Both non-root, so both have a parent and a base name.
        let (from_parent, from_base) = split(from).expect("non-root path");
        let (to_parent, to_base) = split(to).expect("non-root path");

        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let source = resolve(&tx, from)?;
        match resolve(&tx, &to_parent)? {
            Resolved::Directory => {}
            Resolved::File(_) => {
                return Err(StoreError::NotADirectory {
                    path: to_parent.to_string(),
                })
            }
        }
        if lookup(&tx, to_parent.as_str(), to_base)?.is_some() {
            return Err(StoreError::AlreadyExists {
                path: to.to_string(),
            });
        }

        // Copy the leaf under its new name.
        let (kind, blob) = match source {
            Resolved::Directory => (EntryKind::Directory, None),
            Resolved::File(id) => (EntryKind::File, Some(id.as_bytes().to_vec())),
        };
        tx.execute(
            "INSERT INTO entries (parent, name, kind, blob_id) VALUES (?1, ?2, ?3, ?4)",
            params![to_parent.as_str(), to_base, kind.type_tag(), blob],
        )?;

        // For a directory, copy the whole subtree with parent paths
        // rewritten, then delete the originals.
        if kind.is_dir() {
            let descendants = collect_subtree(&tx, from.as_str())?;
            for row in descendants {
                let new_parent = rewrite_parent(&row.parent, from.as_str(), to.as_str());
                tx.execute(
                    "INSERT INTO entries (parent, name, kind, blob_id) VALUES (?1, ?2, ?3, ?4)",
                    params![new_parent, row.name, row.kind, row.blob],
                )?;
            }
            tx.execute(
                "DELETE FROM entries
                 WHERE parent = ?1 OR substr(parent, 1, length(?1) + 1) = ?1 || '/'",
                params![from.as_str()],
            )?;
        }
        tx.execute(
            "DELETE FROM entries WHERE parent = ?1 AND name = ?2",
            params![from_parent.as_str(), from_base],
        )?;

        tx.commit()?;
        debug!(from = %from, to = %to, "rename");
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("namespace store mutex poisoned")
    }
}

/// A raw subtree row, as read back during a rename.
struct SubtreeRow {
    parent: String,
    name: String,
    kind: i64,
    blob: Option<Vec<u8>>,
}

/// Parent path and base name of a non-root path.
fn split(path: &NsPath) -> Option<(NsPath, &str)> {
    Some((path.parent()?, path.base_name()?))
}

/// Look up the entry named `name` inside the directory `parent`.
fn lookup(tx: &Transaction<'_>, parent: &str, name: &str) -> Result<Option<Resolved>> {
    let row = tx
        .query_row(
            "SELECT kind, blob_id FROM entries WHERE parent = ?1 AND name = ?2",
            params![parent, name],
            |row| {
                let tag: i64 = row.get(0)?;
                let blob: Option<Vec<u8>> = row.get(1)?;
                Ok((tag, blob))
            },
        )
        .optional()?;

    let Some((tag, blob)) = row else {
        return Ok(None);
    };

    let entry_path = if parent == "/" {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    };
    match EntryKind::from_type_tag(tag as u8) {
        Some(EntryKind::Directory) => Ok(Some(Resolved::Directory)),
        Some(EntryKind::File) => {
            let bytes = blob.ok_or_else(|| StoreError::Corrupt {
                path: entry_path.clone(),
                reason: "file entry without blob id".into(),
            })?;
            let id = BlobId::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                path: entry_path,
                reason: e.to_string(),
            })?;
            Ok(Some(Resolved::File(id)))
        }
        None => Err(StoreError::Corrupt {
            path: entry_path,
            reason: format!("unknown type tag {tag:#04x}"),
        }),
    }
}

/// Walk the tree one segment at a time, starting from the root.
///
/// A missing segment aborts with [`StoreError::NotFound`]; so does a
/// segment nested under a file, since files have no children.
fn resolve(tx: &Transaction<'_>, path: &NsPath) -> Result<Resolved> {
    let mut current = Resolved::Directory;
    let mut parent = String::from("/");
    for segment in path.segments() {
        if !matches!(current, Resolved::Directory) {
            return Err(StoreError::NotFound {
                path: path.to_string(),
            });
        }
        current = lookup(tx, &parent, segment)?.ok_or_else(|| StoreError::NotFound {
            path: path.to_string(),
        })?;
        if parent != "/" {
            parent.push('/');
        }
        parent.push_str(segment);
    }
    Ok(current)
}

/// Create every missing directory along `path` inside the transaction.
fn ensure_dirs(tx: &Transaction<'_>, path: &NsPath) -> Result<()> {
    let mut parent = String::from("/");
    for segment in path.segments() {
        let child_path = if parent == "/" {
            format!("/{segment}")
        } else {
            format!("{parent}/{segment}")
        };
        match lookup(tx, &parent, segment)? {
            Some(Resolved::Directory) => {}
            Some(Resolved::File(_)) => {
                return Err(StoreError::Conflict {
                    path: child_path,
                    reason: "path segment is a file".into(),
                })
            }
            None => {
                tx.execute(
                    "INSERT INTO entries (parent, name, kind, blob_id) VALUES (?1, ?2, ?3, NULL)",
                    params![parent, segment, EntryKind::Directory.type_tag()],
                )?;
            }
        }
        parent = child_path;
    }
    Ok(())
}

/// Whether the directory at `path` has any children.
fn has_children(tx: &Transaction<'_>, path: &str) -> Result<bool> {
    let n: i64 = tx.query_row(
        "SELECT count(*) FROM entries WHERE parent = ?1",
        params![path],
        |row| row.get(0),
    )?;
    Ok(n > 0)
}

/// Collect every row whose parent is `root` or lies strictly below it.
fn collect_subtree(tx: &Transaction<'_>, root: &str) -> Result<Vec<SubtreeRow>> {
    let mut stmt = tx.prepare(
        "SELECT parent, name, kind, blob_id FROM entries
         WHERE parent = ?1 OR substr(parent, 1, length(?1) + 1) = ?1 || '/'",
    )?;
    let rows = stmt.query_map(params![root], |row| {
        Ok(SubtreeRow {
            parent: row.get(0)?,
            name: row.get(1)?,
            kind: row.get(2)?,
            blob: row.get(3)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Rewrite a subtree row's parent path for a rename of `from` to `to`.
fn rewrite_parent(parent: &str, from: &str, to: &str) -> String {
    debug_assert!(parent.starts_with(from));
    format!("{to}{}", &parent[from.len()..])
}

/// Map a uniqueness violation on insert to the creation-race conflict.
///
/// The mutex serializes writers, so this only fires if two stores are
/// opened on the same file out-of-process.
fn map_constraint(err: rusqlite::Error, path: &NsPath) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StoreError::Conflict {
                path: path.to_string(),
                reason: "entry created concurrently".into(),
            }
        }
        _ => StoreError::Store(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, NamespaceStore) {
        let dir = TempDir::new().unwrap();
        let ns = NamespaceStore::open(&dir.path().join("ns.db")).unwrap();
        (dir, ns)
    }

    fn p(s: &str) -> NsPath {
        NsPath::new(s).unwrap()
    }

    // -----------------------------------------------------------------------
    // mkdir
    // -----------------------------------------------------------------------

    #[test]
    fn mkdir_creates_chain() {
        let (_dir, ns) = store();
        ns.mkdir(&p("/a/b/c")).unwrap();
        assert_eq!(
            ns.list(&p("/a/b")).unwrap(),
            vec![DirEntry::new("c", EntryKind::Directory)]
        );
    }

    #[test]
    fn mkdir_is_idempotent() {
        let (_dir, ns) = store();
        ns.mkdir(&p("/a/b")).unwrap();
        ns.mkdir(&p("/a/b")).unwrap();
        assert_eq!(
            ns.list(&p("/a")).unwrap(),
            vec![DirEntry::new("b", EntryKind::Directory)]
        );
    }

    #[test]
    fn mkdir_root_is_noop() {
        let (_dir, ns) = store();
        ns.mkdir(&p("/")).unwrap();
        assert!(ns.list(&p("/")).unwrap().is_empty());
    }

    #[test]
    fn mkdir_through_file_conflicts() {
        let (_dir, ns) = store();
        ns.add(&p("/a"), BlobId::generate()).unwrap();
        let err = ns.mkdir(&p("/a/b")).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }), "{err}");
        // Nothing partial was created.
        assert_eq!(ns.list(&p("/")).unwrap().len(), 1);
    }

    #[test]
    fn mkdir_conflict_rolls_back_whole_chain() {
        let (_dir, ns) = store();
        ns.add(&p("/x/file"), BlobId::generate()).unwrap();
        // "/x/file" is a file, so the deeper chain must not leave "/x/new"
        // behind either.
        let err = ns.mkdir(&p("/x/file/deep/er")).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
        assert_eq!(
            ns.list(&p("/x")).unwrap(),
            vec![DirEntry::new("file", EntryKind::File)]
        );
    }

    // -----------------------------------------------------------------------
    // add / get
    // -----------------------------------------------------------------------

    #[test]
    fn add_then_get() {
        let (_dir, ns) = store();
        let id = BlobId::generate();
        ns.add(&p("/a/b"), id).unwrap();
        assert_eq!(ns.get(&p("/a/b")).unwrap(), id);
    }

    #[test]
    fn add_autocreates_ancestors() {
        let (_dir, ns) = store();
        ns.add(&p("/a/b/c/d"), BlobId::generate()).unwrap();
        assert_eq!(
            ns.list(&p("/a/b/c")).unwrap(),
            vec![DirEntry::new("d", EntryKind::File)]
        );
    }

    #[test]
    fn add_over_existing_fails() {
        let (_dir, ns) = store();
        ns.add(&p("/a"), BlobId::generate()).unwrap();
        let err = ns.add(&p("/a"), BlobId::generate()).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));

        ns.mkdir(&p("/d")).unwrap();
        let err = ns.add(&p("/d"), BlobId::generate()).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[test]
    fn add_root_fails() {
        let (_dir, ns) = store();
        let err = ns.add(&p("/"), BlobId::generate()).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[test]
    fn get_missing_is_not_found() {
        let (_dir, ns) = store();
        assert!(matches!(
            ns.get(&p("/nope")).unwrap_err(),
            StoreError::NotFound { .. }
        ));
        ns.add(&p("/a/b"), BlobId::generate()).unwrap();
        assert!(matches!(
            ns.get(&p("/a/b/c")).unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }

    #[test]
    fn get_directory_is_not_a_file() {
        let (_dir, ns) = store();
        ns.mkdir(&p("/d")).unwrap();
        assert!(matches!(
            ns.get(&p("/d")).unwrap_err(),
            StoreError::NotAFile { .. }
        ));
        assert!(matches!(
            ns.get(&p("/")).unwrap_err(),
            StoreError::NotAFile { .. }
        ));
    }

    // -----------------------------------------------------------------------
    // remove / rmdir
    // -----------------------------------------------------------------------

    #[test]
    fn remove_returns_blob_id() {
        let (_dir, ns) = store();
        let id = BlobId::generate();
        ns.add(&p("/f"), id).unwrap();
        assert_eq!(ns.remove(&p("/f")).unwrap(), id);
        assert!(matches!(
            ns.get(&p("/f")).unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }

    #[test]
    fn remove_unknown_path_leaves_tree_unmodified() {
        let (_dir, ns) = store();
        ns.add(&p("/file/a"), BlobId::generate()).unwrap();
        let err = ns.remove(&p("/file/d")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(
            ns.list(&p("/file")).unwrap(),
            vec![DirEntry::new("a", EntryKind::File)]
        );
    }

    #[test]
    fn remove_directory_is_not_a_file() {
        let (_dir, ns) = store();
        ns.mkdir(&p("/d")).unwrap();
        assert!(matches!(
            ns.remove(&p("/d")).unwrap_err(),
            StoreError::NotAFile { .. }
        ));
    }

    #[test]
    fn rmdir_file_is_not_a_directory() {
        let (_dir, ns) = store();
        ns.add(&p("/f"), BlobId::generate()).unwrap();
        assert!(matches!(
            ns.rmdir(&p("/f")).unwrap_err(),
            StoreError::NotADirectory { .. }
        ));
    }

    #[test]
    fn rmdir_guards_non_empty() {
        let (_dir, ns) = store();
        ns.add(&p("/thing/1"), BlobId::generate()).unwrap();
        ns.add(&p("/thing/2"), BlobId::generate()).unwrap();

        let err = ns.rmdir(&p("/thing")).unwrap_err();
        assert!(matches!(err, StoreError::DirectoryNotEmpty { .. }));

        ns.remove(&p("/thing/1")).unwrap();
        ns.remove(&p("/thing/2")).unwrap();
        ns.rmdir(&p("/thing")).unwrap();
        assert!(ns.list(&p("/")).unwrap().is_empty());
    }

    #[test]
    fn root_is_never_removable() {
        let (_dir, ns) = store();
        assert!(matches!(
            ns.rmdir(&p("/")).unwrap_err(),
            StoreError::DirectoryNotEmpty { .. }
        ));
        assert!(matches!(
            ns.remove(&p("/")).unwrap_err(),
            StoreError::NotAFile { .. }
        ));
    }

    // -----------------------------------------------------------------------
    // list
    // -----------------------------------------------------------------------

    #[test]
    fn list_is_lexicographic() {
        let (_dir, ns) = store();
        ns.add(&p("/thing/2"), BlobId::generate()).unwrap();
        ns.add(&p("/thing/1"), BlobId::generate()).unwrap();
        ns.mkdir(&p("/thing/3/ok")).unwrap();

        assert_eq!(
            ns.list(&p("/thing")).unwrap(),
            vec![
                DirEntry::new("1", EntryKind::File),
                DirEntry::new("2", EntryKind::File),
                DirEntry::new("3", EntryKind::Directory),
            ]
        );
    }

    #[test]
    fn list_file_is_not_a_directory() {
        let (_dir, ns) = store();
        ns.add(&p("/f"), BlobId::generate()).unwrap();
        assert!(matches!(
            ns.list(&p("/f")).unwrap_err(),
            StoreError::NotADirectory { .. }
        ));
    }

    #[test]
    fn list_missing_is_not_found() {
        let (_dir, ns) = store();
        assert!(matches!(
            ns.list(&p("/nope")).unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }

    #[test]
    fn list_empty_root() {
        let (_dir, ns) = store();
        assert!(ns.list(&p("/")).unwrap().is_empty());
    }

    // -----------------------------------------------------------------------
    // rename
    // -----------------------------------------------------------------------

    #[test]
    fn rename_file_preserves_blob_id() {
        let (_dir, ns) = store();
        let id = BlobId::generate();
        ns.add(&p("/file/a"), id).unwrap();
        ns.rename(&p("/file/a"), &p("/file/z")).unwrap();

        assert_eq!(ns.get(&p("/file/z")).unwrap(), id);
        assert!(matches!(
            ns.get(&p("/file/a")).unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }

    #[test]
    fn rename_moves_whole_subtree() {
        let (_dir, ns) = store();
        let id1 = BlobId::generate();
        let id2 = BlobId::generate();
        ns.add(&p("/src/a"), id1).unwrap();
        ns.add(&p("/src/deep/b"), id2).unwrap();
        ns.mkdir(&p("/dst")).unwrap();

        ns.rename(&p("/src"), &p("/dst/moved")).unwrap();

        assert_eq!(ns.get(&p("/dst/moved/a")).unwrap(), id1);
        assert_eq!(ns.get(&p("/dst/moved/deep/b")).unwrap(), id2);
        assert!(matches!(
            ns.list(&p("/src")).unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }

    #[test]
    fn rename_to_occupied_fails() {
        let (_dir, ns) = store();
        ns.add(&p("/a"), BlobId::generate()).unwrap();
        ns.add(&p("/b"), BlobId::generate()).unwrap();
        let err = ns.rename(&p("/a"), &p("/b")).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
        // Source untouched by the failed rename.
        assert!(ns.get(&p("/a")).is_ok());
    }

    #[test]
    fn rename_missing_source_fails() {
        let (_dir, ns) = store();
        assert!(matches!(
            ns.rename(&p("/nope"), &p("/b")).unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }

    #[test]
    fn rename_requires_destination_parent() {
        let (_dir, ns) = store();
        ns.add(&p("/a"), BlobId::generate()).unwrap();
        assert!(matches!(
            ns.rename(&p("/a"), &p("/missing/b")).unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }

    #[test]
    fn rename_into_own_subtree_conflicts() {
        let (_dir, ns) = store();
        ns.mkdir(&p("/d/sub")).unwrap();
        assert!(matches!(
            ns.rename(&p("/d"), &p("/d/sub/again")).unwrap_err(),
            StoreError::Conflict { .. }
        ));
    }

    #[test]
    fn rename_root_is_rejected() {
        let (_dir, ns) = store();
        assert!(matches!(
            ns.rename(&p("/"), &p("/elsewhere")).unwrap_err(),
            StoreError::Conflict { .. }
        ));
        ns.add(&p("/a"), BlobId::generate()).unwrap();
        assert!(matches!(
            ns.rename(&p("/a"), &p("/")).unwrap_err(),
            StoreError::Conflict { .. }
        ));
    }

    #[test]
    fn rename_to_self_is_noop() {
        let (_dir, ns) = store();
        let id = BlobId::generate();
        ns.add(&p("/a"), id).unwrap();
        ns.rename(&p("/a"), &p("/a")).unwrap();
        assert_eq!(ns.get(&p("/a")).unwrap(), id);
    }

    #[test]
    fn rename_does_not_grab_sibling_name_prefix() {
        let (_dir, ns) = store();
        let id = BlobId::generate();
        ns.add(&p("/ab/x"), id).unwrap();
        ns.mkdir(&p("/a")).unwrap();
        ns.rename(&p("/a"), &p("/c")).unwrap();
        // "/ab" shares a string prefix with "/a" but is not inside it.
        assert_eq!(ns.get(&p("/ab/x")).unwrap(), id);
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    #[test]
    fn tree_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("ns.db");
        let id = BlobId::generate();
        {
            let ns = NamespaceStore::open(&db).unwrap();
            ns.add(&p("/a/b"), id).unwrap();
        }
        let ns = NamespaceStore::open(&db).unwrap();
        assert_eq!(ns.get(&p("/a/b")).unwrap(), id);
    }

    #[test]
    fn concrete_removal_scenario() {
        let (_dir, ns) = store();
        ns.add(&p("/file/a"), BlobId::generate()).unwrap();
        ns.add(&p("/file/b"), BlobId::generate()).unwrap();

        ns.remove(&p("/file/b")).unwrap();
        assert!(matches!(
            ns.remove(&p("/file/b")).unwrap_err(),
            StoreError::NotFound { .. }
        ));
        assert!(matches!(
            ns.remove(&p("/file/d")).unwrap_err(),
            StoreError::NotFound { .. }
        ));
        assert_eq!(
            ns.list(&p("/file")).unwrap(),
            vec![DirEntry::new("a", EntryKind::File)]
        );
    }
}
