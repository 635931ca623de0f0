//! Open-file handles.
//!
//! A [`FileHandle`] is a thin wrapper around one open blob descriptor,
//! aware of the logical path it was opened for. Handles are transient
//! and owned by whoever opened them; multiple handles may reference the
//! same blob concurrently, with ordinary file-descriptor semantics and
//! no exclusivity. Dropping a handle releases the descriptor only — the
//! namespace entry and the blob stay.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
#[cfg(unix)]
use std::os::unix::fs::FileExt;
use std::time::SystemTime;

use arkfs_types::{BlobId, NsPath};

use crate::error::Result;
use crate::fs::BlobFileSystem;

/// Metadata of a file entry, surfaced under its logical name.
#[derive(Clone, Debug)]
pub struct FileInfo {
    /// The logical base name (never the physical blob filename).
    pub name: String,
    /// Size of the blob in bytes.
    pub len: u64,
    /// Whether the blob file is read-only. There is no richer permission
    /// model; entries are only ever directories or writable files.
    pub readonly: bool,
    /// Last modification time of the blob file.
    pub modified: SystemTime,
}

/// An open read/write handle on one blob, bound to a logical path.
pub struct FileHandle {
    path: NsPath,
    blob: BlobId,
    file: File,
    fs: BlobFileSystem,
}

impl FileHandle {
    pub(crate) fn new(path: NsPath, blob: BlobId, file: File, fs: BlobFileSystem) -> Self {
        Self {
            path,
            blob,
            file,
            fs,
        }
    }

    /// The logical path this handle was opened for.
    pub fn path(&self) -> &NsPath {
        &self.path
    }

    /// The blob backing this handle.
    pub fn blob_id(&self) -> BlobId {
        self.blob
    }

    /// Read at an absolute offset, without moving the cursor.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.file.read_at(buf, offset)
    }

    /// Write at an absolute offset, without moving the cursor.
    pub fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        self.file.write_at(buf, offset)
    }

    /// Truncate (or extend with zeros) the blob to `len` bytes.
    ///
    /// Re-open never truncates, so a caller replacing a blob's content
    /// wholesale must cut off the old tail itself.
    pub fn set_len(&self, len: u64) -> io::Result<()> {
        self.file.set_len(len)
    }

    /// Flush the blob to durable storage.
    pub fn sync(&self) -> io::Result<()> {
        self.file.sync_all()
    }

    /// Stat through the owning filesystem, guaranteeing the logical name
    /// is surfaced rather than the blob filename.
    pub fn stat(&self) -> Result<FileInfo> {
        self.fs.stat(&self.path)
    }
}

impl Read for FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for FileHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Seek for FileHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl std::fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileHandle")
            .field("path", &self.path)
            .field("blob", &self.blob)
            .finish_non_exhaustive()
    }
}
