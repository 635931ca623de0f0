//! Foundation types for arkfs.
//!
//! This crate provides the identifier, entry, and path types used
//! throughout the arkfs system. Every other arkfs crate depends on
//! `arkfs-types`.
//!
//! # Key Types
//!
//! - [`ArchiveId`] — identifier of one archive (an isolated namespace plus
//!   its blob store)
//! - [`BlobId`] — 128-bit identifier naming the physical file behind a
//!   file entry
//! - [`EntryKind`] — the directory/file distinction, with its on-disk
//!   type tag
//! - [`DirEntry`] — one (name, kind) record in a directory listing
//! - [`NsPath`] — a normalized, `/`-rooted logical path

pub mod entry;
pub mod error;
pub mod id;
pub mod path;

pub use entry::{DirEntry, EntryKind};
pub use error::TypeError;
pub use id::{ArchiveId, BlobId};
pub use path::NsPath;
