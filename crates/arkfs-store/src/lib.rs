//! Transactional hierarchical namespace for arkfs.
//!
//! This crate implements the directory tree of one archive on top of an
//! embedded SQLite store file. It owns path resolution, typed entries
//! (directory vs. file) and blob-id assignment; the physical blob files
//! live one layer up, in `arkfs-blob`.
//!
//! # Design Rules
//!
//! 1. Every public operation runs inside exactly one store transaction.
//! 2. Writers are fully serialized; a failing operation rolls back and
//!    the first error is returned verbatim — no partial application is
//!    observable.
//! 3. A file entry's blob id is assigned once, at creation, and is
//!    preserved by rename.
//! 4. Sibling names are unique; children list in bytewise name order.
//! 5. The root directory always exists and can never be removed.

pub mod error;
pub mod namespace;

pub use error::{Result, StoreError};
pub use namespace::NamespaceStore;
