//! Logical path normalization.
//!
//! Callers address namespace entries by `/`-rooted logical paths. A
//! [`NsPath`] is always in normal form: it starts with a single `/`,
//! contains no empty, `.` or `..` segments, and never ends with a
//! separator (except the root itself, which is exactly `"/"`). All of
//! `""`, `"/"` and `"///"` normalize to the root.

use std::fmt;

use crate::error::TypeError;

/// A normalized, `/`-rooted logical path inside one archive's namespace.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NsPath {
    inner: String,
}

impl NsPath {
    /// The root path `"/"`. Always present, never removable.
    pub fn root() -> Self {
        Self { inner: "/".into() }
    }

    /// Normalize a raw path string.
    ///
    /// Duplicate, leading and trailing separators are trimmed. Segments
    /// equal to `.` or `..` and segments containing NUL are rejected:
    /// the namespace has no notion of relative traversal, and allowing
    /// `..` through would silently alias distinct logical paths.
    pub fn new(raw: &str) -> Result<Self, TypeError> {
        let mut inner = String::with_capacity(raw.len() + 1);
        for segment in raw.split('/') {
            if segment.is_empty() {
                continue;
            }
            if segment == "." || segment == ".." {
                return Err(TypeError::InvalidPath {
                    path: raw.to_string(),
                    reason: format!("segment {segment:?} is not allowed"),
                });
            }
            if segment.contains('\0') {
                return Err(TypeError::InvalidPath {
                    path: raw.to_string(),
                    reason: "segment contains NUL".into(),
                });
            }
            inner.push('/');
            inner.push_str(segment);
        }
        if inner.is_empty() {
            inner.push('/');
        }
        Ok(Self { inner })
    }

    /// The normalized string form.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns `true` if this is the root path.
    pub fn is_root(&self) -> bool {
        self.inner == "/"
    }

    /// The path segments, in order. Empty for the root.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|s| !s.is_empty())
    }

    /// The parent directory path. `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.inner.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(i) => Some(Self {
                inner: self.inner[..i].to_string(),
            }),
            None => None,
        }
    }

    /// The final path segment. `None` for the root.
    pub fn base_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.inner.rfind('/').map(|i| &self.inner[i + 1..])
    }

    /// Returns `true` if `self` is a strict ancestor of `other`.
    ///
    /// The root is an ancestor of every other path; no path is its own
    /// ancestor.
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        if self == other {
            return false;
        }
        if self.is_root() {
            return true;
        }
        other.inner.starts_with(&self.inner)
            && other.inner.as_bytes().get(self.inner.len()) == Some(&b'/')
    }
}

impl fmt::Debug for NsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NsPath({})", self.inner)
    }
}

impl fmt::Display for NsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl AsRef<str> for NsPath {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl std::str::FromStr for NsPath {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
