//! Normalized file identity
//!
//! Two handles to the same file must compare equal so that the result store
//! de-duplicates correctly. Existing files are keyed by their canonical path
//! (symlinks and `..` resolved); paths that cannot be canonicalized fall back
//! to the lexically absolute path.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Comparable, hashable key for a file
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileIdentity {
    path: PathBuf,
}

impl FileIdentity {
    /// Create an identity, normalizing the path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: normalize_path(path.as_ref()),
        }
    }

    /// Create an identity from a path the caller already normalized
    ///
    /// Used by in-memory file sources whose paths never touch the disk.
    pub fn from_normalized(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The normalized path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl From<&Path> for FileIdentity {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

impl From<PathBuf> for FileIdentity {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&str> for FileIdentity {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return canonical;
    }

    match std::path::absolute(path) {
        Ok(absolute) => absolute,
        Err(e) => {
            log::debug!("Keeping path as given, cannot make it absolute: {path:?}: {e}");
            path.to_path_buf()
        }
    }
}
