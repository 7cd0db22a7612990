//! Expands command line paths into the files to hash
//!
//! Files named on the command line are taken as is. Directories are walked
//! and their entries filtered by include and exclude glob patterns.

mod filter;
mod walker;

pub use filter::{FileFilter, PatternMatcher};
pub use walker::{FileDiscovery, FileDiscoveryOptions, discover_inputs};

use std::path::PathBuf;

/// A file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid glob pattern: {0}")]
    InvalidPattern(String),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
