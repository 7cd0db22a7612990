//! Errors from stat-ing or reading a file

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A failed file access, with the path when known
#[derive(Error, Debug)]
pub struct IoError {
    pub kind: IoErrorKind,
    pub path: Option<PathBuf>,
    #[source]
    pub source: Option<std::io::Error>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoErrorKind {
    FileNotFound,
    PermissionDenied,
    /// Reading did not finish within the configured timeout
    TimedOut { seconds: u64 },
    Other,
}

impl IoError {
    pub fn timed_out(path: &Path, seconds: u64) -> Self {
        Self {
            kind: IoErrorKind::TimedOut { seconds },
            path: Some(path.to_path_buf()),
            source: None,
        }
    }

    /// Classify a standard I/O error; the path is attached with [`IoError::with_path`]
    pub fn from_std(source: std::io::Error) -> Self {
        let kind = match source.kind() {
            std::io::ErrorKind::NotFound => IoErrorKind::FileNotFound,
            std::io::ErrorKind::PermissionDenied => IoErrorKind::PermissionDenied,
            _ => IoErrorKind::Other,
        };

        Self {
            kind,
            path: None,
            source: Some(source),
        }
    }

    pub fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.to_path_buf());
        self
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IoErrorKind::FileNotFound => write!(f, "File not found")?,
            IoErrorKind::PermissionDenied => write!(f, "Permission denied")?,
            IoErrorKind::TimedOut { seconds } => write!(f, "Read timed out after {seconds}s")?,
            IoErrorKind::Other => match &self.source {
                Some(source) => write!(f, "I/O error ({source})")?,
                None => write!(f, "I/O error")?,
            },
        }

        match &self.path {
            Some(path) => write!(f, ": {}", path.display()),
            None => Ok(()),
        }
    }
}
