//! File metadata and content access
//!
//! The engine never touches the file system directly. It goes through a
//! [`FileSource`], which lets tests substitute an in-memory implementation.

use crate::config::{DateZone, EngineOptions};
use crate::identity::FileIdentity;
use crate::{Result, error::IoError};
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use std::time::{Duration, SystemTime};

/// Fixed layout for the `Date` field, e.g. `Mar 07, 2024 at 09:05:03`
pub const DATE_FORMAT: &str = "%b %d, %Y at %H:%M:%S";

/// What a successful stat returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// Source of file metadata and content
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Stat a file
    async fn metadata(&self, identity: &FileIdentity) -> Result<FileMetadata>;

    /// Read a file's full content
    async fn read(&self, identity: &FileIdentity) -> Result<Vec<u8>>;
}

/// [`FileSource`] backed by the local file system
#[derive(Debug, Clone, Default)]
pub struct LocalFileSource {
    read_timeout: Option<Duration>,
}

impl LocalFileSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source honoring the engine's read timeout
    pub fn from_options(options: &EngineOptions) -> Self {
        Self {
            read_timeout: options.read_timeout(),
        }
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl FileSource for LocalFileSource {
    async fn metadata(&self, identity: &FileIdentity) -> Result<FileMetadata> {
        let path = identity.path();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| IoError::from_std(e).with_path(path))?;

        Ok(FileMetadata {
            size: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }

    async fn read(&self, identity: &FileIdentity) -> Result<Vec<u8>> {
        let path = identity.path();
        let read = tokio::fs::read(path);

        let content = match self.read_timeout {
            Some(limit) => tokio::time::timeout(limit, read)
                .await
                .map_err(|_| IoError::timed_out(path, limit.as_secs()))?,
            None => read.await,
        };

        Ok(content.map_err(|e| IoError::from_std(e).with_path(path))?)
    }
}

/// Render a size as `"<N> bytes"`
pub fn format_size(bytes: u64) -> String {
    format!("{bytes} bytes")
}

/// Render a timestamp with [`DATE_FORMAT`]
pub fn format_modified<Tz>(instant: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    instant.format(DATE_FORMAT).to_string()
}

/// Render a file system timestamp in the configured zone
pub fn format_system_time(instant: SystemTime, zone: DateZone) -> String {
    match zone {
        DateZone::Local => format_modified(&DateTime::<Local>::from(instant)),
        DateZone::Utc => format_modified(&DateTime::<Utc>::from(instant)),
    }
}
