//! In-memory file source

use async_trait::async_trait;
use filehash_core::{Error, FileIdentity, FileMetadata, FileSource, Result, error::IoError};
use std::collections::HashMap;
use std::io;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
enum MockEntry {
    File {
        content: Vec<u8>,
        modified: Option<SystemTime>,
    },
    /// Stat succeeds, reading fails
    Unreadable {
        size: u64,
        modified: Option<SystemTime>,
    },
}

/// Mock [`FileSource`] serving files from memory
///
/// Paths are used as given, without normalization. Every read is logged so
/// tests can assert that nothing was hashed twice.
#[derive(Debug, Default)]
pub struct MockFileSource {
    entries: Mutex<HashMap<FileIdentity, MockEntry>>,
    reads: Mutex<Vec<FileIdentity>>,
    read_delay: Option<Duration>,
}

impl MockFileSource {
    /// Create an empty mock file source
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long on every read, to keep the worker busy
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    /// Add a readable file modified at the Unix epoch
    pub fn add_file(&self, path: &str, content: &[u8]) -> FileIdentity {
        self.add_file_modified(path, content, Some(SystemTime::UNIX_EPOCH))
    }

    /// Add a readable file with a specific modification time
    pub fn add_file_modified(
        &self,
        path: &str,
        content: &[u8],
        modified: Option<SystemTime>,
    ) -> FileIdentity {
        self.insert(
            path,
            MockEntry::File {
                content: content.to_vec(),
                modified,
            },
        )
    }

    /// Add a file whose metadata is available but whose content is not
    pub fn add_unreadable(&self, path: &str, size: u64) -> FileIdentity {
        self.insert(
            path,
            MockEntry::Unreadable {
                size,
                modified: Some(SystemTime::UNIX_EPOCH),
            },
        )
    }

    /// Identity for a path that is not in the source
    pub fn missing(&self, path: &str) -> FileIdentity {
        FileIdentity::from_normalized(path)
    }

    /// Every read so far, in order
    pub fn read_log(&self) -> Vec<FileIdentity> {
        self.reads.lock().unwrap().clone()
    }

    /// How often a file was read
    pub fn reads_of(&self, identity: &FileIdentity) -> usize {
        self.reads
            .lock()
            .unwrap()
            .iter()
            .filter(|read| *read == identity)
            .count()
    }

    fn insert(&self, path: &str, entry: MockEntry) -> FileIdentity {
        let identity = FileIdentity::from_normalized(path);
        self.entries
            .lock()
            .unwrap()
            .insert(identity.clone(), entry);
        identity
    }

    fn entry(&self, identity: &FileIdentity) -> Result<MockEntry> {
        self.entries
            .lock()
            .unwrap()
            .get(identity)
            .cloned()
            .ok_or_else(|| {
                let missing = io::Error::new(io::ErrorKind::NotFound, "mock: no such file");
                Error::Io(IoError::from_std(missing).with_path(identity.path()))
            })
    }
}

#[async_trait]
impl FileSource for MockFileSource {
    async fn metadata(&self, identity: &FileIdentity) -> Result<FileMetadata> {
        Ok(match self.entry(identity)? {
            MockEntry::File { content, modified } => FileMetadata {
                size: content.len() as u64,
                modified,
            },
            MockEntry::Unreadable { size, modified } => FileMetadata { size, modified },
        })
    }

    async fn read(&self, identity: &FileIdentity) -> Result<Vec<u8>> {
        self.reads.lock().unwrap().push(identity.clone());
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }

        match self.entry(identity)? {
            MockEntry::File { content, .. } => Ok(content),
            MockEntry::Unreadable { .. } => {
                let denied = io::Error::new(io::ErrorKind::PermissionDenied, "mock: unreadable");
                Err(Error::Io(IoError::from_std(denied).with_path(identity.path())))
            }
        }
    }
}
