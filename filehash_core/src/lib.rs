//! File Hashing Core Library
//!
//! Computes size, modification date, a version tag and content digests
//! (MD5, SHA-1, CRC32) for files, one file at a time on a background task,
//! with per-file and aggregate progress and cooperative cancellation.

pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod hashing;
pub mod identity;
pub mod metadata;
pub mod progress;
pub mod record;

// Re-export main types
pub use config::{AlgorithmConfig, Check, DateZone, EngineOptions};
pub use engine::{EngineStatus, HashingEngine, HashingEngineBuilder, SubmitReceipt, VERSION_TAG};
pub use error::{Error, Result};
pub use export::{DEFAULT_EXPORT_FILE_NAME, render_plain_text, write_plain_text};
pub use hashing::{HashAlgorithm, crc32, format_crc32};
pub use identity::FileIdentity;
pub use metadata::{FileMetadata, FileSource, LocalFileSource};
pub use progress::{
    BatchOutcome, NullProvider, ProgressProvider, ProgressState, ProgressTracker, ProgressUpdate,
};
pub use record::{ResultField, ResultRecord, ResultStore};
