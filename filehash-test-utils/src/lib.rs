//! Test utilities for the file hashing engine
//!
//! This crate provides mock implementations and test builders for testing
//! the engine without touching, or while deliberately touching, the disk.

pub mod builders;
pub mod mocks;

// Re-export commonly used types
pub use builders::TestFileBuilder;
pub use mocks::{MockFileSource, RecordingProvider};
