//! File Hashing CLI Library
//!
//! Building blocks for the `filehash` binary: layered configuration, file
//! discovery, progress rendering and result formatting.

pub mod config;
pub mod file_discovery;
pub mod output;
pub mod progress;
pub mod terminal;
