//! Content digest functionality
//!
//! Every content check (MD5, SHA-1, CRC32) is a [`HashAlgorithmImpl`]
//! registered in the global [`AlgorithmRegistry`]. The engine resolves a
//! [`HashAlgorithm`] to its implementation and hashes a file's full content
//! in one call.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;

mod algorithms;
mod registry;
mod traits;

pub use algorithms::crc32::{Crc32, crc32, format_crc32};
pub use registry::AlgorithmRegistry;
pub use traits::{HashAlgorithmExt, HashAlgorithmImpl, StreamingHasher};

/// Content-dependent checks, in the order the engine runs them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// MD5 digest (16 bytes)
    MD5,
    /// SHA-1 digest (20 bytes)
    SHA1,
    /// Reflected CRC-32 checksum (4 bytes)
    CRC32,
}

impl HashAlgorithm {
    /// All content checks in processing order
    pub const ALL: [HashAlgorithm; 3] = [
        HashAlgorithm::MD5,
        HashAlgorithm::SHA1,
        HashAlgorithm::CRC32,
    ];

    /// Hash a byte slice and return the uppercase hex rendering
    pub fn digest_hex(&self, data: &[u8]) -> String {
        self.to_impl().hash_bytes(data)
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashAlgorithm::MD5 => write!(f, "md5"),
            HashAlgorithm::SHA1 => write!(f, "sha1"),
            HashAlgorithm::CRC32 => write!(f, "crc32"),
        }
    }
}

impl HashAlgorithmExt for HashAlgorithm {
    fn to_impl(&self) -> Arc<dyn HashAlgorithmImpl> {
        AlgorithmRegistry::global().resolve(*self)
    }
}

/// Render bytes as uppercase hexadecimal, two zero-padded digits per byte
pub fn encode_upper_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // Writing to a String cannot fail
        let _ = write!(out, "{byte:02X}");
    }
    out
}
