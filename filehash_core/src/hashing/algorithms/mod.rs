//! Hash algorithm implementations

use super::HashAlgorithm;
use super::registry::AlgorithmRegistry;
use super::traits::HashAlgorithmImpl;
use std::sync::Arc;

pub(crate) mod crc32;
mod md5;
mod sha1;

/// Register all built-in algorithms with the registry
pub(crate) fn register_all(registry: &mut AlgorithmRegistry) {
    registry.register(md5::Md5Algorithm);
    registry.register(sha1::Sha1Algorithm);
    registry.register(crc32::Crc32Algorithm);
}

/// Construct a built-in algorithm directly, bypassing the registry
pub(crate) fn builtin(algorithm: HashAlgorithm) -> Arc<dyn HashAlgorithmImpl> {
    match algorithm {
        HashAlgorithm::MD5 => Arc::new(md5::Md5Algorithm),
        HashAlgorithm::SHA1 => Arc::new(sha1::Sha1Algorithm),
        HashAlgorithm::CRC32 => Arc::new(crc32::Crc32Algorithm),
    }
}
