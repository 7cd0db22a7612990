//! SHA-1 digest provider

use crate::hashing::encode_upper_hex;
use crate::hashing::traits::{HashAlgorithmImpl, StreamingHasher};
use sha1::{Digest as Sha1Digest, Sha1};

pub struct Sha1Algorithm;

/// SHA1 streaming hasher
struct Sha1StreamingHasher {
    hasher: Sha1,
}

impl StreamingHasher for Sha1StreamingHasher {
    fn update(&mut self, data: &[u8]) {
        Sha1Digest::update(&mut self.hasher, data);
    }

    fn finalize(self: Box<Self>) -> String {
        encode_upper_hex(&Sha1Digest::finalize(self.hasher))
    }
}

impl HashAlgorithmImpl for Sha1Algorithm {
    fn id(&self) -> &'static str {
        "sha1"
    }

    fn display_name(&self) -> &'static str {
        "SHA1"
    }

    fn create_hasher(&self) -> Box<dyn StreamingHasher> {
        Box::new(Sha1StreamingHasher {
            hasher: Sha1::new(),
        })
    }
}
