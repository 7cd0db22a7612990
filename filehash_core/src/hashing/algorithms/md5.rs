//! MD5 digest provider

use crate::hashing::encode_upper_hex;
use crate::hashing::traits::{HashAlgorithmImpl, StreamingHasher};
use md5::{Digest as Md5Digest, Md5};

pub struct Md5Algorithm;

/// MD5 streaming hasher
struct Md5StreamingHasher {
    hasher: Md5,
}

impl StreamingHasher for Md5StreamingHasher {
    fn update(&mut self, data: &[u8]) {
        Md5Digest::update(&mut self.hasher, data);
    }

    fn finalize(self: Box<Self>) -> String {
        encode_upper_hex(&Md5Digest::finalize(self.hasher))
    }
}

impl HashAlgorithmImpl for Md5Algorithm {
    fn id(&self) -> &'static str {
        "md5"
    }

    fn display_name(&self) -> &'static str {
        "MD5"
    }

    fn create_hasher(&self) -> Box<dyn StreamingHasher> {
        Box::new(Md5StreamingHasher { hasher: Md5::new() })
    }
}
