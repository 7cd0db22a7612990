//! CRC-32 codec
//!
//! Reflected CRC-32 (polynomial `0xEDB88320`, init and final XOR
//! `0xFFFFFFFF`) computed bit by bit, without a lookup table. This is the
//! checksum used by zip, gzip and Ethernet; the check value for the ASCII
//! bytes `"123456789"` is `0xCBF43926`.

use crate::hashing::traits::{HashAlgorithmImpl, StreamingHasher};

const POLYNOMIAL: u32 = 0xEDB8_8320;
const INITIAL: u32 = 0xFFFF_FFFF;
const FINAL_XOR: u32 = 0xFFFF_FFFF;

/// Compute the CRC-32 checksum of a byte sequence
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update(data);
    crc.finalize()
}

/// Render a checksum as 8 uppercase, zero-padded hex digits
pub fn format_crc32(value: u32) -> String {
    format!("{value:08X}")
}

/// Incremental CRC-32 state
#[derive(Debug, Clone, Copy)]
pub struct Crc32 {
    accumulator: u32,
}

impl Crc32 {
    pub fn new() -> Self {
        Self {
            accumulator: INITIAL,
        }
    }

    /// Feed more bytes into the checksum
    pub fn update(&mut self, data: &[u8]) {
        let mut crc = self.accumulator;
        for &byte in data {
            crc ^= u32::from(byte);
            for _ in 0..8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ POLYNOMIAL;
                } else {
                    crc >>= 1;
                }
            }
        }
        self.accumulator = crc;
    }

    /// Final checksum value; the state itself is left untouched
    pub fn finalize(&self) -> u32 {
        self.accumulator ^ FINAL_XOR
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Crc32Algorithm;

/// CRC32 streaming hasher
struct Crc32StreamingHasher {
    state: Crc32,
}

impl StreamingHasher for Crc32StreamingHasher {
    fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    fn finalize(self: Box<Self>) -> String {
        format_crc32(self.state.finalize())
    }
}

impl HashAlgorithmImpl for Crc32Algorithm {
    fn id(&self) -> &'static str {
        "crc32"
    }

    fn display_name(&self) -> &'static str {
        "CRC32"
    }

    fn create_hasher(&self) -> Box<dyn StreamingHasher> {
        Box::new(Crc32StreamingHasher {
            state: Crc32::new(),
        })
    }
}
