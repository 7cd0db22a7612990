//! Check selection and engine options
//!
//! [`AlgorithmConfig`] is captured by value when files are submitted, so
//! flipping a toggle afterwards never affects work that is already queued.

use crate::hashing::HashAlgorithm;
use crate::{Error, Result, error::ValidationError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single user-selectable check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Check {
    Version,
    Date,
    Md5,
    Sha1,
    Crc32,
}

impl Check {
    /// All checks in the order they are presented to the user
    pub const ALL: [Check; 5] = [
        Check::Version,
        Check::Date,
        Check::Md5,
        Check::Sha1,
        Check::Crc32,
    ];
}

impl std::fmt::Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Check::Version => "version",
            Check::Date => "date",
            Check::Md5 => "md5",
            Check::Sha1 => "sha1",
            Check::Crc32 => "crc32",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Check {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "version" => Ok(Check::Version),
            "date" | "modified" => Ok(Check::Date),
            "md5" => Ok(Check::Md5),
            "sha1" | "sha-1" => Ok(Check::Sha1),
            "crc32" | "crc-32" => Ok(Check::Crc32),
            other => Err(Error::Validation(ValidationError::unknown_check(other))),
        }
    }
}

/// Immutable snapshot of which checks to run for a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmConfig {
    pub include_version: bool,
    pub include_date: bool,
    pub include_md5: bool,
    pub include_sha1: bool,
    pub include_crc32: bool,
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self::all()
    }
}

impl AlgorithmConfig {
    /// Every check enabled
    pub fn all() -> Self {
        Self {
            include_version: true,
            include_date: true,
            include_md5: true,
            include_sha1: true,
            include_crc32: true,
        }
    }

    /// Every check disabled; only `Size` is recorded
    pub fn none() -> Self {
        Self {
            include_version: false,
            include_date: false,
            include_md5: false,
            include_sha1: false,
            include_crc32: false,
        }
    }

    /// Enable exactly the given checks
    pub fn from_checks(checks: &[Check]) -> Self {
        checks
            .iter()
            .fold(Self::none(), |config, check| config.with(*check, true))
    }

    /// Parse a comma separated list such as `"md5,sha1"`
    pub fn parse_list(list: &str) -> Result<Self> {
        let checks = list
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Check>>>()?;
        Ok(Self::from_checks(&checks))
    }

    /// Return a copy with one check switched on or off
    pub fn with(mut self, check: Check, enabled: bool) -> Self {
        match check {
            Check::Version => self.include_version = enabled,
            Check::Date => self.include_date = enabled,
            Check::Md5 => self.include_md5 = enabled,
            Check::Sha1 => self.include_sha1 = enabled,
            Check::Crc32 => self.include_crc32 = enabled,
        }
        self
    }

    /// Whether a check is enabled
    pub fn is_enabled(&self, check: Check) -> bool {
        match check {
            Check::Version => self.include_version,
            Check::Date => self.include_date,
            Check::Md5 => self.include_md5,
            Check::Sha1 => self.include_sha1,
            Check::Crc32 => self.include_crc32,
        }
    }

    /// Whether a content digest is enabled
    pub fn includes(&self, algorithm: HashAlgorithm) -> bool {
        match algorithm {
            HashAlgorithm::MD5 => self.include_md5,
            HashAlgorithm::SHA1 => self.include_sha1,
            HashAlgorithm::CRC32 => self.include_crc32,
        }
    }

    /// Enabled content digests, in processing order (MD5, SHA1, CRC32)
    pub fn enabled_digests(&self) -> Vec<HashAlgorithm> {
        HashAlgorithm::ALL
            .into_iter()
            .filter(|algorithm| self.includes(*algorithm))
            .collect()
    }

    /// Number of enabled content digests; the per-file progress denominator
    pub fn digest_count(&self) -> usize {
        self.enabled_digests().len()
    }
}

/// Time zone used to render the `Date` field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateZone {
    #[default]
    Local,
    Utc,
}

/// Engine-wide options that are not part of a submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Give up on reading a file's content after this many seconds
    pub read_timeout_seconds: Option<u64>,
    /// Time zone for the `Date` field
    pub time_zone: DateZone,
}

impl EngineOptions {
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout_seconds = Some(timeout.as_secs().max(1));
        self
    }

    pub fn with_time_zone(mut self, zone: DateZone) -> Self {
        self.time_zone = zone;
        self
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_seconds.map(Duration::from_secs)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.read_timeout_seconds == Some(0) {
            return Err(Error::Validation(ValidationError::invalid_parameter(
                "read_timeout_seconds",
                "must be greater than 0",
            )));
        }
        Ok(())
    }
}
