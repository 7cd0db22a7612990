//! Per-file results and the store that accumulates them

use crate::config::{AlgorithmConfig, Check};
use crate::hashing::HashAlgorithm;
use crate::identity::FileIdentity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A field of a [`ResultRecord`], ordered the way it is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResultField {
    Size,
    Version,
    Date,
    #[serde(rename = "MD5")]
    Md5,
    #[serde(rename = "SHA1")]
    Sha1,
    #[serde(rename = "CRC32")]
    Crc32,
}

impl ResultField {
    /// Every field in display order
    pub const ALL: [ResultField; 6] = [
        ResultField::Size,
        ResultField::Version,
        ResultField::Date,
        ResultField::Md5,
        ResultField::Sha1,
        ResultField::Crc32,
    ];

    /// Stable key used in records and machine readable output
    pub fn key(&self) -> &'static str {
        match self {
            ResultField::Size => "Size",
            ResultField::Version => "Version",
            ResultField::Date => "Date",
            ResultField::Md5 => "MD5",
            ResultField::Sha1 => "SHA1",
            ResultField::Crc32 => "CRC32",
        }
    }

    /// Human readable label used in plain text output
    pub fn label(&self) -> &'static str {
        match self {
            ResultField::Date => "Modified",
            other => other.key(),
        }
    }

    /// The check that produces this field; `Size` is unconditional
    pub fn check(&self) -> Option<Check> {
        match self {
            ResultField::Size => None,
            ResultField::Version => Some(Check::Version),
            ResultField::Date => Some(Check::Date),
            ResultField::Md5 => Some(Check::Md5),
            ResultField::Sha1 => Some(Check::Sha1),
            ResultField::Crc32 => Some(Check::Crc32),
        }
    }

    /// Whether the field should be shown under the given toggles
    pub fn is_visible(&self, visible: &AlgorithmConfig) -> bool {
        self.check().is_none_or(|check| visible.is_enabled(check))
    }
}

impl From<HashAlgorithm> for ResultField {
    fn from(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::MD5 => ResultField::Md5,
            HashAlgorithm::SHA1 => ResultField::Sha1,
            HashAlgorithm::CRC32 => ResultField::Crc32,
        }
    }
}

impl std::fmt::Display for ResultField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// The fields computed for one file
///
/// A field that failed to compute is simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRecord {
    fields: BTreeMap<ResultField, String>,
}

impl ResultRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: ResultField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn get(&self, field: ResultField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: ResultField) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in display order
    pub fn iter(&self) -> impl Iterator<Item = (ResultField, &str)> {
        self.fields.iter().map(|(field, value)| (*field, value.as_str()))
    }

    /// Fields in display order, restricted to the visible ones
    pub fn visible<'a>(
        &'a self,
        visible: &'a AlgorithmConfig,
    ) -> impl Iterator<Item = (ResultField, &'a str)> + 'a {
        self.iter().filter(move |(field, _)| field.is_visible(visible))
    }
}

/// Insertion-ordered map of file identity to result record
///
/// Once a file has a record, it is never overwritten. Removing it is the
/// only way to make the file eligible for hashing again.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultStore {
    entries: Vec<(FileIdentity, ResultRecord)>,
    #[serde(skip)]
    index: HashMap<FileIdentity, usize>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identity: &FileIdentity) -> bool {
        self.index.contains_key(identity)
    }

    pub fn get(&self, identity: &FileIdentity) -> Option<&ResultRecord> {
        self.index.get(identity).map(|&at| &self.entries[at].1)
    }

    /// Record results for a file
    ///
    /// Returns `false` and leaves the store untouched if the file already
    /// has a record.
    pub(crate) fn insert(&mut self, identity: FileIdentity, record: ResultRecord) -> bool {
        if self.index.contains_key(&identity) {
            return false;
        }
        self.index.insert(identity.clone(), self.entries.len());
        self.entries.push((identity, record));
        true
    }

    /// Forget a file's record, returning it
    pub fn remove(&mut self, identity: &FileIdentity) -> Option<ResultRecord> {
        let at = self.index.remove(identity)?;
        let (_, record) = self.entries.remove(at);
        for position in self.index.values_mut() {
            if *position > at {
                *position -= 1;
            }
        }
        Some(record)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records in the order files finished
    pub fn iter(&self) -> impl Iterator<Item = (&FileIdentity, &ResultRecord)> {
        self.entries.iter().map(|(identity, record)| (identity, record))
    }
}

impl PartialEq for ResultStore {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for ResultStore {}
