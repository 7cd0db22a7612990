//! Plain text rendering of results
//!
//! One block per file, fields in a fixed order, blocks separated by a blank
//! line:
//!
//! ```text
//! File: /data/abc.txt
//! Size: 3 bytes
//! Version: 1.0.4.0
//! Modified: Mar 07, 2024 at 09:05:03
//! MD5: 900150983CD24FB0D6963F7D28E17F72
//! SHA1: A9993E364706816ABA3E25717850C26C9CD0D89D
//! CRC32: 352441C2
//! ```

use crate::config::AlgorithmConfig;
use crate::error::IoError;
use crate::identity::FileIdentity;
use crate::record::{ResultRecord, ResultStore};
use crate::Result;
use std::io::Write;
use std::path::Path;

/// File name offered when saving results
pub const DEFAULT_EXPORT_FILE_NAME: &str = "hash_results.txt";

/// Lines for one file, `File:` first
///
/// Fields hidden by `visible` are left out; `Size` is always shown when
/// present.
pub fn render_record_lines(
    identity: &FileIdentity,
    record: &ResultRecord,
    visible: &AlgorithmConfig,
) -> Vec<String> {
    std::iter::once(format!("File: {}", identity.path().display()))
        .chain(
            record
                .visible(visible)
                .map(|(field, value)| format!("{}: {value}", field.label())),
        )
        .collect()
}

/// Render the whole store; empty when the store is empty
pub fn render_plain_text(store: &ResultStore, visible: &AlgorithmConfig) -> String {
    if store.is_empty() {
        return String::new();
    }

    let blocks: Vec<String> = store
        .iter()
        .map(|(identity, record)| render_record_lines(identity, record, visible).join("\n"))
        .collect();

    let mut text = blocks.join("\n\n");
    text.push('\n');
    text
}

/// Write the rendered store to `path`
///
/// The text goes to a temporary file in the same directory which is then
/// renamed over `path`, so readers never observe a half written file.
pub fn write_plain_text(path: &Path, store: &ResultStore, visible: &AlgorithmConfig) -> Result<()> {
    let text = render_plain_text(store, visible);
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_EXPORT_FILE_NAME.to_string());
    let staging = dir.join(format!(".{file_name}.{}.tmp", std::process::id()));

    let written = std::fs::File::create(&staging).and_then(|mut file| {
        file.write_all(text.as_bytes())?;
        file.sync_all()
    });

    if let Err(e) = written.and_then(|()| std::fs::rename(&staging, path)) {
        let _ = std::fs::remove_file(&staging);
        return Err(IoError::from_std(e).with_path(path).into());
    }

    log::debug!("Wrote {} record(s) to {}", store.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Check;
    use crate::record::ResultField;
    use tempfile::TempDir;

    fn sample_store() -> ResultStore {
        let mut first = ResultRecord::new();
        first.set(ResultField::Size, "3 bytes");
        first.set(ResultField::Version, "1.0.4.0");
        first.set(ResultField::Date, "Mar 07, 2024 at 09:05:03");
        first.set(ResultField::Md5, "900150983CD24FB0D6963F7D28E17F72");
        first.set(ResultField::Sha1, "A9993E364706816ABA3E25717850C26C9CD0D89D");
        first.set(ResultField::Crc32, "352441C2");

        let mut second = ResultRecord::new();
        second.set(ResultField::Size, "0 bytes");
        second.set(ResultField::Crc32, "00000000");

        let mut store = ResultStore::new();
        store.insert(FileIdentity::from_normalized("/data/abc.txt"), first);
        store.insert(FileIdentity::from_normalized("/data/empty.txt"), second);
        store
    }

    #[test]
    fn test_render_full_shape() {
        let text = render_plain_text(&sample_store(), &AlgorithmConfig::all());
        assert_eq!(
            text,
            "File: /data/abc.txt\n\
             Size: 3 bytes\n\
             Version: 1.0.4.0\n\
             Modified: Mar 07, 2024 at 09:05:03\n\
             MD5: 900150983CD24FB0D6963F7D28E17F72\n\
             SHA1: A9993E364706816ABA3E25717850C26C9CD0D89D\n\
             CRC32: 352441C2\n\
             \n\
             File: /data/empty.txt\n\
             Size: 0 bytes\n\
             CRC32: 00000000\n"
        );
    }

    #[test]
    fn test_render_respects_visibility() {
        let visible = AlgorithmConfig::from_checks(&[Check::Md5]);
        let store = sample_store();
        let (identity, record) = store.iter().next().unwrap();

        assert_eq!(
            render_record_lines(identity, record, &visible),
            vec![
                "File: /data/abc.txt",
                "Size: 3 bytes",
                "MD5: 900150983CD24FB0D6963F7D28E17F72"
            ]
        );
    }

    #[test]
    fn test_render_empty_store() {
        assert_eq!(
            render_plain_text(&ResultStore::new(), &AlgorithmConfig::all()),
            ""
        );
    }

    #[test]
    fn test_write_plain_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE_NAME);
        let store = sample_store();

        write_plain_text(&path, &store, &AlgorithmConfig::all()).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, render_plain_text(&store, &AlgorithmConfig::all()));

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("out.txt");
        assert!(write_plain_text(&path, &sample_store(), &AlgorithmConfig::all()).is_err());
    }
}
