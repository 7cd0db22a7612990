//! Directory walking with pattern filtering

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::{DiscoveredFile, DiscoveryError, Result, filter::FileFilter};

#[derive(Debug, Clone, Default)]
pub struct FileDiscoveryOptions {
    /// Glob patterns a file must match (empty means all files)
    pub include_patterns: Vec<String>,
    /// Glob patterns that drop a file, overriding includes
    pub exclude_patterns: Vec<String>,
    /// Descend into subdirectories
    pub recursive: bool,
    pub follow_links: bool,
    pub max_depth: Option<usize>,
}

impl FileDiscoveryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_include_patterns(mut self, patterns: Vec<String>) -> Self {
        self.include_patterns = patterns;
        self
    }

    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Streams the files below a directory, sorted by name
pub struct FileDiscovery {
    walker: walkdir::IntoIter,
    filter: FileFilter,
}

impl FileDiscovery {
    pub fn new(path: &Path, options: &FileDiscoveryOptions) -> Result<Self> {
        if !path.exists() {
            return Err(DiscoveryError::PathNotFound(path.to_path_buf()));
        }

        let filter = FileFilter::new(&options.include_patterns, &options.exclude_patterns)?;

        let mut walker = WalkDir::new(path)
            .follow_links(options.follow_links)
            .sort_by_file_name();

        if !options.recursive {
            walker = walker.max_depth(1);
        } else if let Some(depth) = options.max_depth {
            walker = walker.max_depth(depth);
        }

        Ok(Self {
            walker: walker.into_iter(),
            filter,
        })
    }

    fn should_include_entry(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_file() && self.filter.should_include(entry.path())
    }
}

impl Iterator for FileDiscovery {
    type Item = DiscoveredFile;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.walker.next()? {
                Ok(entry) if self.should_include_entry(&entry) => match entry.metadata() {
                    Ok(metadata) => {
                        return Some(DiscoveredFile {
                            path: entry.into_path(),
                            size: metadata.len(),
                        });
                    }
                    Err(e) => {
                        log::warn!("Failed to read metadata for {:?}: {e}", entry.path());
                    }
                },
                Ok(_) => {}
                Err(e) => log::warn!("Walk error: {e}"),
            }
        }
    }
}

/// Expand command line inputs into files, keeping their order
///
/// Files are kept even when they do not match the patterns; only directory
/// contents are filtered.
pub fn discover_inputs(inputs: &[PathBuf], options: &FileDiscoveryOptions) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let before = files.len();
            files.extend(FileDiscovery::new(input, options)?.map(|found| found.path));
            log::debug!(
                "Discovered {} files under {}",
                files.len() - before,
                input.display()
            );
        } else if input.exists() {
            files.push(input.clone());
        } else {
            return Err(DiscoveryError::PathNotFound(input.clone()));
        }
    }

    Ok(files)
}
