//! Include/exclude filtering with compiled glob sets

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

use super::{DiscoveryError, Result};

#[derive(Debug, Clone)]
pub struct PatternMatcher {
    globset: GlobSet,
    patterns: Vec<String>,
}

impl PatternMatcher {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();

        for pattern in patterns {
            let glob = Glob::new(pattern)
                .map_err(|e| DiscoveryError::InvalidPattern(format!("{pattern}: {e}")))?;
            builder.add(glob);
        }

        let globset = builder
            .build()
            .map_err(|e| DiscoveryError::InvalidPattern(e.to_string()))?;

        Ok(Self {
            globset,
            patterns: patterns.to_vec(),
        })
    }

    /// Match against the full path or just the file name
    pub fn matches(&self, path: &Path) -> bool {
        self.globset.is_match(path)
            || path
                .file_name()
                .is_some_and(|name| self.globset.is_match(name))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// Excludes always win over includes; no includes means include everything
#[derive(Debug)]
pub struct FileFilter {
    include_matcher: Option<PatternMatcher>,
    exclude_matcher: Option<PatternMatcher>,
}

impl FileFilter {
    pub fn new(include_patterns: &[String], exclude_patterns: &[String]) -> Result<Self> {
        let include_matcher = if include_patterns.is_empty() {
            None
        } else {
            Some(PatternMatcher::new(include_patterns)?)
        };

        let exclude_matcher = if exclude_patterns.is_empty() {
            None
        } else {
            Some(PatternMatcher::new(exclude_patterns)?)
        };

        Ok(Self {
            include_matcher,
            exclude_matcher,
        })
    }

    pub fn should_include(&self, path: &Path) -> bool {
        if let Some(ref exclude) = self.exclude_matcher
            && exclude.matches(path)
        {
            return false;
        }

        match self.include_matcher {
            Some(ref include) => include.matches(path),
            None => true,
        }
    }
}
