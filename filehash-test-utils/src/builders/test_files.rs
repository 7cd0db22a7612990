//! Real files on disk for end-to-end tests

use filehash_core::{Error, Result, error::IoError};
use std::path::{Path, PathBuf};

/// Creates files under a base directory and removes them on drop
pub struct TestFileBuilder {
    base_dir: PathBuf,
    generated_files: Vec<PathBuf>,
}

impl TestFileBuilder {
    /// Create a new test file builder
    pub fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            generated_files: Vec::new(),
        }
    }

    /// Write a file with the given content
    pub fn create_file(&mut self, name: &str, content: &[u8]) -> Result<PathBuf> {
        let file_path = self.base_dir.join(name);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Io(IoError::from_std(e).with_path(parent)))?;
        }

        std::fs::write(&file_path, content)
            .map_err(|e| Error::Io(IoError::from_std(e).with_path(&file_path)))?;

        self.generated_files.push(file_path.clone());
        Ok(file_path)
    }

    /// Write a file of `size` pseudo-random bytes derived from `seed`
    pub fn generate_deterministic_file(
        &mut self,
        name: &str,
        size: usize,
        seed: u32,
    ) -> Result<PathBuf> {
        let mut content = Vec::with_capacity(size);
        let mut state = seed;

        for _ in 0..size {
            content.push((state >> 16) as u8);
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
        }

        self.create_file(name, &content)
    }

    /// Files created so far
    pub fn files(&self) -> &[PathBuf] {
        &self.generated_files
    }

    /// Clean up all generated files
    pub fn cleanup(&mut self) {
        for file_path in &self.generated_files {
            let _ = std::fs::remove_file(file_path);
        }
        self.generated_files.clear();
    }
}

impl Drop for TestFileBuilder {
    fn drop(&mut self) {
        self.cleanup();
    }
}
