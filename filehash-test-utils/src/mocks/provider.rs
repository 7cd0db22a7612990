//! Progress provider that records every event

use filehash_core::{FileIdentity, ProgressProvider, ProgressUpdate};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

type Hook = Box<dyn Fn(&ProgressUpdate) + Send + Sync>;

/// Records progress updates for later assertions
///
/// An optional hook runs on every update, after it is recorded. Tests use it
/// to act at an exact point of the batch, e.g. cancel right after a given
/// file completes.
#[derive(Default)]
pub struct RecordingProvider {
    updates: Mutex<Vec<ProgressUpdate>>,
    completions: AtomicUsize,
    hook: Option<Hook>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `hook` on every update
    pub fn with_hook<F>(hook: F) -> Self
    where
        F: Fn(&ProgressUpdate) + Send + Sync + 'static,
    {
        Self {
            hook: Some(Box::new(hook)),
            ..Self::default()
        }
    }

    /// All updates so far
    pub fn updates(&self) -> Vec<ProgressUpdate> {
        self.updates.lock().unwrap().clone()
    }

    /// `total` after each file completed
    pub fn total_values(&self) -> Vec<f64> {
        self.updates()
            .into_iter()
            .filter_map(|update| match update {
                ProgressUpdate::FileCompleted { progress, .. } => Some(progress.total),
                _ => None,
            })
            .collect()
    }

    /// `current_file` after each step of `identity`
    pub fn step_values(&self, identity: &FileIdentity) -> Vec<f64> {
        self.updates()
            .into_iter()
            .filter_map(|update| match update {
                ProgressUpdate::StepCompleted {
                    identity: stepped,
                    progress,
                    ..
                } if &stepped == identity => Some(progress.current_file),
                _ => None,
            })
            .collect()
    }

    /// Files in the order they completed
    pub fn completed_files(&self) -> Vec<FileIdentity> {
        self.updates()
            .into_iter()
            .filter_map(|update| match update {
                ProgressUpdate::FileCompleted { identity, .. } => Some(identity),
                _ => None,
            })
            .collect()
    }

    /// Number of times the worker went idle
    pub fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }
}

impl ProgressProvider for RecordingProvider {
    fn report(&self, update: ProgressUpdate) {
        self.updates.lock().unwrap().push(update.clone());
        if let Some(hook) = &self.hook {
            hook(&update);
        }
    }

    fn complete(&self) {
        self.completions.fetch_add(1, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for RecordingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingProvider")
            .field("updates", &self.updates.lock().unwrap().len())
            .field("completions", &self.completions())
            .finish()
    }
}
