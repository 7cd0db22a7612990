//! Progress tracking and reporting
//!
//! [`ProgressTracker`] owns the counters the engine advances and derives
//! the two published fractions from them. [`ProgressProvider`] is the push
//! side: observers that want events instead of polling snapshots.

use crate::identity::FileIdentity;
use crate::record::ResultField;
use serde::{Deserialize, Serialize};

/// Published progress, both fractions in `[0.0, 1.0]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    /// Progress within the file being processed
    pub current_file: f64,
    /// Files finished divided by files scheduled in this batch
    pub total: f64,
}

/// Counters behind [`ProgressState`]
///
/// Fractions are always recomputed from integer counts, so the last step
/// of a file and the last file of a batch land exactly on `1.0`.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    scheduled: usize,
    completed: usize,
    file_steps: usize,
    file_completed_steps: usize,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new batch of `files` files, resetting both fractions
    pub fn begin_batch(&mut self, files: usize) {
        *self = Self {
            scheduled: files,
            ..Self::default()
        };
    }

    /// Grow the current batch
    pub fn extend(&mut self, files: usize) {
        self.scheduled += files;
    }

    /// Start a file with `steps` content steps; `current_file` drops to 0
    pub fn begin_file(&mut self, steps: usize) {
        self.file_steps = steps;
        self.file_completed_steps = 0;
    }

    /// One content step of the current file finished
    pub fn complete_step(&mut self) {
        if self.file_completed_steps < self.file_steps {
            self.file_completed_steps += 1;
        }
    }

    /// The current file is recorded; advances `total`
    pub fn complete_file(&mut self) {
        if self.completed < self.scheduled {
            self.completed += 1;
        }
    }

    /// Forget everything
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn snapshot(&self) -> ProgressState {
        ProgressState {
            current_file: fraction(self.file_completed_steps, self.file_steps),
            total: fraction(self.completed, self.scheduled),
        }
    }
}

fn fraction(done: usize, of: usize) -> f64 {
    if of == 0 {
        0.0
    } else {
        done as f64 / of as f64
    }
}

/// Why a batch stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchOutcome {
    /// Every scheduled file was recorded
    Completed,
    /// Stopped at a file boundary; `unprocessed` files were dropped
    Cancelled { unprocessed: usize },
}

/// Event pushed to a [`ProgressProvider`]
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressUpdate {
    /// Processing of a file began
    FileStarted {
        identity: FileIdentity,
        steps: usize,
    },

    /// A content digest for the current file was recorded
    StepCompleted {
        identity: FileIdentity,
        field: ResultField,
        progress: ProgressState,
    },

    /// A file's record was frozen into the store
    FileCompleted {
        identity: FileIdentity,
        progress: ProgressState,
    },

    /// The worker stopped
    BatchFinished { outcome: BatchOutcome },
}

/// Receives progress events from the engine
///
/// Called from the worker task, never while engine state is locked, so an
/// implementation may call back into the engine.
pub trait ProgressProvider: Send + Sync {
    /// Report a progress update
    fn report(&self, update: ProgressUpdate);

    /// Signal that the worker went idle
    fn complete(&self);
}

/// Null implementation for when no progress is needed
pub struct NullProvider;

impl ProgressProvider for NullProvider {
    fn report(&self, _update: ProgressUpdate) {}

    fn complete(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tracker_is_zero() {
        let tracker = ProgressTracker::new();
        assert_eq!(tracker.snapshot(), ProgressState::default());
    }

    #[test]
    fn test_total_steps_by_file() {
        let mut tracker = ProgressTracker::new();
        tracker.begin_batch(3);

        let mut seen = Vec::new();
        for _ in 0..3 {
            tracker.begin_file(3);
            tracker.complete_file();
            seen.push(tracker.snapshot().total);
        }

        assert_eq!(seen, vec![1.0 / 3.0, 2.0 / 3.0, 1.0]);
    }

    #[test]
    fn test_current_file_steps_and_resets() {
        let mut tracker = ProgressTracker::new();
        tracker.begin_batch(2);
        tracker.begin_file(2);

        tracker.complete_step();
        assert_eq!(tracker.snapshot().current_file, 0.5);
        tracker.complete_step();
        assert_eq!(tracker.snapshot().current_file, 1.0);

        tracker.complete_file();
        tracker.begin_file(3);
        assert_eq!(tracker.snapshot().current_file, 0.0);
    }

    #[test]
    fn test_zero_steps_stays_at_zero() {
        let mut tracker = ProgressTracker::new();
        tracker.begin_batch(1);
        tracker.begin_file(0);
        tracker.complete_step();
        assert_eq!(tracker.snapshot().current_file, 0.0);

        tracker.complete_file();
        assert_eq!(tracker.snapshot().total, 1.0);
    }

    #[test]
    fn test_extend_grows_denominator() {
        let mut tracker = ProgressTracker::new();
        tracker.begin_batch(2);
        tracker.complete_file();
        assert_eq!(tracker.snapshot().total, 0.5);

        tracker.extend(2);
        assert_eq!(tracker.snapshot().total, 0.25);

        tracker.complete_file();
        assert_eq!(tracker.snapshot().total, 0.5);
    }

    #[test]
    fn test_fractions_never_exceed_one() {
        let mut tracker = ProgressTracker::new();
        tracker.begin_batch(1);
        tracker.begin_file(1);
        for _ in 0..3 {
            tracker.complete_step();
            tracker.complete_file();
        }

        let state = tracker.snapshot();
        assert_eq!(state.current_file, 1.0);
        assert_eq!(state.total, 1.0);
    }

    #[test]
    fn test_begin_batch_resets() {
        let mut tracker = ProgressTracker::new();
        tracker.begin_batch(1);
        tracker.begin_file(1);
        tracker.complete_step();
        tracker.complete_file();

        tracker.begin_batch(4);
        assert_eq!(tracker.snapshot(), ProgressState::default());

        tracker.complete_file();
        assert_eq!(tracker.snapshot().total, 0.25);
    }

    #[test]
    fn test_null_provider_accepts_everything() {
        let provider = NullProvider;
        provider.report(ProgressUpdate::BatchFinished {
            outcome: BatchOutcome::Completed,
        });
        provider.complete();
    }
}
