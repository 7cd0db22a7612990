//! Terminal rendering of engine progress
//!
//! Two bars: the file being hashed and the whole batch. Both run from 0 to
//! 100 and follow the engine's fractions directly.

use colored::*;
use filehash_core::{BatchOutcome, ProgressState, ProgressUpdate};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use super::utils::format_duration;

const BAR_LENGTH: u64 = 100;

/// Drain `rx` until the provider completes, then print a summary line
pub async fn render_progress(mut rx: mpsc::Receiver<ProgressUpdate>) -> Option<BatchOutcome> {
    let mut renderer = ProgressRenderer::new();

    while let Some(update) = rx.recv().await {
        renderer.handle_update(update);
    }

    renderer.finish();
    renderer.outcome()
}

pub struct ProgressRenderer {
    multi: MultiProgress,
    file_bar: ProgressBar,
    total_bar: ProgressBar,
    files_completed: usize,
    outcome: Option<BatchOutcome>,
    start_time: Instant,
}

impl Default for ProgressRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressRenderer {
    /// Renderer drawing to stderr
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Renderer that tracks state without drawing
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let multi = MultiProgress::with_draw_target(target);
        let file_bar = multi.add(ProgressBar::new(BAR_LENGTH));
        let total_bar = multi.add(ProgressBar::new(BAR_LENGTH));

        let style = ProgressStyle::default_bar()
            .template("{prefix:>6} [{bar:40.cyan/blue}] {percent:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        file_bar.set_style(style.clone());
        total_bar.set_style(style);
        file_bar.set_prefix("File");
        total_bar.set_prefix("Total");
        total_bar.enable_steady_tick(Duration::from_millis(200));

        Self {
            multi,
            file_bar,
            total_bar,
            files_completed: 0,
            outcome: None,
            start_time: Instant::now(),
        }
    }

    pub fn handle_update(&mut self, update: ProgressUpdate) {
        match update {
            ProgressUpdate::FileStarted { identity, steps } => {
                self.file_bar.set_position(0);
                let name = identity
                    .path()
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| identity.to_string());
                if steps == 0 {
                    self.file_bar.set_message(name.cyan().to_string());
                } else {
                    self.file_bar
                        .set_message(format!("{} ({steps} digests)", name.cyan()));
                }
            }

            ProgressUpdate::StepCompleted {
                field, progress, ..
            } => {
                self.apply(progress);
                self.total_bar.set_message(field.label().dimmed().to_string());
            }

            ProgressUpdate::FileCompleted { progress, .. } => {
                self.files_completed += 1;
                self.apply(progress);
                self.total_bar
                    .set_message(format!("{} files", self.files_completed));
            }

            ProgressUpdate::BatchFinished { outcome } => {
                self.outcome = Some(outcome);
            }
        }
    }

    fn apply(&self, progress: ProgressState) {
        self.file_bar.set_position(to_position(progress.current_file));
        self.total_bar.set_position(to_position(progress.total));
    }

    pub fn file_position(&self) -> u64 {
        self.file_bar.position()
    }

    pub fn total_position(&self) -> u64 {
        self.total_bar.position()
    }

    pub fn files_completed(&self) -> usize {
        self.files_completed
    }

    /// Outcome of the last finished batch
    pub fn outcome(&self) -> Option<BatchOutcome> {
        self.outcome
    }

    /// Clear the bars and print a summary to stderr
    pub fn finish(&self) {
        self.file_bar.finish_and_clear();
        self.total_bar.finish_and_clear();
        let _ = self.multi.clear();

        if self.multi.is_hidden() {
            return;
        }

        let elapsed = format_duration(self.start_time.elapsed());
        match self.outcome {
            Some(BatchOutcome::Cancelled { unprocessed }) => eprintln!(
                "{} {} files hashed, {unprocessed} skipped in {elapsed}",
                "Cancelled:".yellow().bold(),
                self.files_completed
            ),
            _ => eprintln!(
                "{} {} files hashed in {elapsed}",
                "Done:".green().bold(),
                self.files_completed
            ),
        }
    }
}

fn to_position(fraction: f64) -> u64 {
    (fraction.clamp(0.0, 1.0) * BAR_LENGTH as f64).round() as u64
}
