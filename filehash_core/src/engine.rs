//! The hashing engine
//!
//! A single background worker drains a queue of files, one file at a time
//! and one digest at a time. All shared state sits behind one mutex and every
//! mutation happens in a single critical section, so readers of
//! [`HashingEngine::snapshot_progress`] and [`HashingEngine::snapshot_results`]
//! only ever see fully formed states.
//!
//! Cancellation is cooperative: the flag is checked before each file is
//! taken from the queue, never while a file is being hashed.

use crate::config::{AlgorithmConfig, EngineOptions};
use crate::error::InternalError;
use crate::identity::FileIdentity;
use crate::metadata::{FileSource, LocalFileSource, format_size, format_system_time};
use crate::progress::{
    BatchOutcome, NullProvider, ProgressProvider, ProgressState, ProgressTracker, ProgressUpdate,
};
use crate::record::{ResultField, ResultRecord, ResultStore};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Value of the `Version` field
pub const VERSION_TAG: &str = "1.0.4.0";

/// Lifecycle of the worker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineStatus {
    /// Nothing has been submitted yet, or everything was cleared
    #[default]
    Idle,
    /// A batch is being processed
    Running,
    /// The last batch stopped
    Finished(BatchOutcome),
}

impl EngineStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, EngineStatus::Running)
    }
}

/// What a call to [`HashingEngine::submit`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// Files added to the work list
    pub scheduled: usize,
    /// Files left out because they are already recorded, queued or in flight
    pub skipped: usize,
}

struct Job {
    identity: FileIdentity,
    config: AlgorithmConfig,
    batch: u64,
    epoch: u64,
}

#[derive(Default)]
struct EngineState {
    store: ResultStore,
    queue: VecDeque<Job>,
    in_flight: Option<FileIdentity>,
    progress: ProgressTracker,
    cancel_requested: bool,
    worker_running: bool,
    /// Bumped whenever a fresh batch starts; stale jobs leave progress alone
    batch: u64,
    /// Bumped by `clear`; stale jobs are not recorded
    epoch: u64,
}

impl EngineState {
    fn is_pending(&self, identity: &FileIdentity) -> bool {
        self.store.contains(identity)
            || self.in_flight.as_ref() == Some(identity)
            || (!self.cancel_requested && self.queue.iter().any(|job| &job.identity == identity))
    }
}

struct EngineInner {
    source: Arc<dyn FileSource>,
    options: EngineOptions,
    provider: Arc<dyn ProgressProvider>,
    state: Mutex<EngineState>,
    status: watch::Sender<EngineStatus>,
}

impl EngineInner {
    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Builder for [`HashingEngine`]
#[derive(Default)]
pub struct HashingEngineBuilder {
    source: Option<Arc<dyn FileSource>>,
    options: EngineOptions,
    provider: Option<Arc<dyn ProgressProvider>>,
}

impl HashingEngineBuilder {
    /// Read files through a custom source instead of the local file system
    pub fn source(mut self, source: Arc<dyn FileSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn progress_provider(mut self, provider: Arc<dyn ProgressProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn build(self) -> Result<HashingEngine> {
        self.options.validate()?;

        let source = self
            .source
            .unwrap_or_else(|| Arc::new(LocalFileSource::from_options(&self.options)));
        let provider = self.provider.unwrap_or_else(|| Arc::new(NullProvider));
        let (status, _) = watch::channel(EngineStatus::Idle);

        Ok(HashingEngine {
            inner: Arc::new(EngineInner {
                source,
                options: self.options,
                provider,
                state: Mutex::new(EngineState::default()),
                status,
            }),
        })
    }
}

/// Computes per-file results in the background
///
/// Cloning is cheap and every clone drives the same engine, which is how a
/// signal handler gets a handle to call [`cancel`](Self::cancel) on.
#[derive(Clone)]
pub struct HashingEngine {
    inner: Arc<EngineInner>,
}

impl HashingEngine {
    /// Engine reading the local file system with default options
    pub fn new() -> Self {
        let (status, _) = watch::channel(EngineStatus::Idle);
        Self {
            inner: Arc::new(EngineInner {
                source: Arc::new(LocalFileSource::new()),
                options: EngineOptions::default(),
                provider: Arc::new(NullProvider),
                state: Mutex::new(EngineState::default()),
                status,
            }),
        }
    }

    pub fn builder() -> HashingEngineBuilder {
        HashingEngineBuilder::default()
    }

    /// Queue files for hashing
    ///
    /// Files that already have a record, are queued, or are being hashed are
    /// skipped, as are repeats within `files`. The rest are appended to the
    /// running batch, or start a new one. Returns as soon as the work is
    /// queued; processing happens on a task spawned on the current Tokio
    /// runtime.
    pub fn submit<I>(&self, files: I, config: AlgorithmConfig) -> Result<SubmitReceipt>
    where
        I: IntoIterator,
        I::Item: Into<FileIdentity>,
    {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| Error::Internal(InternalError::no_runtime()))?;

        // Normalizing paths touches the file system; keep it outside the lock
        let identities: Vec<FileIdentity> = files.into_iter().map(Into::into).collect();

        let mut state = self.inner.state();
        let mut seen = HashSet::new();
        let mut receipt = SubmitReceipt::default();
        let mut accepted = Vec::new();

        for identity in identities {
            if state.is_pending(&identity) || !seen.insert(identity.clone()) {
                receipt.skipped += 1;
                continue;
            }
            accepted.push(identity);
        }
        receipt.scheduled = accepted.len();

        if accepted.is_empty() {
            log::debug!("Nothing to schedule, {} file(s) skipped", receipt.skipped);
            return Ok(receipt);
        }

        if state.worker_running && !state.cancel_requested {
            state.progress.extend(accepted.len());
        } else {
            if state.cancel_requested {
                log::debug!(
                    "Dropping {} file(s) of the cancelled batch",
                    state.queue.len()
                );
                state.queue.clear();
                state.cancel_requested = false;
            }
            state.batch += 1;
            state.progress.begin_batch(accepted.len());
        }

        let (batch, epoch) = (state.batch, state.epoch);
        state
            .queue
            .extend(accepted.into_iter().map(|identity| Job {
                identity,
                config,
                batch,
                epoch,
            }));
        self.inner.status.send_replace(EngineStatus::Running);

        if !state.worker_running {
            state.worker_running = true;
            runtime.spawn(run_worker(Arc::clone(&self.inner)));
        }

        log::debug!(
            "Scheduled {} file(s), skipped {}",
            receipt.scheduled,
            receipt.skipped
        );
        Ok(receipt)
    }

    /// Ask the worker to stop at the next file boundary
    ///
    /// The file being hashed is still completed and recorded. Has no effect
    /// when nothing is running.
    pub fn cancel(&self) {
        let mut state = self.inner.state();
        if state.worker_running && !state.cancel_requested {
            log::debug!("Cancellation requested");
            state.cancel_requested = true;
        }
    }

    pub fn snapshot_progress(&self) -> ProgressState {
        self.inner.state().progress.snapshot()
    }

    pub fn snapshot_results(&self) -> ResultStore {
        self.inner.state().store.clone()
    }

    /// Record for one file, if it has been processed
    pub fn result(&self, identity: &FileIdentity) -> Option<ResultRecord> {
        self.inner.state().store.get(identity).cloned()
    }

    pub fn status(&self) -> EngineStatus {
        *self.inner.status.borrow()
    }

    /// Wait until the worker is no longer running and return the status
    pub async fn wait_idle(&self) -> EngineStatus {
        let mut status = self.inner.status.subscribe();
        match status.wait_for(|status| !status.is_running()).await {
            Ok(status) => *status,
            Err(_) => self.status(),
        }
    }

    /// Forget one file's record so that a later submit hashes it again
    ///
    /// A file currently being hashed is recorded once it finishes.
    pub fn remove(&self, identity: &FileIdentity) -> Option<ResultRecord> {
        self.inner.state().store.remove(identity)
    }

    /// Drop all records and queued work and reset progress
    ///
    /// A running worker stops at the next file boundary; the file it is
    /// hashing is discarded rather than recorded.
    pub fn clear(&self) {
        let mut state = self.inner.state();
        state.store.clear();
        state.queue.clear();
        state.in_flight = None;
        state.progress.reset();
        state.epoch += 1;
        state.batch += 1;
        if state.worker_running {
            state.cancel_requested = true;
        } else {
            self.inner.status.send_replace(EngineStatus::Idle);
        }
        log::debug!("Cleared results");
    }
}

impl Default for HashingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HashingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashingEngine")
            .field("options", &self.inner.options)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

/// Stops the batch if the worker unwinds out of a file source or provider
struct WorkerGuard<'a> {
    inner: &'a EngineInner,
    armed: bool,
}

impl Drop for WorkerGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let mut state = self.inner.state();
        let unprocessed = state.queue.len();
        state.queue.clear();
        state.in_flight = None;
        state.cancel_requested = false;
        state.worker_running = false;
        log::error!("Worker stopped unexpectedly, {unprocessed} file(s) left unprocessed");
        self.inner
            .status
            .send_replace(EngineStatus::Finished(BatchOutcome::Cancelled { unprocessed }));
    }
}

async fn run_worker(inner: Arc<EngineInner>) {
    let mut guard = WorkerGuard {
        inner: &inner,
        armed: true,
    };

    let outcome = loop {
        let job = {
            let mut state = inner.state();

            if state.cancel_requested {
                let unprocessed = state.queue.len();
                state.queue.clear();
                state.cancel_requested = false;
                state.worker_running = false;
                let outcome = BatchOutcome::Cancelled { unprocessed };
                inner.status.send_replace(EngineStatus::Finished(outcome));
                break outcome;
            }

            match state.queue.pop_front() {
                Some(job) => {
                    state.in_flight = Some(job.identity.clone());
                    if job.batch == state.batch {
                        state.progress.begin_file(job.config.digest_count());
                    }
                    job
                }
                None => {
                    state.worker_running = false;
                    let outcome = BatchOutcome::Completed;
                    inner.status.send_replace(EngineStatus::Finished(outcome));
                    break outcome;
                }
            }
        };

        process_file(&inner, job).await;
    };
    guard.armed = false;

    match outcome {
        BatchOutcome::Completed => log::info!("Batch completed"),
        BatchOutcome::Cancelled { unprocessed } => {
            log::info!("Batch cancelled, {unprocessed} file(s) left unprocessed")
        }
    }
    inner.provider.report(ProgressUpdate::BatchFinished { outcome });
    inner.provider.complete();
}

async fn process_file(inner: &EngineInner, job: Job) {
    let Job {
        identity,
        config,
        batch,
        epoch,
    } = job;
    let digests = config.enabled_digests();

    log::debug!("Processing {identity} ({} digest(s))", digests.len());
    inner.provider.report(ProgressUpdate::FileStarted {
        identity: identity.clone(),
        steps: digests.len(),
    });

    let mut record = ResultRecord::new();

    match inner.source.metadata(&identity).await {
        Ok(metadata) => {
            record.set(ResultField::Size, format_size(metadata.size));
            if config.include_date {
                match metadata.modified {
                    Some(modified) => record.set(
                        ResultField::Date,
                        format_system_time(modified, inner.options.time_zone),
                    ),
                    None => log::debug!("No modification time for {identity}"),
                }
            }
        }
        Err(e) => log::warn!("Metadata unavailable for {identity}: {e}"),
    }

    if config.include_version {
        record.set(ResultField::Version, VERSION_TAG);
    }

    if !digests.is_empty() {
        match inner.source.read(&identity).await {
            Ok(content) => {
                let content: Arc<[u8]> = content.into();
                for algorithm in digests {
                    let data = Arc::clone(&content);
                    let field = ResultField::from(algorithm);
                    match tokio::task::spawn_blocking(move || algorithm.digest_hex(&data)).await {
                        Ok(hex) => record.set(field, hex),
                        Err(e) => {
                            let error = InternalError::hash_calculation(
                                &algorithm.to_string(),
                                &e.to_string(),
                            );
                            log::error!("{error} ({identity})");
                        }
                    }

                    let progress = {
                        let mut state = inner.state();
                        if batch == state.batch {
                            state.progress.complete_step();
                        }
                        state.progress.snapshot()
                    };
                    inner.provider.report(ProgressUpdate::StepCompleted {
                        identity: identity.clone(),
                        field,
                        progress,
                    });
                }
            }
            Err(e) => log::warn!("Content unreadable for {identity}, skipping digests: {e}"),
        }
    }

    let progress = {
        let mut state = inner.state();
        if epoch == state.epoch {
            state.store.insert(identity.clone(), record);
        }
        state.in_flight = None;
        if batch == state.batch {
            state.progress.complete_file();
        }
        state.progress.snapshot()
    };

    log::debug!("Finished {identity}");
    inner
        .provider
        .report(ProgressUpdate::FileCompleted { identity, progress });
}
