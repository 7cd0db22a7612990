//! Engine behavior against an in-memory file source

use async_trait::async_trait;
use filehash_core::{
    AlgorithmConfig, BatchOutcome, Check, DateZone, EngineOptions, EngineStatus, FileIdentity,
    FileMetadata, FileSource, HashingEngine, ProgressState, ProgressUpdate, ResultField,
    SubmitReceipt, VERSION_TAG,
};
use filehash_test_utils::{MockFileSource, RecordingProvider};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

fn engine_with(source: &Arc<MockFileSource>, provider: &Arc<RecordingProvider>) -> HashingEngine {
    HashingEngine::builder()
        .source(source.clone())
        .progress_provider(provider.clone())
        .options(EngineOptions::default().with_time_zone(DateZone::Utc))
        .build()
        .unwrap()
}

fn digests_only() -> AlgorithmConfig {
    AlgorithmConfig::from_checks(&[Check::Md5, Check::Sha1, Check::Crc32])
}

/// Provider whose hook can reach the engine it is attached to
fn provider_with_engine_hook<F>(hook: F) -> (Arc<RecordingProvider>, Arc<OnceLock<HashingEngine>>)
where
    F: Fn(&HashingEngine, &ProgressUpdate) + Send + Sync + 'static,
{
    let slot = Arc::new(OnceLock::<HashingEngine>::new());
    let hook_slot = Arc::clone(&slot);
    let provider = Arc::new(RecordingProvider::with_hook(move |update| {
        if let Some(engine) = hook_slot.get() {
            hook(engine, update);
        }
    }));
    (provider, slot)
}

#[tokio::test]
async fn test_abc_digests() {
    let source = Arc::new(MockFileSource::new());
    let provider = Arc::new(RecordingProvider::new());
    let f = source.add_file("/mock/f", b"abc");

    let engine = engine_with(&source, &provider);
    engine.submit([f.clone()], digests_only()).unwrap();
    engine.wait_idle().await;

    let record = engine.result(&f).unwrap();
    assert_eq!(
        record.get(ResultField::Md5),
        Some("900150983CD24FB0D6963F7D28E17F72")
    );
    assert_eq!(
        record.get(ResultField::Sha1),
        Some("A9993E364706816ABA3E25717850C26C9CD0D89D")
    );
    assert_eq!(record.get(ResultField::Crc32), Some("352441C2"));
    assert_eq!(record.get(ResultField::Size), Some("3 bytes"));
    assert!(!record.contains(ResultField::Version));
    assert!(!record.contains(ResultField::Date));
}

#[tokio::test]
async fn test_metadata_fields() {
    let source = Arc::new(MockFileSource::new());
    let provider = Arc::new(RecordingProvider::new());
    let f = source.add_file("/mock/f", b"abc");

    let engine = engine_with(&source, &provider);
    engine
        .submit([f.clone()], AlgorithmConfig::from_checks(&[Check::Version, Check::Date]))
        .unwrap();
    engine.wait_idle().await;

    let record = engine.result(&f).unwrap();
    assert_eq!(record.get(ResultField::Version), Some(VERSION_TAG));
    assert_eq!(record.get(ResultField::Date), Some("Jan 01, 1970 at 00:00:00"));
    assert_eq!(record.get(ResultField::Size), Some("3 bytes"));
    assert_eq!(record.len(), 3);
    assert_eq!(source.reads_of(&f), 0);
}

#[tokio::test]
async fn test_total_progress_sequence() {
    let source = Arc::new(MockFileSource::new());
    let provider = Arc::new(RecordingProvider::new());
    let files: Vec<_> = (0..4)
        .map(|i| source.add_file(&format!("/mock/{i}.bin"), format!("content {i}").as_bytes()))
        .collect();

    let engine = engine_with(&source, &provider);
    engine.submit(files.clone(), AlgorithmConfig::all()).unwrap();
    engine.wait_idle().await;

    assert_eq!(provider.total_values(), vec![0.25, 0.5, 0.75, 1.0]);
    assert_eq!(provider.completed_files(), files);
    assert_eq!(engine.snapshot_progress().total, 1.0);

    let order: Vec<_> = engine
        .snapshot_results()
        .iter()
        .map(|(identity, _)| identity.clone())
        .collect();
    assert_eq!(order, files);
}

#[tokio::test]
async fn test_current_file_steps() {
    let source = Arc::new(MockFileSource::new());
    let provider = Arc::new(RecordingProvider::new());
    let three = source.add_file("/mock/three.bin", b"three");
    let two = source.add_file("/mock/two.bin", b"two");

    let engine = engine_with(&source, &provider);
    engine.submit([three.clone()], AlgorithmConfig::all()).unwrap();
    engine.wait_idle().await;
    engine
        .submit([two.clone()], AlgorithmConfig::from_checks(&[Check::Sha1, Check::Crc32]))
        .unwrap();
    engine.wait_idle().await;

    assert_eq!(provider.step_values(&three), vec![1.0 / 3.0, 2.0 / 3.0, 1.0]);
    assert_eq!(provider.step_values(&two), vec![0.5, 1.0]);

    let steps: Vec<_> = provider
        .updates()
        .into_iter()
        .filter_map(|update| match update {
            ProgressUpdate::StepCompleted { identity, field, .. } if identity == three => {
                Some(field)
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        steps,
        vec![ResultField::Md5, ResultField::Sha1, ResultField::Crc32]
    );
}

#[tokio::test]
async fn test_metadata_only_keeps_current_file_at_zero() {
    let source = Arc::new(MockFileSource::new());
    let provider = Arc::new(RecordingProvider::new());
    let f = source.add_file("/mock/f", b"abc");

    let engine = engine_with(&source, &provider);
    engine
        .submit([f.clone()], AlgorithmConfig::from_checks(&[Check::Version]))
        .unwrap();
    engine.wait_idle().await;

    assert!(provider.step_values(&f).is_empty());
    assert_eq!(
        engine.snapshot_progress(),
        ProgressState {
            current_file: 0.0,
            total: 1.0
        }
    );
}

#[tokio::test]
async fn test_resubmission_does_not_recompute() {
    let source = Arc::new(MockFileSource::new());
    let provider = Arc::new(RecordingProvider::new());
    let f = source.add_file("/mock/f", b"abc");

    let engine = engine_with(&source, &provider);
    engine.submit([f.clone()], AlgorithmConfig::all()).unwrap();
    engine.wait_idle().await;
    let first = engine.snapshot_results();
    let progress = engine.snapshot_progress();

    let receipt = engine
        .submit([f.clone()], AlgorithmConfig::from_checks(&[Check::Md5]))
        .unwrap();
    engine.wait_idle().await;

    assert_eq!(
        receipt,
        SubmitReceipt {
            scheduled: 0,
            skipped: 1
        }
    );
    assert_eq!(engine.snapshot_results(), first);
    assert_eq!(engine.snapshot_results().len(), 1);
    assert_eq!(engine.snapshot_progress(), progress);
    assert_eq!(source.reads_of(&f), 1);
}

#[tokio::test]
async fn test_duplicates_within_one_submit() {
    let source = Arc::new(MockFileSource::new());
    let provider = Arc::new(RecordingProvider::new());
    let a = source.add_file("/mock/a", b"a");
    let b = source.add_file("/mock/b", b"b");

    let engine = engine_with(&source, &provider);
    let receipt = engine
        .submit([a.clone(), a.clone(), b.clone()], AlgorithmConfig::all())
        .unwrap();
    engine.wait_idle().await;

    assert_eq!(receipt.scheduled, 2);
    assert_eq!(receipt.skipped, 1);
    assert_eq!(provider.total_values(), vec![0.5, 1.0]);
    assert_eq!(source.reads_of(&a), 1);
}

#[tokio::test]
async fn test_cancel_and_resume() {
    let source = Arc::new(MockFileSource::new());
    let a = source.add_file("/mock/a", b"a");
    let b = source.add_file("/mock/b", b"b");
    let c = source.add_file("/mock/c", b"c");

    let cancel_after = a.clone();
    let (provider, slot) = provider_with_engine_hook(move |engine, update| {
        if let ProgressUpdate::FileCompleted { identity, .. } = update
            && *identity == cancel_after
        {
            engine.cancel();
            engine.cancel();
        }
    });
    let engine = engine_with(&source, &provider);
    slot.set(engine.clone()).unwrap();

    let batch = vec![a.clone(), b.clone(), c.clone()];
    engine.submit(batch.clone(), AlgorithmConfig::all()).unwrap();
    let status = engine.wait_idle().await;

    assert_eq!(
        status,
        EngineStatus::Finished(BatchOutcome::Cancelled { unprocessed: 2 })
    );
    let results = engine.snapshot_results();
    assert_eq!(results.len(), 1);
    assert!(results.contains(&a));
    assert!(!results.contains(&b));
    assert!(!results.contains(&c));

    let receipt = engine.submit(batch, AlgorithmConfig::all()).unwrap();
    let status = engine.wait_idle().await;

    assert_eq!(receipt.scheduled, 2);
    assert_eq!(receipt.skipped, 1);
    assert_eq!(status, EngineStatus::Finished(BatchOutcome::Completed));
    assert_eq!(engine.snapshot_results().len(), 3);
    assert_eq!(source.read_log(), vec![a, b, c]);
}

#[tokio::test]
async fn test_cancel_lets_in_flight_file_finish() {
    let source = Arc::new(MockFileSource::new());
    let a = source.add_file("/mock/a", b"abc");
    let b = source.add_file("/mock/b", b"b");

    let cancel_on = a.clone();
    let (provider, slot) = provider_with_engine_hook(move |engine, update| {
        if let ProgressUpdate::FileStarted { identity, .. } = update
            && *identity == cancel_on
        {
            engine.cancel();
        }
    });
    let engine = engine_with(&source, &provider);
    slot.set(engine.clone()).unwrap();

    engine.submit([a.clone(), b.clone()], AlgorithmConfig::all()).unwrap();
    engine.wait_idle().await;

    let record = engine.result(&a).unwrap();
    assert_eq!(record.get(ResultField::Crc32), Some("352441C2"));
    assert!(engine.result(&b).is_none());
    assert_eq!(engine.snapshot_progress().total, 0.5);
}

#[tokio::test]
async fn test_submit_during_pending_cancel_starts_fresh_batch() {
    let source = Arc::new(MockFileSource::new());
    let a = source.add_file("/mock/a", b"a");
    let b = source.add_file("/mock/b", b"b");
    let c = source.add_file("/mock/c", b"c");
    let d = source.add_file("/mock/d", b"d");

    let (trigger, replacement) = (a.clone(), d.clone());
    let (provider, slot) = provider_with_engine_hook(move |engine, update| {
        if let ProgressUpdate::FileStarted { identity, .. } = update
            && *identity == trigger
        {
            engine.cancel();
            engine
                .submit([replacement.clone()], AlgorithmConfig::all())
                .unwrap();
        }
    });
    let engine = engine_with(&source, &provider);
    slot.set(engine.clone()).unwrap();

    engine
        .submit([a.clone(), b.clone(), c.clone()], AlgorithmConfig::all())
        .unwrap();
    let status = engine.wait_idle().await;

    assert_eq!(status, EngineStatus::Finished(BatchOutcome::Completed));
    assert_eq!(provider.completed_files(), vec![a.clone(), d.clone()]);
    assert_eq!(provider.total_values(), vec![0.0, 1.0]);

    let results = engine.snapshot_results();
    assert!(results.contains(&a));
    assert!(results.contains(&d));
    assert!(!results.contains(&b));
    assert!(!results.contains(&c));
}

#[tokio::test]
async fn test_append_while_running_grows_batch() {
    let source = Arc::new(MockFileSource::new().with_read_delay(Duration::from_millis(5)));
    let provider = Arc::new(RecordingProvider::new());
    let a = source.add_file("/mock/a", b"a");
    let b = source.add_file("/mock/b", b"b");
    let c = source.add_file("/mock/c", b"c");

    let engine = engine_with(&source, &provider);
    engine
        .submit([a.clone(), b.clone()], AlgorithmConfig::from_checks(&[Check::Md5]))
        .unwrap();
    let receipt = engine
        .submit([b.clone(), c.clone()], AlgorithmConfig::from_checks(&[Check::Sha1]))
        .unwrap();
    engine.wait_idle().await;

    assert_eq!(receipt.scheduled, 1);
    assert_eq!(receipt.skipped, 1);
    assert_eq!(provider.total_values(), vec![1.0 / 3.0, 2.0 / 3.0, 1.0]);
    assert_eq!(provider.completions(), 1);

    let b_record = engine.result(&b).unwrap();
    assert!(b_record.contains(ResultField::Md5));
    assert!(!b_record.contains(ResultField::Sha1));

    let c_record = engine.result(&c).unwrap();
    assert!(c_record.contains(ResultField::Sha1));
    assert!(!c_record.contains(ResultField::Md5));
}

#[tokio::test]
async fn test_unreadable_file_keeps_metadata() {
    let source = Arc::new(MockFileSource::new());
    let provider = Arc::new(RecordingProvider::new());
    let locked = source.add_unreadable("/mock/locked.bin", 42);
    let next = source.add_file("/mock/next.bin", b"abc");

    let engine = engine_with(&source, &provider);
    engine
        .submit([locked.clone(), next.clone()], AlgorithmConfig::all())
        .unwrap();
    let status = engine.wait_idle().await;

    assert_eq!(status, EngineStatus::Finished(BatchOutcome::Completed));

    let record = engine.result(&locked).unwrap();
    assert_eq!(record.get(ResultField::Size), Some("42 bytes"));
    assert!(record.contains(ResultField::Date));
    assert!(record.contains(ResultField::Version));
    for field in [ResultField::Md5, ResultField::Sha1, ResultField::Crc32] {
        assert!(!record.contains(field));
    }

    let next_record = engine.result(&next).unwrap();
    assert_eq!(next_record.get(ResultField::Crc32), Some("352441C2"));
    assert_eq!(engine.snapshot_progress().total, 1.0);
}

#[tokio::test]
async fn test_missing_file_has_no_metadata() {
    let source = Arc::new(MockFileSource::new());
    let provider = Arc::new(RecordingProvider::new());
    let missing = source.missing("/mock/gone.bin");

    let engine = engine_with(&source, &provider);
    engine.submit([missing.clone()], AlgorithmConfig::all()).unwrap();
    engine.wait_idle().await;

    let record = engine.result(&missing).unwrap();
    let fields: Vec<_> = record.iter().map(|(field, _)| field).collect();
    assert_eq!(fields, vec![ResultField::Version]);
}

#[tokio::test]
async fn test_remove_allows_recompute() {
    let source = Arc::new(MockFileSource::new());
    let provider = Arc::new(RecordingProvider::new());
    let f = source.add_file("/mock/f", b"abc");

    let engine = engine_with(&source, &provider);
    engine.submit([f.clone()], AlgorithmConfig::from_checks(&[Check::Md5])).unwrap();
    engine.wait_idle().await;

    let removed = engine.remove(&f).unwrap();
    assert!(removed.contains(ResultField::Md5));
    assert!(engine.remove(&f).is_none());

    let receipt = engine
        .submit([f.clone()], AlgorithmConfig::from_checks(&[Check::Crc32]))
        .unwrap();
    engine.wait_idle().await;

    assert_eq!(receipt.scheduled, 1);
    let record = engine.result(&f).unwrap();
    assert!(record.contains(ResultField::Crc32));
    assert!(!record.contains(ResultField::Md5));
    assert_eq!(source.reads_of(&f), 2);
}

#[tokio::test]
async fn test_clear_resets_everything() {
    let source = Arc::new(MockFileSource::new());
    let provider = Arc::new(RecordingProvider::new());
    let f = source.add_file("/mock/f", b"abc");

    let engine = engine_with(&source, &provider);
    engine.submit([f.clone()], AlgorithmConfig::all()).unwrap();
    engine.wait_idle().await;

    engine.clear();
    assert!(engine.snapshot_results().is_empty());
    assert_eq!(engine.snapshot_progress(), ProgressState::default());
    assert_eq!(engine.status(), EngineStatus::Idle);

    engine.submit([f.clone()], AlgorithmConfig::all()).unwrap();
    engine.wait_idle().await;
    assert_eq!(engine.snapshot_results().len(), 1);
    assert_eq!(source.reads_of(&f), 2);
}

#[tokio::test]
async fn test_clear_while_running_discards_in_flight_file() {
    let source = Arc::new(MockFileSource::new());
    let a = source.add_file("/mock/a", b"a");
    let b = source.add_file("/mock/b", b"b");

    let clear_on = a.clone();
    let (provider, slot) = provider_with_engine_hook(move |engine, update| {
        if let ProgressUpdate::FileStarted { identity, .. } = update
            && *identity == clear_on
        {
            engine.clear();
        }
    });
    let engine = engine_with(&source, &provider);
    slot.set(engine.clone()).unwrap();

    engine.submit([a, b], AlgorithmConfig::all()).unwrap();
    let status = engine.wait_idle().await;

    assert_eq!(
        status,
        EngineStatus::Finished(BatchOutcome::Cancelled { unprocessed: 0 })
    );
    assert!(engine.snapshot_results().is_empty());
    assert_eq!(engine.snapshot_progress(), ProgressState::default());
}

#[tokio::test]
async fn test_snapshots_while_running_are_consistent() {
    let source = Arc::new(MockFileSource::new().with_read_delay(Duration::from_millis(2)));
    let provider = Arc::new(RecordingProvider::new());
    let files: Vec<FileIdentity> = (0..10)
        .map(|i| source.add_file(&format!("/mock/{i}.bin"), &[i as u8; 64]))
        .collect();

    let engine = engine_with(&source, &provider);
    engine.submit(files, AlgorithmConfig::all()).unwrap();

    let mut last_total = 0.0;
    while engine.status().is_running() {
        let progress = engine.snapshot_progress();
        assert!((0.0..=1.0).contains(&progress.current_file));
        assert!((0.0..=1.0).contains(&progress.total));
        assert!(progress.total >= last_total);
        last_total = progress.total;

        for (_, record) in engine.snapshot_results().iter() {
            assert!(record.contains(ResultField::Crc32));
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    engine.wait_idle().await;
    assert_eq!(engine.snapshot_results().len(), 10);
    assert_eq!(provider.completions(), 1);
}

/// Path whose normalization takes a while, like a canonicalize on a slow mount
struct SlowPath(&'static str);

impl From<SlowPath> for FileIdentity {
    fn from(path: SlowPath) -> Self {
        std::thread::sleep(Duration::from_millis(200));
        FileIdentity::from_normalized(path.0)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_snapshots_not_blocked_by_path_normalization() {
    let source = Arc::new(MockFileSource::new());
    let provider = Arc::new(RecordingProvider::new());
    let engine = engine_with(&source, &provider);

    let submitter = {
        let engine = engine.clone();
        let handle = tokio::runtime::Handle::current();
        std::thread::spawn(move || {
            let _guard = handle.enter();
            let paths = ["/slow/a", "/slow/b", "/slow/c", "/slow/d", "/slow/e"];
            engine.submit(paths.map(SlowPath), digests_only())
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;

    let started = Instant::now();
    let progress = engine.snapshot_progress();
    assert!(started.elapsed() < Duration::from_millis(100));
    assert_eq!(progress, ProgressState::default());

    let started = Instant::now();
    assert!(engine.snapshot_results().is_empty());
    assert!(started.elapsed() < Duration::from_millis(100));

    let receipt = submitter.join().unwrap().unwrap();
    assert_eq!(receipt.scheduled, 5);
    engine.wait_idle().await;
    assert_eq!(engine.snapshot_results().len(), 5);
}

/// Source that panics when reading one particular file
struct PanickingSource {
    files: MockFileSource,
    bomb: FileIdentity,
}

#[async_trait]
impl FileSource for PanickingSource {
    async fn metadata(&self, identity: &FileIdentity) -> filehash_core::Result<FileMetadata> {
        self.files.metadata(identity).await
    }

    async fn read(&self, identity: &FileIdentity) -> filehash_core::Result<Vec<u8>> {
        if *identity == self.bomb {
            panic!("read of {identity} blew up");
        }
        self.files.read(identity).await
    }
}

#[tokio::test]
async fn test_worker_panic_finishes_batch_and_allows_resubmit() {
    let files = MockFileSource::new();
    let first = files.add_file("/mock/first", b"abc");
    let bomb = files.add_file("/mock/bomb", b"boom");
    let last = files.add_file("/mock/last", b"xyz");

    let engine = HashingEngine::builder()
        .source(Arc::new(PanickingSource {
            files,
            bomb: bomb.clone(),
        }))
        .options(EngineOptions::default().with_time_zone(DateZone::Utc))
        .build()
        .unwrap();

    engine
        .submit([first.clone(), bomb.clone(), last.clone()], digests_only())
        .unwrap();
    let status = engine.wait_idle().await;

    assert_eq!(
        status,
        EngineStatus::Finished(BatchOutcome::Cancelled { unprocessed: 1 })
    );
    assert!(!engine.status().is_running());
    assert!(engine.result(&first).is_some());
    assert!(engine.result(&bomb).is_none());
    assert!(engine.result(&last).is_none());

    let receipt = engine.submit([last.clone()], digests_only()).unwrap();
    assert_eq!(receipt.scheduled, 1);
    assert_eq!(
        engine.wait_idle().await,
        EngineStatus::Finished(BatchOutcome::Completed)
    );
    assert_eq!(
        engine.result(&last).unwrap().get(ResultField::Crc32),
        Some(filehash_core::format_crc32(filehash_core::crc32(b"xyz")).as_str())
    );
}
