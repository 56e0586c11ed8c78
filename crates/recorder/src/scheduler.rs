//! RecordingScheduler - the drift-free acquisition loop.
//!
//! The loop runs on a dedicated OS thread so sub-millisecond busy-polling
//! never occupies the async runtime. Worker pools live on a runtime owned
//! by the scheduler; the loop talks to them through bounded channels only.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use metrics::{counter, histogram};
use tracing::{debug, error, info, warn};

use contracts::{
    FrameSource, FrameStore, RecorderConfig, RecorderError, RecordingStats, TimestampRecord,
};
use timestamp_log::TimestampLog;
use timing::{frame_interval, TimingSource};

use crate::admission::{classify, Admission};
use crate::history::HistoryRing;
use crate::pool::{CapturePool, SaveJob, SavePool};
use crate::sync::SyncQualityEvaluator;

/// Counters and histories mutated only by the loop thread.
struct StatsInner {
    frame_count: u64,
    expected_frame_count: u64,
    dropped_frames: u64,
    late_frames: u64,
    sync_history: HistoryRing,
    timing_errors: HistoryRing,
}

impl StatsInner {
    fn new(history_capacity: usize) -> Self {
        Self {
            frame_count: 0,
            expected_frame_count: 0,
            dropped_frames: 0,
            late_frames: 0,
            sync_history: HistoryRing::new(history_capacity),
            timing_errors: HistoryRing::new(history_capacity),
        }
    }
}

/// State shared between the loop thread and the controlling thread.
struct Shared {
    /// Sole loop-continuation authority
    is_recording: AtomicBool,
    stats: Mutex<StatsInner>,
    fault: Mutex<Option<RecorderError>>,
}

/// Schedules synchronized dual-stream acquisition at a fixed rate.
///
/// One scheduler handles one session at a time; `start` / `stop` may be
/// called repeatedly for successive sessions.
pub struct RecordingScheduler {
    config: RecorderConfig,
    runtime: tokio::runtime::Runtime,
    shared: Arc<Shared>,
    loop_thread: Mutex<Option<thread::JoinHandle<()>>>,
}

impl RecordingScheduler {
    /// Create a scheduler and its worker runtime.
    pub fn new(config: RecorderConfig) -> Result<Self, RecorderError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.capture_workers + config.save_workers)
            .thread_name("recorder-worker")
            .enable_all()
            .build()?;

        let history_capacity = config.history_capacity;
        Ok(Self {
            config,
            runtime,
            shared: Arc::new(Shared {
                is_recording: AtomicBool::new(false),
                stats: Mutex::new(StatsInner::new(history_capacity)),
                fault: Mutex::new(None),
            }),
            loop_thread: Mutex::new(None),
        })
    }

    /// Begin a recording session.
    ///
    /// Resets counters and histories, anchors the timing origin, spawns the
    /// acquisition loop, and returns immediately.
    ///
    /// # Errors
    /// `AlreadyRecording` if a session is live.
    pub fn start(
        &self,
        sources: Vec<Arc<dyn FrameSource>>,
        store: Arc<dyn FrameStore>,
        timestamp_log: TimestampLog,
    ) -> Result<(), RecorderError> {
        if sources.len() != 2 {
            return Err(RecorderError::config_validation(
                "sources",
                format!("exactly two streams required, got {}", sources.len()),
            ));
        }

        if self
            .shared
            .is_recording
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(RecorderError::AlreadyRecording);
        }

        {
            let mut stats = self.shared.stats.lock().unwrap_or_else(|e| e.into_inner());
            *stats = StatsInner::new(self.config.history_capacity);
        }
        *self.shared.fault.lock().unwrap_or_else(|e| e.into_inner()) = None;

        let capture_pool = CapturePool::spawn(self.runtime.handle().clone(), sources);
        let save_pool = SavePool::spawn(
            self.runtime.handle(),
            store,
            self.config.save_workers,
            self.config.save_queue_capacity,
        );

        let clock = TimingSource::new(self.config.timing);
        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();

        info!(fps = config.fps, tolerance = config.frame_tolerance, "recording started");

        let spawned = thread::Builder::new()
            .name("recorder-loop".into())
            .spawn(move || {
                let result = run_loop(
                    &config,
                    &shared,
                    &clock,
                    &capture_pool,
                    &save_pool,
                    &timestamp_log,
                );

                // Best-effort final flush even on a fault
                if let Err(e) = timestamp_log.flush() {
                    warn!(error = %e, "final timestamp flush failed");
                }

                let captures = capture_pool.metrics().snapshot();
                let saves = save_pool.metrics().snapshot();
                debug!(?captures, ?saves, "pool counters at session end");
                save_pool.shutdown();

                if let Err(e) = result {
                    error!(error = %e, "recording loop terminated on fault");
                    *shared.fault.lock().unwrap_or_else(|p| p.into_inner()) = Some(e);
                }
                shared.is_recording.store(false, Ordering::Release);
            });

        match spawned {
            Ok(handle) => {
                *self
                    .loop_thread
                    .lock()
                    .unwrap_or_else(|e| e.into_inner()) = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.shared.is_recording.store(false, Ordering::Release);
                Err(e.into())
            }
        }
    }

    /// End the session: signal the loop, join it, surface any loop fault.
    ///
    /// Idempotent; calling with no live session is a no-op.
    pub fn stop(&self) -> Result<(), RecorderError> {
        self.shared.is_recording.store(false, Ordering::Release);

        let handle = self
            .loop_thread
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                return Err(RecorderError::loop_fault("recording loop panicked"));
            }
        }

        if let Some(fault) = self
            .shared
            .fault
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            return Err(fault);
        }

        info!("recording stopped");
        Ok(())
    }

    /// Whether a session is currently live.
    pub fn is_recording(&self) -> bool {
        self.shared.is_recording.load(Ordering::Acquire)
    }

    /// Point-in-time statistics snapshot.
    pub fn stats(&self) -> RecordingStats {
        let stats = self.shared.stats.lock().unwrap_or_else(|e| e.into_inner());
        RecordingStats {
            frame_count: stats.frame_count,
            expected_frame_count: stats.expected_frame_count,
            dropped_frames: stats.dropped_frames,
            late_frames: stats.late_frames,
            fps: self.config.fps,
            sync_history: stats.sync_history.to_vec(),
            timing_errors: stats.timing_errors.to_vec(),
        }
    }
}

/// The acquisition loop. Returns `Err` only on an unrecoverable fault.
fn run_loop(
    config: &RecorderConfig,
    shared: &Shared,
    clock: &TimingSource,
    capture_pool: &CapturePool,
    save_pool: &SavePool,
    timestamp_log: &TimestampLog,
) -> Result<(), RecorderError> {
    let (_, interval_ns) = frame_interval(config.fps);
    let tolerance_ns = config.frame_tolerance * interval_ns as f64;
    let capture_timeout = Duration::from_secs(config.capture_timeout_secs);
    let sync_eval = SyncQualityEvaluator::new(config.sync_good_threshold_ms);

    let origin_ns = clock.now_ns();
    debug!(interval_ns, "acquisition loop entered");

    while shared.is_recording.load(Ordering::Acquire) {
        let expected_index = {
            let stats = shared.stats.lock().unwrap_or_else(|e| e.into_inner());
            stats.expected_frame_count
        };
        let deadline = clock.deadline(origin_ns, expected_index, interval_ns);
        let lag_ns = deadline.lag_ns(clock.now_ns());

        match classify(lag_ns, tolerance_ns) {
            Admission::Drop => {
                let mut stats = shared.stats.lock().unwrap_or_else(|e| e.into_inner());
                stats.dropped_frames += 1;
                stats.expected_frame_count += 1;
                drop(stats);
                counter!("recorder_frames_dropped_total").increment(1);
                warn!(
                    expected_index,
                    lag_ms = lag_ns as f64 / 1e6,
                    "slot dropped, loop too far behind"
                );
                continue;
            }
            Admission::Wait => {
                clock.wait_until(deadline.target_time_ns);
            }
            Admission::Late => {
                let mut stats = shared.stats.lock().unwrap_or_else(|e| e.into_inner());
                stats.late_frames += 1;
                drop(stats);
                counter!("recorder_frames_late_total").increment(1);
            }
        }

        if !capture_pool.is_healthy() {
            return Err(RecorderError::loop_fault("capture worker died"));
        }

        let results = capture_pool.capture_all(capture_timeout);
        let mut results = results.into_iter();
        let (primary, secondary) = match (results.next().flatten(), results.next().flatten()) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                // Forfeit the frame; no partial persistence, no retry
                let mut stats = shared.stats.lock().unwrap_or_else(|e| e.into_inner());
                stats.expected_frame_count += 1;
                drop(stats);
                counter!("recorder_capture_failures_total").increment(1);
                continue;
            }
        };

        let quality = sync_eval.evaluate(primary.timing.start_ns, secondary.timing.start_ns);
        // The offset is read at deadline evaluation, before any wait or
        // capture; an on-pace loop records a negative value.
        let timing_error_ms = lag_ns as f64 / 1e6;

        let frame_idx = {
            let mut stats = shared.stats.lock().unwrap_or_else(|e| e.into_inner());
            stats.sync_history.push(quality.diff_ms);
            stats.timing_errors.push(timing_error_ms.abs());
            let frame_idx = stats.frame_count;
            stats.frame_count += 1;
            stats.expected_frame_count += 1;
            frame_idx
        };

        counter!("recorder_frames_saved_total").increment(1);
        histogram!("recorder_timing_error_ms").record(timing_error_ms.abs());
        histogram!("recorder_sync_diff_ms").record(quality.diff_ms);

        timestamp_log.add(TimestampRecord {
            frame_idx,
            expected_frame_idx: expected_index,
            target_time_ns: deadline.target_time_ns,
            timing_error_ms,
            sync_diff_ms: quality.diff_ms,
        });

        save_pool.submit(SaveJob::Frame {
            primary: primary.payload,
            secondary: secondary.payload,
            frame_idx,
        });

        if timestamp_log.should_flush() {
            save_pool.submit(SaveJob::FlushTimestamps(timestamp_log.clone()));
        }
    }

    debug!("acquisition loop exited");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::SyntheticFrameSource;
    use contracts::FramePayload;
    use std::sync::atomic::AtomicU64;
    use tempfile::tempdir;

    struct CountingStore {
        saved: AtomicU64,
    }

    impl FrameStore for CountingStore {
        fn save_pair(
            &self,
            _primary: FramePayload,
            _secondary: FramePayload,
            _frame_idx: u64,
        ) -> Result<(), RecorderError> {
            self.saved.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    fn fast_config() -> RecorderConfig {
        let mut config = RecorderConfig::default();
        config.fps = 20;
        config.batch_size = 10;
        config
    }

    fn sources() -> Vec<Arc<dyn FrameSource>> {
        vec![
            Arc::new(SyntheticFrameSource::image("rgb", 8, 8)),
            Arc::new(SyntheticFrameSource::array("thermal", 4, 4)),
        ]
    }

    #[test]
    fn test_start_stop_lifecycle() {
        let dir = tempdir().unwrap();
        let scheduler = RecordingScheduler::new(fast_config()).unwrap();
        let store = Arc::new(CountingStore {
            saved: AtomicU64::new(0),
        });
        let log = TimestampLog::new(dir.path().join("timestamps.txt"), 10);

        assert!(!scheduler.is_recording());
        scheduler.start(sources(), store, log).unwrap();
        assert!(scheduler.is_recording());

        thread::sleep(Duration::from_millis(300));
        scheduler.stop().unwrap();
        assert!(!scheduler.is_recording());

        let stats = scheduler.stats();
        assert!(stats.expected_frame_count > 0);
        assert_eq!(stats.frame_count, stats.expected_frame_count);
        assert_eq!(stats.dropped_frames, 0);
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let dir = tempdir().unwrap();
        let scheduler = RecordingScheduler::new(fast_config()).unwrap();
        let store = Arc::new(CountingStore {
            saved: AtomicU64::new(0),
        });
        let log = TimestampLog::new(dir.path().join("timestamps.txt"), 10);

        scheduler.start(sources(), Arc::clone(&store) as _, log.clone()).unwrap();
        let second = scheduler.start(sources(), store, log);
        assert!(matches!(second, Err(RecorderError::AlreadyRecording)));
        scheduler.stop().unwrap();
    }

    #[test]
    fn test_stop_is_idempotent() {
        let scheduler = RecordingScheduler::new(fast_config()).unwrap();
        scheduler.stop().unwrap();
        scheduler.stop().unwrap();
    }

    #[test]
    fn test_stop_performs_final_flush() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("timestamps.txt");
        let scheduler = RecordingScheduler::new(fast_config()).unwrap();
        let store = Arc::new(CountingStore {
            saved: AtomicU64::new(0),
        });
        // Batch size large enough that only the final flush writes
        let log = TimestampLog::new(&path, 10_000);

        scheduler.start(sources(), store, log.clone()).unwrap();
        thread::sleep(Duration::from_millis(300));
        scheduler.stop().unwrap();

        assert!(log.is_empty());
        let content = std::fs::read_to_string(&path).unwrap();
        let row_count = content.lines().count() - 1;
        assert_eq!(row_count as u64, scheduler.stats().frame_count);
    }

    // Sources that take 30 ms per capture against a 100 ms interval: the
    // loop evaluates each slot about 70 ms before its target, so the logged
    // offset must be negative and capture-latency sized, not the post-join
    // lateness.
    #[test]
    fn test_timing_error_is_sampled_at_evaluation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("timestamps.txt");
        let mut config = RecorderConfig::default();
        config.fps = 10;
        config.batch_size = 5;
        let scheduler = RecordingScheduler::new(config).unwrap();
        let store = Arc::new(CountingStore {
            saved: AtomicU64::new(0),
        });
        let log = TimestampLog::new(&path, 5);

        let sources: Vec<Arc<dyn FrameSource>> = vec![
            Arc::new(
                SyntheticFrameSource::image("rgb", 8, 8)
                    .with_latency(Duration::from_millis(30)),
            ),
            Arc::new(
                SyntheticFrameSource::array("thermal", 4, 4)
                    .with_latency(Duration::from_millis(30)),
            ),
        ];

        scheduler.start(sources, store, log).unwrap();
        thread::sleep(Duration::from_millis(800));
        scheduler.stop().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let offsets: Vec<f64> = content
            .lines()
            .skip(1)
            .map(|line| line.split(',').nth(3).unwrap().parse().unwrap())
            .collect();
        assert!(offsets.len() > 3, "too few rows: {}", offsets.len());

        // Row 0 is evaluated right at the origin; every later row must be
        // an early evaluation.
        for &offset in &offsets[1..] {
            assert!(offset < 0.0, "expected early evaluation, got {offset} ms");
        }
        let mean = offsets[1..].iter().sum::<f64>() / (offsets.len() - 1) as f64;
        assert!(mean < -30.0, "mean offset {mean} ms not capture-latency sized");
    }

    #[test]
    fn test_failing_source_counts_expected_only() {
        let dir = tempdir().unwrap();
        let scheduler = RecordingScheduler::new(fast_config()).unwrap();
        let store = Arc::new(CountingStore {
            saved: AtomicU64::new(0),
        });
        let log = TimestampLog::new(dir.path().join("timestamps.txt"), 10);

        let sources: Vec<Arc<dyn FrameSource>> = vec![
            Arc::new(SyntheticFrameSource::image("rgb", 8, 8)),
            Arc::new(SyntheticFrameSource::array("thermal", 4, 4).with_failure_every(1)),
        ];

        scheduler.start(sources, store, log).unwrap();
        thread::sleep(Duration::from_millis(300));
        scheduler.stop().unwrap();

        let stats = scheduler.stats();
        assert!(stats.expected_frame_count > 0);
        assert_eq!(stats.frame_count, 0);
        assert!(stats.sync_history.is_empty());
    }

    #[test]
    fn test_restart_resets_counters() {
        let dir = tempdir().unwrap();
        let scheduler = RecordingScheduler::new(fast_config()).unwrap();
        let store = Arc::new(CountingStore {
            saved: AtomicU64::new(0),
        });

        let log = TimestampLog::new(dir.path().join("a.txt"), 10);
        scheduler.start(sources(), Arc::clone(&store) as _, log).unwrap();
        thread::sleep(Duration::from_millis(200));
        scheduler.stop().unwrap();
        let first = scheduler.stats().expected_frame_count;
        assert!(first > 0);

        let log = TimestampLog::new(dir.path().join("b.txt"), 10);
        scheduler.start(sources(), store, log).unwrap();
        let early = scheduler.stats().expected_frame_count;
        assert!(early < first);
        scheduler.stop().unwrap();
    }
}
