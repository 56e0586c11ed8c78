//! Capture and save worker pools.
//!
//! Both pools run on a tokio runtime owned by the scheduler, keeping
//! blocking work off the timing loop:
//! - the capture pool has one worker per stream, driven by per-stream
//!   request channels; the loop thread joins both replies under a bounded
//!   timeout.
//! - the save pool is a set of workers draining one bounded MPMC queue;
//!   submission is non-blocking and a full queue drops the job.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use contracts::{CapturedFrame, FramePayload, FrameSource, FrameStore};
use timestamp_log::TimestampLog;

/// Outstanding capture requests tolerated per stream before submissions
/// start failing. A hung capture occupies one slot until it returns.
const CAPTURE_QUEUE_DEPTH: usize = 4;

/// Shared counters for one worker pool.
#[derive(Debug, Default)]
pub struct PoolMetrics {
    /// Current queue length approximation
    queue_len: AtomicUsize,
    /// Jobs accepted into the queue
    submitted: AtomicU64,
    /// Jobs finished successfully
    completed: AtomicU64,
    /// Jobs rejected because the queue was full
    dropped: AtomicU64,
    /// Jobs that ran and failed
    failed: AtomicU64,
    /// Capture joins that exceeded the timeout
    timeouts: AtomicU64,
}

impl PoolMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    fn inc_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    fn inc_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn inc_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn timeouts(&self) -> u64 {
        self.timeouts.load(Ordering::Relaxed)
    }

    fn inc_timeouts(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> PoolMetricsSnapshot {
        PoolMetricsSnapshot {
            queue_len: self.queue_len(),
            submitted: self.submitted(),
            completed: self.completed(),
            dropped: self.dropped(),
            failed: self.failed(),
            timeouts: self.timeouts(),
        }
    }
}

/// Snapshot of pool counters (for reporting).
#[derive(Debug, Clone, Copy)]
pub struct PoolMetricsSnapshot {
    pub queue_len: usize,
    pub submitted: u64,
    pub completed: u64,
    pub dropped: u64,
    pub failed: u64,
    pub timeouts: u64,
}

struct CaptureRequest {
    reply: oneshot::Sender<Option<CapturedFrame>>,
}

struct CaptureWorker {
    stream_id: String,
    tx: mpsc::Sender<CaptureRequest>,
    handle: JoinHandle<()>,
}

/// One capture worker per stream, joined pairwise by the loop thread.
pub struct CapturePool {
    runtime: Handle,
    workers: Vec<CaptureWorker>,
    metrics: Arc<PoolMetrics>,
}

impl CapturePool {
    /// Spawn one worker task per source on `runtime`.
    pub fn spawn(runtime: Handle, sources: Vec<Arc<dyn FrameSource>>) -> Self {
        let metrics = Arc::new(PoolMetrics::new());
        let workers = sources
            .into_iter()
            .map(|source| {
                let stream_id = source.stream_id().to_string();
                let (tx, rx) = mpsc::channel(CAPTURE_QUEUE_DEPTH);
                let worker_id = stream_id.clone();
                let handle = runtime.spawn(capture_worker(source, rx, worker_id));
                CaptureWorker {
                    stream_id,
                    tx,
                    handle,
                }
            })
            .collect();
        Self {
            runtime,
            workers,
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<PoolMetrics> {
        &self.metrics
    }

    /// Dispatch a capture on every stream and join the replies.
    ///
    /// Called from the loop thread. Each reply is bounded by `timeout`;
    /// a timed-out or failed stream yields `None` in its slot and the
    /// in-flight capture is abandoned, never retried.
    pub fn capture_all(&self, timeout: Duration) -> Vec<Option<CapturedFrame>> {
        let receivers: Vec<Option<oneshot::Receiver<Option<CapturedFrame>>>> = self
            .workers
            .iter()
            .map(|worker| {
                let (reply, rx) = oneshot::channel();
                match worker.tx.try_send(CaptureRequest { reply }) {
                    Ok(()) => {
                        self.metrics.inc_submitted();
                        Some(rx)
                    }
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        self.metrics.inc_dropped();
                        warn!(stream = %worker.stream_id, "capture queue full, request dropped");
                        None
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        self.metrics.inc_failed();
                        error!(stream = %worker.stream_id, "capture worker closed unexpectedly");
                        None
                    }
                }
            })
            .collect();

        self.runtime.block_on(async {
            let mut results = Vec::with_capacity(receivers.len());
            for (worker, rx) in self.workers.iter().zip(receivers) {
                let result = match rx {
                    Some(rx) => match tokio::time::timeout(timeout, rx).await {
                        Ok(Ok(frame)) => frame,
                        Ok(Err(_)) => {
                            self.metrics.inc_failed();
                            error!(stream = %worker.stream_id, "capture reply channel dropped");
                            None
                        }
                        Err(_) => {
                            self.metrics.inc_timeouts();
                            warn!(
                                stream = %worker.stream_id,
                                timeout_ms = timeout.as_millis() as u64,
                                "capture timed out, frame forfeited"
                            );
                            None
                        }
                    },
                    None => None,
                };
                results.push(result);
            }
            results
        })
    }

    /// Whether every worker task is still alive.
    pub fn is_healthy(&self) -> bool {
        self.workers.iter().all(|w| !w.handle.is_finished())
    }
}

/// Per-stream worker: serialize captures for one source, each run under
/// `spawn_blocking` so a slow sensor read cannot stall the runtime.
async fn capture_worker(
    source: Arc<dyn FrameSource>,
    mut rx: mpsc::Receiver<CaptureRequest>,
    stream_id: String,
) {
    debug!(stream = %stream_id, "capture worker started");
    while let Some(request) = rx.recv().await {
        let source = Arc::clone(&source);
        let result = match tokio::task::spawn_blocking(move || source.capture()).await {
            Ok(frame) => frame,
            Err(e) => {
                error!(stream = %stream_id, error = ?e, "capture task panicked");
                None
            }
        };
        // Receiver may have timed out and gone away
        let _ = request.reply.send(result);
    }
    debug!(stream = %stream_id, "capture worker stopped");
}

/// Unit of background persistence work.
pub enum SaveJob {
    /// Persist one frame's payload pair.
    Frame {
        primary: FramePayload,
        secondary: FramePayload,
        frame_idx: u64,
    },
    /// Flush the pending timestamp batch.
    FlushTimestamps(TimestampLog),
}

/// Fire-and-forget persistence pool over one bounded MPMC queue.
pub struct SavePool {
    tx: async_channel::Sender<SaveJob>,
    metrics: Arc<PoolMetrics>,
    workers: Vec<JoinHandle<()>>,
}

impl SavePool {
    /// Spawn `worker_count` workers sharing one queue of `capacity` jobs.
    pub fn spawn(
        runtime: &Handle,
        store: Arc<dyn FrameStore>,
        worker_count: usize,
        capacity: usize,
    ) -> Self {
        let (tx, rx) = async_channel::bounded(capacity);
        let metrics = Arc::new(PoolMetrics::new());

        let workers = (0..worker_count)
            .map(|worker_idx| {
                let rx = rx.clone();
                let store = Arc::clone(&store);
                let metrics = Arc::clone(&metrics);
                runtime.spawn(save_worker(rx, store, metrics, worker_idx))
            })
            .collect();

        Self {
            tx,
            metrics,
            workers,
        }
    }

    pub fn metrics(&self) -> &Arc<PoolMetrics> {
        &self.metrics
    }

    /// Submit a job without blocking.
    ///
    /// Returns true if queued, false if the queue was full or closed (the
    /// job is dropped and counted).
    pub fn submit(&self, job: SaveJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => {
                self.metrics.inc_submitted();
                self.metrics.set_queue_len(self.tx.len());
                true
            }
            Err(async_channel::TrySendError::Full(job)) => {
                self.metrics.inc_dropped();
                match job {
                    SaveJob::Frame { frame_idx, .. } => {
                        warn!(frame_idx, "save queue full, frame dropped");
                    }
                    SaveJob::FlushTimestamps(_) => {
                        warn!("save queue full, timestamp flush postponed");
                    }
                }
                false
            }
            Err(async_channel::TrySendError::Closed(_)) => {
                error!("save pool closed, job dropped");
                false
            }
        }
    }

    /// Close the queue. Queued jobs keep draining in the background;
    /// nothing is awaited.
    pub fn shutdown(self) {
        self.tx.close();
        drop(self.workers);
    }
}

/// Save worker: drain jobs from the shared queue, running each blocking
/// write under `spawn_blocking`. A failed job is logged and counted, never
/// propagated.
async fn save_worker(
    rx: async_channel::Receiver<SaveJob>,
    store: Arc<dyn FrameStore>,
    metrics: Arc<PoolMetrics>,
    worker_idx: usize,
) {
    debug!(worker = worker_idx, "save worker started");
    while let Ok(job) = rx.recv().await {
        metrics.set_queue_len(rx.len());
        let store = Arc::clone(&store);

        let label = match &job {
            SaveJob::Frame { frame_idx, .. } => format!("frame {frame_idx}"),
            SaveJob::FlushTimestamps(_) => "timestamp flush".to_string(),
        };

        let result = tokio::task::spawn_blocking(move || match job {
            SaveJob::Frame {
                primary,
                secondary,
                frame_idx,
            } => store.save_pair(primary, secondary, frame_idx),
            SaveJob::FlushTimestamps(log) => log.flush(),
        })
        .await;

        match result {
            Ok(Ok(())) => metrics.inc_completed(),
            Ok(Err(e)) => {
                metrics.inc_failed();
                error!(job = %label, error = %e, "save job failed");
            }
            Err(e) => {
                metrics.inc_failed();
                error!(job = %label, error = ?e, "save job panicked");
            }
        }
    }
    debug!(worker = worker_idx, "save worker stopped");
}
