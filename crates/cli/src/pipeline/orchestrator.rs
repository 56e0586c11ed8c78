//! Session orchestrator - wires sources, store, log, and scheduler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{info, warn};

use contracts::{FrameSource, RecorderConfig, StreamConfig, StreamKind};
use recorder::{RecordingScheduler, SyntheticFrameSource};
use timestamp_log::TimestampLog;

use crate::session::{self, SessionInfo};
use crate::store::FileStore;

use super::RunStats;

/// How often the poll loop logs a progress snapshot.
const PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

/// Session configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The recorder configuration
    pub config: RecorderConfig,

    /// Recording duration limit (None = until stopped)
    pub duration: Option<Duration>,

    /// Maximum frames to save (None = unlimited)
    pub max_frames: Option<u64>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Recording session orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new session with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the session to completion.
    ///
    /// Blocking: meant to run off the async runtime (the caller wraps it in
    /// `spawn_blocking`). `stop` is the external termination signal, set by
    /// the Ctrl+C handler.
    pub fn run_blocking(self, stop: Arc<AtomicBool>) -> Result<RunStats> {
        let config = &self.config.config;

        // Metrics endpoint (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!(port, "metrics endpoint available");
        }

        // Session directories and persistence
        let paths = session::create_session(config).context("creating session directories")?;
        let store = Arc::new(FileStore::new(&paths.primary_dir, &paths.secondary_dir));
        let timestamp_log = TimestampLog::new(&paths.timestamp_path, config.batch_size);

        let sources: Vec<Arc<dyn FrameSource>> = vec![
            build_source(&config.streams.primary),
            build_source(&config.streams.secondary),
        ];

        info!(
            primary = %config.streams.primary.id,
            secondary = %config.streams.secondary.id,
            fps = config.fps,
            "starting recording session"
        );

        let scheduler = RecordingScheduler::new(config.clone())?;
        let started_at = Local::now();
        let start = Instant::now();
        scheduler.start(sources, store, timestamp_log.clone())?;

        // Poll until a limit is hit or the stop signal fires
        let mut last_progress = Instant::now();
        while scheduler.is_recording() {
            if stop.load(Ordering::Acquire) {
                info!("stop signal received");
                break;
            }
            if let Some(limit) = self.config.duration {
                if start.elapsed() >= limit {
                    info!(secs = limit.as_secs(), "duration limit reached");
                    break;
                }
            }
            if let Some(max) = self.config.max_frames {
                if scheduler.stats().frame_count >= max {
                    info!(max, "frame limit reached");
                    break;
                }
            }

            if last_progress.elapsed() >= PROGRESS_INTERVAL {
                let snapshot = scheduler.stats();
                info!(
                    saved = snapshot.frame_count,
                    expected = snapshot.expected_frame_count,
                    dropped = snapshot.dropped_frames,
                    late = snapshot.late_frames,
                    "recording in progress"
                );
                last_progress = Instant::now();
            }

            thread::sleep(Duration::from_millis(100));
        }

        let stop_result = scheduler.stop();
        let duration = start.elapsed();
        let stats = scheduler.stats();

        if let Err(e) = &stop_result {
            warn!(error = %e, "session ended on a loop fault");
        }

        let info = SessionInfo {
            started_at,
            ended_at: Local::now(),
            fps: config.fps,
            frame_tolerance: config.frame_tolerance,
            primary_stream: config.streams.primary.id.to_string(),
            secondary_stream: config.streams.secondary.id.to_string(),
            stats: stats.clone(),
        };
        if let Err(e) = session::write_session_info(&paths.root, &info) {
            warn!(error = %e, "failed to write session info");
        }

        stop_result.context("recording loop fault")?;

        Ok(RunStats {
            stats,
            duration,
            session_dir: paths.root,
            good_sync_threshold_ms: config.sync_good_threshold_ms,
        })
    }
}

/// Build the capture source for one configured stream.
fn build_source(stream: &StreamConfig) -> Arc<dyn FrameSource> {
    match stream.kind {
        StreamKind::Image => Arc::new(SyntheticFrameSource::image(
            stream.id.as_str(),
            stream.width,
            stream.height,
        )),
        StreamKind::Array => Arc::new(SyntheticFrameSource::array(
            stream.id.as_str(),
            stream.height,
            stream.width,
        )),
    }
}
