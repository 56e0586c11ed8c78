//! Synthetic Session Demo
//!
//! Runs a short recording session against synthetic sources, with frames
//! counted instead of persisted. No hardware or filesystem layout needed
//! beyond a temp directory for the timestamp log.
//!
//! Run with: cargo run --bin synthetic_session

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use config_loader::ConfigLoader;
use contracts::{FramePayload, FrameSource, FrameStore, RecorderError};
use observability::{LogFormat, ObservabilityConfig, RecordingMetricsAggregator};
use recorder::{RecordingScheduler, SyntheticFrameSource};
use timestamp_log::TimestampLog;

/// Counts saved pairs instead of writing them anywhere.
struct CountingStore {
    saved: AtomicU64,
}

impl FrameStore for CountingStore {
    fn save_pair(
        &self,
        primary: FramePayload,
        secondary: FramePayload,
        frame_idx: u64,
    ) -> Result<(), RecorderError> {
        self.saved.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            frame_idx,
            primary_bytes = primary.len(),
            secondary_bytes = secondary.len(),
            "frame pair received"
        );
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init_with_config(ObservabilityConfig {
        log_format: LogFormat::Compact,
        metrics_port: None,
        default_log_level: "info".to_string(),
    })?;

    tracing::info!("Starting synthetic recording demo");

    // Default config, or load one passed on the command line
    let mut config = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading configuration");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        Default::default()
    };
    config.fps = 10;
    config.batch_size = 20;

    let log_path = std::env::temp_dir().join("synthetic_session_timestamps.txt");
    let _ = std::fs::remove_file(&log_path);
    let timestamp_log = TimestampLog::new(&log_path, config.batch_size);

    let sources: Vec<Arc<dyn FrameSource>> = vec![
        Arc::new(
            SyntheticFrameSource::image("rgb", 64, 64).with_jitter(Duration::from_millis(3)),
        ),
        Arc::new(
            SyntheticFrameSource::array("thermal", 62, 80)
                .with_latency(Duration::from_millis(2)),
        ),
    ];
    let store = Arc::new(CountingStore {
        saved: AtomicU64::new(0),
    });

    let threshold = config.sync_good_threshold_ms;
    let scheduler = RecordingScheduler::new(config)?;
    scheduler.start(sources, Arc::clone(&store) as _, timestamp_log)?;

    tracing::info!("Recording for 3 seconds...");
    std::thread::sleep(Duration::from_secs(3));

    scheduler.stop()?;
    let stats = scheduler.stats();

    let summary = RecordingMetricsAggregator::new(threshold).summarize(&stats);
    println!("\n{summary}");
    println!(
        "Pairs delivered to store: {}",
        store.saved.load(Ordering::Relaxed)
    );
    println!("Timestamp log: {}", log_path.display());

    Ok(())
}
