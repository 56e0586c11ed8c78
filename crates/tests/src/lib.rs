//! # Integration Tests
//!
//! End-to-end tests over the full recording path.
//!
//! Covers:
//! - Scheduler lifecycle against synthetic sources and a disk store
//! - Timestamp log file format
//! - Counter invariants under slow and flaky sources
//! - End-of-run summary aggregation

#[cfg(test)]
mod contract_tests {
    use contracts::RecorderConfig;

    #[test]
    fn test_default_config_is_valid() {
        let config = RecorderConfig::default();
        assert!(config_loader::ConfigLoader::validate(&config).is_ok());
        assert_eq!(config.fps, 12);
        assert_eq!(config.streams.primary.id, "rgb");
        assert_eq!(config.streams.secondary.id, "thermal");
    }

    #[test]
    fn test_full_toml_loads() {
        let content = r#"
fps = 20
frame_tolerance = 1.5
batch_size = 25
capture_workers = 2
save_workers = 2
capture_timeout_secs = 3
save_queue_capacity = 32
history_capacity = 50
sync_good_threshold_ms = 8.0

[timing]
coarse_sleep_threshold = 0.002
safety_margin = 0.001
busy_wait_granularity = 0.0005

[streams.primary]
id = "rgb"
kind = "image"
width = 320
height = 240

[streams.secondary]
id = "thermal"
kind = "array"
width = 80
height = 62

[output]
records_root = "/tmp/records"
timestamp_file = "ts.csv"
"#;
        let config =
            config_loader::ConfigLoader::load_from_str(content, config_loader::ConfigFormat::Toml)
                .unwrap();
        assert_eq!(config.fps, 20);
        assert_eq!(config.batch_size, 25);
        assert_eq!(config.streams.primary.width, 320);
        assert_eq!(config.output.timestamp_file, "ts.csv");
        assert!((config.timing.safety_margin - 0.001).abs() < 1e-12);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use contracts::{FramePayload, FrameSource, FrameStore, RecorderConfig, RecorderError};
    use observability::RecordingMetricsAggregator;
    use recorder::{RecordingScheduler, SyntheticFrameSource};
    use tempfile::tempdir;
    use timestamp_log::TimestampLog;

    /// Writes each payload of a pair as one file per stream directory.
    struct DirStore {
        primary_dir: PathBuf,
        secondary_dir: PathBuf,
    }

    impl DirStore {
        fn new(root: &Path) -> Self {
            let primary_dir = root.join("primary");
            let secondary_dir = root.join("secondary");
            fs::create_dir_all(&primary_dir).unwrap();
            fs::create_dir_all(&secondary_dir).unwrap();
            Self {
                primary_dir,
                secondary_dir,
            }
        }

        fn write(dir: &Path, payload: FramePayload, frame_idx: u64) -> Result<(), RecorderError> {
            let bytes = match payload {
                FramePayload::Image(img) => img.data.to_vec(),
                FramePayload::Array(arr) => {
                    arr.data.iter().flat_map(|v| v.to_le_bytes()).collect()
                }
                FramePayload::Raw(raw) => raw.to_vec(),
            };
            fs::write(dir.join(format!("{frame_idx:06}.bin")), bytes)
                .map_err(|e| RecorderError::store_write(frame_idx, e.to_string()))
        }

        fn count(dir: &Path) -> usize {
            fs::read_dir(dir).unwrap().count()
        }
    }

    impl FrameStore for DirStore {
        fn save_pair(
            &self,
            primary: FramePayload,
            secondary: FramePayload,
            frame_idx: u64,
        ) -> Result<(), RecorderError> {
            Self::write(&self.primary_dir, primary, frame_idx)?;
            Self::write(&self.secondary_dir, secondary, frame_idx)
        }
    }

    fn fast_config() -> RecorderConfig {
        let mut config = RecorderConfig::default();
        config.fps = 20;
        config.batch_size = 5;
        config.streams.primary.width = 8;
        config.streams.primary.height = 8;
        config.streams.secondary.width = 4;
        config.streams.secondary.height = 4;
        config
    }

    fn sources() -> Vec<Arc<dyn FrameSource>> {
        vec![
            Arc::new(SyntheticFrameSource::image("rgb", 8, 8)),
            Arc::new(SyntheticFrameSource::array("thermal", 4, 4)),
        ]
    }

    #[test]
    fn test_e2e_recording_to_disk() {
        let dir = tempdir().unwrap();
        let store = Arc::new(DirStore::new(dir.path()));
        let log = TimestampLog::new(dir.path().join("timestamps.txt"), 5);

        let scheduler = RecordingScheduler::new(fast_config()).unwrap();
        scheduler.start(sources(), Arc::clone(&store) as _, log).unwrap();
        thread::sleep(Duration::from_millis(600));
        scheduler.stop().unwrap();

        let stats = scheduler.stats();
        assert!(stats.frame_count >= 5, "saved {} frames", stats.frame_count);
        assert_eq!(stats.frame_count, stats.expected_frame_count);
        assert_eq!(stats.dropped_frames, 0);

        // Save workers drain queued jobs after shutdown
        thread::sleep(Duration::from_millis(500));
        let primary_files = DirStore::count(&store.primary_dir);
        let secondary_files = DirStore::count(&store.secondary_dir);
        assert_eq!(primary_files, secondary_files);
        assert_eq!(primary_files as u64, stats.frame_count);
    }

    #[test]
    fn test_timestamp_file_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("timestamps.txt");
        let store = Arc::new(DirStore::new(dir.path()));
        let log = TimestampLog::new(&path, 5);

        let scheduler = RecordingScheduler::new(fast_config()).unwrap();
        scheduler.start(sources(), store, log).unwrap();
        thread::sleep(Duration::from_millis(400));
        scheduler.stop().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "frame_idx,expected_frame_idx,target_time_ns,timing_error_ms,sync_diff_ms"
        );

        let mut previous_idx = None;
        for line in lines {
            let fields: Vec<&str> = line.split(',').collect();
            assert_eq!(fields.len(), 5, "malformed row: {line}");

            let frame_idx: u64 = fields[0].parse().unwrap();
            let expected_idx: u64 = fields[1].parse().unwrap();
            let _target_ns: u64 = fields[2].parse().unwrap();
            let _timing_err: f64 = fields[3].parse().unwrap();
            let sync_diff: f64 = fields[4].parse().unwrap();

            assert!(expected_idx >= frame_idx);
            assert!(sync_diff >= 0.0);
            if let Some(prev) = previous_idx {
                assert_eq!(frame_idx, prev + 1);
            }
            previous_idx = Some(frame_idx);
        }
        assert!(previous_idx.is_some(), "no rows written");
    }

    #[test]
    fn test_flaky_stream_widens_expected_count() {
        let dir = tempdir().unwrap();
        let store = Arc::new(DirStore::new(dir.path()));
        let log = TimestampLog::new(dir.path().join("timestamps.txt"), 5);

        let flaky_sources: Vec<Arc<dyn FrameSource>> = vec![
            Arc::new(SyntheticFrameSource::image("rgb", 8, 8)),
            Arc::new(SyntheticFrameSource::array("thermal", 4, 4).with_failure_every(3)),
        ];

        let scheduler = RecordingScheduler::new(fast_config()).unwrap();
        scheduler.start(flaky_sources, store, log).unwrap();
        thread::sleep(Duration::from_millis(600));
        scheduler.stop().unwrap();

        let stats = scheduler.stats();
        // Every third capture fails, so slots are consumed without saves
        assert!(stats.expected_frame_count > stats.frame_count);
        assert!(stats.frame_count > 0);
    }

    #[test]
    fn test_slow_capture_is_marked_late() {
        let dir = tempdir().unwrap();
        let store = Arc::new(DirStore::new(dir.path()));
        let log = TimestampLog::new(dir.path().join("timestamps.txt"), 5);

        // 55ms captures against a 50ms interval fall behind a little each
        // frame but stay inside the 60ms tolerance for a while
        let slow_sources: Vec<Arc<dyn FrameSource>> = vec![
            Arc::new(
                SyntheticFrameSource::image("rgb", 8, 8).with_latency(Duration::from_millis(55)),
            ),
            Arc::new(SyntheticFrameSource::array("thermal", 4, 4)),
        ];

        let scheduler = RecordingScheduler::new(fast_config()).unwrap();
        scheduler.start(slow_sources, store, log).unwrap();
        thread::sleep(Duration::from_millis(600));
        scheduler.stop().unwrap();

        let stats = scheduler.stats();
        assert!(stats.late_frames > 0, "expected late captures");
    }

    #[test]
    fn test_summary_over_session() {
        let dir = tempdir().unwrap();
        let store = Arc::new(DirStore::new(dir.path()));
        let log = TimestampLog::new(dir.path().join("timestamps.txt"), 5);

        let config = fast_config();
        let threshold = config.sync_good_threshold_ms;
        let scheduler = RecordingScheduler::new(config).unwrap();
        scheduler.start(sources(), store, log).unwrap();
        thread::sleep(Duration::from_millis(400));
        scheduler.stop().unwrap();

        let stats = scheduler.stats();
        let summary = RecordingMetricsAggregator::new(threshold).summarize(&stats);

        assert_eq!(summary.frame_count, stats.frame_count);
        assert_eq!(summary.fps, 20);
        assert!(summary.completion_rate <= 100.0);
        assert_eq!(summary.sync_diff_ms.count, stats.sync_history.len() as u64);

        let report = format!("{summary}");
        assert!(report.contains("=== Recording Summary ==="));
        assert!(report.contains("Target rate: 20 fps"));
    }

    #[test]
    fn test_restarted_session_writes_its_own_log() {
        let dir = tempdir().unwrap();
        let store = Arc::new(DirStore::new(dir.path()));
        let scheduler = RecordingScheduler::new(fast_config()).unwrap();

        let first_path = dir.path().join("first.txt");
        let log = TimestampLog::new(&first_path, 5);
        scheduler.start(sources(), Arc::clone(&store) as _, log).unwrap();
        thread::sleep(Duration::from_millis(300));
        scheduler.stop().unwrap();

        let second_path = dir.path().join("second.txt");
        let log = TimestampLog::new(&second_path, 5);
        scheduler.start(sources(), store, log).unwrap();
        thread::sleep(Duration::from_millis(300));
        scheduler.stop().unwrap();

        let first = fs::read_to_string(&first_path).unwrap();
        let second = fs::read_to_string(&second_path).unwrap();
        assert!(first.lines().count() > 1);
        assert!(second.lines().count() > 1);
        // Each session restarts frame numbering from zero
        assert!(second.lines().nth(1).unwrap().starts_with("0,"));
    }
}
