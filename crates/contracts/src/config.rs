//! Recorder configuration contracts shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

use crate::StreamId;

/// Top-level recorder configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecorderConfig {
    /// Target frame rate (frames per second)
    #[serde(default = "defaults::fps")]
    #[validate(range(min = 1, max = 25))]
    pub fps: u32,

    /// Lateness tolerance as a multiplier on the frame interval. A slot
    /// whose lag exceeds `frame_tolerance * interval` is dropped without
    /// attempting capture.
    #[serde(default = "defaults::frame_tolerance")]
    #[validate(range(exclusive_min = 0.0))]
    pub frame_tolerance: f64,

    /// Timestamp records accumulated before a background flush
    #[serde(default = "defaults::batch_size")]
    #[validate(range(min = 1))]
    pub batch_size: usize,

    /// Capture worker count (one per stream)
    #[serde(default = "defaults::workers")]
    #[validate(range(min = 1))]
    pub capture_workers: usize,

    /// Save worker count
    #[serde(default = "defaults::workers")]
    #[validate(range(min = 1))]
    pub save_workers: usize,

    /// Bounded wait on the concurrent capture join (seconds)
    #[serde(default = "defaults::capture_timeout_secs")]
    #[validate(range(min = 1))]
    pub capture_timeout_secs: u64,

    /// Capacity of the fire-and-forget save queue
    #[serde(default = "defaults::save_queue_capacity")]
    #[validate(range(min = 1))]
    pub save_queue_capacity: usize,

    /// Entries retained in the sync / timing-error histories
    #[serde(default = "defaults::history_capacity")]
    #[validate(range(min = 1))]
    pub history_capacity: usize,

    /// Cross-stream skew below this is bucketed "good" (milliseconds)
    #[serde(default = "defaults::sync_good_threshold_ms")]
    #[validate(range(exclusive_min = 0.0))]
    pub sync_good_threshold_ms: f64,

    /// Hybrid wait tuning
    #[serde(default)]
    #[validate(nested)]
    pub timing: TimingTuning,

    /// The two recorded streams
    #[serde(default)]
    pub streams: StreamsConfig,

    /// Output locations
    #[serde(default)]
    pub output: OutputConfig,

    /// Prometheus exporter port (None = disabled)
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            fps: defaults::fps(),
            frame_tolerance: defaults::frame_tolerance(),
            batch_size: defaults::batch_size(),
            capture_workers: defaults::workers(),
            save_workers: defaults::workers(),
            capture_timeout_secs: defaults::capture_timeout_secs(),
            save_queue_capacity: defaults::save_queue_capacity(),
            history_capacity: defaults::history_capacity(),
            sync_good_threshold_ms: defaults::sync_good_threshold_ms(),
            timing: TimingTuning::default(),
            streams: StreamsConfig::default(),
            output: OutputConfig::default(),
            metrics_port: None,
        }
    }
}

/// Hybrid wait tuning knobs.
///
/// A wait longer than `coarse_sleep_threshold` is mostly block-slept,
/// keeping `safety_margin` in reserve; the residual is consumed by polling
/// the clock every `busy_wait_granularity` seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct TimingTuning {
    /// Waits above this use a coarse blocking sleep first (seconds)
    #[serde(default = "defaults::coarse_sleep_threshold")]
    #[validate(range(exclusive_min = 0.0))]
    pub coarse_sleep_threshold: f64,

    /// Reserve left for the fine phase after a coarse sleep (seconds)
    #[serde(default = "defaults::safety_margin")]
    #[validate(range(exclusive_min = 0.0))]
    pub safety_margin: f64,

    /// Clock poll period during the fine phase (seconds)
    #[serde(default = "defaults::busy_wait_granularity")]
    #[validate(range(exclusive_min = 0.0))]
    pub busy_wait_granularity: f64,
}

impl Default for TimingTuning {
    fn default() -> Self {
        Self {
            coarse_sleep_threshold: defaults::coarse_sleep_threshold(),
            safety_margin: defaults::safety_margin(),
            busy_wait_granularity: defaults::busy_wait_granularity(),
        }
    }
}

/// The recorded stream pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamsConfig {
    /// Primary stream (reference for sync skew sign conventions)
    pub primary: StreamConfig,

    /// Secondary stream
    pub secondary: StreamConfig,
}

impl Default for StreamsConfig {
    fn default() -> Self {
        Self {
            primary: StreamConfig {
                id: StreamId::new("rgb"),
                kind: StreamKind::Image,
                width: 640,
                height: 640,
            },
            secondary: StreamConfig {
                id: StreamId::new("thermal"),
                kind: StreamKind::Array,
                width: 80,
                height: 62,
            },
        }
    }
}

/// One stream's identity and payload shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Stream identifier
    pub id: StreamId,

    /// Payload kind produced by this stream
    #[serde(default)]
    pub kind: StreamKind,

    /// Payload width (pixels or columns)
    #[serde(default = "defaults::stream_width")]
    pub width: u32,

    /// Payload height (pixels or rows)
    #[serde(default = "defaults::stream_height")]
    pub height: u32,
}

/// Payload kind of a stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    /// Pixel frames
    #[default]
    Image,
    /// Numeric grids
    Array,
}

/// Output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for recording sessions
    #[serde(default = "defaults::records_root")]
    pub records_root: PathBuf,

    /// Timestamp log file name inside a session directory
    #[serde(default = "defaults::timestamp_file")]
    pub timestamp_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            records_root: defaults::records_root(),
            timestamp_file: defaults::timestamp_file(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn fps() -> u32 {
        12
    }
    pub fn frame_tolerance() -> f64 {
        1.2
    }
    pub fn batch_size() -> usize {
        50
    }
    pub fn workers() -> usize {
        2
    }
    pub fn capture_timeout_secs() -> u64 {
        5
    }
    pub fn save_queue_capacity() -> usize {
        64
    }
    pub fn history_capacity() -> usize {
        100
    }
    pub fn sync_good_threshold_ms() -> f64 {
        10.0
    }
    pub fn coarse_sleep_threshold() -> f64 {
        0.001
    }
    pub fn safety_margin() -> f64 {
        0.0005
    }
    pub fn busy_wait_granularity() -> f64 {
        0.0001
    }
    pub fn stream_width() -> u32 {
        640
    }
    pub fn stream_height() -> u32 {
        640
    }
    pub fn records_root() -> PathBuf {
        PathBuf::from("./records")
    }
    pub fn timestamp_file() -> String {
        "timestamps.txt".to_string()
    }
}
