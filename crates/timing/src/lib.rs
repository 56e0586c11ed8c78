//! # Timing
//!
//! Monotonic recording clock and sub-millisecond waits.
//!
//! Responsibilities:
//! - One process-wide monotonic timeline that deadlines and capture spans
//!   share, so timestamps from different components are directly comparable
//! - Convert a frame rate into the deadline spacing
//! - Hybrid coarse-sleep / fine-poll waits for drift-free scheduling

use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};

use contracts::{FrameDeadline, TimingTuning};

/// Nanoseconds per second as f64, for interval math.
const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Nanoseconds elapsed on the process-wide monotonic timeline.
///
/// The anchor is fixed on first use; every caller reads the same timeline,
/// never the wall clock.
pub fn now_ns() -> u64 {
    static ANCHOR: OnceLock<Instant> = OnceLock::new();
    ANCHOR.get_or_init(Instant::now).elapsed().as_nanos() as u64
}

/// Frame interval for a target rate, as seconds and nanoseconds.
///
/// The nanosecond form is rounded once here so every deadline uses the
/// same spacing; re-deriving it per frame would let rounding drift in.
pub fn frame_interval(fps: u32) -> (f64, u64) {
    let secs = 1.0 / fps as f64;
    let nanos = (secs * NANOS_PER_SEC).round() as u64;
    (secs, nanos)
}

/// Clock handle with wait tuning.
///
/// Reads the shared timeline; holds only the tuning knobs for the hybrid
/// wait, so cloning is free and all instances agree on `now_ns`.
#[derive(Debug, Clone, Copy)]
pub struct TimingSource {
    tuning: TimingTuning,
}

impl TimingSource {
    pub fn new(tuning: TimingTuning) -> Self {
        Self { tuning }
    }

    /// Nanoseconds on the shared timeline.
    pub fn now_ns(&self) -> u64 {
        now_ns()
    }

    /// Deadline for `expected_index` frames after `origin_ns`.
    pub fn deadline(&self, origin_ns: u64, expected_index: u64, interval_ns: u64) -> FrameDeadline {
        FrameDeadline::from_origin(origin_ns, expected_index, interval_ns)
    }

    /// Block until `target_ns` on the shared timeline.
    ///
    /// Returns immediately if the target has already passed.
    pub fn wait_until(&self, target_ns: u64) {
        let now = now_ns();
        if target_ns <= now {
            return;
        }
        self.wait((target_ns - now) as f64 / NANOS_PER_SEC);
    }

    /// Block for `secs` with sub-millisecond accuracy.
    ///
    /// Long waits are mostly block-slept, leaving `safety_margin` in
    /// reserve. The residual is consumed by polling the clock every
    /// `busy_wait_granularity` seconds. Short waits skip straight to the
    /// polling phase. A non-positive duration returns immediately.
    pub fn wait(&self, secs: f64) {
        if secs <= 0.0 {
            return;
        }

        let start = Instant::now();

        if secs > self.tuning.coarse_sleep_threshold {
            let coarse = secs - self.tuning.safety_margin;
            thread::sleep(Duration::from_secs_f64(coarse));
        }

        let probe = Duration::from_secs_f64(self.tuning.busy_wait_granularity);
        while start.elapsed().as_secs_f64() < secs {
            thread::sleep(probe);
        }
    }
}

impl Default for TimingSource {
    fn default() -> Self {
        Self::new(TimingTuning::default())
    }
}
