//! Recording metrics aggregation.
//!
//! Condenses a `RecordingStats` snapshot into summary statistics over the
//! history windows (mean/max/min/std of timing error and sync skew) for
//! the end-of-run report.

use contracts::RecordingStats;

/// Summarizes recording statistics snapshots.
#[derive(Debug, Clone, Copy)]
pub struct RecordingMetricsAggregator {
    good_sync_threshold_ms: f64,
}

impl RecordingMetricsAggregator {
    pub fn new(good_sync_threshold_ms: f64) -> Self {
        Self {
            good_sync_threshold_ms,
        }
    }

    /// Build a summary from a stats snapshot.
    ///
    /// Timing and sync statistics cover the history windows (most recent
    /// samples); counters cover the whole session.
    pub fn summarize(&self, stats: &RecordingStats) -> MetricsSummary {
        let mut timing = RunningStats::default();
        for v in &stats.timing_errors {
            timing.push(*v);
        }

        let mut sync = RunningStats::default();
        let mut good_sync = 0u64;
        for v in &stats.sync_history {
            sync.push(*v);
            if *v < self.good_sync_threshold_ms {
                good_sync += 1;
            }
        }

        let sync_samples = stats.sync_history.len() as u64;
        MetricsSummary {
            frame_count: stats.frame_count,
            expected_frame_count: stats.expected_frame_count,
            dropped_frames: stats.dropped_frames,
            late_frames: stats.late_frames,
            missed_frames: stats.missed_frames(),
            completion_rate: stats.completion_rate(),
            fps: stats.fps,
            timing_error_ms: StatsSummary::from(&timing),
            sync_diff_ms: StatsSummary::from(&sync),
            good_sync_rate: if sync_samples > 0 {
                good_sync as f64 / sync_samples as f64 * 100.0
            } else {
                0.0
            },
        }
    }
}

impl Default for RecordingMetricsAggregator {
    fn default() -> Self {
        Self::new(10.0)
    }
}

/// End-of-run metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub frame_count: u64,
    pub expected_frame_count: u64,
    pub dropped_frames: u64,
    pub late_frames: u64,
    pub missed_frames: u64,
    pub completion_rate: f64,
    pub fps: u32,
    pub timing_error_ms: StatsSummary,
    pub sync_diff_ms: StatsSummary,
    pub good_sync_rate: f64,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Recording Summary ===")?;
        writeln!(f, "Target rate: {} fps", self.fps)?;
        writeln!(
            f,
            "Frames saved: {} / {} expected ({:.2}%)",
            self.frame_count, self.expected_frame_count, self.completion_rate
        )?;
        writeln!(f, "Dropped slots: {}", self.dropped_frames)?;
        writeln!(f, "Late captures: {}", self.late_frames)?;
        writeln!(f, "Missed frames: {}", self.missed_frames)?;
        writeln!(f, "Timing error (ms): {}", self.timing_error_ms)?;
        writeln!(f, "Sync skew (ms): {}", self.sync_diff_ms)?;
        writeln!(f, "Good sync rate: {:.2}%", self.good_sync_rate)?;
        Ok(())
    }
}

/// Statistics summary of one metric window
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a sample
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean value
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum value
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum value
    pub fn max(&self) -> f64 {
        self.max
    }
}
