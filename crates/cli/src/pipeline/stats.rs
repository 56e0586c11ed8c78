//! Run statistics and end-of-session report.

use std::path::PathBuf;
use std::time::Duration;

use contracts::RecordingStats;
use observability::RecordingMetricsAggregator;

/// Statistics from one recording run
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Final scheduler statistics snapshot
    pub stats: RecordingStats,

    /// Wall-clock duration of the session
    pub duration: Duration,

    /// Session directory the run wrote into
    pub session_dir: PathBuf,

    /// Sync skew bucket boundary used for the report (ms)
    pub good_sync_threshold_ms: f64,
}

impl RunStats {
    /// Achieved save rate in frames per second
    pub fn achieved_fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.stats.frame_count as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print the detailed end-of-run report
    pub fn print_summary(&self) {
        let summary =
            RecordingMetricsAggregator::new(self.good_sync_threshold_ms).summarize(&self.stats);

        println!();
        println!("{summary}");
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        println!("Achieved rate: {:.2} fps", self.achieved_fps());
        println!("Session: {}", self.session_dir.display());
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_achieved_fps() {
        let run = RunStats {
            stats: RecordingStats {
                frame_count: 120,
                expected_frame_count: 120,
                fps: 12,
                ..Default::default()
            },
            duration: Duration::from_secs(10),
            session_dir: PathBuf::from("/tmp/session"),
            good_sync_threshold_ms: 10.0,
        };
        assert!((run.achieved_fps() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_duration_fps() {
        let run = RunStats {
            stats: RecordingStats::default(),
            duration: Duration::ZERO,
            session_dir: PathBuf::new(),
            good_sync_threshold_ms: 10.0,
        };
        assert_eq!(run.achieved_fps(), 0.0);
    }
}
