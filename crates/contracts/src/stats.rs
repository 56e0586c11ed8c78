//! RecordingStats - point-in-time statistics snapshot

use serde::{Deserialize, Serialize};

/// Snapshot of the scheduler's running statistics.
///
/// Always a value copy taken under the stats lock, never a live alias into
/// structures the loop is still mutating.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordingStats {
    /// Frames actually persisted
    pub frame_count: u64,

    /// Deadlines processed (saved + dropped + failed + late)
    pub expected_frame_count: u64,

    /// Slots skipped because the loop fell too far behind
    pub dropped_frames: u64,

    /// Slots captured after their deadline but within tolerance
    pub late_frames: u64,

    /// Target frame rate for this session
    pub fps: u32,

    /// Most recent cross-stream skews (ms), oldest first
    pub sync_history: Vec<f64>,

    /// Most recent absolute timing errors (ms), oldest first
    pub timing_errors: Vec<f64>,
}

impl RecordingStats {
    /// Slots that produced no saved frame.
    pub fn missed_frames(&self) -> u64 {
        self.expected_frame_count.saturating_sub(self.frame_count)
    }

    /// Fraction of attempted slots that were persisted, in percent.
    pub fn completion_rate(&self) -> f64 {
        if self.expected_frame_count == 0 {
            return 100.0;
        }
        self.frame_count as f64 / self.expected_frame_count as f64 * 100.0
    }
}
