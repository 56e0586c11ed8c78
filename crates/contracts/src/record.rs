//! TimestampRecord - per-saved-frame metadata row

use serde::{Deserialize, Serialize};

/// Metadata written for every persisted frame.
///
/// `frame_idx` is a compact sequence over saved frames only;
/// `expected_frame_idx` advances on every attempted deadline, so a gap
/// between the two columns identifies dropped or failed slots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimestampRecord {
    /// Index among persisted frames
    pub frame_idx: u64,

    /// Index among all attempted deadlines
    pub expected_frame_idx: u64,

    /// Planned capture time on the recording clock (nanoseconds)
    pub target_time_ns: u64,

    /// Signed deviation of the evaluation time from the target (ms)
    pub timing_error_ms: f64,

    /// Cross-stream capture-start skew (ms)
    pub sync_diff_ms: f64,
}
