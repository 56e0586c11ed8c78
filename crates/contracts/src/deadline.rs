//! FrameDeadline - absolute per-frame capture targets
//!
//! Deadlines are always derived from the fixed recording origin, never from
//! the previous deadline. Re-basing on the previous frame would let timing
//! error accumulate over a long run.

use serde::{Deserialize, Serialize};

/// Absolute target time for one frame slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDeadline {
    /// Monotonic counter over every attempted slot (saved + dropped + late)
    pub expected_index: u64,

    /// Absolute target time on the recording clock (nanoseconds)
    pub target_time_ns: u64,
}

impl FrameDeadline {
    /// Deadline for slot `expected_index`: `origin + index * interval`.
    pub fn from_origin(origin_ns: u64, expected_index: u64, interval_ns: u64) -> Self {
        Self {
            expected_index,
            target_time_ns: origin_ns + expected_index * interval_ns,
        }
    }

    /// Signed lag of `now_ns` against this deadline, in nanoseconds.
    /// Positive means the loop is running behind.
    pub fn lag_ns(&self, now_ns: u64) -> i64 {
        now_ns as i64 - self.target_time_ns as i64
    }
}
