//! Frame admission policy
//!
//! Each deadline is classified once, from how far behind the loop is:
//! ahead of the deadline means wait, behind within tolerance means capture
//! late, behind beyond tolerance means drop the slot without capturing.

/// Outcome of admitting one frame slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Deadline is still ahead; wait for it, then capture.
    Wait,
    /// Deadline has passed but within tolerance; capture immediately.
    Late,
    /// Too far behind; skip the slot entirely.
    Drop,
}

/// Classify a slot from its lag behind the deadline.
///
/// `lag_ns` is positive when the loop is behind. The drop comparison is
/// strict: a lag of exactly `tolerance_ns` is still a late capture.
pub fn classify(lag_ns: i64, tolerance_ns: f64) -> Admission {
    if lag_ns as f64 > tolerance_ns {
        Admission::Drop
    } else if lag_ns > 0 {
        Admission::Late
    } else {
        Admission::Wait
    }
}
