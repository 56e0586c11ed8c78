//! FrameSource trait - per-stream capture abstraction
//!
//! Decouples the scheduler from concrete sensor hardware. Real camera
//! drivers and synthetic sources implement the same interface.

use crate::CapturedFrame;

/// Per-stream capture operation.
///
/// The scheduler invokes `capture` once per stream per attempted frame,
/// concurrently across streams, from a capture worker. Implementations must
/// swallow their own failures and return `None`; a `None` (or a join
/// timeout) forfeits the whole frame with no retry.
pub trait FrameSource: Send + Sync {
    /// Stream identifier (used for logging/metrics and dispatch)
    fn stream_id(&self) -> &str;

    /// Perform one blocking capture.
    ///
    /// Returns the payload plus its timing on the shared recording clock,
    /// or `None` if the read failed.
    fn capture(&self) -> Option<CapturedFrame>;
}
