//! FrameStore trait - frame pair persistence abstraction

use crate::{FramePayload, RecorderError};

/// Persists one frame's paired payloads.
///
/// Invoked on a save worker, never on the timing-critical loop. Dispatch is
/// fire-and-forget: a returned error is logged and counted by the worker and
/// does not affect subsequent scheduling.
pub trait FrameStore: Send + Sync {
    /// Persist both payloads of frame `frame_idx` as a single unit.
    fn save_pair(
        &self,
        primary: FramePayload,
        secondary: FramePayload,
        frame_idx: u64,
    ) -> Result<(), RecorderError>;
}
