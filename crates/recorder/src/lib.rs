//! # Recorder
//!
//! Dual-stream synchronized frame acquisition core.
//!
//! The `RecordingScheduler` runs a drift-free timing loop on a dedicated
//! OS thread: deadlines are derived from a fixed origin, slots that fall
//! too far behind are dropped, both streams are captured concurrently
//! under a bounded timeout, and persistence is dispatched fire-and-forget
//! so file IO never perturbs the loop.

mod admission;
mod history;
mod pool;
mod scheduler;
mod sync;
mod synthetic;

pub use admission::{classify, Admission};
pub use history::HistoryRing;
pub use pool::{CapturePool, PoolMetrics, PoolMetricsSnapshot, SaveJob, SavePool};
pub use scheduler::RecordingScheduler;
pub use sync::SyncQualityEvaluator;
pub use synthetic::SyntheticFrameSource;
