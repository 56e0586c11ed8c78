//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Uses a shared monotonic clock (nanoseconds, u64) as primary clock
//! - All deadlines derive from one fixed recording origin, never from the
//!   previous deadline, so timing error cannot accumulate

mod config;
mod deadline;
mod error;
mod frame;
mod record;
mod source;
mod stats;
mod store;
mod stream_id;
mod sync;

pub use config::*;
pub use deadline::FrameDeadline;
pub use error::*;
pub use frame::*;
pub use record::TimestampRecord;
pub use source::FrameSource;
pub use stats::RecordingStats;
pub use store::FrameStore;
pub use stream_id::StreamId;
pub use sync::{SyncBucket, SyncQuality};
