//! SyncQuality - cross-stream alignment measurement
//!
//! Ephemeral per-frame diagnostic derived from the two capture start times.
//! Never gates frame admission.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cross-stream sync measurement for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyncQuality {
    /// Absolute difference between the two capture start times (ms)
    pub diff_ms: f64,

    /// Quality bucket for the measured skew
    pub bucket: SyncBucket,
}

/// Quality bucket for cross-stream skew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncBucket {
    /// Skew below the configured threshold
    Good,
    /// Skew at or above the configured threshold
    Poor,
}

impl fmt::Display for SyncBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncBucket::Good => write!(f, "good"),
            SyncBucket::Poor => write!(f, "poor"),
        }
    }
}
