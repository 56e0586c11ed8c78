//! Cross-stream synchronization quality.

use contracts::{SyncBucket, SyncQuality};

/// Buckets the skew between the two streams' capture start times.
///
/// Diagnostic only: the verdict never influences admission or persistence.
#[derive(Debug, Clone, Copy)]
pub struct SyncQualityEvaluator {
    good_threshold_ms: f64,
}

impl SyncQualityEvaluator {
    pub fn new(good_threshold_ms: f64) -> Self {
        Self { good_threshold_ms }
    }

    /// Evaluate one frame from both capture start times (ns, same clock).
    pub fn evaluate(&self, primary_start_ns: u64, secondary_start_ns: u64) -> SyncQuality {
        let diff_ms = primary_start_ns.abs_diff(secondary_start_ns) as f64 / 1e6;
        let bucket = if diff_ms < self.good_threshold_ms {
            SyncBucket::Good
        } else {
            SyncBucket::Poor
        };
        SyncQuality { diff_ms, bucket }
    }
}

impl Default for SyncQualityEvaluator {
    fn default() -> Self {
        Self::new(10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_skew_is_good() {
        let eval = SyncQualityEvaluator::default();
        let quality = eval.evaluate(100_000_000, 103_000_000);
        assert!((quality.diff_ms - 3.0).abs() < 1e-9);
        assert_eq!(quality.bucket, SyncBucket::Good);
    }

    #[test]
    fn test_large_skew_is_poor() {
        let eval = SyncQualityEvaluator::default();
        let quality = eval.evaluate(100_000_000, 115_000_000);
        assert!((quality.diff_ms - 15.0).abs() < 1e-9);
        assert_eq!(quality.bucket, SyncBucket::Poor);
    }

    #[test]
    fn test_skew_is_symmetric() {
        let eval = SyncQualityEvaluator::default();
        let a = eval.evaluate(5_000_000, 9_000_000);
        let b = eval.evaluate(9_000_000, 5_000_000);
        assert_eq!(a.diff_ms, b.diff_ms);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let eval = SyncQualityEvaluator::new(10.0);
        let at = eval.evaluate(0, 10_000_000);
        assert_eq!(at.bucket, SyncBucket::Poor);
        let under = eval.evaluate(0, 9_999_999);
        assert_eq!(under.bucket, SyncBucket::Good);
    }
}
