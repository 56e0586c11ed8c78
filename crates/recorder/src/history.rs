//! Fixed-capacity metric history with oldest-first eviction.

use ringbuf::{traits::*, HeapRb};

/// Ring of the most recent `f64` samples.
///
/// Pushing into a full ring evicts the oldest sample. Snapshots are
/// oldest-first copies, safe to hand out while the loop keeps pushing.
pub struct HistoryRing {
    buf: HeapRb<f64>,
}

impl std::fmt::Debug for HistoryRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryRing")
            .field("len", &self.buf.occupied_len())
            .field("capacity", &self.buf.capacity().get())
            .finish()
    }
}

impl HistoryRing {
    /// Create a ring holding at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: HeapRb::new(capacity),
        }
    }

    /// Append a sample, evicting the oldest when full.
    #[inline]
    pub fn push(&mut self, value: f64) {
        if self.buf.is_full() {
            let _ = self.buf.try_pop();
        }
        let _ = self.buf.try_push(value);
    }

    /// Oldest-first copy of the current samples.
    pub fn to_vec(&self) -> Vec<f64> {
        self.buf.iter().copied().collect()
    }

    /// Current sample count.
    pub fn len(&self) -> usize {
        self.buf.occupied_len()
    }

    /// Whether no samples are held.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Discard all samples, keeping the capacity.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_snapshot_order() {
        let mut ring = HistoryRing::new(5);
        ring.push(1.0);
        ring.push(2.0);
        ring.push(3.0);
        assert_eq!(ring.to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_full_ring_evicts_oldest() {
        let mut ring = HistoryRing::new(3);
        for v in 1..=5 {
            ring.push(v as f64);
        }
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.to_vec(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_clear() {
        let mut ring = HistoryRing::new(3);
        ring.push(1.0);
        ring.clear();
        assert!(ring.is_empty());
        ring.push(2.0);
        assert_eq!(ring.to_vec(), vec![2.0]);
    }
}
