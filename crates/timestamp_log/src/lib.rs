//! # Timestamp Log
//!
//! Batched CSV persistence for per-frame timing records.
//!
//! Records accumulate in memory and are appended to a session-scoped CSV
//! file in batches, keeping file IO off the timing-critical loop. A failed
//! flush keeps its records queued so a later flush can retry them.

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use metrics::counter;
use tracing::{debug, warn};

use contracts::{RecorderError, TimestampRecord};

const HEADER: &str = "frame_idx,expected_frame_idx,target_time_ns,timing_error_ms,sync_diff_ms";

/// Shareable handle to a session's timestamp log.
///
/// Clones share one pending buffer. `add` is cheap and lock-bounded;
/// `flush` does file IO and is meant to run on a save worker, with one
/// final synchronous flush at session stop.
#[derive(Debug, Clone)]
pub struct TimestampLog {
    pending: Arc<Mutex<Vec<TimestampRecord>>>,
    path: PathBuf,
    batch_size: usize,
}

impl TimestampLog {
    /// Create a log appending to `path`, flushing every `batch_size` records.
    pub fn new(path: impl Into<PathBuf>, batch_size: usize) -> Self {
        Self {
            pending: Arc::new(Mutex::new(Vec::with_capacity(batch_size))),
            path: path.into(),
            batch_size,
        }
    }

    /// Queue one record.
    pub fn add(&self, record: TimestampRecord) {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).push(record);
    }

    /// Whether the pending buffer has reached the batch threshold.
    pub fn should_flush(&self) -> bool {
        self.len() >= self.batch_size
    }

    /// Pending record count.
    pub fn len(&self) -> usize {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether no records are pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Path of the backing CSV file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append all pending records to the CSV file.
    ///
    /// Writes the header line only when the file does not exist yet. On
    /// failure the batch is restored to the front of the pending buffer,
    /// ahead of records queued while the write was in flight.
    pub fn flush(&self) -> Result<(), RecorderError> {
        let batch: Vec<TimestampRecord> = {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            if pending.is_empty() {
                return Ok(());
            }
            std::mem::take(&mut *pending)
        };

        match self.write_batch(&batch) {
            Ok(()) => {
                counter!("recorder_timestamp_flushes_total").increment(1);
                counter!("recorder_timestamp_records_total").increment(batch.len() as u64);
                debug!(records = batch.len(), path = %self.path.display(), "timestamp batch flushed");
                Ok(())
            }
            Err(e) => {
                counter!("recorder_timestamp_flush_failures_total").increment(1);
                warn!(
                    records = batch.len(),
                    error = %e,
                    "timestamp flush failed, batch kept for retry"
                );
                let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
                let newer = std::mem::replace(&mut *pending, batch);
                pending.extend(newer);
                Err(e)
            }
        }
    }

    fn write_batch(&self, batch: &[TimestampRecord]) -> Result<(), RecorderError> {
        let needs_header = !self.path.exists();

        let mut body = String::with_capacity(batch.len() * 64);
        if needs_header {
            body.push_str(HEADER);
            body.push('\n');
        }
        for record in batch {
            // write! to a String is infallible
            let _ = writeln!(
                body,
                "{},{},{},{:.3},{:.3}",
                record.frame_idx,
                record.expected_frame_idx,
                record.target_time_ns,
                record.timing_error_ms,
                record.sync_diff_ms,
            );
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| RecorderError::timestamp_write(format!("open {}: {e}", self.path.display())))?;
        file.write_all(body.as_bytes())
            .map_err(|e| RecorderError::timestamp_write(format!("write {}: {e}", self.path.display())))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(frame_idx: u64, expected: u64) -> TimestampRecord {
        TimestampRecord {
            frame_idx,
            expected_frame_idx: expected,
            target_time_ns: expected * 100_000_000,
            timing_error_ms: -1.2345,
            sync_diff_ms: 3.4567,
        }
    }

    #[test]
    fn test_should_flush_at_threshold() {
        let dir = tempdir().unwrap();
        let log = TimestampLog::new(dir.path().join("timestamps.txt"), 50);
        for i in 0..49 {
            log.add(record(i, i));
        }
        assert!(!log.should_flush());
        log.add(record(49, 49));
        assert!(log.should_flush());
    }

    #[test]
    fn test_flush_writes_header_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("timestamps.txt");
        let log = TimestampLog::new(&path, 50);
        log.add(record(1, 1));
        log.add(record(2, 3));
        log.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "1,1,100000000,-1.234,3.457");
        assert_eq!(lines[2], "2,3,300000000,-1.234,3.457");
        assert!(log.is_empty());
    }

    #[test]
    fn test_second_flush_appends_without_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("timestamps.txt");
        let log = TimestampLog::new(&path, 50);
        log.add(record(1, 1));
        log.flush().unwrap();
        log.add(record(2, 2));
        log.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let headers = content.lines().filter(|l| *l == HEADER).count();
        assert_eq!(headers, 1);
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_flush_empty_is_noop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("timestamps.txt");
        let log = TimestampLog::new(&path, 50);
        log.flush().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_flush_preserves_records() {
        let dir = tempdir().unwrap();
        // a directory path cannot be opened as a file
        let log = TimestampLog::new(dir.path(), 50);
        log.add(record(1, 1));
        log.add(record(2, 2));
        assert!(log.flush().is_err());
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_clones_share_buffer() {
        let dir = tempdir().unwrap();
        let log = TimestampLog::new(dir.path().join("timestamps.txt"), 50);
        let other = log.clone();
        log.add(record(1, 1));
        other.add(record(2, 2));
        assert_eq!(log.len(), 2);
    }
}
