//! Session directory management.
//!
//! Each recording session gets a timestamp-named directory under the
//! records root, one subdirectory per stream, and a `session_info.json`
//! written at stop with the final statistics.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

use contracts::{RecorderConfig, RecordingStats};

/// Resolved paths of one recording session.
#[derive(Debug, Clone)]
pub struct SessionPaths {
    /// Session root (records_root/YYYYmmdd_HHMMSS)
    pub root: PathBuf,
    /// Primary stream payload directory
    pub primary_dir: PathBuf,
    /// Secondary stream payload directory
    pub secondary_dir: PathBuf,
    /// Timestamp CSV log path
    pub timestamp_path: PathBuf,
}

/// Create the directory tree for a new session.
pub fn create_session(config: &RecorderConfig) -> Result<SessionPaths> {
    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let root = config.output.records_root.join(stamp);

    let primary_dir = root.join(config.streams.primary.id.as_str());
    let secondary_dir = root.join(config.streams.secondary.id.as_str());

    fs::create_dir_all(&primary_dir)
        .with_context(|| format!("creating {}", primary_dir.display()))?;
    fs::create_dir_all(&secondary_dir)
        .with_context(|| format!("creating {}", secondary_dir.display()))?;

    let timestamp_path = root.join(&config.output.timestamp_file);

    info!(session = %root.display(), "session directory created");
    Ok(SessionPaths {
        root,
        primary_dir,
        secondary_dir,
        timestamp_path,
    })
}

/// Final session record persisted as `session_info.json`.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub started_at: DateTime<Local>,
    pub ended_at: DateTime<Local>,
    pub fps: u32,
    pub frame_tolerance: f64,
    pub primary_stream: String,
    pub secondary_stream: String,
    pub stats: RecordingStats,
}

/// Write `session_info.json` into the session root.
pub fn write_session_info(root: &Path, info: &SessionInfo) -> Result<()> {
    let path = root.join("session_info.json");
    let json = serde_json::to_string_pretty(info).context("serializing session info")?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "session info written");
    Ok(())
}
