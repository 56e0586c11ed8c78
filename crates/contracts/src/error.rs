//! Layered error definitions
//!
//! Categorized by source: config / store / timestamp / lifecycle

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum RecorderError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Persistence Errors =====
    /// Frame pair write error
    #[error("store write error for frame {frame_idx}: {message}")]
    StoreWrite { frame_idx: u64, message: String },

    /// Timestamp log write error
    #[error("timestamp log write error: {message}")]
    TimestampWrite { message: String },

    // ===== Lifecycle Errors =====
    /// start() called while a session is live
    #[error("recording already in progress")]
    AlreadyRecording,

    /// Unexpected fault terminated the recording loop
    #[error("recording loop fault: {message}")]
    LoopFault { message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecorderError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create store write error
    pub fn store_write(frame_idx: u64, message: impl Into<String>) -> Self {
        Self::StoreWrite {
            frame_idx,
            message: message.into(),
        }
    }

    /// Create timestamp write error
    pub fn timestamp_write(message: impl Into<String>) -> Self {
        Self::TimestampWrite {
            message: message.into(),
        }
    }

    /// Create loop fault error
    pub fn loop_fault(message: impl Into<String>) -> Self {
        Self::LoopFault {
            message: message.into(),
        }
    }
}
