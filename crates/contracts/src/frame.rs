//! Frame payloads and capture timing
//!
//! Raw per-stream capture output. Payload encoding is opaque to the
//! scheduler; it only moves these values between pools.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Timing of a single capture operation, on the shared monotonic clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureTiming {
    /// Capture start (nanoseconds since recording clock origin)
    pub start_ns: u64,

    /// Capture end (nanoseconds since recording clock origin)
    pub end_ns: u64,

    /// Capture duration in milliseconds
    pub duration_ms: f64,
}

impl CaptureTiming {
    /// Build timing from start/end instants on the shared clock.
    pub fn from_span(start_ns: u64, end_ns: u64) -> Self {
        Self {
            start_ns,
            end_ns,
            duration_ms: end_ns.saturating_sub(start_ns) as f64 / 1e6,
        }
    }
}

/// One successful per-stream capture: payload plus its timing.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    /// Opaque payload handed on to persistence
    pub payload: FramePayload,

    /// When the capture actually happened
    pub timing: CaptureTiming,
}

/// Frame payload (zero-copy)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FramePayload {
    /// Pixel data (e.g. the RGB camera stream)
    Image(ImageData),

    /// Dense numeric grid (e.g. the thermal sensor stream)
    Array(ArrayData),

    /// Raw bytes (fallback)
    Raw(Bytes),
}

impl FramePayload {
    /// Payload size in bytes
    pub fn len(&self) -> usize {
        match self {
            FramePayload::Image(img) => img.data.len(),
            FramePayload::Array(arr) => arr.data.len() * std::mem::size_of::<f32>(),
            FramePayload::Raw(raw) => raw.len(),
        }
    }

    /// Whether the payload carries no data
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Image data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageData {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Pixel format
    pub format: ImageFormat,

    /// Raw pixel data
    pub data: Bytes,
}

/// Pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    Rgb8,
    Rgba8,
    Luma8,
}

/// Dense numeric grid data (row-major f32)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayData {
    /// Number of rows
    pub rows: u32,

    /// Number of columns
    pub cols: u32,

    /// Cell data, rows * cols values in row-major order
    pub data: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_from_span() {
        let t = CaptureTiming::from_span(1_000_000, 4_500_000);
        assert_eq!(t.start_ns, 1_000_000);
        assert_eq!(t.end_ns, 4_500_000);
        assert!((t.duration_ms - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_timing_from_reversed_span_saturates() {
        let t = CaptureTiming::from_span(5, 3);
        assert_eq!(t.duration_ms, 0.0);
    }

    #[test]
    fn test_payload_len() {
        let img = FramePayload::Image(ImageData {
            width: 2,
            height: 2,
            format: ImageFormat::Rgb8,
            data: Bytes::from(vec![0u8; 12]),
        });
        assert_eq!(img.len(), 12);
        assert!(!img.is_empty());

        let raw = FramePayload::Raw(Bytes::new());
        assert!(raw.is_empty());
    }
}
