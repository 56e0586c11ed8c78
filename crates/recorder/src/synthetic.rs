//! Synthetic frame source for hardware-free runs and tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use bytes::Bytes;

use contracts::{
    ArrayData, CaptureTiming, CapturedFrame, FramePayload, FrameSource, ImageData, ImageFormat,
};

#[derive(Debug, Clone, Copy)]
enum Shape {
    Image { width: u32, height: u32 },
    Array { rows: u32, cols: u32 },
}

/// Deterministic stand-in for a camera stream.
///
/// Produces fixed-shape payloads whose bytes encode the capture ordinal.
/// Latency, jitter, and periodic failures are configurable so scheduler
/// behavior under slow or flaky sensors can be exercised without hardware.
/// Jitter cycles through a fixed fraction sequence rather than using a
/// random source, keeping runs reproducible.
pub struct SyntheticFrameSource {
    id: String,
    shape: Shape,
    latency: Duration,
    jitter: Duration,
    failure_every: Option<u64>,
    calls: AtomicU64,
}

impl SyntheticFrameSource {
    /// Image-producing stream of `width` x `height` RGB frames.
    pub fn image(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self::new(id, Shape::Image { width, height })
    }

    /// Array-producing stream of `rows` x `cols` float grids.
    pub fn array(id: impl Into<String>, rows: u32, cols: u32) -> Self {
        Self::new(id, Shape::Array { rows, cols })
    }

    fn new(id: impl Into<String>, shape: Shape) -> Self {
        Self {
            id: id.into(),
            shape,
            latency: Duration::ZERO,
            jitter: Duration::ZERO,
            failure_every: None,
            calls: AtomicU64::new(0),
        }
    }

    /// Fixed delay added to every capture.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Peak additional delay, cycled deterministically across captures.
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Make every `n`-th capture fail (`n = 1` fails every capture).
    pub fn with_failure_every(mut self, n: u64) -> Self {
        self.failure_every = Some(n.max(1));
        self
    }

    /// Captures attempted so far.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    fn payload_for(&self, ordinal: u64) -> FramePayload {
        match self.shape {
            Shape::Image { width, height } => {
                let fill = (ordinal % 256) as u8;
                let data = Bytes::from(vec![fill; (width * height * 3) as usize]);
                FramePayload::Image(ImageData {
                    width,
                    height,
                    format: ImageFormat::Rgb8,
                    data,
                })
            }
            Shape::Array { rows, cols } => {
                let fill = ordinal as f32;
                FramePayload::Array(ArrayData {
                    rows,
                    cols,
                    data: vec![fill; (rows * cols) as usize],
                })
            }
        }
    }
}

impl FrameSource for SyntheticFrameSource {
    fn stream_id(&self) -> &str {
        &self.id
    }

    fn capture(&self) -> Option<CapturedFrame> {
        let ordinal = self.calls.fetch_add(1, Ordering::Relaxed);

        if let Some(every) = self.failure_every {
            if ordinal % every == every - 1 {
                return None;
            }
        }

        let start_ns = timing::now_ns();

        let delay = self.latency + self.jitter.mul_f64((ordinal % 8) as f64 / 8.0);
        if !delay.is_zero() {
            thread::sleep(delay);
        }

        let end_ns = timing::now_ns();
        Some(CapturedFrame {
            payload: self.payload_for(ordinal),
            timing: CaptureTiming::from_span(start_ns, end_ns),
        })
    }
}
