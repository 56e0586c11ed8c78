//! Disk persistence for frame payload pairs.

use std::fs;
use std::path::{Path, PathBuf};

use image::{GrayImage, RgbImage, RgbaImage};

use contracts::{ArrayData, FramePayload, FrameStore, ImageData, ImageFormat, RecorderError};

/// Writes each frame's payload pair into per-stream session directories.
///
/// Images are encoded as PNG, arrays as bincode, raw payloads verbatim.
/// File names are 6-digit zero-padded frame indices.
pub struct FileStore {
    primary_dir: PathBuf,
    secondary_dir: PathBuf,
}

impl FileStore {
    pub fn new(primary_dir: impl Into<PathBuf>, secondary_dir: impl Into<PathBuf>) -> Self {
        Self {
            primary_dir: primary_dir.into(),
            secondary_dir: secondary_dir.into(),
        }
    }

    fn save_payload(dir: &Path, payload: FramePayload, frame_idx: u64) -> Result<(), RecorderError> {
        match payload {
            FramePayload::Image(img) => Self::save_image(dir, img, frame_idx),
            FramePayload::Array(arr) => Self::save_array(dir, arr, frame_idx),
            FramePayload::Raw(data) => {
                let path = dir.join(format!("{frame_idx:06}.raw"));
                fs::write(&path, &data)
                    .map_err(|e| RecorderError::store_write(frame_idx, e.to_string()))
            }
        }
    }

    fn save_image(dir: &Path, img: ImageData, frame_idx: u64) -> Result<(), RecorderError> {
        let path = dir.join(format!("{frame_idx:06}.png"));
        let pixels = img.data.to_vec();
        let result = match img.format {
            ImageFormat::Rgb8 => RgbImage::from_raw(img.width, img.height, pixels)
                .ok_or_else(|| {
                    RecorderError::store_write(frame_idx, "image buffer size mismatch")
                })?
                .save(&path),
            ImageFormat::Rgba8 => RgbaImage::from_raw(img.width, img.height, pixels)
                .ok_or_else(|| {
                    RecorderError::store_write(frame_idx, "image buffer size mismatch")
                })?
                .save(&path),
            ImageFormat::Luma8 => GrayImage::from_raw(img.width, img.height, pixels)
                .ok_or_else(|| {
                    RecorderError::store_write(frame_idx, "image buffer size mismatch")
                })?
                .save(&path),
        };
        result.map_err(|e| RecorderError::store_write(frame_idx, e.to_string()))
    }

    fn save_array(dir: &Path, arr: ArrayData, frame_idx: u64) -> Result<(), RecorderError> {
        let path = dir.join(format!("{frame_idx:06}.bin"));
        let encoded = bincode::serialize(&arr)
            .map_err(|e| RecorderError::store_write(frame_idx, e.to_string()))?;
        fs::write(&path, encoded).map_err(|e| RecorderError::store_write(frame_idx, e.to_string()))
    }
}

impl FrameStore for FileStore {
    fn save_pair(
        &self,
        primary: FramePayload,
        secondary: FramePayload,
        frame_idx: u64,
    ) -> Result<(), RecorderError> {
        Self::save_payload(&self.primary_dir, primary, frame_idx)?;
        Self::save_payload(&self.secondary_dir, secondary, frame_idx)
    }
}
