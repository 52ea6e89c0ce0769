//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three pixel operations the export
//! pipeline needs: decode, resize and PNG encode. Compositing is backend
//! independent and lives in [`compositor`](super::compositor).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests swap in a recording mock so orchestration logic can be checked
//! without paying for real resampling.

use image::RgbaImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("invalid target dimension {width}x{height}: both sides must be > 0")]
    InvalidDimension { width: u32, height: u32 },
    #[error("failed to decode source image: {0}")]
    Decode(String),
    #[error("failed to encode PNG: {0}")]
    Encode(String),
}

/// Trait for image processing backends.
///
/// `Sync` because the orchestrator renders independent specs on rayon's pool
/// against one shared backend.
pub trait ImageBackend: Sync {
    /// Decode encoded source bytes (PNG, JPEG, ...) into RGBA8 pixels.
    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage, BackendError>;

    /// Resample `source` to exactly `width × height`. Aspect ratio is not kept.
    ///
    /// Must be deterministic: the same input always yields the same pixels.
    fn resize(&self, source: &RgbaImage, width: u32, height: u32)
    -> Result<RgbaImage, BackendError>;

    /// Encode pixels as a PNG file.
    fn encode_png(&self, image: &RgbaImage) -> Result<Vec<u8>, BackendError>;
}

/// Reject zero-sized targets before any backend work happens.
pub fn check_dimensions(width: u32, height: u32) -> Result<(), BackendError> {
    if width == 0 || height == 0 {
        return Err(BackendError::InvalidDimension { width, height });
    }
    Ok(())
}
