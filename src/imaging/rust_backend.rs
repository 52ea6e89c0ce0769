//! Pure Rust image backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, GIF, BMP, ICO, TIFF, WebP) | `image::load_from_memory` |
//! | Resize | `image::imageops::resize` with the configured [`ResampleFilter`] |
//! | Encode → PNG | `image::codecs::png::PngEncoder`, adaptive row filtering |
//!
//! Resampling is plain floating-point convolution with no dithering, so output
//! pixels depend only on the input pixels, the target size and the filter. The
//! PNG encoder writes no timestamp chunk, so the encoded bytes are stable too.

use super::backend::{BackendError, ImageBackend, check_dimensions};
use super::params::{PngCompression, ResampleFilter};
use image::codecs::png::{FilterType as PngFilter, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

/// `image`-crate backend. See the [module docs](self) for the crate mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend {
    filter: ResampleFilter,
    compression: PngCompression,
}

impl RustBackend {
    pub fn new(filter: ResampleFilter, compression: PngCompression) -> Self {
        Self {
            filter,
            compression,
        }
    }
}

/// Wrap an already-decoded RGBA buffer, checking its length against its size.
pub fn rgba_from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Result<RgbaImage, BackendError> {
    let len = pixels.len();
    RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
        BackendError::Decode(format!(
            "{len} bytes is not a {width}x{height} RGBA buffer"
        ))
    })
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage, BackendError> {
        let img = image::load_from_memory(bytes).map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(img.into_rgba8())
    }

    fn resize(
        &self,
        source: &RgbaImage,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, BackendError> {
        check_dimensions(width, height)?;
        if source.width() == 0 || source.height() == 0 {
            return Err(BackendError::Decode("source image has no pixels".into()));
        }
        Ok(image::imageops::resize(
            source,
            width,
            height,
            self.filter.filter_type(),
        ))
    }

    fn encode_png(&self, image: &RgbaImage) -> Result<Vec<u8>, BackendError> {
        let mut buffer = Vec::new();
        let encoder = PngEncoder::new_with_quality(
            &mut buffer,
            self.compression.compression_type(),
            PngFilter::Adaptive,
        );
        encoder
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| BackendError::Encode(e.to_string()))?;
        Ok(buffer)
    }
}
