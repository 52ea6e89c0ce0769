//! Draw resized artwork centered on a solid background.
//!
//! Only tile-style outputs go through here. The canvas is filled with the fill
//! colour first, then the artwork is alpha-blended on top at
//! [`center_offset`](super::calculations::center_offset). Artwork larger than
//! the canvas is clipped around the same center; nothing is scaled.

use super::backend::{BackendError, check_dimensions};
use super::calculations::center_offset;
use crate::color::FillColor;
use image::RgbaImage;
use image::imageops::overlay;

pub fn composite_on_background(
    artwork: &RgbaImage,
    canvas_width: u32,
    canvas_height: u32,
    fill: FillColor,
) -> Result<RgbaImage, BackendError> {
    check_dimensions(canvas_width, canvas_height)?;

    let mut canvas = RgbaImage::from_pixel(canvas_width, canvas_height, fill.to_rgba());
    let (x, y) = center_offset((canvas_width, canvas_height), artwork.dimensions());
    overlay(&mut canvas, artwork, x, y);
    Ok(canvas)
}
