//! Pure calculation functions for icon and tile dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Side of the square box a tile's artwork is fitted into.
///
/// # Arguments
/// * `canvas` - Tile canvas dimensions (width, height)
/// * `ratio` - Fraction of the canvas's short edge given to the artwork
///
/// # Examples
/// ```
/// # use icon_bundler::imaging::calculations::tile_artwork_box;
/// // Wide 310x150 tile at 0.6 → 90px box (0.6 × 150)
/// assert_eq!(tile_artwork_box((310, 150), 0.6), 90);
/// ```
pub fn tile_artwork_box(canvas: (u32, u32), ratio: f64) -> u32 {
    let short_edge = canvas.0.min(canvas.1);
    ((short_edge as f64 * ratio).floor() as u32).clamp(1, short_edge.max(1))
}

/// Largest dimensions with the source's aspect ratio that fit inside `bounds`.
///
/// One dimension matches the bound exactly; neither is ever below 1.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bounds` - Box to fit into (width, height)
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    let src_aspect = src_w as f64 / src_h as f64;
    let box_aspect = max_w as f64 / max_h as f64;

    if src_aspect > box_aspect {
        // Source is wider: width matches, height shrinks
        let h = (max_w as f64 / src_aspect).round() as u32;
        (max_w, h.clamp(1, max_h))
    } else {
        // Source is taller (or same shape): height matches
        let w = (max_h as f64 * src_aspect).round() as u32;
        (w.clamp(1, max_w), max_h)
    }
}

/// Top-left offset that centers `content` on `canvas`.
///
/// Integer division truncates toward zero, so oversize content gets a negative
/// offset and is cropped evenly (give or take a pixel) on both sides.
pub fn center_offset(canvas: (u32, u32), content: (u32, u32)) -> (i64, i64) {
    (
        (canvas.0 as i64 - content.0 as i64) / 2,
        (canvas.1 as i64 - content.1 as i64) / 2,
    )
}
