//! Shared test utilities for the icon-bundler test suite.
//!
//! Provides deterministic source images, PNG helpers, and lookups into
//! rendered artifacts and archives.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = encode_source_png(&gradient_image(64, 64));
//! let bundle = exporter.export(&snapshot, &source).unwrap();
//!
//! let members = archive_members(&bundle.bytes);
//! let ico = find_member(&members, "favicon.ico");
//! ```

use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

use crate::archive::{self, ArchiveMember};
use crate::export::ExportArtifact;

// =========================================================================
// Source images
// =========================================================================

/// A deterministic RGBA gradient with partial transparency.
///
/// Every pixel differs from its neighbours, so resampling bugs show up as
/// pixel differences rather than hiding in flat colour.
pub fn gradient_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) % 256) as u8,
            (128 + (x * 7 + y * 3) % 128) as u8,
        ])
    })
}

/// A single-colour image.
pub fn solid_image(width: u32, height: u32, px: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(px))
}

/// Encode an image as PNG bytes, the way a caller would hand a file to export.
pub fn encode_source_png(img: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

// =========================================================================
// Decoding outputs
// =========================================================================

/// Decode PNG bytes to RGBA. Panics with the decoder error on failure.
pub fn decode_png(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .unwrap_or_else(|e| panic!("not a decodable PNG ({} bytes): {e}", bytes.len()))
        .into_rgba8()
}

/// Reopen an archive. Panics if it cannot be read.
pub fn archive_members(archive: &[u8]) -> Vec<ArchiveMember> {
    archive::read_members(archive).unwrap()
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find an archive member by name. Panics if not found.
pub fn find_member<'a>(members: &'a [ArchiveMember], name: &str) -> &'a ArchiveMember {
    members.iter().find(|m| m.name == name).unwrap_or_else(|| {
        let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
        panic!("archive member '{name}' not found. Available: {names:?}")
    })
}

/// Find a rendered artifact by filename. Panics if not found.
pub fn find_artifact<'a>(artifacts: &'a [ExportArtifact], filename: &str) -> &'a ExportArtifact {
    artifacts
        .iter()
        .find(|a| a.filename == filename)
        .unwrap_or_else(|| {
            let names: Vec<&str> = artifacts.iter().map(|a| a.filename.as_str()).collect();
            panic!("artifact '{filename}' not found. Available: {names:?}")
        })
}

// =========================================================================
// Pixel assertions
// =========================================================================

/// Assert every pixel on the outermost ring of `img` equals `px`.
pub fn assert_border(img: &RgbaImage, px: [u8; 4]) {
    let (w, h) = img.dimensions();
    let ring = (0..w)
        .flat_map(|x| [(x, 0), (x, h - 1)])
        .chain((0..h).flat_map(|y| [(0, y), (w - 1, y)]));
    for (x, y) in ring {
        assert_eq!(
            img.get_pixel(x, y).0,
            px,
            "border pixel ({x}, {y}) of {w}x{h} image"
        );
    }
}
