//! # Icon Bundler
//!
//! Turns one source image into every icon file a set of target platforms
//! expects, and hands them back as a single downloadable archive.
//!
//! # Architecture: Snapshot → Render → Pack
//!
//! ```text
//! 1. Select    SelectionStore  →  SelectionSnapshot   (platforms + fill colour)
//! 2. Render    snapshot + image →  Vec<ExportArtifact> (PNG per spec, .ico per group)
//! 3. Pack      artifacts        →  icons.tar.gz        (in memory)
//! ```
//!
//! The selection is copied before anything is rendered, so toggling platforms
//! while an export runs never changes that export's output. Rendering is a pure
//! function of the snapshot and the decoded source: same inputs, same bytes.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`presets`] | The fixed catalog: Android, iOS, Web, Windows and their icon specs |
//! | [`selection`] | Chosen platforms and the tile fill colour; produces snapshots |
//! | [`color`] | `#RGB` / `#RRGGBB` / `#RRGGBBAA` fill colour parsing |
//! | [`imaging`] | Decode, resize, composite, and PNG-encode via the `image` crate |
//! | [`ico`] | Icon container writer and directory reader |
//! | [`export`] | Plans render units, renders them in parallel, packs the result |
//! | [`archive`] | Deterministic in-memory `.tar.gz` writer and reader |
//! | [`config`] | `icon-bundler.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## PNG Inside The Icon Container
//!
//! `.ico` entries embed PNG data rather than legacy BMP/DIB bitmaps. Every
//! browser that still asks for `favicon.ico` reads PNG entries, and it keeps
//! one encoder for the whole crate.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Lanczos3 resampling, compositing, and PNG encoding all come from
//! the `image` crate. No system libraries, so the binary runs anywhere.
//!
//! ## Tiles Keep Their Aspect Ratio
//!
//! Ordinary icons are stretched to their exact declared size. Windows tiles
//! are different: the artwork is fitted into a centered square and the rest of
//! the tile is painted with the fill colour, so a wide `310x150` tile shows the
//! logo undistorted.

pub mod archive;
pub mod color;
pub mod config;
pub mod export;
pub mod ico;
pub mod imaging;
pub mod output;
pub mod presets;
pub mod selection;

#[cfg(test)]
pub(crate) mod test_helpers;
