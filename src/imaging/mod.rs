//! Pixel work for the export pipeline, in pure Rust with no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory` → RGBA8 |
//! | **Resize** | `image::imageops::resize`, Lanczos3 by default |
//! | **Composite** | `image::imageops::overlay` onto a filled canvas |
//! | **Encode** | `PngEncoder` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Resampling filter and PNG compression choices
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Compositor**: Tile backgrounds, backend independent

pub mod backend;
pub mod calculations;
pub mod compositor;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use compositor::composite_on_background;
pub use params::{PngCompression, ResampleFilter};
pub use rust_backend::{RustBackend, rgba_from_raw};
