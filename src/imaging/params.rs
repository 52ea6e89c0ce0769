//! Parameter types for image operations.
//!
//! These describe *how* pixels are resampled and encoded, independent of which
//! [`ImageBackend`](super::ImageBackend) does the work. Both are configurable
//! from `[rendering]` in the config file.
//!
//! - [`ResampleFilter`]: interpolation used when resizing. Bilinear or better;
//!   nearest-neighbour is not offered.
//! - [`PngCompression`]: zlib effort for PNG output. Affects size, never pixels.

use image::codecs::png::CompressionType;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    /// Bilinear.
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl ResampleFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PngCompression {
    Fast,
    Default,
    #[default]
    Best,
}

impl PngCompression {
    pub fn compression_type(self) -> CompressionType {
        match self {
            PngCompression::Fast => CompressionType::Fast,
            PngCompression::Default => CompressionType::Default,
            PngCompression::Best => CompressionType::Best,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        assert_eq!(ResampleFilter::default(), ResampleFilter::Lanczos3);
        assert_eq!(PngCompression::default(), PngCompression::Best);
    }

    #[test]
    fn filter_names_are_kebab_case() {
        #[derive(Deserialize)]
        struct W {
            f: ResampleFilter,
        }
        let w: W = toml::from_str("f = \"catmull-rom\"").unwrap();
        assert_eq!(w.f, ResampleFilter::CatmullRom);
        assert!(toml::from_str::<W>("f = \"nearest\"").is_err());
    }

    #[test]
    fn triangle_maps_to_bilinear() {
        assert_eq!(ResampleFilter::Triangle.filter_type(), FilterType::Triangle);
    }
}
