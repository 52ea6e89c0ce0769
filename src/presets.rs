//! The preset catalog: which icon files each target platform needs.
//!
//! The catalog is a fixed table built once per process. Each [`Preset`] names a
//! platform and lists its [`IconSpec`]s in the order they are exported. Only the
//! `chosen` flag ever changes, and that lives in the
//! [`SelectionStore`](crate::selection::SelectionStore), never here.
//!
//! ```text
//! Android  9 × android-chrome-NxN.png    36 … 512
//! iOS      9 × apple-touch-icon-NxN.png  57 … 180
//! Web      favicon-16x16.png, favicon-32x32.png, favicon.ico (32×32)
//! Windows  5 × mstile-WxH.png            tile style, filled background
//! ```

use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// Output encoding of a single icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IconMime {
    #[serde(rename = "image/png")]
    Png,
    /// The multi-resolution icon container (`.ico`).
    #[serde(rename = "image/x-icon")]
    Ico,
}

impl IconMime {
    pub fn as_str(self) -> &'static str {
        match self {
            IconMime::Png => "image/png",
            IconMime::Ico => "image/x-icon",
        }
    }

    /// Whether specs of this type are bundled into one container file.
    pub fn is_container(self) -> bool {
        matches!(self, IconMime::Ico)
    }
}

impl fmt::Display for IconMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One required output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IconSpec {
    pub width: u32,
    pub height: u32,
    pub mime: IconMime,
    pub filename: &'static str,
    pub desc: &'static str,
}

/// A named platform target and the icons it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub value: Vec<IconSpec>,
    pub chosen: bool,
}

/// Name of the only platform whose outputs are drawn over the fill colour.
pub const TILE_PLATFORM: &str = "Windows";

impl Preset {
    /// Tile-style presets composite their artwork over a solid background.
    pub fn is_tile_style(&self) -> bool {
        is_tile_platform(self.name)
    }
}

pub fn is_tile_platform(name: &str) -> bool {
    name == TILE_PLATFORM
}

const fn png(size: (u32, u32), filename: &'static str, desc: &'static str) -> IconSpec {
    IconSpec {
        width: size.0,
        height: size.1,
        mime: IconMime::Png,
        filename,
        desc,
    }
}

const fn ico(size: u32, filename: &'static str, desc: &'static str) -> IconSpec {
    IconSpec {
        width: size,
        height: size,
        mime: IconMime::Ico,
        filename,
        desc,
    }
}

const ANDROID: &[IconSpec] = &[
    png((36, 36), "android-chrome-36x36.png", "For Android Chrome M39+ with 0.75 screen density."),
    png((48, 48), "android-chrome-48x48.png", "For Android Chrome M39+ with 1.0 screen density."),
    png((72, 72), "android-chrome-72x72.png", "For Android Chrome M39+ with 1.5 screen density."),
    png((96, 96), "android-chrome-96x96.png", "For Android Chrome M39+ with 2.0 screen density."),
    png((144, 144), "android-chrome-144x144.png", "For Android Chrome M39+ with 3.0 screen density."),
    png((192, 192), "android-chrome-192x192.png", "For Android Chrome M39+ with 4.0 screen density."),
    png((256, 256), "android-chrome-256x256.png", "For Android Chrome M47+ Splash screen with 1.5 screen density."),
    png((384, 384), "android-chrome-384x384.png", "For Android Chrome M47+ Splash screen with 3.0 screen density."),
    png((512, 512), "android-chrome-512x512.png", "For Android Chrome M47+ Splash screen with 4.0 screen density."),
];

const IOS: &[IconSpec] = &[
    png((57, 57), "apple-touch-icon-57x57.png", "iPhone and iPad users can turn web pages into icons on their home screen. Such link appears as a regular iOS native application. When this happens, the device looks for a specific picture. The 57x57 resolution is convenient for non-retina iPhone with iOS6 or prior. Learn more in Apple docs."),
    png((60, 60), "apple-touch-icon-60x60.png", "For non-retina iPhone with iOS7."),
    png((72, 72), "apple-touch-icon-72x72.png", "For non-retina iPad with iOS6 or prior."),
    png((76, 76), "apple-touch-icon-76x76.png", "For non-retina iPad with iOS7."),
    png((114, 114), "apple-touch-icon-114x114.png", "For retina iPhone with iOS6 or prior."),
    png((120, 120), "apple-touch-icon-120x120.png", "For retina iPhone with iOS7."),
    png((144, 144), "apple-touch-icon-144x144.png", "For retina iPad with iOS6 or prior."),
    png((152, 152), "apple-touch-icon-152x152.png", "For retina iPad with iOS7."),
    png((180, 180), "apple-touch-icon-180x180.png", "For iPhone 6 Plus with iOS8."),
];

const WEB: &[IconSpec] = &[
    png((16, 16), "favicon-16x16.png", "The classic favicon, displayed in the tabs."),
    png((32, 32), "favicon-32x32.png", "For Safari on Mac OS."),
    ico(32, "favicon.ico", "Used by IE, and also by some other browsers if we are not careful."),
];

const WINDOWS: &[IconSpec] = &[
    png((70, 70), "mstile-70x70.png", "For Windows 8 / IE11."),
    png((144, 144), "mstile-144x144.png", "For Windows 8 / IE10."),
    png((150, 150), "mstile-150x150.png", "For Windows 8 / IE11."),
    png((310, 310), "mstile-310x310.png", "For Windows 8 / IE11."),
    png((310, 150), "mstile-310x150.png", "For Windows 8 / IE11."),
];

static CATALOG: LazyLock<Vec<Preset>> = LazyLock::new(|| {
    [
        ("Android", ANDROID),
        ("iOS", IOS),
        ("Web", WEB),
        (TILE_PLATFORM, WINDOWS),
    ]
    .into_iter()
    .map(|(name, specs)| Preset {
        name,
        value: specs.to_vec(),
        chosen: true,
    })
    .collect()
});

/// The catalog in its initial state (every preset chosen).
pub fn catalog() -> &'static [Preset] {
    &CATALOG
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_order_and_sizes() {
        let names: Vec<&str> = catalog().iter().map(|p| p.name).collect();
        assert_eq!(names, ["Android", "iOS", "Web", "Windows"]);

        let counts: Vec<usize> = catalog().iter().map(|p| p.value.len()).collect();
        assert_eq!(counts, [9, 9, 3, 5]);
    }

    #[test]
    fn every_preset_starts_chosen() {
        assert!(catalog().iter().all(|p| p.chosen));
    }

    #[test]
    fn dimensions_are_positive() {
        for spec in catalog().iter().flat_map(|p| &p.value) {
            assert!(spec.width > 0 && spec.height > 0, "{}", spec.filename);
        }
    }

    #[test]
    fn filenames_unique_across_catalog() {
        let mut seen = HashSet::new();
        for spec in catalog().iter().flat_map(|p| &p.value) {
            assert!(seen.insert(spec.filename), "duplicate {}", spec.filename);
        }
    }

    #[test]
    fn only_web_has_a_container() {
        for preset in catalog() {
            let has_ico = preset.value.iter().any(|s| s.mime.is_container());
            assert_eq!(has_ico, preset.name == "Web", "{}", preset.name);
        }
    }

    #[test]
    fn windows_is_the_only_tile_preset() {
        let tiles: Vec<&str> = catalog()
            .iter()
            .filter(|p| p.is_tile_style())
            .map(|p| p.name)
            .collect();
        assert_eq!(tiles, ["Windows"]);
    }

    #[test]
    fn ios_57_describes_home_screen_icons() {
        let ios = catalog().iter().find(|p| p.name == "iOS").unwrap();
        let spec = &ios.value[0];
        assert_eq!(spec.filename, "apple-touch-icon-57x57.png");
        assert!(spec.desc.starts_with(
            "iPhone and iPad users can turn web pages into icons on their home screen. \
             Such link appears as a regular iOS native application."
        ));
        assert!(spec.desc.contains("non-retina iPhone with iOS6 or prior"));
    }

    #[test]
    fn mime_serializes_as_media_type() {
        let json = serde_json::to_string(&IconMime::Ico).unwrap();
        assert_eq!(json, "\"image/x-icon\"");
        assert_eq!(IconMime::Png.to_string(), "image/png");
    }
}
