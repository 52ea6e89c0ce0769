//! Turn a selection snapshot and one source image into an icon archive.
//!
//! An export runs through four steps, terminal on success or on the first
//! failure:
//!
//! ```text
//! Collect   snapshot.specs                  (catalog order, already flattened)
//! Group     container specs sharing (platform, filename) → one RenderUnit
//! Render    per unit, in parallel:  resize → [composite] → PNG
//!                                   or resize×n → PNG×n → .ico
//! Pack      artifacts, in Collect/Group order → .tar.gz
//! ```
//!
//! A container group takes the position of its first member, so selecting only
//! Web yields `favicon-16x16.png`, `favicon-32x32.png`, `favicon.ico`.
//!
//! ## Tile outputs
//!
//! Specs of the tile-style platform (Windows) are not stretched. The source is
//! fitted, aspect intact, into a square box of
//! `floor(short_edge × tiles.artwork_ratio)` and drawn centered over the fill
//! colour. Container outputs never get a background; favicons keep their
//! transparency.
//!
//! ## Concurrency
//!
//! One [`Exporter`] runs at most one export at a time; a second call while one
//! is running fails fast with [`ExportError::Busy`]. Inside an export, render
//! units run on rayon's pool and are reassembled in plan order. Nothing is
//! retried: every input is already in memory, so a retry would fail the same
//! way.

use crate::archive::{self, ArchiveError};
use crate::color::FillColor;
use crate::config::BundlerConfig;
use crate::ico::{self, ContainerImage};
use crate::imaging::calculations::{calculate_fit_dimensions, tile_artwork_box};
use crate::imaging::{BackendError, ImageBackend, RustBackend, composite_on_background};
use crate::presets::{IconMime, IconSpec, is_tile_platform};
use crate::selection::SelectionSnapshot;
use image::RgbaImage;
use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("nothing selected: choose at least one platform")]
    NothingSelected,
    #[error("an export is already in progress")]
    Busy,
    #[error("could not read source image: {0}")]
    Decode(#[source] BackendError),
    #[error("export failed at {platform}/{filename}: {reason}")]
    Failed {
        platform: String,
        filename: String,
        reason: String,
    },
    #[error("archive error: {0}")]
    Archive(ArchiveError),
}

impl ExportError {
    fn failed(platform: &str, filename: &str, reason: impl ToString) -> Self {
        ExportError::Failed {
            platform: platform.to_string(),
            filename: filename.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<ArchiveError> for ExportError {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::NothingSelected => ExportError::NothingSelected,
            other => ExportError::Archive(other),
        }
    }
}

/// One finished, encoded output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub platform: &'static str,
    pub filename: String,
    pub mime: IconMime,
    pub bytes: Vec<u8>,
}

/// What went into an archive, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactSummary {
    pub platform: &'static str,
    pub filename: String,
    pub mime: IconMime,
    pub size: usize,
}

impl From<&ExportArtifact> for ArtifactSummary {
    fn from(artifact: &ExportArtifact) -> Self {
        Self {
            platform: artifact.platform,
            filename: artifact.filename.clone(),
            mime: artifact.mime,
            size: artifact.bytes.len(),
        }
    }
}

/// The archive plus its suggested download name.
#[derive(Debug, Clone)]
pub struct ExportBundle {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub artifacts: Vec<ArtifactSummary>,
}

/// A unit of rendering work producing exactly one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderUnit {
    Single {
        platform: &'static str,
        spec: IconSpec,
    },
    /// Container specs of one platform sharing one filename.
    Container {
        platform: &'static str,
        filename: &'static str,
        members: Vec<IconSpec>,
    },
}

impl RenderUnit {
    pub fn platform(&self) -> &'static str {
        match self {
            RenderUnit::Single { platform, .. } | RenderUnit::Container { platform, .. } => {
                platform
            }
        }
    }

    pub fn filename(&self) -> &'static str {
        match self {
            RenderUnit::Single { spec, .. } => spec.filename,
            RenderUnit::Container { filename, .. } => filename,
        }
    }
}

/// Collect + Group: the ordered render units for a snapshot.
///
/// Container specs collapse by `(platform, filename)`, never by MIME type
/// alone, so unrelated `.ico` files stay separate. A PNG spec that reuses a
/// container's filename on the same platform is a catalog error.
pub fn plan(snapshot: &SelectionSnapshot) -> Result<Vec<RenderUnit>, ExportError> {
    let mut units: Vec<RenderUnit> = Vec::new();

    for selected in &snapshot.specs {
        let platform = selected.platform;
        let spec = &selected.spec;

        let existing = units
            .iter()
            .position(|u| u.platform() == platform && u.filename() == spec.filename);

        match (spec.mime.is_container(), existing) {
            (true, None) => units.push(RenderUnit::Container {
                platform,
                filename: spec.filename,
                members: vec![spec.clone()],
            }),
            (false, None) => units.push(RenderUnit::Single {
                platform,
                spec: spec.clone(),
            }),
            (true, Some(i)) => match &mut units[i] {
                RenderUnit::Container { members, .. } => members.push(spec.clone()),
                RenderUnit::Single { .. } => {
                    return Err(ExportError::failed(
                        platform,
                        spec.filename,
                        "filename is declared with conflicting MIME types",
                    ));
                }
            },
            (false, Some(i)) => {
                let reason = match units[i] {
                    RenderUnit::Container { .. } => {
                        "filename is declared with conflicting MIME types"
                    }
                    RenderUnit::Single { .. } => "filename is declared twice",
                };
                return Err(ExportError::failed(platform, spec.filename, reason));
            }
        }
    }

    Ok(units)
}

/// Knobs an export reads from config.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    /// Fraction of a tile's short edge given to the artwork.
    pub tile_artwork_ratio: f64,
    /// Gzip level, 0-9.
    pub compression_level: u32,
    /// Archive file name without extension.
    pub archive_name: String,
}

impl ExportSettings {
    pub fn from_config(config: &BundlerConfig) -> Self {
        Self {
            tile_artwork_ratio: config.tiles.artwork_ratio,
            compression_level: config.archive.compression_level,
            archive_name: config.archive.name.clone(),
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self::from_config(&BundlerConfig::default())
    }
}

/// Releases the in-flight flag when the export ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, ExportError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlight(flag))
            .map_err(|_| ExportError::Busy)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Exporter<B: ImageBackend = RustBackend> {
    backend: B,
    settings: ExportSettings,
    in_flight: AtomicBool,
}

impl Exporter<RustBackend> {
    /// Production exporter: `image`-crate backend configured from `[rendering]`.
    pub fn new(config: &BundlerConfig) -> Self {
        let backend = RustBackend::new(config.rendering.filter, config.rendering.png_compression);
        Self::with_backend(backend, ExportSettings::from_config(config))
    }
}

impl<B: ImageBackend> Exporter<B> {
    /// Use a specific backend (allows testing with mock).
    pub fn with_backend(backend: B, settings: ExportSettings) -> Self {
        Self {
            backend,
            settings,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Decode `source` (PNG, JPEG, ...) and export it.
    pub fn export(
        &self,
        snapshot: &SelectionSnapshot,
        source: &[u8],
    ) -> Result<ExportBundle, ExportError> {
        let _guard = InFlight::acquire(&self.in_flight)?;
        if snapshot.is_empty() {
            return Err(ExportError::NothingSelected);
        }
        let pixels = self.backend.decode(source).map_err(ExportError::Decode)?;
        self.run(snapshot, &pixels)
    }

    /// Export already-decoded pixels.
    pub fn export_image(
        &self,
        snapshot: &SelectionSnapshot,
        source: &RgbaImage,
    ) -> Result<ExportBundle, ExportError> {
        let _guard = InFlight::acquire(&self.in_flight)?;
        self.run(snapshot, source)
    }

    fn run(
        &self,
        snapshot: &SelectionSnapshot,
        source: &RgbaImage,
    ) -> Result<ExportBundle, ExportError> {
        let artifacts = self.render(snapshot, source)?;
        let bytes = archive::pack(&artifacts, self.settings.compression_level)?;
        let file_name = archive::archive_file_name(&self.settings.archive_name);
        info!(
            "packed {} artifacts into {} ({} bytes)",
            artifacts.len(),
            file_name,
            bytes.len()
        );
        Ok(ExportBundle {
            file_name,
            bytes,
            artifacts: artifacts.iter().map(ArtifactSummary::from).collect(),
        })
    }

    /// Collect, Group and Render, without packing.
    pub fn render(
        &self,
        snapshot: &SelectionSnapshot,
        source: &RgbaImage,
    ) -> Result<Vec<ExportArtifact>, ExportError> {
        if snapshot.is_empty() {
            return Err(ExportError::NothingSelected);
        }
        if source.width() == 0 || source.height() == 0 {
            return Err(ExportError::Decode(BackendError::Decode(
                "source image has no pixels".into(),
            )));
        }

        let units = plan(snapshot)?;
        info!(
            "exporting {} specs as {} artifacts from a {}x{} source",
            snapshot.specs.len(),
            units.len(),
            source.width(),
            source.height()
        );

        units
            .par_iter()
            .map(|unit| self.render_unit(unit, source, snapshot.fill_color))
            .collect()
    }

    fn render_unit(
        &self,
        unit: &RenderUnit,
        source: &RgbaImage,
        fill: FillColor,
    ) -> Result<ExportArtifact, ExportError> {
        let platform = unit.platform();
        let filename = unit.filename();
        let fail = |reason: &dyn std::fmt::Display| ExportError::failed(platform, filename, reason);

        let (mime, bytes) = match unit {
            RenderUnit::Single { spec, .. } => {
                let pixels = if is_tile_platform(platform) {
                    self.render_tile(source, spec, fill)
                } else {
                    self.backend.resize(source, spec.width, spec.height)
                }
                .map_err(|e| fail(&e))?;
                let png = self.backend.encode_png(&pixels).map_err(|e| fail(&e))?;
                (spec.mime, png)
            }
            RenderUnit::Container { members, .. } => {
                let images = members
                    .iter()
                    .map(|spec| {
                        let pixels = self.backend.resize(source, spec.width, spec.height)?;
                        Ok(ContainerImage {
                            width: spec.width,
                            height: spec.height,
                            data: self.backend.encode_png(&pixels)?,
                        })
                    })
                    .collect::<Result<Vec<_>, BackendError>>()
                    .map_err(|e| fail(&e))?;
                let container = ico::build_container(&images).map_err(|e| fail(&e))?;
                (IconMime::Ico, container)
            }
        };

        debug!("rendered {platform}/{filename}: {} bytes", bytes.len());
        Ok(ExportArtifact {
            platform,
            filename: filename.to_string(),
            mime,
            bytes,
        })
    }

    fn render_tile(
        &self,
        source: &RgbaImage,
        spec: &IconSpec,
        fill: FillColor,
    ) -> Result<RgbaImage, BackendError> {
        let side = tile_artwork_box((spec.width, spec.height), self.settings.tile_artwork_ratio);
        let (art_w, art_h) = calculate_fit_dimensions(source.dimensions(), (side, side));
        let artwork = self.backend.resize(source, art_w, art_h)?;
        composite_on_background(&artwork, spec.width, spec.height, fill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::selection::{SelectedSpec, SelectionStore};

    fn snapshot_of(platforms: &[&str]) -> SelectionSnapshot {
        let mut store = SelectionStore::new();
        store.select_only(platforms).unwrap();
        store.snapshot()
    }

    fn mock_exporter(backend: MockBackend) -> Exporter<MockBackend> {
        Exporter::with_backend(backend, ExportSettings::default())
    }

    fn spec(width: u32, mime: IconMime, filename: &'static str) -> IconSpec {
        IconSpec {
            width,
            height: width,
            mime,
            filename,
            desc: "",
        }
    }

    fn custom_snapshot(platform: &'static str, specs: Vec<IconSpec>) -> SelectionSnapshot {
        SelectionSnapshot {
            specs: specs
                .into_iter()
                .map(|spec| SelectedSpec { platform, spec })
                .collect(),
            fill_color: FillColor::WHITE,
        }
    }

    // =========================================================================
    // plan
    // =========================================================================

    #[test]
    fn plan_web_keeps_ico_last() {
        let units = plan(&snapshot_of(&["Web"])).unwrap();
        let names: Vec<&str> = units.iter().map(|u| u.filename()).collect();
        assert_eq!(names, ["favicon-16x16.png", "favicon-32x32.png", "favicon.ico"]);
        assert!(matches!(&units[2], RenderUnit::Container { members, .. } if members.len() == 1));
    }

    #[test]
    fn plan_everything_is_one_unit_per_png_plus_one_ico() {
        let units = plan(&SelectionStore::new().snapshot()).unwrap();
        assert_eq!(units.len(), 26);
    }

    #[test]
    fn plan_groups_container_specs_by_filename() {
        let snap = custom_snapshot(
            "Web",
            vec![
                spec(16, IconMime::Ico, "favicon.ico"),
                spec(16, IconMime::Png, "favicon-16x16.png"),
                spec(32, IconMime::Ico, "favicon.ico"),
                spec(48, IconMime::Ico, "legacy.ico"),
                spec(48, IconMime::Ico, "favicon.ico"),
            ],
        );
        let units = plan(&snap).unwrap();

        assert_eq!(units.len(), 3);
        match &units[0] {
            RenderUnit::Container {
                filename, members, ..
            } => {
                assert_eq!(*filename, "favicon.ico");
                let sizes: Vec<u32> = members.iter().map(|m| m.width).collect();
                assert_eq!(sizes, [16, 32, 48]);
            }
            other => panic!("expected container, got {other:?}"),
        }
        assert_eq!(units[1].filename(), "favicon-16x16.png");
        assert_eq!(units[2].filename(), "legacy.ico");
    }

    #[test]
    fn plan_rejects_png_reusing_container_name() {
        let snap = custom_snapshot(
            "Web",
            vec![
                spec(32, IconMime::Ico, "favicon.ico"),
                spec(32, IconMime::Png, "favicon.ico"),
            ],
        );
        let err = plan(&snap).unwrap_err();
        assert!(matches!(err, ExportError::Failed { filename, .. } if filename == "favicon.ico"));
    }

    // =========================================================================
    // render with the mock backend
    // =========================================================================

    #[test]
    fn render_resizes_every_png_to_exact_size() {
        let exporter = mock_exporter(MockBackend::new());
        let artifacts = exporter
            .render(&snapshot_of(&["iOS"]), &RgbaImage::new(64, 64))
            .unwrap();

        assert_eq!(artifacts.len(), 9);
        let ops = exporter.backend.get_operations();
        assert!(ops.contains(&RecordedOp::Resize {
            from: (64, 64),
            width: 180,
            height: 180
        }));
        assert!(ops.contains(&RecordedOp::EncodePng {
            width: 57,
            height: 57
        }));
    }

    #[test]
    fn render_tiles_fit_artwork_then_encode_full_canvas() {
        let exporter = mock_exporter(MockBackend::new());
        let artifacts = exporter
            .render(&snapshot_of(&["Windows"]), &RgbaImage::new(200, 100))
            .unwrap();

        assert_eq!(artifacts.len(), 5);
        let ops = exporter.backend.get_operations();
        // 310x150 tile: box 90 (0.6 × 150), 2:1 source → 90x45 artwork
        assert!(ops.contains(&RecordedOp::Resize {
            from: (200, 100),
            width: 90,
            height: 45
        }));
        assert!(ops.contains(&RecordedOp::EncodePng {
            width: 310,
            height: 150
        }));
        assert!(!ops.iter().any(|op| matches!(
            op,
            RecordedOp::Resize {
                width: 310,
                height: 150,
                ..
            }
        )));
    }

    #[test]
    fn render_container_has_ico_mime_and_valid_directory() {
        let exporter = mock_exporter(MockBackend::new());
        let artifacts = exporter
            .render(&snapshot_of(&["Web"]), &RgbaImage::new(64, 64))
            .unwrap();

        let ico_artifact = &artifacts[2];
        assert_eq!(ico_artifact.mime, IconMime::Ico);
        let dir = ico::IconDir::parse(&ico_artifact.bytes).unwrap();
        assert_eq!(dir.entries.len(), 1);
        assert_eq!((dir.entries[0].width, dir.entries[0].height), (32, 32));
    }

    #[test]
    fn render_failure_names_platform_and_file() {
        let exporter = mock_exporter(MockBackend::failing_at(120, 120));
        let err = exporter
            .render(&snapshot_of(&["iOS"]), &RgbaImage::new(64, 64))
            .unwrap_err();

        match err {
            ExportError::Failed {
                platform,
                filename,
                reason,
            } => {
                assert_eq!(platform, "iOS");
                assert_eq!(filename, "apple-touch-icon-120x120.png");
                assert!(reason.contains("mock failure"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn container_dimension_over_256_fails_the_export() {
        let exporter = mock_exporter(MockBackend::new());
        let snap = custom_snapshot("Web", vec![spec(512, IconMime::Ico, "huge.ico")]);
        let err = exporter.render(&snap, &RgbaImage::new(8, 8)).unwrap_err();
        assert!(matches!(err, ExportError::Failed { reason, .. } if reason.contains("1-256")));
    }

    // =========================================================================
    // render with the image-crate backend
    // =========================================================================

    #[test]
    fn real_tiles_have_fill_border_and_exact_size() {
        use crate::test_helpers::{assert_border, decode_png, find_artifact, solid_image};

        let exporter = Exporter::new(&BundlerConfig::default());
        let mut snap = snapshot_of(&["Windows"]);
        snap.fill_color = FillColor::rgb(0, 0, 255);
        let artifacts = exporter
            .render(&snap, &solid_image(80, 40, [250, 250, 0, 255]))
            .unwrap();

        let wide = decode_png(&find_artifact(&artifacts, "mstile-310x150.png").bytes);
        assert_eq!(wide.dimensions(), (310, 150));
        assert_border(&wide, [0, 0, 255, 255]);
        assert_ne!(wide.get_pixel(155, 75).0, [0, 0, 255, 255]);
    }

    #[test]
    fn real_export_archive_reopens_with_valid_ico() {
        use crate::test_helpers::{archive_members, encode_source_png, find_member, gradient_image};

        let exporter = Exporter::new(&BundlerConfig::default());
        let source = encode_source_png(&gradient_image(50, 50));
        let bundle = exporter.export(&snapshot_of(&["Web"]), &source).unwrap();

        let members = archive_members(&bundle.bytes);
        let ico_bytes = &find_member(&members, "favicon.ico").bytes;
        let dir = ico::IconDir::parse(ico_bytes).unwrap();
        assert!(dir.entries[0].data(ico_bytes).unwrap().starts_with(b"\x89PNG"));
    }

    // =========================================================================
    // export: validation, decode, in-flight guard
    // =========================================================================

    #[test]
    fn empty_selection_is_nothing_selected_without_decoding() {
        let exporter = mock_exporter(MockBackend::new());
        let err = exporter.export(&snapshot_of(&[]), b"png bytes").unwrap_err();

        assert!(matches!(err, ExportError::NothingSelected));
        assert!(exporter.backend.get_operations().is_empty());
    }

    #[test]
    fn undecodable_source_is_decode_error() {
        let exporter = mock_exporter(MockBackend::new());
        let err = exporter.export(&snapshot_of(&["Web"]), b"").unwrap_err();
        assert!(matches!(err, ExportError::Decode(_)));
    }

    #[test]
    fn export_names_archive_from_settings() {
        let settings = ExportSettings {
            archive_name: "brand-icons".into(),
            ..ExportSettings::default()
        };
        let exporter = Exporter::with_backend(MockBackend::new(), settings);
        let bundle = exporter.export(&snapshot_of(&["Web"]), b"source").unwrap();

        assert_eq!(bundle.file_name, "brand-icons.tar.gz");
        let names: Vec<&str> = bundle.artifacts.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, ["favicon-16x16.png", "favicon-32x32.png", "favicon.ico"]);
    }

    #[test]
    fn second_export_while_busy_is_rejected() {
        let exporter = mock_exporter(MockBackend::new());
        exporter.in_flight.store(true, Ordering::SeqCst);

        let err = exporter.export(&snapshot_of(&["Web"]), b"source").unwrap_err();
        assert!(matches!(err, ExportError::Busy));
        assert!(exporter.backend.get_operations().is_empty());
    }

    #[test]
    fn export_image_takes_decoded_pixels() {
        use crate::imaging::rgba_from_raw;
        use crate::test_helpers::{archive_members, decode_png, find_member};

        let pixels: Vec<u8> = (0..64 * 64)
            .flat_map(|i| [(i % 64) as u8 * 4, (i / 64) as u8 * 4, 90, 255])
            .collect();
        let source = rgba_from_raw(64, 64, pixels).unwrap();

        let exporter = Exporter::new(&BundlerConfig::default());
        let bundle = exporter
            .export_image(&snapshot_of(&["Web"]), &source)
            .unwrap();

        let names: Vec<&str> = bundle.artifacts.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, ["favicon-16x16.png", "favicon-32x32.png", "favicon.ico"]);

        let members = archive_members(&bundle.bytes);
        let small = decode_png(&find_member(&members, "favicon-16x16.png").bytes);
        assert_eq!(small.dimensions(), (16, 16));
        let ico_bytes = &find_member(&members, "favicon.ico").bytes;
        let dir = ico::IconDir::parse(ico_bytes).unwrap();
        assert_eq!(dir.entries.len(), 1);
        assert_eq!((dir.entries[0].width, dir.entries[0].height), (32, 32));
    }

    #[test]
    fn export_image_is_rejected_while_busy() {
        let exporter = mock_exporter(MockBackend::new());
        let source = RgbaImage::new(64, 64);
        exporter.in_flight.store(true, Ordering::SeqCst);

        let err = exporter
            .export_image(&snapshot_of(&["Web"]), &source)
            .unwrap_err();
        assert!(matches!(err, ExportError::Busy));
        assert!(exporter.backend.get_operations().is_empty());
        // The rejected call must not clear a flag it never acquired.
        assert!(exporter.is_busy());

        exporter.in_flight.store(false, Ordering::SeqCst);
        assert!(exporter.export_image(&snapshot_of(&["Web"]), &source).is_ok());
        assert!(!exporter.is_busy());
        assert!(
            !exporter
                .backend
                .get_operations()
                .iter()
                .any(|op| matches!(op, RecordedOp::Decode(_)))
        );
    }

    #[test]
    fn in_flight_flag_is_released_after_failure() {
        let exporter = mock_exporter(MockBackend::new());
        assert!(exporter.export(&snapshot_of(&[]), b"x").is_err());
        assert!(!exporter.is_busy());
        assert!(exporter.export(&snapshot_of(&["Web"]), b"x").is_ok());
        assert!(!exporter.is_busy());
    }

    #[test]
    fn archive_nothing_selected_maps_to_export_nothing_selected() {
        let err: ExportError = ArchiveError::NothingSelected.into();
        assert!(matches!(err, ExportError::NothingSelected));
        let err: ExportError = ArchiveError::DuplicateEntry("a".into()).into();
        assert!(matches!(err, ExportError::Archive(_)));
    }
}
