//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output leads with what a file *is* (platform, icon name, pixel size) and
//! shows byte counts and MIME types as secondary context. The same two-level
//! pattern is used everywhere:
//!
//! 1. **Header line**: positional index + platform (+ detail like icon count)
//! 2. **Context lines**: indented file lines
//!
//! # Output Format
//!
//! ## Presets
//!
//! ```text
//! 001 Android (9 icons)
//!     android-chrome-36x36.png   36x36  image/png
//!     ...
//! 003 Web (3 icons)
//!     favicon-16x16.png          16x16  image/png
//!     favicon-32x32.png          32x32  image/png
//!     favicon.ico                32x32  image/x-icon
//! ```
//!
//! ## Export
//!
//! ```text
//! Web
//!     favicon-16x16.png (612 B)
//!     favicon-32x32.png (1.4 KB)
//!     favicon.ico (1.4 KB, image/x-icon)
//!
//! Wrote out/icons.tar.gz (3 files, 3.1 KB)
//! ```
//!
//! ## Inspect
//!
//! ```text
//! Icon container: 2 images
//!     001 16x16 (612 B at 38)
//!     002 32x32 (1.4 KB at 650)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::export::ExportBundle;
use crate::ico::IconDir;
use crate::presets::{IconMime, Preset};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count: `B` below 1 KiB, then one decimal of KB / MB.
fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// presets
// ============================================================================

/// Format the preset catalog, optionally marking which presets are chosen.
pub fn format_presets(presets: &[Preset], show_chosen: bool) -> Vec<String> {
    let name_width = presets
        .iter()
        .flat_map(|p| &p.value)
        .map(|s| s.filename.len())
        .max()
        .unwrap_or(0);

    let mut lines = Vec::new();
    for (i, preset) in presets.iter().enumerate() {
        let mut header = format!(
            "{} {} ({})",
            format_index(i + 1),
            preset.name,
            plural(preset.value.len(), "icon", "icons")
        );
        if preset.is_tile_style() {
            header.push_str(" [tile]");
        }
        if show_chosen && !preset.chosen {
            header.push_str(" (not selected)");
        }
        lines.push(header);

        for spec in &preset.value {
            let size = format!("{}x{}", spec.width, spec.height);
            lines.push(format!(
                "{}{:<name_width$}  {:>7}  {}",
                indent(1),
                spec.filename,
                size,
                spec.mime
            ));
        }
    }
    lines
}

pub fn print_presets(presets: &[Preset], show_chosen: bool) {
    for line in format_presets(presets, show_chosen) {
        println!("{}", line);
    }
}

// ============================================================================
// export
// ============================================================================

/// Format the result of an export: artifacts grouped under their platform,
/// then one summary line naming where the archive went.
pub fn format_export_output(bundle: &ExportBundle, written_to: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_platform: Option<&str> = None;

    for artifact in &bundle.artifacts {
        if current_platform != Some(artifact.platform) {
            current_platform = Some(artifact.platform);
            lines.push(artifact.platform.to_string());
        }
        let detail = match artifact.mime {
            IconMime::Png => format_size(artifact.size),
            other => format!("{}, {}", format_size(artifact.size), other),
        };
        lines.push(format!("{}{} ({})", indent(1), artifact.filename, detail));
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Wrote {} ({}, {})",
        written_to.display(),
        plural(bundle.artifacts.len(), "file", "files"),
        format_size(bundle.bytes.len())
    ));
    lines
}

pub fn print_export_output(bundle: &ExportBundle, written_to: &Path) {
    for line in format_export_output(bundle, written_to) {
        println!("{}", line);
    }
}

// ============================================================================
// inspect
// ============================================================================

/// Format the directory of an icon container.
pub fn format_ico_directory(dir: &IconDir) -> Vec<String> {
    let kind = match dir.resource_type {
        1 => "Icon container".to_string(),
        2 => "Cursor container".to_string(),
        other => format!("Container (type {other})"),
    };
    let mut lines = vec![format!(
        "{}: {}",
        kind,
        plural(dir.entries.len(), "image", "images")
    )];
    for (i, entry) in dir.entries.iter().enumerate() {
        lines.push(format!(
            "{}{} {}x{} ({} at {})",
            indent(1),
            format_index(i + 1),
            entry.width,
            entry.height,
            format_size(entry.size as usize),
            entry.offset
        ));
    }
    lines
}

pub fn print_ico_directory(dir: &IconDir) {
    for line in format_ico_directory(dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
