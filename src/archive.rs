//! Package export artifacts into one downloadable `.tar.gz`.
//!
//! The archive is built entirely in memory. Every member is a regular file with
//! mode `0644`, owner `0:0` and mtime `0`, so packing the same artifacts twice
//! gives byte-identical archives. Gzip runs at the configured level (0–9,
//! default 6); `flate2` reads back anything it wrote, as do `tar`, 7-Zip and
//! the desktop archive managers.

use crate::export::ExportArtifact;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use log::debug;
use std::collections::HashSet;
use std::io::Read;
use thiserror::Error;

pub const ARCHIVE_EXTENSION: &str = "tar.gz";
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;
const MEMBER_MODE: u32 = 0o644;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Two artifacts with one name. Export naming makes this unreachable, so
    /// hitting it means a bug upstream.
    #[error("duplicate archive entry '{0}'")]
    DuplicateEntry(String),
    #[error("nothing selected: no artifacts to archive")]
    NothingSelected,
    #[error("archive entry '{name}' declares {declared} bytes but holds {actual}")]
    Truncated {
        name: String,
        declared: u64,
        actual: u64,
    },
}

/// One member read back out of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Pack artifacts, in order, into a gzip-compressed tar stream.
pub fn pack(artifacts: &[ExportArtifact], compression_level: u32) -> Result<Vec<u8>, ArchiveError> {
    if artifacts.is_empty() {
        return Err(ArchiveError::NothingSelected);
    }

    let mut seen = HashSet::new();
    if let Some(dup) = artifacts.iter().find(|a| !seen.insert(a.filename.as_str())) {
        return Err(ArchiveError::DuplicateEntry(dup.filename.clone()));
    }

    let encoder = GzEncoder::new(Vec::new(), Compression::new(compression_level.min(9)));
    let mut builder = tar::Builder::new(encoder);
    builder.mode(tar::HeaderMode::Deterministic);

    for artifact in artifacts {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(artifact.bytes.len() as u64);
        header.set_mode(MEMBER_MODE);
        header.set_uid(0);
        header.set_gid(0);
        header.set_mtime(0);
        builder.append_data(&mut header, &artifact.filename, artifact.bytes.as_slice())?;
        debug!(
            "archived {} ({} bytes, {})",
            artifact.filename,
            artifact.bytes.len(),
            artifact.mime
        );
    }

    let encoder = builder.into_inner()?;
    Ok(encoder.finish()?)
}

/// Reopen an archive produced by [`pack`] and return its members in order.
///
/// Header sizes are not trusted: a member must actually hold the bytes its
/// header declares, or the read fails with [`ArchiveError::Truncated`].
pub fn read_members(archive: &[u8]) -> Result<Vec<ArchiveMember>, ArchiveError> {
    let mut tar = tar::Archive::new(GzDecoder::new(archive));
    let mut members = Vec::new();
    for entry in tar.entries()? {
        let mut entry = entry?;
        let name = entry.path()?.to_string_lossy().into_owned();
        let declared = entry.size();
        // Pre-size from the header only up to what the input could hold.
        let hint = declared.min(archive.len() as u64) as usize;
        let mut bytes = Vec::with_capacity(hint);
        entry.read_to_end(&mut bytes)?;
        if bytes.len() as u64 != declared {
            return Err(ArchiveError::Truncated {
                name,
                declared,
                actual: bytes.len() as u64,
            });
        }
        members.push(ArchiveMember { name, bytes });
    }
    Ok(members)
}

/// Download name for an archive, e.g. `icons` → `icons.tar.gz`.
pub fn archive_file_name(stem: &str) -> String {
    format!("{stem}.{ARCHIVE_EXTENSION}")
}
