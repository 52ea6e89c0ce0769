//! Icon container (`image/x-icon`, `.ico`) serializer and directory reader.
//!
//! The container embeds PNG images as-is behind a small directory:
//!
//! ```text
//! offset  size  field
//! 0       2     reserved (0)
//! 2       2     type (1 = icon)
//! 4       2     image count
//! 6       16×n  directory entries, one per image:
//!                 u8  width   (0 means 256)
//!                 u8  height  (0 means 256)
//!                 u8  colour count (0)
//!                 u8  reserved (0)
//!                 u16 colour planes (0)
//!                 u16 bits per pixel (0)
//!                 u32 data size
//!                 u32 data offset from start of file
//! 6+16n   …     image data, same order as the directory
//! ```
//!
//! All integers are little-endian. Writing is a pure function of the input
//! entries; there is no decoding or resampling here.

use log::trace;
use thiserror::Error;

pub const HEADER_SIZE: usize = 6;
pub const DIR_ENTRY_SIZE: usize = 16;
pub const TYPE_ICON: u16 = 1;

/// Largest side the one-byte dimension fields can express (stored as 0).
pub const MAX_DIMENSION: u32 = 256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IcoError {
    #[error("icon container cannot hold a {width}x{height} image (sides must be 1-256)")]
    UnsupportedContainerDimension { width: u32, height: u32 },
    #[error("icon container needs at least one image")]
    EmptyContainer,
    #[error("icon container too large: {0}")]
    ContainerTooLarge(String),
    #[error("malformed icon container: {0}")]
    MalformedContainer(String),
}

/// One image to embed: its pixel size and already-encoded PNG bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Encode a side length into the directory's single byte.
fn encode_dimension(value: u32) -> Option<u8> {
    match value {
        1..=255 => Some(value as u8),
        MAX_DIMENSION => Some(0),
        _ => None,
    }
}

fn decode_dimension(byte: u8) -> u32 {
    if byte == 0 { MAX_DIMENSION } else { byte as u32 }
}

/// A parsed (or about-to-be-written) directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconDirEntry {
    /// Pixel width, with the stored 0 already mapped back to 256.
    pub width: u32,
    pub height: u32,
    pub color_count: u8,
    pub planes: u16,
    pub bit_count: u16,
    pub size: u32,
    pub offset: u32,
}

impl IconDirEntry {
    fn pack(&self) -> Result<[u8; DIR_ENTRY_SIZE], IcoError> {
        let unsupported = || IcoError::UnsupportedContainerDimension {
            width: self.width,
            height: self.height,
        };
        let mut bytes = [0u8; DIR_ENTRY_SIZE];
        bytes[0] = encode_dimension(self.width).ok_or_else(unsupported)?;
        bytes[1] = encode_dimension(self.height).ok_or_else(unsupported)?;
        bytes[2] = self.color_count;
        bytes[3] = 0; // reserved
        bytes[4..6].copy_from_slice(&self.planes.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.bit_count.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.size.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.offset.to_le_bytes());
        Ok(bytes)
    }

    fn unpack(data: &[u8; DIR_ENTRY_SIZE]) -> Self {
        Self {
            width: decode_dimension(data[0]),
            height: decode_dimension(data[1]),
            color_count: data[2],
            planes: u16::from_le_bytes([data[4], data[5]]),
            bit_count: u16::from_le_bytes([data[6], data[7]]),
            size: u32::from_le_bytes([data[8], data[9], data[10], data[11]]),
            offset: u32::from_le_bytes([data[12], data[13], data[14], data[15]]),
        }
    }

    /// The embedded image bytes inside `file`, if the entry points within it.
    pub fn data<'a>(&self, file: &'a [u8]) -> Option<&'a [u8]> {
        let start = self.offset as usize;
        let end = start.checked_add(self.size as usize)?;
        file.get(start..end)
    }
}

/// Serialize images into one icon container, preserving input order.
pub fn build_container(images: &[ContainerImage]) -> Result<Vec<u8>, IcoError> {
    if images.is_empty() {
        return Err(IcoError::EmptyContainer);
    }
    let count = u16::try_from(images.len())
        .map_err(|_| IcoError::ContainerTooLarge(format!("{} images", images.len())))?;

    let data_start = HEADER_SIZE + images.len() * DIR_ENTRY_SIZE;
    let total = data_start + images.iter().map(|i| i.data.len()).sum::<usize>();
    if total > u32::MAX as usize {
        return Err(IcoError::ContainerTooLarge(format!("{total} bytes")));
    }

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&TYPE_ICON.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());

    let mut offset = data_start;
    for image in images {
        let entry = IconDirEntry {
            width: image.width,
            height: image.height,
            color_count: 0,
            planes: 0,
            bit_count: 0,
            size: image.data.len() as u32,
            offset: offset as u32,
        };
        out.extend_from_slice(&entry.pack()?);
        trace!(
            "ico entry {}x{}: {} bytes at {:#x}",
            image.width,
            image.height,
            image.data.len(),
            offset
        );
        offset += image.data.len();
    }

    for image in images {
        out.extend_from_slice(&image.data);
    }

    Ok(out)
}

/// The header and directory of an icon container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconDir {
    pub resource_type: u16,
    pub entries: Vec<IconDirEntry>,
}

impl IconDir {
    /// Read the header and directory. Entry data ranges are checked against
    /// the buffer length; the embedded images themselves are not decoded.
    pub fn parse(bytes: &[u8]) -> Result<Self, IcoError> {
        let malformed = |msg: String| IcoError::MalformedContainer(msg);

        if bytes.len() < HEADER_SIZE {
            return Err(malformed(format!("{} bytes is shorter than the header", bytes.len())));
        }
        let reserved = u16::from_le_bytes([bytes[0], bytes[1]]);
        let resource_type = u16::from_le_bytes([bytes[2], bytes[3]]);
        let count = u16::from_le_bytes([bytes[4], bytes[5]]) as usize;
        if reserved != 0 {
            return Err(malformed(format!("reserved field is {reserved}")));
        }

        let dir_end = HEADER_SIZE + count * DIR_ENTRY_SIZE;
        if bytes.len() < dir_end {
            return Err(malformed(format!("directory of {count} entries is truncated")));
        }

        let entries = bytes[HEADER_SIZE..dir_end]
            .chunks_exact(DIR_ENTRY_SIZE)
            .map(|chunk| {
                let mut raw = [0u8; DIR_ENTRY_SIZE];
                raw.copy_from_slice(chunk);
                IconDirEntry::unpack(&raw)
            })
            .collect::<Vec<_>>();

        for (i, entry) in entries.iter().enumerate() {
            if entry.data(bytes).is_none() {
                return Err(malformed(format!(
                    "entry {i} data ({} bytes at {}) runs past end of file",
                    entry.size, entry.offset
                )));
            }
        }

        Ok(Self {
            resource_type,
            entries,
        })
    }
}
