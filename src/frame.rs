//! Compressed-frame protocol for `.so4` / `.so5` entries.
//!
//! ```text
//! [i32 packed_size][i32 unpacked_size][packed_size bytes of codec output]
//! ```
//!
//! Both header fields are little-endian.  A stored entry only counts as a
//! frame when its name carries a compressible suffix, its stored size is
//! larger than the header, `packed_size + 8 == stored size` and both fields
//! are positive.  Anything else under a compressible suffix is plain bytes.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Seek, SeekFrom, Write};
use thiserror::Error;

use crate::codec::{Codec, CodecError};
use crate::entry::Entry;

/// Size of the `(packed_size, unpacked_size)` sub-header.
pub const FRAME_HEADER_LEN: usize = 8;

/// Name suffixes whose payloads are framed.  Compared case-insensitively.
pub const COMPRESSED_SUFFIXES: [&str; 2] = [".so4", ".so5"];

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

pub fn has_compressed_suffix(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    COMPRESSED_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

/// Whether a stored entry may hold a frame and its header is worth reading.
pub fn is_frame_candidate(name: &str, stored_size: u32) -> bool {
    has_compressed_suffix(name) && stored_size as usize > FRAME_HEADER_LEN
}

// ── FrameHeader ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub packed_size:   i32,
    pub unpacked_size: i32,
}

impl FrameHeader {
    pub fn read<R: Read>(mut reader: R) -> io::Result<Self> {
        Ok(Self {
            packed_size:   reader.read_i32::<LittleEndian>()?,
            unpacked_size: reader.read_i32::<LittleEndian>()?,
        })
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_i32::<LittleEndian>(self.packed_size)?;
        writer.write_i32::<LittleEndian>(self.unpacked_size)?;
        Ok(())
    }

    /// Consistency check against the entry's stored size.
    pub fn fits(&self, stored_size: u32) -> bool {
        self.packed_size > 0
            && self.unpacked_size > 0
            && i64::from(self.packed_size) + FRAME_HEADER_LEN as i64 == i64::from(stored_size)
    }
}

// ── Encode ───────────────────────────────────────────────────────────────────

/// Build the stored bytes for a compressible file.
///
/// An empty input has no valid frame (both header fields must be positive),
/// so it is stored as zero raw bytes and reads back as empty.
pub fn frame(data: &[u8], codec: &dyn Codec, level: i32) -> Result<Vec<u8>, CodecError> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let unpacked_size = i32::try_from(data.len())
        .map_err(|_| CodecError::Compression(format!("input of {} bytes is too large to frame", data.len())))?;

    let packed = codec.compress(data, level)?;
    if packed.is_empty() {
        return Err(CodecError::Compression("codec produced no output".into()));
    }
    let packed_size = i32::try_from(packed.len())
        .ok()
        .filter(|n| *n <= i32::MAX - FRAME_HEADER_LEN as i32)
        .ok_or_else(|| CodecError::Compression(format!("compressed size {} does not fit a frame", packed.len())))?;

    let mut out = Vec::with_capacity(FRAME_HEADER_LEN + packed.len());
    FrameHeader { packed_size, unpacked_size }
        .write(&mut out)
        .map_err(|e| CodecError::Compression(e.to_string()))?;
    out.extend_from_slice(&packed);
    Ok(out)
}

// ── Decode ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Name is not compressible, or the entry is too small to hold a frame.
    Plain,
    /// Compressible name, but the header did not check out.
    Fallback,
    /// Frame decoded through the codec.
    Decoded(FrameHeader),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub data: Vec<u8>,
    pub kind: PayloadKind,
}

/// Inverse of [`frame`] over a stored byte slice.
pub fn unframe(name: &str, stored: &[u8], codec: &dyn Codec) -> Result<Payload, CodecError> {
    decode_stored(name, stored.to_vec(), codec)
}

fn decode_stored(name: &str, stored: Vec<u8>, codec: &dyn Codec) -> Result<Payload, CodecError> {
    let size = u32::try_from(stored.len()).unwrap_or(u32::MAX);
    if !is_frame_candidate(name, size) {
        return Ok(Payload { data: stored, kind: PayloadKind::Plain });
    }
    let header = FrameHeader::read(&stored[..]).map_err(|e| CodecError::Decompression(e.to_string()))?;
    if !header.fits(size) {
        return Ok(Payload { data: stored, kind: PayloadKind::Fallback });
    }
    let data = codec.decompress(&stored[FRAME_HEADER_LEN..])?;
    Ok(Payload { data, kind: PayloadKind::Decoded(header) })
}

/// Read one entry's stored bytes from the data blob and decode them as
/// [`unframe`] does.  The entry's placement must already have been validated.
pub fn read_payload<R: Read + Seek>(
    reader: &mut R,
    entry:  &Entry,
    codec:  &dyn Codec,
) -> Result<Payload, FrameError> {
    reader.seek(SeekFrom::Start(u64::from(entry.offset)))?;
    let mut stored = vec![0u8; entry.size as usize];
    reader.read_exact(&mut stored)?;
    Ok(decode_stored(&entry.name, stored, codec)?)
}
