//! Fixed-width index record: 14-byte name, u32 offset, u32 size.
//!
//! All integers are little-endian.  The codec is total: any 22 bytes decode
//! to an [`Entry`], and bounds checking is left to [`Entry::check_placement`].

use byteorder::{ByteOrder, LittleEndian};
use std::io::{self, Read, Write};

/// Width of the null-padded name field.
pub const NAME_LEN:    usize = 14;
/// Size of one on-disk index record.
pub const RECORD_SIZE: usize = NAME_LEN + 4 + 4;
/// Upper bound on records per index (16-bit index positions).
pub const MAX_ENTRIES: usize = 0xFFFF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name:   String,
    pub offset: u32,
    pub size:   u32,
    /// Zero-based record position inside the index file.
    pub order:  usize,
}

impl Entry {
    pub fn new(name: impl Into<String>, offset: u32, size: u32, order: usize) -> Self {
        Self { name: name.into(), offset, size, order }
    }

    /// Decode one record.  Trailing NULs are trimmed from the name; non-ASCII
    /// bytes come back as `?`.
    pub fn decode(record: &[u8; RECORD_SIZE], order: usize) -> Self {
        let mut name_field = [0u8; NAME_LEN];
        name_field.copy_from_slice(&record[..NAME_LEN]);
        let offset = LittleEndian::read_u32(&record[NAME_LEN..NAME_LEN + 4]);
        let size   = LittleEndian::read_u32(&record[NAME_LEN + 4..]);
        Self { name: decode_name(&name_field), offset, size, order }
    }

    /// Read a record from a stream.
    pub fn read<R: Read>(mut reader: R, order: usize) -> io::Result<Self> {
        let mut record = [0u8; RECORD_SIZE];
        reader.read_exact(&mut record)?;
        Ok(Self::decode(&record, order))
    }

    /// Encode into 22 bytes.  Names longer than [`NAME_LEN`] must already be
    /// truncated by the caller; anything past the field is dropped here.
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut record = [0u8; RECORD_SIZE];
        let name = encode_name(&self.name);
        let n = name.len().min(NAME_LEN);
        record[..n].copy_from_slice(&name[..n]);
        LittleEndian::write_u32(&mut record[NAME_LEN..NAME_LEN + 4], self.offset);
        LittleEndian::write_u32(&mut record[NAME_LEN + 4..], self.size);
        record
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&self.encode())
    }

    /// True when `[offset, offset + size)` lies within a blob of `data_len` bytes.
    pub fn check_placement(&self, data_len: u64) -> bool {
        is_valid_placement(self.offset, self.size, data_len)
    }
}

/// Bounds check used for every record during unpack.
pub fn is_valid_placement(offset: u32, size: u32, data_len: u64) -> bool {
    u64::from(offset) + u64::from(size) <= data_len
}

/// ASCII-encode a name the way the index stores it: every non-ASCII char
/// becomes a single `?`.
pub fn encode_name(name: &str) -> Vec<u8> {
    name.chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .collect()
}

fn decode_name(field: &[u8; NAME_LEN]) -> String {
    let end = field.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    field[..end]
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect()
}

/// Fit `name` into the record's name field.  Returns the stored form and
/// whether anything was cut off.
pub fn fit_name(name: &str) -> (String, bool) {
    let encoded = encode_name(name);
    if encoded.len() <= NAME_LEN {
        return (String::from_utf8_lossy(&encoded).into_owned(), false);
    }
    (String::from_utf8_lossy(&encoded[..NAME_LEN]).into_owned(), true)
}
