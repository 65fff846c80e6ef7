//! Index file (`.lst`): a bare sequence of 22-byte records.
//!
//! No header, no padding.  The record count is the file length divided by
//! [`RECORD_SIZE`]; a remainder or more than [`MAX_ENTRIES`] records means
//! the file is not an index.

use std::io::{self, Read, Write};

use crate::entry::{Entry, MAX_ENTRIES, RECORD_SIZE};
use crate::error::{FfaError, Result};

/// Number of records implied by an index of `len` bytes.
pub fn record_count(len: u64) -> Result<usize> {
    let count = len / RECORD_SIZE as u64;
    if len % RECORD_SIZE as u64 != 0 || count > MAX_ENTRIES as u64 {
        return Err(FfaError::InsaneRecordCount { len });
    }
    Ok(count as usize)
}

/// Decode every record in file order.  `len` is the index length in bytes.
pub fn read_index<R: Read>(mut reader: R, len: u64) -> Result<Vec<Entry>> {
    let count = record_count(len)?;
    let mut entries = Vec::with_capacity(count);
    for order in 0..count {
        entries.push(Entry::read(&mut reader, order)?);
    }
    Ok(entries)
}

/// Decode an in-memory index.
pub fn parse_index(bytes: &[u8]) -> Result<Vec<Entry>> {
    read_index(bytes, bytes.len() as u64)
}

pub fn write_index<W: Write>(mut writer: W, entries: &[Entry]) -> io::Result<()> {
    for e in entries {
        e.write(&mut writer)?;
    }
    writer.flush()
}
