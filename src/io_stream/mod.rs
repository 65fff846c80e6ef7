//! Streaming archive engine: data-blob writer and reader.
//!
//! # Writer
//! [`FfaWriter`] appends entries to the data blob one at a time.  Files with
//! a compressible suffix are framed through the codec first; every other file
//! is copied verbatim.  The writer tracks the cumulative offset and the
//! [`Entry`] list that becomes the index.  Names are fitted to the 14-byte
//! field here, which is the only place truncation happens.
//!
//! # Reader
//! [`FfaReader`] wraps the data blob.  It knows the blob length for
//! placement checks and returns each entry's payload through
//! [`crate::frame::read_payload`].
//!
//! Both sides are generic over the underlying stream so they can be driven
//! from a `File` or an in-memory `Cursor`.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::codec::{get_codec, Codec, CodecId};
use crate::entry::{fit_name, Entry};
use crate::error::{FfaError, Result};
use crate::frame::{self, FrameError, FrameHeader, Payload};
use crate::report::{Event, Reporter};

/// Default compression level handed to the codec.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

// ── Writer ───────────────────────────────────────────────────────────────────

pub struct FfaWriter<W: Write> {
    writer:  W,
    codec:   Box<dyn Codec>,
    level:   i32,
    /// Bytes written to the blob so far; the next entry's offset.
    offset:  u64,
    entries: Vec<Entry>,
}

impl<W: Write> FfaWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, CodecId::default(), DEFAULT_COMPRESSION_LEVEL)
    }

    pub fn with_options(writer: W, codec: CodecId, level: i32) -> Self {
        Self::with_codec(writer, get_codec(codec), level)
    }

    /// Use a caller-supplied codec implementation.
    pub fn with_codec(writer: W, codec: Box<dyn Codec>, level: i32) -> Self {
        Self { writer, codec, level, offset: 0, entries: Vec::new() }
    }

    pub fn entries(&self) -> &[Entry] { &self.entries }

    pub fn data_len(&self) -> u64 { self.offset }

    /// Append one file.
    ///
    /// Returns `Ok(None)` when the file was skipped because the codec
    /// failed; that is reported as [`Event::CompressFailed`] and nothing is
    /// written.  Write errors and an offset past `u32::MAX` are hard errors.
    pub fn add_file(
        &mut self,
        name:     &str,
        data:     &[u8],
        reporter: &dyn Reporter,
    ) -> Result<Option<&Entry>> {
        // Compression follows the stored name so each record decodes on its own.
        let (stored_name, truncated) = fit_name(name);
        let framed;
        let stored: &[u8] = if frame::has_compressed_suffix(&stored_name) {
            match frame::frame(data, self.codec.as_ref(), self.level) {
                Ok(bytes) => {
                    framed = bytes;
                    if !framed.is_empty() {
                        reporter.report(&Event::Compressed {
                            name:     name.to_owned(),
                            original: data.len(),
                            packed:   framed.len() - frame::FRAME_HEADER_LEN,
                        });
                    }
                    &framed
                }
                Err(e) => {
                    reporter.report(&Event::CompressFailed {
                        name:   name.to_owned(),
                        reason: e.to_string(),
                    });
                    return Ok(None);
                }
            }
        } else {
            data
        };

        let (offset, size) = match (u32::try_from(self.offset), u32::try_from(stored.len())) {
            (Ok(o), Ok(s)) if u64::from(o) + u64::from(s) <= u64::from(u32::MAX) => (o, s),
            _ => return Err(FfaError::ArchiveTooLarge(name.to_owned())),
        };

        if truncated {
            reporter.report(&Event::NameTruncated {
                name:   name.to_owned(),
                stored: stored_name.clone(),
            });
        }

        self.writer.write_all(stored)?;
        self.offset += u64::from(size);

        let order = self.entries.len();
        self.entries.push(Entry { name: stored_name, offset, size, order });
        reporter.report(&Event::Packed { name: name.to_owned(), offset, size });
        Ok(self.entries.last())
    }

    /// Flush the blob and hand back the stream and the index entries in
    /// layout order.
    pub fn finish(mut self) -> io::Result<(W, Vec<Entry>)> {
        self.writer.flush()?;
        Ok((self.writer, self.entries))
    }
}

// ── Reader ───────────────────────────────────────────────────────────────────

pub struct FfaReader<R: Read + Seek> {
    reader:   R,
    codec:    Box<dyn Codec>,
    data_len: u64,
}

impl<R: Read + Seek> FfaReader<R> {
    pub fn new(reader: R) -> io::Result<Self> {
        Self::with_codec(reader, get_codec(CodecId::default()))
    }

    pub fn with_options(reader: R, codec: CodecId) -> io::Result<Self> {
        Self::with_codec(reader, get_codec(codec))
    }

    pub fn with_codec(mut reader: R, codec: Box<dyn Codec>) -> io::Result<Self> {
        let data_len = reader.seek(SeekFrom::End(0))?;
        Ok(Self { reader, codec, data_len })
    }

    pub fn data_len(&self) -> u64 { self.data_len }

    pub fn is_placed(&self, entry: &Entry) -> bool {
        entry.check_placement(self.data_len)
    }

    /// Payload of a placed entry, decoded if it is a valid frame.
    pub fn read_entry(&mut self, entry: &Entry) -> std::result::Result<Payload, FrameError> {
        frame::read_payload(&mut self.reader, entry, self.codec.as_ref())
    }

    /// Frame header of a placed entry, if it has a valid one.  Does not run
    /// the codec.
    pub fn frame_header(&mut self, entry: &Entry) -> io::Result<Option<FrameHeader>> {
        if !frame::is_frame_candidate(&entry.name, entry.size) {
            return Ok(None);
        }
        self.reader.seek(SeekFrom::Start(u64::from(entry.offset)))?;
        let header = FrameHeader::read(&mut self.reader)?;
        Ok(header.fits(entry.size).then_some(header))
    }
}
