//! High-level pack and unpack API, the primary embedding surface.
//!
//! An archive is a triple of sibling files sharing a base name:
//!
//! | File               | Contents                                   |
//! |--------------------|--------------------------------------------|
//! | `name.dat`         | data blob (caller-chosen extension)        |
//! | `name.lst`         | index, 22-byte records                     |
//! | `name.order.json`  | order ledger written by unpack             |
//!
//! ```no_run
//! use ffa::archive::{pack, unpack, PackOptions, UnpackOptions};
//! use ffa::report::TracingReporter;
//! use std::path::Path;
//!
//! unpack(Path::new("game.dat"), Path::new("game"), &UnpackOptions::default(), &TracingReporter)?;
//! // ... edit files under game/ ...
//! pack(Path::new("game"), Path::new("game.dat"), &PackOptions::default(), &TracingReporter)?;
//! # Ok::<(), ffa::FfaError>(())
//! ```

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::codec::CodecId;
use crate::entry::{Entry, MAX_ENTRIES};
use crate::error::{FfaError, Result};
use crate::frame::{FrameError, FrameHeader, PayloadKind};
use crate::index;
use crate::io_stream::{FfaReader, FfaWriter, DEFAULT_COMPRESSION_LEVEL};
use crate::ledger::OrderLedger;
use crate::path::{entry_path, normalize_rel_path};
use crate::report::{Event, Reporter};

/// Extension of the index file.
pub const INDEX_EXT:  &str = "lst";
/// Extension of the order ledger.
pub const LEDGER_EXT: &str = "order.json";

// ── ArchivePaths ──────────────────────────────────────────────────────────────

/// The three sibling files of one archive, derived from the data blob path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePaths {
    pub data:   PathBuf,
    pub index:  PathBuf,
    pub ledger: PathBuf,
}

impl ArchivePaths {
    pub fn new<P: AsRef<Path>>(data: P) -> Self {
        let data = data.as_ref().to_owned();
        Self {
            index:  data.with_extension(INDEX_EXT),
            ledger: data.with_extension(LEDGER_EXT),
            data,
        }
    }

    fn data_file_name(&self) -> String {
        self.data
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

// ── Options ──────────────────────────────────────────────────────────────────

/// Where the pack order comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackOrder {
    /// Follow the ledger written by a previous unpack.  Required to exist.
    #[default]
    Ledger,
    /// Walk the input folder and pack in lexicographic path order.
    Scan,
}

/// Configuration for [`pack`].
#[derive(Debug, Clone)]
pub struct PackOptions {
    pub codec: CodecId,
    pub level: i32,
    pub order: PackOrder,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            codec: CodecId::default(),
            level: DEFAULT_COMPRESSION_LEVEL,
            order: PackOrder::default(),
        }
    }
}

/// Configuration for [`unpack`] and [`list`].
#[derive(Debug, Clone, Default)]
pub struct UnpackOptions {
    pub codec: CodecId,
}

// ── Summaries ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnpackSummary {
    /// Records in the index, valid or not.
    pub records:   usize,
    pub extracted: usize,
    pub skipped:   usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackSummary {
    pub packed:   usize,
    pub skipped:  usize,
    pub data_len: u64,
}

/// One row of [`list`].
#[derive(Debug, Clone)]
pub struct EntryStatus {
    pub entry:  Entry,
    pub placed: bool,
    /// Set when the entry holds a well-formed compressed frame.
    pub frame:  Option<FrameHeader>,
}

// ── Unpack ───────────────────────────────────────────────────────────────────

fn open_index(paths: &ArchivePaths) -> Result<Vec<Entry>> {
    if !paths.index.is_file() {
        return Err(FfaError::MissingIndex(paths.index.clone()));
    }
    let file = File::open(&paths.index)?;
    let len = file.metadata()?.len();
    index::read_index(BufReader::new(file), len)
}

/// Extract every placeable entry of `archive` into `output`.
///
/// The order ledger is written next to the archive before any entry is
/// touched and lists every record, placeable or not.  Per-entry problems are
/// reported and skipped; only missing files, a malformed index and I/O on
/// the archive itself abort the run.
pub fn unpack(
    archive:  &Path,
    output:   &Path,
    opts:     &UnpackOptions,
    reporter: &dyn Reporter,
) -> Result<UnpackSummary> {
    let paths = ArchivePaths::new(archive);
    let entries = open_index(&paths)?;
    let mut reader = FfaReader::with_options(BufReader::new(File::open(&paths.data)?), opts.codec)?;

    OrderLedger::capture(&paths.data_file_name(), &entries).persist(&paths.ledger)?;

    let mut summary = UnpackSummary { records: entries.len(), ..Default::default() };

    let placed: Vec<&Entry> = entries
        .iter()
        .filter(|e| {
            let ok = reader.is_placed(e);
            if !ok {
                reporter.report(&Event::InvalidPlacement {
                    name:   e.name.clone(),
                    offset: e.offset,
                    size:   e.size,
                });
            }
            ok
        })
        .collect();
    summary.skipped = entries.len() - placed.len();

    fs::create_dir_all(output)?;

    for entry in placed {
        if extract_entry(&mut reader, entry, output, reporter) {
            summary.extracted += 1;
        } else {
            summary.skipped += 1;
        }
    }

    Ok(summary)
}

/// Returns `false` when the entry was skipped.
fn extract_entry<R: std::io::Read + std::io::Seek>(
    reader:   &mut FfaReader<R>,
    entry:    &Entry,
    output:   &Path,
    reporter: &dyn Reporter,
) -> bool {
    let name = &entry.name;
    let Some(out_path) = entry_path(output, name) else {
        reporter.report(&Event::UnsafeName { name: name.clone() });
        return false;
    };

    let payload = match reader.read_entry(entry) {
        Ok(p) => p,
        Err(FrameError::Codec(e)) => {
            reporter.report(&Event::DecompressFailed { name: name.clone(), reason: e.to_string() });
            return false;
        }
        Err(FrameError::Io(e)) => {
            reporter.report(&Event::ReadFailed { name: name.clone(), reason: e.to_string() });
            return false;
        }
    };

    if let PayloadKind::Decoded(header) = payload.kind {
        reporter.report(&Event::Decompressed { name: name.clone() });
        if header.unpacked_size as usize != payload.data.len() {
            reporter.report(&Event::SizeMismatch {
                name:     name.clone(),
                expected: header.unpacked_size as usize,
                actual:   payload.data.len(),
            });
        }
    }

    let written = match out_path.parent() {
        Some(dir) => fs::create_dir_all(dir),
        None => Ok(()),
    }
    .and_then(|()| fs::write(&out_path, &payload.data));

    match written {
        Ok(()) => {
            reporter.report(&Event::Extracted { name: name.clone(), size: payload.data.len() });
            true
        }
        Err(e) => {
            reporter.report(&Event::WriteFailed { name: name.clone(), reason: e.to_string() });
            false
        }
    }
}

/// Describe every record of `archive` without extracting anything.
pub fn list(archive: &Path, opts: &UnpackOptions) -> Result<Vec<EntryStatus>> {
    let paths = ArchivePaths::new(archive);
    let entries = open_index(&paths)?;
    let mut reader = FfaReader::with_options(BufReader::new(File::open(&paths.data)?), opts.codec)?;

    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let placed = reader.is_placed(&entry);
        let frame = if placed { reader.frame_header(&entry)? } else { None };
        out.push(EntryStatus { entry, placed, frame });
    }
    Ok(out)
}

// ── Pack ─────────────────────────────────────────────────────────────────────

/// Relative paths of every file under `input`, sorted.
fn scan_input(input: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for ent in WalkDir::new(input).follow_links(false) {
        let ent = ent.map_err(|e| {
            let msg = e.to_string();
            FfaError::Io(e.into_io_error().unwrap_or_else(|| std::io::Error::other(msg)))
        })?;
        if !ent.file_type().is_file() {
            continue;
        }
        if let Some(rel) = normalize_rel_path(input, ent.path()) {
            names.push(rel);
        }
    }
    names.sort();
    Ok(names)
}

/// Build `archive` (and its index) from the files under `input`.
///
/// With [`PackOrder::Ledger`] the names come from `archive`'s ledger and are
/// packed in that order; names missing from `input` are reported and
/// skipped.  The entry ceiling is checked before anything is created.
pub fn pack(
    input:    &Path,
    archive:  &Path,
    opts:     &PackOptions,
    reporter: &dyn Reporter,
) -> Result<PackSummary> {
    if !input.is_dir() {
        return Err(FfaError::MissingInputDir(input.to_owned()));
    }
    let paths = ArchivePaths::new(archive);

    let names = match opts.order {
        PackOrder::Ledger => OrderLedger::load(&paths.ledger)?.names,
        PackOrder::Scan => {
            let names = scan_input(input)?;
            if names.is_empty() {
                return Err(FfaError::NoInputFiles(input.to_owned()));
            }
            names
        }
    };
    if names.len() > MAX_ENTRIES {
        return Err(FfaError::TooManyEntries(names.len()));
    }

    let mut writer = FfaWriter::with_options(BufWriter::new(File::create(&paths.data)?), opts.codec, opts.level);
    let mut summary = PackSummary::default();

    for name in &names {
        let Some(src) = entry_path(input, name) else {
            reporter.report(&Event::UnsafeName { name: name.clone() });
            summary.skipped += 1;
            continue;
        };
        if !src.is_file() {
            reporter.report(&Event::MissingSource { name: name.clone() });
            summary.skipped += 1;
            continue;
        }
        let data = match fs::read(&src) {
            Ok(d) => d,
            Err(e) => {
                reporter.report(&Event::ReadFailed { name: name.clone(), reason: e.to_string() });
                summary.skipped += 1;
                continue;
            }
        };
        match writer.add_file(name, &data, reporter)? {
            Some(_) => summary.packed += 1,
            None    => summary.skipped += 1,
        }
    }

    summary.data_len = writer.data_len();
    let (_, entries) = writer.finish()?;

    let mut idx = BufWriter::new(File::create(&paths.index)?);
    index::write_index(&mut idx, &entries)?;

    Ok(summary)
}
