//! Advisory events emitted while packing and unpacking.
//!
//! Nothing here is part of the data contract.  Pipelines take a
//! `&dyn Reporter`; the CLI uses [`TracingReporter`], tests use [`EventLog`].

use std::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A compressed frame was decoded.
    Decompressed { name: String },
    /// A source file was framed with the codec.
    Compressed { name: String, original: usize, packed: usize },
    /// An entry was written to the output directory.
    Extracted { name: String, size: usize },
    /// An entry was appended to the data blob.
    Packed { name: String, offset: u32, size: u32 },
    InvalidPlacement { name: String, offset: u32, size: u32 },
    UnsafeName { name: String },
    DecompressFailed { name: String, reason: String },
    CompressFailed { name: String, reason: String },
    ReadFailed { name: String, reason: String },
    WriteFailed { name: String, reason: String },
    MissingSource { name: String },
    NameTruncated { name: String, stored: String },
    SizeMismatch { name: String, expected: usize, actual: usize },
}

impl Event {
    /// True for events that mean an entry was skipped or degraded.
    pub fn is_warning(&self) -> bool {
        !matches!(
            self,
            Event::Decompressed { .. }
                | Event::Compressed { .. }
                | Event::Extracted { .. }
                | Event::Packed { .. }
        )
    }
}

pub trait Reporter {
    fn report(&self, event: &Event);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: &Event) {
        match event {
            Event::Decompressed { name } => info!(%name, "decompressed"),
            Event::Compressed { name, original, packed } => {
                info!(%name, original, packed, "compressed")
            }
            Event::Extracted { name, size } => debug!(%name, size, "extracted"),
            Event::Packed { name, offset, size } => debug!(%name, offset, size, "packed"),
            Event::InvalidPlacement { name, offset, size } => {
                warn!(%name, offset, size, "invalid entry placement")
            }
            Event::UnsafeName { name } => warn!(%name, "entry name escapes output folder"),
            Event::DecompressFailed { name, reason } => {
                warn!(%name, %reason, "failed to decompress")
            }
            Event::CompressFailed { name, reason } => warn!(%name, %reason, "failed to compress"),
            Event::ReadFailed { name, reason } => warn!(%name, %reason, "failed to read"),
            Event::WriteFailed { name, reason } => warn!(%name, %reason, "failed to write"),
            Event::MissingSource { name } => warn!(%name, "listed in ledger but missing from input"),
            Event::NameTruncated { name, stored } => {
                warn!(%name, %stored, "filename too long, truncating")
            }
            Event::SizeMismatch { name, expected, actual } => {
                warn!(%name, expected, actual, "decoded size differs from frame header")
            }
        }
    }
}

/// In-memory sink.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<Event>>,
}

impl EventLog {
    pub fn new() -> Self { Self::default() }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn warnings(&self) -> Vec<Event> {
        self.events().into_iter().filter(Event::is_warning).collect()
    }
}

impl Reporter for EventLog {
    fn report(&self, event: &Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _: &Event) {}
}
