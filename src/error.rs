use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Structural failures.  Any of these aborts the whole pack or unpack run;
/// per-entry problems are reported through [`crate::report::Reporter`] instead.
#[derive(Error, Debug)]
pub enum FfaError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Associated list file not found: {}", .0.display())]
    MissingIndex(PathBuf),
    #[error("Input folder not found: {}", .0.display())]
    MissingInputDir(PathBuf),
    #[error("Order ledger not found: {} (unpack the original archive first, or pack with --scan)", .0.display())]
    MissingLedger(PathBuf),
    #[error("Order ledger is empty: {}", .0.display())]
    EmptyLedger(PathBuf),
    #[error("Order ledger is malformed: {0}")]
    Ledger(#[from] serde_json::Error),
    #[error("File count is not sane: index is {len} bytes")]
    InsaneRecordCount { len: u64 },
    #[error("Too many files: {0} (maximum is 65535)")]
    TooManyEntries(usize),
    #[error("No files found in input folder: {}", .0.display())]
    NoInputFiles(PathBuf),
    #[error("Data blob would exceed 4 GiB at entry {0}")]
    ArchiveTooLarge(String),
}

pub type Result<T> = std::result::Result<T, FfaError>;
