//! Order ledger: the original record sequence of an archive.
//!
//! Written next to the data blob on unpack (`<base>.order.json`) and read
//! back on pack so the rebuilt blob has the same physical layout.  Every
//! record's name is kept, including records whose placement was invalid.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::entry::Entry;
use crate::error::{FfaError, Result};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OrderLedger {
    /// File name of the data blob this order was captured from.
    #[serde(default)]
    pub archive:  String,
    /// Unix timestamp of capture.
    #[serde(default)]
    pub captured: i64,
    pub names:    Vec<String>,
}

impl OrderLedger {
    /// Record every entry's name in index order.
    pub fn capture(archive: &str, entries: &[Entry]) -> Self {
        let mut ordered: Vec<&Entry> = entries.iter().collect();
        ordered.sort_by_key(|e| e.order);
        Self {
            archive:  archive.to_owned(),
            captured: Utc::now().timestamp(),
            names:    ordered.into_iter().map(|e| e.name.clone()).collect(),
        }
    }

    pub fn len(&self) -> usize { self.names.len() }

    pub fn is_empty(&self) -> bool { self.names.is_empty() }

    pub fn to_bytes(&self) -> std::result::Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn persist(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Load a ledger for packing.  A missing file or an empty name list is a
    /// hard error: packing has no other source of order.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(FfaError::MissingLedger(path.to_owned()));
        }
        let ledger = Self::from_bytes(&fs::read(path)?)?;
        if ledger.is_empty() {
            return Err(FfaError::EmptyLedger(path.to_owned()));
        }
        Ok(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn capture_keeps_index_order() {
        let entries = vec![
            Entry::new("b.so4", 5, 12, 1),
            Entry::new("a.txt", 0, 5, 0),
            Entry::new("bad.bin", 999, 1, 2),
        ];
        let ledger = OrderLedger::capture("x.dat", &entries);
        assert_eq!(ledger.names, ["a.txt", "b.so4", "bad.bin"]);
        assert_eq!(ledger.archive, "x.dat");
    }

    #[test]
    fn persist_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.order.json");
        let ledger = OrderLedger {
            archive:  "x.dat".into(),
            captured: 0,
            names:    vec!["one".into(), "two".into(), "one".into()],
        };
        ledger.persist(&path).unwrap();
        assert_eq!(OrderLedger::load(&path).unwrap(), ledger);
    }

    #[test]
    fn missing_and_empty_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.order.json");
        assert!(matches!(OrderLedger::load(&path), Err(FfaError::MissingLedger(_))));

        fs::write(&path, br#"{"names": []}"#).unwrap();
        assert!(matches!(OrderLedger::load(&path), Err(FfaError::EmptyLedger(_))));

        fs::write(&path, b"not json").unwrap();
        assert!(matches!(OrderLedger::load(&path), Err(FfaError::Ledger(_))));
    }
}
