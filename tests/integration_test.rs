use ffa::archive::{
    list, pack, unpack, ArchivePaths, PackOptions, PackOrder, UnpackOptions, UnpackSummary,
};
use ffa::codec::{Codec, CodecId, LzssCodec};
use ffa::entry::{Entry, RECORD_SIZE};
use ffa::frame::FrameHeader;
use ffa::index::write_index;
use ffa::ledger::OrderLedger;
use ffa::report::{Event, EventLog};
use ffa::FfaError;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_archive(data_path: &Path, blob: &[u8], entries: &[Entry]) {
    fs::write(data_path, blob).unwrap();
    let mut idx = Vec::new();
    write_index(&mut idx, entries).unwrap();
    fs::write(ArchivePaths::new(data_path).index, idx).unwrap();
}

fn framed(raw: &[u8]) -> Vec<u8> {
    let packed = LzssCodec.compress(raw, 0).unwrap();
    let mut out = Vec::new();
    FrameHeader { packed_size: packed.len() as i32, unpacked_size: raw.len() as i32 }
        .write(&mut out)
        .unwrap();
    out.extend_from_slice(&packed);
    out
}

#[test]
fn test_two_record_archive_unpacks_and_repacks_identically() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("game.dat");

    let b_raw = b"aaaaaaaaaa";
    let b_stored = framed(b_raw);
    let mut blob = b"hello".to_vec();
    blob.extend_from_slice(&b_stored);
    let entries = vec![
        Entry::new("a.txt", 0, 5, 0),
        Entry::new("b.so4", 5, b_stored.len() as u32, 1),
    ];
    write_archive(&archive, &blob, &entries);
    let original_index = fs::read(dir.path().join("game.lst")).unwrap();
    assert_eq!(original_index.len(), 2 * RECORD_SIZE);

    let out = dir.path().join("game");
    let log = EventLog::new();
    let summary = unpack(&archive, &out, &UnpackOptions::default(), &log).unwrap();
    assert_eq!((summary.records, summary.extracted, summary.skipped), (2, 2, 0));
    assert_eq!(fs::read(out.join("a.txt")).unwrap(), b"hello");
    assert_eq!(fs::read(out.join("b.so4")).unwrap(), b_raw);
    assert!(log.events().contains(&Event::Decompressed { name: "b.so4".into() }));
    assert!(log.warnings().is_empty());

    let ledger = OrderLedger::load(&dir.path().join("game.order.json")).unwrap();
    assert_eq!(ledger.names, ["a.txt", "b.so4"]);

    let summary = pack(&out, &archive, &PackOptions::default(), &log).unwrap();
    assert_eq!(summary.packed, 2);
    assert_eq!(summary.data_len, blob.len() as u64);
    assert_eq!(fs::read(&archive).unwrap(), blob);
    assert_eq!(fs::read(dir.path().join("game.lst")).unwrap(), original_index);
}

#[test]
fn test_scan_pack_unpack_roundtrip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("assets");
    fs::create_dir_all(input.join("sub")).unwrap();

    let files: Vec<(&str, Vec<u8>)> = vec![
        ("readme.txt", b"plain text".to_vec()),
        ("m.so4", b"model model model model model".repeat(20)),
        ("sub/x.SO5", (0u8..=255).collect()),
        ("empty.so4", Vec::new()),
        ("one.so5", vec![7]),
        ("blank.bin", Vec::new()),
    ];
    for (name, data) in &files {
        fs::write(input.join(name), data).unwrap();
    }

    let archive = dir.path().join("assets.dat");
    let opts = PackOptions { order: PackOrder::Scan, ..Default::default() };
    let log = EventLog::new();
    let packed = pack(&input, &archive, &opts, &log).unwrap();
    assert_eq!(packed.packed, files.len());
    assert!(log.warnings().is_empty());

    let out = dir.path().join("out");
    let summary = unpack(&archive, &out, &UnpackOptions::default(), &log).unwrap();
    assert_eq!(summary.extracted, files.len());
    for (name, data) in &files {
        assert_eq!(&fs::read(out.join(name)).unwrap(), data, "{name}");
    }

    // Scan order is lexicographic on relative paths.
    let ledger = OrderLedger::load(&ArchivePaths::new(&archive).ledger).unwrap();
    let mut sorted: Vec<String> = files.iter().map(|(n, _)| n.to_string()).collect();
    sorted.sort();
    assert_eq!(ledger.names, sorted);
}

#[test]
fn test_misplaced_entry_is_skipped_but_kept_in_ledger() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("bad.dat");
    write_archive(&archive, b"0123456789", &[
        Entry::new("ok.txt", 0, 4, 0),
        Entry::new("past_end.txt", 8, 5, 1),
        Entry::new("tail.txt", 4, 6, 2),
    ]);

    let out = dir.path().join("bad");
    let log = EventLog::new();
    let summary = unpack(&archive, &out, &UnpackOptions::default(), &log).unwrap();
    assert_eq!((summary.records, summary.extracted, summary.skipped), (3, 2, 1));
    assert!(!out.join("past_end.txt").exists());
    assert_eq!(fs::read(out.join("tail.txt")).unwrap(), b"456789");
    assert!(matches!(&log.warnings()[..], [Event::InvalidPlacement { name, .. }] if name == "past_end.txt"));

    let ledger = OrderLedger::load(&dir.path().join("bad.order.json")).unwrap();
    assert_eq!(ledger.names, ["ok.txt", "past_end.txt", "tail.txt"]);

    // Repacking reports the missing file and keeps the rest in ledger order.
    let log = EventLog::new();
    let summary = pack(&out, &archive, &PackOptions::default(), &log).unwrap();
    assert_eq!((summary.packed, summary.skipped), (2, 1));
    assert!(log.warnings().contains(&Event::MissingSource { name: "past_end.txt".into() }));
    let rows = list(&archive, &UnpackOptions::default()).unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.entry.name.as_str()).collect();
    assert_eq!(names, ["ok.txt", "tail.txt"]);
    assert_eq!(rows[1].entry.offset, 4);
}

#[test]
fn test_bad_frame_header_extracts_raw_bytes() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("f.dat");
    let mut stored = Vec::new();
    FrameHeader { packed_size: 3, unpacked_size: 10 }.write(&mut stored).unwrap();
    stored.extend_from_slice(b"abcd");
    write_archive(&archive, &stored, &[Entry::new("c.so4", 0, stored.len() as u32, 0)]);

    let out = dir.path().join("f");
    let log = EventLog::new();
    unpack(&archive, &out, &UnpackOptions::default(), &log).unwrap();
    assert_eq!(fs::read(out.join("c.so4")).unwrap(), stored);
    assert!(!log.events().iter().any(|e| matches!(e, Event::Decompressed { .. })));
}

#[test]
fn test_decoder_fault_skips_entry() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("z.dat");
    let mut stored = Vec::new();
    FrameHeader { packed_size: 8, unpacked_size: 8 }.write(&mut stored).unwrap();
    stored.extend_from_slice(b"notzstd!");
    let mut blob = stored.clone();
    blob.extend_from_slice(b"raw");
    write_archive(&archive, &blob, &[
        Entry::new("broken.so5", 0, 16, 0),
        Entry::new("after.txt", 16, 3, 1),
    ]);

    let out = dir.path().join("z");
    let log = EventLog::new();
    let summary = unpack(&archive, &out, &UnpackOptions { codec: CodecId::Zstd }, &log).unwrap();
    assert_eq!((summary.extracted, summary.skipped), (1, 1));
    assert!(!out.join("broken.so5").exists());
    assert_eq!(fs::read(out.join("after.txt")).unwrap(), b"raw");
    assert!(matches!(&log.warnings()[..], [Event::DecompressFailed { name, .. }] if name == "broken.so5"));
}

#[test]
fn test_write_fault_skips_entry_and_continues() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("w.dat");
    write_archive(&archive, b"abcdef", &[
        Entry::new("d", 0, 3, 0),
        Entry::new("e.txt", 3, 3, 1),
    ]);

    let out = dir.path().join("w");
    fs::create_dir_all(out.join("d")).unwrap();
    let log = EventLog::new();
    let summary = unpack(&archive, &out, &UnpackOptions::default(), &log).unwrap();

    assert_eq!(summary, UnpackSummary { records: 2, extracted: 1, skipped: 1 });
    assert!(out.join("d").is_dir());
    assert_eq!(fs::read(out.join("e.txt")).unwrap(), b"def");
    assert!(matches!(&log.warnings()[..], [Event::WriteFailed { name, .. }] if name == "d"));
}

#[test]
fn test_escaping_name_is_not_written() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("a").join("e.dat");
    fs::create_dir_all(archive.parent().unwrap()).unwrap();
    write_archive(&archive, b"evil", &[Entry::new("../evil.txt", 0, 4, 0)]);

    let out = dir.path().join("a").join("out");
    let log = EventLog::new();
    let summary = unpack(&archive, &out, &UnpackOptions::default(), &log).unwrap();
    assert_eq!(summary.extracted, 0);
    assert!(!dir.path().join("a").join("evil.txt").exists());
    assert!(log.warnings().contains(&Event::UnsafeName { name: "../evil.txt".into() }));
}

#[test]
fn test_structural_errors_abort_unpack() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("s.dat");
    fs::write(&archive, b"data").unwrap();
    let out = dir.path().join("s");
    let log = EventLog::new();

    assert!(matches!(
        unpack(&archive, &out, &UnpackOptions::default(), &log),
        Err(FfaError::MissingIndex(_))
    ));

    fs::write(dir.path().join("s.lst"), vec![0u8; RECORD_SIZE + 1]).unwrap();
    assert!(matches!(
        unpack(&archive, &out, &UnpackOptions::default(), &log),
        Err(FfaError::InsaneRecordCount { len: 23 })
    ));

    fs::write(dir.path().join("s.lst"), vec![0u8; RECORD_SIZE * 65536]).unwrap();
    assert!(matches!(
        unpack(&archive, &out, &UnpackOptions::default(), &log),
        Err(FfaError::InsaneRecordCount { .. })
    ));
    assert!(!out.exists());
    assert!(!dir.path().join("s.order.json").exists());
}

#[test]
fn test_structural_errors_abort_pack() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in");
    let archive = dir.path().join("p.dat");
    let log = EventLog::new();

    assert!(matches!(
        pack(&input, &archive, &PackOptions::default(), &log),
        Err(FfaError::MissingInputDir(_))
    ));

    fs::create_dir_all(&input).unwrap();
    assert!(matches!(
        pack(&input, &archive, &PackOptions::default(), &log),
        Err(FfaError::MissingLedger(_))
    ));

    let scan = PackOptions { order: PackOrder::Scan, ..Default::default() };
    assert!(matches!(pack(&input, &archive, &scan, &log), Err(FfaError::NoInputFiles(_))));

    let ledger_path = dir.path().join("p.order.json");
    OrderLedger { archive: "p.dat".into(), captured: 0, names: Vec::new() }
        .persist(&ledger_path)
        .unwrap();
    assert!(matches!(
        pack(&input, &archive, &PackOptions::default(), &log),
        Err(FfaError::EmptyLedger(_))
    ));

    let names = (0..65536).map(|i| format!("f{i}")).collect();
    OrderLedger { archive: "p.dat".into(), captured: 0, names }
        .persist(&ledger_path)
        .unwrap();
    assert!(matches!(
        pack(&input, &archive, &PackOptions::default(), &log),
        Err(FfaError::TooManyEntries(65536))
    ));
    assert!(!archive.exists());
}

#[test]
fn test_list_reports_frames_and_placement() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("l.dat");
    let stored = framed(b"listing listing listing");
    let mut blob = stored.clone();
    blob.extend_from_slice(b"xyz");
    write_archive(&archive, &blob, &[
        Entry::new("a.so4", 0, stored.len() as u32, 0),
        Entry::new("b.txt", stored.len() as u32, 3, 1),
        Entry::new("c.txt", 0, 1000, 2),
    ]);

    let rows = list(&archive, &UnpackOptions::default()).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].frame.map(|h| h.unpacked_size), Some(23));
    assert!(rows[1].placed && rows[1].frame.is_none());
    assert!(!rows[2].placed);
}
