use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ffa::codec::{get_codec, CodecId};
use ffa::frame::{frame, unframe};
use ffa::io_stream::FfaWriter;
use ffa::report::NullReporter;
use std::io::Cursor;

fn bench_frame(c: &mut Criterion) {
    let data = b"mesh vertex data ".repeat(64 * 1024 / 17);
    let lzss = get_codec(CodecId::Lzss);
    let stored = frame(&data, lzss.as_ref(), 0).unwrap();

    c.bench_function("lzss_frame_64k", |b| b.iter(|| frame(black_box(&data), lzss.as_ref(), 0)));
    c.bench_function("lzss_unframe_64k", |b| {
        b.iter(|| unframe("bench.so4", black_box(&stored), lzss.as_ref()))
    });
}

fn bench_pack(c: &mut Criterion) {
    let raw = vec![42u8; 256 * 1024];

    c.bench_function("pack_16_files_mixed", |b| {
        b.iter(|| {
            let mut writer = FfaWriter::new(Cursor::new(Vec::new()));
            for i in 0..16 {
                let name = if i % 2 == 0 { format!("f{i}.so4") } else { format!("f{i}.bin") };
                writer.add_file(&name, black_box(&raw), &NullReporter).unwrap();
            }
            writer.finish().unwrap();
        })
    });
}

criterion_group!(benches, bench_frame, bench_pack);
criterion_main!(benches);
