//! Benchmarks for record framing and command parsing.

use bytes::BytesMut;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tokio_util::codec::Decoder;

use natter_proto::{Command, LineCodec};

/// Short chat message
const SHORT_MESSAGE: &str = "MSG:hello there\n";

/// Message near the body limit
fn long_message() -> String {
    format!("MSG:{}\n", "x".repeat(1000))
}

fn benchmark_line_decoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("Line Decoding");

    // A batch of 100 framed records in one buffer
    let batch: String = (0..100).map(|i| format!("MSG:message number {}\n", i)).collect();
    group.throughput(Throughput::Bytes(batch.len() as u64));

    group.bench_function("decode_100_records", |b| {
        b.iter(|| {
            let mut codec = LineCodec::new();
            let mut buf = BytesMut::from(batch.as_str());
            let mut count = 0;
            while let Ok(Some(record)) = codec.decode(&mut buf) {
                black_box(record);
                count += 1;
            }
            black_box(count)
        })
    });

    group.finish();
}

fn benchmark_command_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Command Parsing");
    let long = long_message();

    group.bench_function("short_msg", |b| {
        b.iter(|| black_box(Command::parse(black_box(SHORT_MESSAGE.trim_end()))))
    });

    group.bench_function("long_msg", |b| {
        b.iter(|| black_box(Command::parse(black_box(long.trim_end()))))
    });

    group.bench_function("quit", |b| {
        b.iter(|| black_box(Command::parse(black_box("QUIT"))))
    });

    group.bench_function("unknown", |b| {
        b.iter(|| black_box(Command::parse(black_box("HELO:world"))))
    });

    group.finish();
}

criterion_group!(benches, benchmark_line_decoding, benchmark_command_parsing);
criterion_main!(benches);
