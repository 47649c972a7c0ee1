//! Benchmarks for the CICS line parser.

use cics_listener::message::MessageKind;
use cics_listener::parser::{classify, parse_line};
use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

/// Sample console lines for benchmarking.
const SAMPLE_LINES: &[&str] = &[
    "FREQ: 7044.0 RX/TX\r\n",
    "CHAN: 'Ham CODAN 003'\r\n",
    "SCAN: OFF\r\n",
    "SIDEBAND: USB\r\n",
    "CALL: 1234\r\n",
    "LINK: ESTABLISHED\r\n",
    "GPS-POSITION:   'Ham CODAN 005',   1542,   1882, 17/08 14:45, 2753.0015, S, 14023.6726, E, 051521\r\n",
];

fn bench_parse_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_line");

    // Benchmark single line parsing
    group.throughput(Throughput::Elements(1));
    group.bench_function("status", |b| b.iter(|| parse_line(black_box(SAMPLE_LINES[0]))));
    group.bench_function("gps", |b| b.iter(|| parse_line(black_box(SAMPLE_LINES[6]))));

    // Benchmark batch parsing
    group.throughput(Throughput::Elements(SAMPLE_LINES.len() as u64));
    group.bench_function("batch", |b| {
        b.iter(|| {
            for line in SAMPLE_LINES {
                let _ = parse_line(black_box(line));
            }
        })
    });

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    let recognized = SAMPLE_LINES[0];
    let unrecognized = "BATTERY CHARGER CONNECTED\r\n";

    group.bench_function("recognized", |b| b.iter(|| classify(black_box(recognized))));
    group.bench_function("unrecognized", |b| {
        b.iter(|| classify(black_box(unrecognized)))
    });

    group.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pipeline");

    // Mix of data lines, prompts and noise
    let mixed_lines: Vec<&str> = vec![
        "FREQ: 7044.0 RX/TX\r\n",
        "> \r\n",
        "GPS-POSITION:   'Ham CODAN 005',   1542,   1882, 17/08 14:45, 2753.0015, S, 14023.6726, E, 051521\r\n",
        "",
        "SCAN: OFF\r\n",
        "BATTERY CHARGER CONNECTED\r\n",
    ];

    group.throughput(Throughput::Elements(mixed_lines.len() as u64));
    group.bench_function("mixed_input", |b| {
        b.iter(|| {
            for line in &mixed_lines {
                if classify(line) != MessageKind::Unrecognized {
                    let _ = parse_line(black_box(line));
                }
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_parse_line, bench_classify, bench_full_pipeline);
criterion_main!(benches);
