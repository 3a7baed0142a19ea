use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use stitchgen::prelude::*;

fn bench_color_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("color_distance");

    group.bench_function("rgb_pair", |b| {
        b.iter(|| {
            black_box(color_distance(
                black_box(0xFF),
                black_box(0x00),
                black_box(0x00),
                black_box(0x00),
                black_box(0xFF),
                black_box(0x00),
            ))
        });
    });

    group.finish();
}

fn bench_nearest_in_palette(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest_in_palette");

    for grayscale_only in [false, true] {
        group.throughput(Throughput::Elements(PALETTE.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("nearest", grayscale_only),
            &grayscale_only,
            |b, &grayscale_only| {
                b.iter(|| black_box(nearest(black_box(0x7F), black_box(0x7F), black_box(0x7F), grayscale_only)));
            },
        );
    }

    group.finish();
}

fn bench_hex_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("hex_round_trip");

    group.bench_function("parse_and_format", |b| {
        b.iter(|| {
            for entry in PALETTE.iter() {
                let hex = entry.hex();
                black_box(stitchgen::core::palette::parse_hex(&hex));
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_color_distance,
    bench_nearest_in_palette,
    bench_hex_round_trip,
);

criterion_main!(benches);
