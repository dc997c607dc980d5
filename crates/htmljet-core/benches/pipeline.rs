//! Benchmarks for the htmljet deduplication pipeline.
//!
//! Run with: cargo bench -p htmljet-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use htmljet_core::pipeline::{dissimilarity, extract::content_hash};
use htmljet_core::{ClusterAssigner, Fingerprint, FingerprintHasher, ImageRecord, SimilarityThreshold};
use image::{DynamicImage, RgbImage};
use std::path::PathBuf;

/// A page-sized screenshot with some structure to average over.
fn screenshot(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 251) as u8, (y % 241) as u8, ((x ^ y) % 256) as u8])
    }))
}

/// Deterministic pseudo-random fingerprints (xorshift).
fn records(n: usize) -> Vec<ImageRecord> {
    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    (0..n)
        .map(|i| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let name = format!("element_{i}.png");
            ImageRecord {
                path: PathBuf::from(&name),
                file_name: name,
                fingerprint: Fingerprint::from_u64(state),
                byte_size: state % 100_000,
                content_hash: String::new(),
                width: 0,
                height: 0,
            }
        })
        .collect()
}

fn benchmark_content_hash(c: &mut Criterion) {
    let data = vec![0xa5u8; 512 * 1024];

    c.bench_function("content_hash_blake3_512k", |b| {
        b.iter(|| content_hash(black_box(&data)))
    });
}

fn benchmark_fingerprint(c: &mut Criterion) {
    let img = screenshot(1280, 720);
    let hasher = FingerprintHasher::default();

    c.bench_function("fingerprint_1280x720", |b| {
        b.iter(|| hasher.fingerprint(black_box(&img)))
    });
}

fn benchmark_dissimilarity(c: &mut Criterion) {
    let a = Fingerprint::from_u64(0x0123_4567_89ab_cdef);
    let b = Fingerprint::from_u64(0xfedc_ba98_7654_3210);

    c.bench_function("dissimilarity_64bit", |bench| {
        bench.iter(|| dissimilarity(black_box(&a), black_box(&b)))
    });
}

fn benchmark_cluster(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster_assign");
    let threshold = SimilarityThreshold::new(0.8).unwrap();

    for n in [100, 1000] {
        let input = records(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| ClusterAssigner::assign(threshold, black_box(input.clone())))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_content_hash,
    benchmark_fingerprint,
    benchmark_dissimilarity,
    benchmark_cluster,
);
criterion_main!(benches);
