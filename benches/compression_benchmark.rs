use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use prismpack::storage::*;
use prismpack::{MemoryPool, PositionList};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;
use std::sync::Arc;

const ROWS: usize = 1_000_000;

fn narrow_column() -> Vec<u32> {
    (0..ROWS as u32).map(|i| i % 4).collect()
}

fn compressors() -> Vec<(&'static str, Box<dyn VectorCompressor>)> {
    vec![
        ("bitpacking", Box::new(BitpackingCompressor::new())),
        (
            "frame_of_reference",
            Box::new(BlockCompressor::new(Arc::new(FrameOfReferenceCodec::new()), 256).unwrap()),
        ),
        (
            "varbyte",
            Box::new(BlockCompressor::new(Arc::new(VarByteCodec::new()), 256).unwrap()),
        ),
    ]
}

fn bench_encode(c: &mut Criterion) {
    let values = narrow_column();
    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Elements(ROWS as u64));

    for (name, compressor) in compressors() {
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                let pool = MemoryPool::default();
                black_box(compressor.compress(black_box(&values), &pool).unwrap())
            })
        });
    }
    group.finish();
}

fn bench_sequential_scan(c: &mut Criterion) {
    let values = narrow_column();
    let pool = MemoryPool::default();
    let mut group = c.benchmark_group("sequential_scan");
    group.throughput(Throughput::Elements(ROWS as u64));

    for (name, compressor) in compressors() {
        let vector = compressor.compress(&values, &pool).unwrap();
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| black_box(vector.decode_all()))
        });
    }
    group.finish();
}

fn bench_point_access(c: &mut Criterion) {
    let values = narrow_column();
    let pool = MemoryPool::default();
    let mut rng = StdRng::seed_from_u64(17);
    let positions: PositionList = (0..10_000).map(|_| rng.random_range(0..ROWS)).collect();

    let mut group = c.benchmark_group("point_access");
    group.throughput(Throughput::Elements(positions.len() as u64));

    for encoding in [
        EncodingType::Bitpacking,
        EncodingType::FrameOfReference,
        EncodingType::VarByte,
    ] {
        let segment = SegmentEncoder::new(encoding)
            .encode_values(&values, None, &pool)
            .unwrap();
        group.bench_function(BenchmarkId::from_parameter(encoding), |b| {
            b.iter(|| {
                let sum: u64 = segment
                    .iterable()
                    .point_access(&positions)
                    .unwrap()
                    .filter_map(|p| p.value)
                    .map(u64::from)
                    .sum();
                black_box(sum)
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_encode,
    bench_sequential_scan,
    bench_point_access
);
criterion_main!(benches);
