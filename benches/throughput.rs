//! Generator and comparator throughput.
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use keystream_csprng::{differs, SystemGenerator};
use std::hint::black_box;

fn generator_benches(c: &mut Criterion) {
    let generator = SystemGenerator::from_os_entropy();
    let mut group = c.benchmark_group("generator");

    for &len in &[16usize, 256, 4096, 65_536] {
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::new("fill", len), &len, |b, &len| {
            let mut buf = vec![0u8; len];
            b.iter(|| {
                generator.fill(black_box(&mut buf));
            });
        });
    }

    group.throughput(Throughput::Bytes(8));
    group.bench_function("next_word", |b| {
        b.iter(|| black_box(generator.next_word()));
    });

    group.finish();
}

fn compare_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("differs");

    for &len in &[16usize, 64, 1024] {
        let a = vec![0x5Au8; len];
        let b = a.clone();
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |bench, &len| {
            bench.iter(|| differs(black_box(&a), black_box(&b), len));
        });
    }

    group.finish();
}

criterion_group!(benches, generator_benches, compare_benches);
criterion_main!(benches);
