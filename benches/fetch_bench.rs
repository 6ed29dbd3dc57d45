use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use flate2::Compression;
use flate2::write::GzEncoder;
use shardset::fetch::{FetchStrategy, fetch_all};
use shardset::sparse_index::SparseIndex;
use std::fs::{self, File};
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::PathBuf;

fn write_shards(dir: &std::path::Path, count: usize) -> Vec<PathBuf> {
    fs::create_dir_all(dir).unwrap();
    let payload = format!("{{\"rooms\": [{}]}}", vec!["{\"w\": 1.5, \"h\": 2.0}"; 200].join(","));
    (0..count)
        .filter(|i| i % 50 != 7)
        .map(|i| {
            let path = dir.join(format!("{}.json.gz", i));
            let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
            enc.write_all(payload.as_bytes()).unwrap();
            enc.finish().unwrap();
            path
        })
        .collect()
}

fn bench_fetch(c: &mut Criterion) {
    let temp_dir = tempfile::tempdir().unwrap();
    let paths = write_shards(&temp_dir.path().join("train"), 500);
    let dense = SparseIndex::from_paths(paths).unwrap().densify(None).unwrap();

    let mut group = c.benchmark_group("fetch_500_shards");
    group.bench_function("sequential", |b| {
        b.iter(|| fetch_all(black_box(dense.slots()), FetchStrategy::Sequential, false).unwrap())
    });
    for workers in [2usize, 4, 8] {
        let strategy = FetchStrategy::Pool(NonZeroUsize::new(workers).unwrap());
        group.bench_with_input(BenchmarkId::new("pool", workers), &strategy, |b, &strategy| {
            b.iter(|| fetch_all(black_box(dense.slots()), strategy, false).unwrap())
        });
    }
    group.finish();
}

fn bench_densify(c: &mut Criterion) {
    let paths: Vec<PathBuf> = (0..100_000)
        .filter(|i| i % 13 != 0)
        .map(|i| PathBuf::from(format!("/data/train/{}.json.gz", i)))
        .collect();
    let index = SparseIndex::from_paths(paths).unwrap();

    c.bench_function("densify_100k", |b| b.iter(|| black_box(&index).densify(None).unwrap()));
}

criterion_group!(benches, bench_fetch, bench_densify);
criterion_main!(benches);
