//! Бенчмарки горячих путей: кодек заголовка и циклическая отдача записи.
//!
//! Запуск: cargo bench -p adq-benchmark

use std::{hint::black_box, io::Write, time::Duration};

use adq_core::{
    batch_len, parse_batch, BatchHeaderExt, BLOCK_SIZE, MAX_BATCH_BLOCKS, SAMPLE_INTERVAL_NS,
};
use adq_replay::{RecordingPlayer, ReplayConfig};
use adq_types::BatchHeader;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tempfile::NamedTempFile;

fn recording_file(num_blocks: usize) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().unwrap();
    let mut block = [0u8; BLOCK_SIZE];

    for i in 0..num_blocks {
        block.fill(i as u8);
        tmp.write_all(&block).unwrap();
    }

    tmp.flush().unwrap();
    tmp
}

fn nominal_timestamps(num_blocks: usize) -> Vec<u64> {
    (0..num_blocks as u64).map(|i| i * SAMPLE_INTERVAL_NS).collect()
}

fn bench_header_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("header_codec");
    group.throughput(Throughput::Bytes(BLOCK_SIZE as u64));

    for &n in &[8usize, MAX_BATCH_BLOCKS] {
        let header = BatchHeader::new(nominal_timestamps(n));
        let mut block = vec![0u8; BLOCK_SIZE];

        group.bench_with_input(BenchmarkId::new("write", n), &n, |b, _| {
            b.iter(|| header.write_to(black_box(&mut block)).unwrap());
        });

        header.write_to(&mut block).unwrap();
        group.bench_with_input(BenchmarkId::new("read", n), &n, |b, _| {
            b.iter(|| BatchHeader::read_from(black_box(&block)).unwrap());
        });
    }

    group.finish();
}

fn bench_batch_parse(c: &mut Criterion) {
    let n = MAX_BATCH_BLOCKS;
    let mut batch = vec![0u8; batch_len(n)];
    BatchHeader::new(nominal_timestamps(n))
        .write_to(&mut batch[..BLOCK_SIZE])
        .unwrap();

    let mut group = c.benchmark_group("batch_parse");
    group.throughput(Throughput::Bytes(batch_len(n) as u64));
    group.bench_function("max_batch", |b| {
        b.iter(|| parse_batch(black_box(&batch)).unwrap());
    });
    group.finish();
}

fn bench_replay_serve(c: &mut Criterion) {
    let tmp = recording_file(512);
    let mut player = RecordingPlayer::new(ReplayConfig {
        recording: tmp.path().to_path_buf(),
        pacing: Duration::ZERO,
        ..ReplayConfig::default()
    });

    let num_blocks = 32usize;
    let mut batch = vec![0u8; batch_len(num_blocks)];

    let mut group = c.benchmark_group("replay_serve");
    group.throughput(Throughput::Bytes(batch_len(num_blocks) as u64));
    group.bench_function("cyclic_32_blocks", |b| {
        b.iter(|| {
            player
                .read_from(tmp.path(), black_box(&mut batch), num_blocks)
                .unwrap()
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_header_codec,
    bench_batch_parse,
    bench_replay_serve
);
criterion_main!(benches);
