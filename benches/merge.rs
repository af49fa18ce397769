//! Criterion benchmarks for the k-way merge and the merge shuffles.
//!
//! Run with:
//!   cargo bench --bench merge

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use tsmerge::index::IndexRecord;
use tsmerge::synth::{sorted_timestamps, SeriesRng};
use tsmerge::{k_way_merge, merge_shuffle, RowRef};

fn sorted_run(rng: &mut SeriesRng, len: usize, tag: bool) -> Vec<IndexRecord> {
    sorted_timestamps(rng, len, 1_600_000_000_000_000, 2_000)
        .into_iter()
        .enumerate()
        .map(|(i, ts)| {
            let r = if tag {
                RowRef::tagged(i as u64)
            } else {
                RowRef::untagged(i as u64)
            };
            IndexRecord::new(ts as u64, r.raw())
        })
        .collect()
}

fn bench_k_way_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("k_way_merge");

    for &fan_in in &[2usize, 4, 16] {
        let per_run = 262_144 / fan_in;
        let mut rng = SeriesRng::new(fan_in as u64);
        let runs_data: Vec<Vec<IndexRecord>> = (0..fan_in)
            .map(|k| sorted_run(&mut rng, per_run, k == 0))
            .collect();
        let runs: Vec<&[IndexRecord]> = runs_data.iter().map(|r| r.as_slice()).collect();
        let total: usize = runs.iter().map(|r| r.len()).sum();
        let mut dest = vec![IndexRecord::default(); total];

        group.throughput(Throughput::Elements(total as u64));
        group.bench_with_input(BenchmarkId::new("fan_in", fan_in), &runs, |b, runs| {
            b.iter(|| k_way_merge(runs, &mut dest))
        });
    }

    group.finish();
}

fn bench_merge_shuffle(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_shuffle");

    let n = 262_144usize;
    let mut rng = SeriesRng::new(7);
    let src1: Vec<i64> = (0..n as i64).collect();
    let src2: Vec<i64> = (0..n as i64).map(|v| -v).collect();
    let index: Vec<IndexRecord> = (0..n)
        .map(|i| {
            let r = if rng.below(2) == 0 {
                RowRef::tagged(rng.below(n as u64))
            } else {
                RowRef::untagged(rng.below(n as u64))
            };
            IndexRecord::new(i as u64, r.raw())
        })
        .collect();
    let mut dest = vec![0i64; n];

    group.throughput(Throughput::Elements(n as u64));
    group.bench_with_input(BenchmarkId::new("64bit", n), &index, |b, index| {
        b.iter(|| merge_shuffle(&src1, &src2, &mut dest, index))
    });

    group.finish();
}

criterion_group!(benches, bench_k_way_merge, bench_merge_shuffle);
criterion_main!(benches);
