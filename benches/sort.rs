//! Criterion benchmarks for the timestamp-index sort kernels.
//!
//! Run with:
//!   cargo bench --bench sort
//!
//! Sizes straddle the quicksort/radix dispatch threshold so both paths show
//! up in the report.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};

use tsmerge::sort::{quick_sort, radix_sort};
use tsmerge::synth::{random_index, SeriesRng};
use tsmerge::{sort_timestamp_index, QUICKSORT_MAX};

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_timestamp_index");

    for &n in &[QUICKSORT_MAX - 1, 10_000usize, 1_000_000] {
        let mut rng = SeriesRng::new(0xbeef);
        let input = random_index(&mut rng, n, u64::MAX / 2);

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("dispatch", n), &input, |b, input| {
            b.iter_batched(
                || input.clone(),
                |mut index| {
                    sort_timestamp_index(&mut index);
                    index
                },
                BatchSize::LargeInput,
            )
        });
    }

    // Direct kernel comparison at a size both can handle.
    let mut rng = SeriesRng::new(0xfeed);
    let input = random_index(&mut rng, 4096, u64::MAX / 2);
    group.throughput(Throughput::Elements(4096));
    group.bench_with_input(BenchmarkId::new("quick", 4096), &input, |b, input| {
        b.iter_batched(
            || input.clone(),
            |mut index| {
                quick_sort(&mut index);
                index
            },
            BatchSize::LargeInput,
        )
    });
    group.bench_with_input(BenchmarkId::new("radix", 4096), &input, |b, input| {
        b.iter_batched(
            || input.clone(),
            |mut index| {
                radix_sort(&mut index);
                index
            },
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_sort);
criterion_main!(benches);
