use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use futures_lite::future::{block_on, yield_now};
use sequence_concurrency::prelude::*;

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_map");
    for limit in [1, 8, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(limit), &limit, |b, &limit| {
            b.iter(|| parallel_map_test(black_box(1000), limit))
        });
    }
    group.bench_function("async_map", |b| b.iter(|| async_map_test(black_box(1000))));
    group.finish();

    c.bench_function("parallel_filter 1000", |b| {
        b.iter(|| parallel_filter_test(black_box(1000)))
    });
    c.bench_function("parallel_map unordered 1000", |b| {
        b.iter(|| parallel_map_unordered_test(black_box(1000)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

/// A unit of work which needs to be polled `n % 4 + 1` times to complete.
async fn work(n: usize) -> usize {
    for _ in 0..n % 4 {
        yield_now().await;
    }
    n
}

fn parallel_map_test(max: usize, limit: usize) {
    block_on(async {
        let out = (0..max).parallel_map(work).limit(limit).await;
        assert_eq!(out.len(), max);
    })
}

fn parallel_map_unordered_test(max: usize) {
    block_on(async {
        let out = (0..max)
            .parallel_map(work)
            .limit(16)
            .preserve_order(false)
            .await;
        assert_eq!(out.len(), max);
    })
}

fn parallel_filter_test(max: usize) {
    block_on(async {
        let out = (0..max)
            .parallel_filter(|n| {
                let n = *n;
                async move { work(n).await % 2 == 0 }
            })
            .limit(16)
            .await;
        assert_eq!(out.len(), max / 2);
    })
}

fn async_map_test(max: usize) {
    block_on(async {
        let out = (0..max).async_map(work).await;
        assert_eq!(out.len(), max);
    })
}
