//! Performance benchmarks for route_match using Criterion.rs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use route_match::geometry::{compute_route_metrics, GeoPoint};
use route_match::matching::{MatchingAlgorithm, RouteMatching};
use route_match::test_helpers::{offer, random_pool};

fn bench_route_metrics(c: &mut Criterion) {
    let a = GeoPoint::new(52.40, 13.10);
    let b = GeoPoint::new(52.60, 13.70);
    let point = GeoPoint::new(52.51, 13.38);
    c.bench_function("compute_route_metrics", |bench| {
        bench.iter(|| compute_route_metrics(black_box(a), black_box(b), black_box(point)))
    });
}

fn bench_find_match(c: &mut Criterion) {
    let subject = offer(1, 1, (52.40, 13.10), (52.60, 13.70));
    let algorithm = RouteMatching::default();

    let mut group = c.benchmark_group("find_match");
    for size in [100usize, 1_000, 10_000] {
        let pool = random_pool(42, size, 2, (52.5, 13.4), 0.3);
        group.bench_with_input(BenchmarkId::from_parameter(size), &pool, |bench, pool| {
            bench.iter(|| black_box(algorithm.find_match(&subject, pool, 0)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_route_metrics, bench_find_match);
criterion_main!(benches);
