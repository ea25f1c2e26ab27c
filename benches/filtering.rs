use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dpa_engine::execution::{ExecutionEngine, ExecutionOptions};
use dpa_engine::frame::{Column, Frame};
use dpa_engine::processing::filter;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

const WHERE: &str = "amount > 100 AND country IN ('US', 'DE') AND note IS NOT NULL";

fn transactions(n_rows: usize) -> Frame {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let countries = ["US", "DE", "IN", "BR", "JP"];
    Frame::new(vec![
        Column::from_f64("amount", (0..n_rows).map(|_| Some(rng.gen_range(0.0..1000.0)))),
        Column::from_strs(
            "country",
            (0..n_rows).map(|_| Some(countries[rng.gen_range(0..countries.len())])),
        ),
        Column::from_strs("note", (0..n_rows).map(|i| (i % 7 != 0).then_some("ok"))),
    ])
    .unwrap()
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");

    for n_rows in [10_000, 100_000].iter() {
        let frame = transactions(*n_rows);
        let engine = ExecutionEngine::new(ExecutionOptions::default()).unwrap();

        group.bench_with_input(BenchmarkId::new("sequential", n_rows), &frame, |b, f| {
            b.iter(|| filter(black_box(f), WHERE, None).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("chunked", n_rows), &frame, |b, f| {
            b.iter(|| engine.filter(black_box(f), WHERE, None).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_filter);
criterion_main!(benches);
