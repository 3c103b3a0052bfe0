//! Criterion benchmarks for the MRL summary.
//!
//! Stable run tips:
//!   export RUSTFLAGS="-C target-cpu=native"
//!   export RAYON_NUM_THREADS=8       # or 1 for max stability
//!
//! Discover benches:
//!   cargo bench --bench mrl_core -- --list
//!
//! Save and compare a baseline:
//!   cargo bench --bench mrl_core -- --save-baseline base
//!   cargo bench --bench mrl_core -- --baseline base "consume"

use std::hint::black_box;
use std::sync::Once;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mrl_quantiles::mrl::test_helpers::full_buffer;
use mrl_quantiles::mrl::{collapse, Buffer};
use mrl_quantiles::quality::trials::{run_trials, TrialConfig};
use mrl_quantiles::{Geometry, SamplingPolicy, Summary, SummaryMode};
use rayon::ThreadPoolBuilder;
use testdata::{gen_dataset, DistKind};

/* ------------------------ RAYON INIT (once) ------------------------ */

static RAYON_INIT: Once = Once::new();

fn init_rayon() {
    RAYON_INIT.call_once(|| {
        let builder = match std::env::var("RAYON_NUM_THREADS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
        {
            Some(n) => ThreadPoolBuilder::new().num_threads(n),
            None => ThreadPoolBuilder::new(),
        };
        let _ = builder.build_global(); // ignore Err if already built
    });
}

/* ------------------------ BUILD HELPERS ------------------------ */

fn build_summary(data: Vec<f64>, g: Geometry, mode: SummaryMode) -> Summary {
    Summary::builder()
        .capacity(g.capacity)
        .buffers(g.buffers)
        .mode(mode)
        .seed(42)
        .build()
        .and_then(|s| s.consume(data))
        .expect("bench summary")
}

/* ------------------------ BENCH: CONSUME ------------------------ */

fn bench_consume(c: &mut Criterion) {
    let modes = [
        ("exact", SummaryMode::Exact),
        ("sampled", SummaryMode::Sampled(SamplingPolicy::default())),
    ];
    let cases = [
        (100_000usize, Geometry::new(7, 217)),
        (1_000_000usize, Geometry::new(9, 412)),
    ];

    let mut g = c.benchmark_group("consume");
    for (n, geometry) in cases {
        let data = gen_dataset(DistKind::Normal, n, 42);
        g.throughput(Throughput::Elements(n as u64));
        for (name, mode) in modes {
            let id = BenchmarkId::from_parameter(format!(
                "{name},n={n},b={},k={}",
                geometry.buffers, geometry.capacity
            ));
            g.bench_function(id, |b| {
                b.iter(|| black_box(build_summary(data.clone(), geometry, mode)));
            });
        }
    }
    g.finish();
}

/* --------------------- BENCH: QUANTILE ------------------------ */

fn bench_quantile(c: &mut Criterion) {
    let data = gen_dataset(DistKind::Normal, 1_000_000, 123);
    let s = build_summary(data, Geometry::new(9, 412), SummaryMode::Exact);

    let mut g_single = c.benchmark_group("estimate_quantile/single");
    g_single.bench_function("phi=0.5", |b| {
        b.iter(|| black_box(s.estimate_quantile(black_box(0.5))));
    });
    g_single.finish();

    // one merge for the whole grid
    let phis: Vec<f64> = (1..1000).map(|i| (i as f64) / 1000.0).collect();
    let mut g_batch = c.benchmark_group("estimate_quantile/batch_1000");
    g_batch.throughput(Throughput::Elements(phis.len() as u64));
    g_batch.bench_function("grid", |b| {
        b.iter(|| black_box(s.quantiles(black_box(&phis))));
    });
    g_batch.finish();
}

/* --------------------- BENCH: COLLAPSE ------------------------ */

fn bench_collapse(c: &mut Criterion) {
    let mut g = c.benchmark_group("collapse");
    for (count, capacity) in [(2usize, 1000usize), (5, 1000), (10, 5000)] {
        let pool: Vec<Buffer> = (0..count)
            .map(|i| {
                let xs = gen_dataset(DistKind::Uniform, capacity, i as u64);
                full_buffer(capacity, &xs, 1 + i as u64)
            })
            .collect();
        g.throughput(Throughput::Elements((count * capacity) as u64));
        g.bench_with_input(
            BenchmarkId::from_parameter(format!("b={count},k={capacity}")),
            &pool,
            |b, pool| {
                b.iter(|| {
                    let mut pool = pool.clone();
                    let mut refs: Vec<&mut Buffer> = pool.iter_mut().collect();
                    collapse(capacity, &mut refs).expect("collapse");
                    black_box(pool);
                });
            },
        );
    }
    g.finish();
}

/* --------------------- BENCH: TRIALS (rayon) ------------------------ */

fn bench_trials(c: &mut Criterion) {
    init_rayon();

    let cfg = TrialConfig {
        dist: DistKind::Bimodal,
        n: 100_000,
        geometry: Geometry::new(7, 217),
        mode: SummaryMode::Exact,
        phi: 0.5,
        runs: 16,
        seed: 7,
    };
    let mut g = c.benchmark_group("trials");
    g.sample_size(10);
    g.bench_function("runs=16,n=100000", |b| {
        b.iter(|| black_box(run_trials(black_box(&cfg)).expect("trials")));
    });
    g.finish();
}

criterion_group!(
    benches,
    bench_consume,
    bench_quantile,
    bench_collapse,
    bench_trials
);
criterion_main!(benches);
