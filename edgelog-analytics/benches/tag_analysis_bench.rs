//! Criterion benchmarks for the analytics hot paths.
//!
//! Run with: `cargo bench -p edgelog-analytics`
//!
//! Combination analysis grows with C(tags, level) per trade, so it is measured
//! separately from the linear passes (core metrics, time buckets).

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use edgelog_analytics::{
    analyze_tags, build_report, compute_core_metrics, compute_time_buckets, AnalyticsConfig,
    MetricsConfig, TagConfig,
};
use edgelog_core::{Direction, Trade};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SYMBOLS: &[&str] = &["ES", "NQ", "CL", "GC", "EURUSD", "BTCUSD"];
const SETUPS: &[&str] = &["breakout", "pullback", "reversal", "range"];
const SESSIONS: &[&str] = &["asia", "london", "ny"];
const GRADES: &[&str] = &["a", "b", "c"];
const EMOTIONS: &[&str] = &["calm", "fomo", "revenge"];

/// Generate a seeded synthetic journal with five tags per trade.
fn generate_trades(count: usize) -> Vec<Trade> {
    let mut rng = StdRng::seed_from_u64(42);
    let start = NaiveDate::from_ymd_opt(2023, 1, 2)
        .and_then(|d| d.and_hms_opt(9, 30, 0))
        .unwrap();

    (0..count)
        .map(|i| {
            let direction = if rng.gen_bool(0.5) { Direction::Long } else { Direction::Short };
            let date = start + Duration::hours(i as i64 * 7 + rng.gen_range(0..6));
            let pnl = (rng.gen_range(-400.0..600.0_f64) * 100.0).round() / 100.0;
            Trade::new(SYMBOLS[rng.gen_range(0..SYMBOLS.len())], direction, date)
                .with_id(i.to_string())
                .with_pnl(pnl)
                .with_rr(pnl / 200.0)
                .with_tag("setup", SETUPS[rng.gen_range(0..SETUPS.len())])
                .with_tag("session", SESSIONS[rng.gen_range(0..SESSIONS.len())])
                .with_tag("grade", GRADES[rng.gen_range(0..GRADES.len())])
                .with_tag("emotion", EMOTIONS[rng.gen_range(0..EMOTIONS.len())])
                .with_tag("timeframe", if rng.gen_bool(0.7) { "5m" } else { "1h" })
        })
        .collect()
}

fn bench_single_tag_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_tag_analysis");
    let config = TagConfig::default();

    for size in [100, 1000, 10000].iter() {
        let trades = generate_trades(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| analyze_tags(black_box(&trades), false, 2, &config));
        });
    }

    group.finish();
}

/// Combination mode at levels 2 and 3.
fn bench_combination_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("combination_analysis");
    let config = TagConfig::default();
    let trades = generate_trades(2000);

    for level in [2usize, 3].iter() {
        group.bench_with_input(BenchmarkId::new("level", level), level, |b, &level| {
            b.iter(|| analyze_tags(black_box(&trades), true, level, &config));
        });
    }

    group.finish();
}

fn bench_linear_passes(c: &mut Criterion) {
    let mut group = c.benchmark_group("linear_passes");
    let trades = generate_trades(10000);
    let metrics = MetricsConfig::default();

    group.bench_function("core_metrics", |b| {
        b.iter(|| compute_core_metrics(black_box(&trades), &metrics));
    });
    group.bench_function("time_buckets", |b| {
        b.iter(|| compute_time_buckets(black_box(&trades)));
    });

    group.finish();
}

fn bench_full_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_report");
    group.sample_size(20);
    let config = AnalyticsConfig::default();

    for size in [1000, 5000].iter() {
        let trades = generate_trades(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| build_report(black_box(&trades), &config));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_tag_analysis,
    bench_combination_analysis,
    bench_linear_passes,
    bench_full_report,
);
criterion_main!(benches);
