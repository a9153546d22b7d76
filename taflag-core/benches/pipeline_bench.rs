//! Criterion benchmarks for the analysis hot paths.
//!
//! Benchmarks:
//! 1. Indicator precompute (full battery into per-bar sets)
//! 2. Signal extraction (all rules over all bars)
//! 3. Trade matching (state machine over per-bar signal sets)
//! 4. Full pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use taflag_core::domain::Bar;
use taflag_core::engine::{compute_indicator_sets, match_trades, IndicatorParams, MatcherConfig};
use taflag_core::signals::{all_rules, extract_signals, Emission, ExitMode};
use taflag_core::{run_pipeline, PipelineConfig};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2020, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0 + (i as f64 * 0.37).cos() * 2.0;
            let open = close - 0.3;
            Bar {
                timestamp: base + chrono::Duration::hours(i as i64),
                open,
                high: close + 1.5,
                low: open - 1.5,
                close,
                volume: 1_000.0 + (i % 500) as f64,
            }
        })
        .collect()
}

const SIZES: [usize; 3] = [500, 2_000, 10_000];

// ── 1. Indicator Precompute ──────────────────────────────────────────

fn bench_precompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicator_precompute");
    let params = IndicatorParams::default();
    for &n in &SIZES {
        let bars = make_bars(n);
        group.bench_with_input(BenchmarkId::new("battery", n), &n, |b, _| {
            b.iter(|| compute_indicator_sets(black_box(&bars), black_box(&params)));
        });
    }
    group.finish();
}

// ── 2. Signal Extraction ─────────────────────────────────────────────

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("signal_extraction");
    let rules = all_rules();
    for &n in &SIZES {
        let bars = make_bars(n);
        let sets = compute_indicator_sets(&bars, &IndicatorParams::default());
        group.bench_with_input(BenchmarkId::new("all_rules", n), &n, |b, _| {
            b.iter(|| {
                extract_signals(
                    black_box(&bars),
                    black_box(&sets),
                    &rules,
                    Emission::EveryBar,
                    ExitMode::Signal,
                )
            });
        });
    }
    group.finish();
}

// ── 3. Trade Matching ────────────────────────────────────────────────

fn bench_matcher(c: &mut Criterion) {
    let mut group = c.benchmark_group("trade_matcher");
    let config = MatcherConfig {
        confirmation_threshold: 2,
        ..MatcherConfig::default()
    };
    for &n in &SIZES {
        let bars = make_bars(n);
        let sets = compute_indicator_sets(&bars, &IndicatorParams::default());
        let extraction =
            extract_signals(&bars, &sets, &all_rules(), Emission::EveryBar, ExitMode::Level);
        group.bench_with_input(BenchmarkId::new("threshold_2", n), &n, |b, _| {
            b.iter(|| match_trades(black_box(&extraction.bars), black_box(&config)));
        });
    }
    group.finish();
}

// ── 4. Full Pipeline ─────────────────────────────────────────────────

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let config = PipelineConfig::default();
    for &n in &SIZES {
        let bars = make_bars(n);
        group.bench_with_input(BenchmarkId::new("run_pipeline", n), &n, |b, _| {
            b.iter(|| run_pipeline(black_box(&bars), black_box(&config)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_precompute,
    bench_extraction,
    bench_matcher,
    bench_pipeline,
);
criterion_main!(benches);
