//! Criterion benchmarks for drawdown_core
//!
//! Run with: cargo bench -p drawdown_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use drawdown_core::config::{ScenarioBuilder, ScenarioConfig};
use drawdown_core::model::MarketAssumptions;
use drawdown_core::{simulate, sweep};

fn create_household(end_year: i32) -> ScenarioBuilder {
    ScenarioBuilder::new(2025, end_year)
        .birth_year(1962)
        .expenses(95_000.0, 0.03)
        .market(MarketAssumptions::Historical {
            historic_year: 1966,
            fallback_growth: 0.07,
            fallback_inflation: 0.03,
        })
        .taxable_account_with_basis("Brokerage", 400_000.0, 250_000.0)
        .post_tax_account("401ks", "Work 401k", 1_200_000.0)
        .post_tax_account("401ks", "Spouse 401k", 600_000.0)
        .pre_tax_account("Roth", 200_000.0, 2027)
        .social_security("SSI", 3_200.0, 2032)
        .lump_sum(50_000.0, 2030)
}

fn sweep_config() -> ScenarioConfig {
    create_household(2060).fixed_rates(0.07, 0.03).into_config()
}

fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate");
    for end_year in [2035, 2060, 2092] {
        let builder = create_household(end_year);
        group.bench_with_input(
            BenchmarkId::new("years", end_year - 2025 + 1),
            &builder,
            |b, builder| {
                b.iter(|| {
                    let scenario = builder.build().unwrap();
                    simulate(black_box(scenario))
                })
            },
        );
    }
    group.finish();
}

fn bench_historical_sweep(c: &mut Criterion) {
    let config = sweep_config();
    let years: Vec<i32> = (1948..=1990).collect();
    c.bench_function("sweep_1948_1990", |b| {
        b.iter(|| sweep(black_box(&config), black_box(&years)))
    });
}

criterion_group!(benches, bench_full_run, bench_historical_sweep);
criterion_main!(benches);
