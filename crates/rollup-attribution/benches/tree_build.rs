//! Benchmarks for attribution tree construction and views.
//!
//! Run with: cargo bench -p rollup-attribution

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use rollup_attribution::prelude::*;
use rollup_core::types::REQUIRED_CASHFLOW_COLUMNS;
use rollup_core::Table;
use rollup_performance::Performance;

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

fn create_investment(
    fund: usize,
    atoms: usize,
    config: &EngineConfig,
) -> Arc<dyn InvestmentContainer> {
    let sectors = ["Energy", "Health", "Industrials", "Software", "Consumer"];
    let regions = ["NA", "EU", "APAC"];

    let mut cf_columns: Vec<String> = REQUIRED_CASHFLOW_COLUMNS
        .iter()
        .map(|c| (*c).to_string())
        .collect();
    cf_columns.push("PositionId".to_string());
    let mut cashflows = Table::new(format!("Fund {fund} cashflows"), cf_columns).unwrap();
    let mut dimn = Table::new(
        format!("Fund {fund} positions"),
        vec!["PositionId".into(), "Sector".into(), "Region".into()],
    )
    .unwrap();

    for i in 0..atoms {
        let id = format!("F{fund:02}-P{i:04}");
        let cost = 100 + (i * 37) % 900;
        let value = cost * (50 + (i * 13) % 150) / 100;
        for (date, kind, amount) in [
            ("2019-06-30", "T", format!("-{cost}")),
            ("2022-03-31", "D", format!("{}", value / 3)),
            ("2024-12-31", "R", format!("{}", value - value / 3)),
        ] {
            cashflows
                .push_row(vec![
                    date.to_string(),
                    kind.to_string(),
                    "USD".to_string(),
                    amount,
                    "2024-12-31".to_string(),
                    "ITD".to_string(),
                    "Base".to_string(),
                    id.clone(),
                ])
                .unwrap();
        }
        dimn.push_row(vec![
            id,
            sectors[i % sectors.len()].to_string(),
            regions[(i / 7) % regions.len()].to_string(),
        ])
        .unwrap();
    }

    Arc::new(InMemoryInvestment::new(format!("Fund {fund}"), cashflows, dimn, config).unwrap())
}

fn create_builder(funds: usize, atoms_per_fund: usize) -> AttributionTreeBuilder {
    let config = EngineConfig::default();
    let containers = (0..funds)
        .map(|f| create_investment(f, atoms_per_fund, &config))
        .collect();
    AttributionTreeBuilder::new(config, containers, ManagerDirectory::new("ManagerName")).unwrap()
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_tree_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_build");

    for atoms in [10, 100, 500] {
        let mut builder = create_builder(4, atoms);
        let merged = builder.merge_containers().unwrap();
        // Warm the per-container atom caches.
        builder.build(&merged, &[] as &[&str], "PositionId").unwrap();

        group.throughput(Throughput::Elements((4 * atoms) as u64));
        group.bench_with_input(BenchmarkId::new("sector_region", atoms), &merged, |b, merged| {
            b.iter(|| {
                builder
                    .build(black_box(merged), &["Sector", "Region"], "PositionId")
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_measures(c: &mut Criterion) {
    let mut builder = create_builder(4, 250);
    let tree = builder.build_from_config(&["Sector"]).unwrap();
    let irr = builder.config().irr;

    c.bench_function("root_pooled_irr", |b| {
        b.iter(|| {
            // Fresh aggregate each time so the memoized IRR is not reused.
            let root = ReportingLayer::aggregate(
                "Total",
                tree.root().children().to_vec(),
                &irr,
            )
            .unwrap();
            black_box(root.irr())
        });
    });

    c.bench_function("one_three_five_breakdown", |b| {
        let extractor = ConcentrationExtractor::default();
        b.iter(|| extractor.one_three_five_breakdown(black_box(tree.root())).unwrap());
    });
}

criterion_group!(benches, bench_tree_build, bench_measures);
criterion_main!(benches);
