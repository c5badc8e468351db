//! End-to-end measure checks on a three-investment bucket.

use approx::assert_relative_eq;
use rollup_core::types::REQUIRED_CASHFLOW_COLUMNS;
use rollup_core::{CashflowSet, Table};
use rollup_performance::prelude::*;
use rust_decimal_macros::dec;

fn leaf(rows: &[&[&str]]) -> PerformanceResult {
    let table = Table::from_str_rows("cashflows", &REQUIRED_CASHFLOW_COLUMNS, rows).unwrap();
    PerformanceResult::new(CashflowSet::from_table(&table).unwrap(), "ITD")
}

#[test]
fn bucket_of_three_investments() {
    let a = leaf(&[
        &["2019-01-15", "T", "USD", "-100", "2024-06-30", "ITD", "Base"],
        &["2024-06-30", "R", "USD", "150", "2024-06-30", "ITD", "Base"],
    ]);
    let b = leaf(&[
        &["2019-04-01", "T", "USD", "-200", "2024-06-30", "ITD", "Base"],
        &["2022-04-01", "D", "USD", "80", "2024-06-30", "ITD", "Base"],
        &["2024-06-30", "R", "USD", "100", "2024-06-30", "ITD", "Base"],
    ]);
    let c = leaf(&[
        &["2020-07-01", "T", "USD", "-50", "2024-06-30", "ITD", "Base"],
        &["2023-07-01", "D", "USD", "80", "2024-06-30", "ITD", "Base"],
    ]);

    assert_eq!((a.cost(), a.pnl()), (dec!(-100), dec!(50)));
    assert_eq!((b.cost(), b.pnl()), (dec!(-200), dec!(-20)));
    assert_eq!((c.cost(), c.pnl()), (dec!(-50), dec!(30)));

    let bucket = AggregatedPerformanceResult::new("X", vec![("A", a), ("B", b), ("C", c)]).unwrap();

    assert_eq!(bucket.cost(), dec!(-350));
    assert_eq!(bucket.pnl(), dec!(60));
    assert_eq!(bucket.distributions(), dec!(160));
    assert_eq!(bucket.nav(), dec!(250));
    assert_relative_eq!(bucket.moic(), 1.0 + 60.0 / 350.0, epsilon = 1e-12);
    assert_relative_eq!(bucket.dpi(), 160.0 / 350.0, epsilon = 1e-12);
    assert_relative_eq!(bucket.loss_ratio(), (-0.1 * -200.0) / -350.0, epsilon = 1e-12);
    assert!(bucket.irr() > 0.0);

    let table: MeasureTable = std::iter::once(
        bucket.to_named_row(&[Measure::Cost, Measure::Pnl, Measure::Moic]),
    )
    .collect();
    let rendered = table.to_table("bucket").unwrap();
    assert_eq!(rendered.columns(), ["Name", "cost", "pnl", "moic"]);
    assert_eq!(rendered.rows()[0][..3], ["X", "-350", "60"]);
}

#[test]
fn measures_parse_from_config_names() {
    let names = ["pnl", "moic", "full_expanded_performance_results_count"];
    let columns = Measure::parse_list(&names[..]).unwrap();
    assert_eq!(columns, vec![Measure::Pnl, Measure::Moic, Measure::FullExpandedCount]);
}
