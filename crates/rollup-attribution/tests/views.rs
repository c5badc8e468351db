//! Concentration, realization and report views over built trees.

mod common;

use rust_decimal_macros::dec;

use rollup_attribution::prelude::*;
use rollup_attribution::report::{BUCKET_COLUMN, LEVEL_COLUMN, PARENT_COLUMN};
use rollup_performance::measure::NAME_COLUMN;
use rollup_performance::{Measure, Performance};

use common::tree_by;

#[test]
fn top_three_and_other_reproduce_the_total() {
    let tree = tree_by(&["Bucket"]);
    let root = tree.root();
    let top = ConcentrationExtractor::default()
        .top_n(root, 3, RankOrder::Descending, true)
        .unwrap();

    let selected: Vec<String> = top.top.expand().into_iter().map(|(n, _)| n).collect();
    assert_eq!(selected, vec!["A", "D", "C"]);
    assert_eq!(top.top.pnl(), dec!(120));

    let other = top.other.expect("two atoms remain");
    assert_eq!(other.name(), "Other [-3]");
    assert_eq!(top.top.pnl() + other.pnl(), root.pnl());
    assert_eq!(top.top.cost() + other.cost(), root.cost());
    assert_eq!(
        top.top.full_expanded_count() + other.full_expanded_count(),
        root.full_expanded_count()
    );
}

#[test]
fn bottom_two_by_ascending_rank() {
    let tree = tree_by(&[]);
    let bottom = ConcentrationExtractor::default()
        .top_n(tree.root(), 2, RankOrder::Ascending, false)
        .unwrap();
    assert_eq!(bottom.top.pnl(), dec!(-50));
    assert!(bottom.other.is_none());
}

#[test]
fn breakdown_rows_for_five_atoms() {
    let tree = tree_by(&["Sector"]);
    let breakdown = ConcentrationExtractor::default()
        .one_three_five_breakdown(tree.root())
        .unwrap();
    assert!(breakdown.other_5.is_none());
    assert_eq!(breakdown.top_5.pnl(), tree.root().pnl());

    let table = breakdown.to_table(&[Measure::Pnl, Measure::FullExpandedCount]);
    let labels: Vec<&str> = table.rows().iter().filter_map(|r| r.label(NAME_COLUMN)).collect();
    assert_eq!(labels, vec!["Top 1", "Top 3", "Top 5", "Total"]);
    let top_1 = table.find(NAME_COLUMN, "Top 1").unwrap();
    assert_eq!(top_1.get(Measure::Pnl).and_then(|v| v.as_amount()), Some(dec!(50)));
}

#[test]
fn realization_split_folds_unmapped_statuses() {
    let tree = tree_by(&["RealizationStatus"]);
    let matcher = RealizationBucketMatcher::from_config(&EngineConfig::default());

    let split = matcher.split(tree.root()).unwrap();
    let realized = split.realized.unwrap();
    assert_eq!(realized.name(), "RealizationStatus - Realized");
    assert_eq!(realized.pnl(), dec!(90));

    let unrealized = split.unrealized.unwrap();
    assert_eq!(
        unrealized.name(),
        "RealizationStatus - Unrealized & RealizationStatus - Written Off"
    );
    assert_eq!(unrealized.pnl(), dec!(-20));

    let strict = matcher
        .get_bucket(tree.root(), RealizationBucket::Unrealized, false)
        .unwrap()
        .unwrap();
    assert_eq!(strict.pnl(), dec!(10));
}

#[test]
fn attribution_report_lists_every_layer() {
    let config = EngineConfig::default().with_measure_columns(vec![Measure::Pnl, Measure::Moic]);
    let tree = tree_by(&["Bucket"]);
    let table = ReportKind::Attribution
        .assign_components(tree.root(), &config)
        .unwrap();

    assert_eq!(table.len(), tree.root().walk().len());
    let first = &table.rows()[0];
    assert_eq!(first.label(NAME_COLUMN), Some("Total"));
    assert_eq!(first.label(LEVEL_COLUMN), Some("0"));
    assert_eq!(first.label(PARENT_COLUMN), Some(""));

    let a = table.find(NAME_COLUMN, "A").unwrap();
    assert_eq!(a.label(PARENT_COLUMN), Some("Bucket - X"));
    assert_eq!(a.label(LEVEL_COLUMN), Some("2"));

    let mut csv = Vec::new();
    table.write_csv(&mut csv).unwrap();
    let text = String::from_utf8(csv).unwrap();
    assert!(text.starts_with("Name,Level,Parent,pnl,moic\n"));
}

#[test]
fn concentration_and_split_reports() {
    let config = EngineConfig::default().with_measure_columns(vec![Measure::Pnl]);
    let by_status = tree_by(&["RealizationStatus"]);

    let concentration = ReportKind::Concentration
        .assign_components(by_status.root(), &config)
        .unwrap();
    assert_eq!(concentration.len(), 4);

    let split = ReportKind::RealizationSplit
        .assign_components(by_status.root(), &config)
        .unwrap();
    let buckets: Vec<&str> = split.rows().iter().filter_map(|r| r.label(BUCKET_COLUMN)).collect();
    assert_eq!(buckets, vec!["REALIZED", "UNREALIZED", "TOTAL"]);
    let total = split.find(BUCKET_COLUMN, "TOTAL").unwrap();
    assert_eq!(total.get(Measure::Pnl).and_then(|v| v.as_amount()), Some(dec!(70)));

    for kind in ReportKind::ALL {
        let kind_table = kind.assign_components(by_status.root(), &config).unwrap();
        let header = kind_table.columns();
        for meta in kind.available_metas() {
            assert!(header.iter().any(|c| c == meta), "{kind} lacks {meta}");
        }
    }
}
