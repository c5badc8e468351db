//! Aggregates composed from named component results.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use rollup_core::Date;
use rollup_math::IrrConfig;

use crate::error::{PerfResult, PerformanceError};
use crate::measure::{Measure, MeasureRow, NAME_COLUMN};
use crate::performance::{solve_irr, Multiples, Performance};
use crate::result::PerformanceResult;

/// A component of an aggregate: a leaf or a nested aggregate.
#[derive(Debug, Clone)]
pub enum PerformanceNode {
    /// A leaf result.
    Leaf(Arc<PerformanceResult>),
    /// A nested aggregate.
    Aggregate(Arc<AggregatedPerformanceResult>),
}

impl PerformanceNode {
    /// Dated amounts of every leaf underneath.
    fn pooled_cashflows(&self, out: &mut Vec<(Date, Decimal)>) {
        match self {
            PerformanceNode::Leaf(leaf) => out.extend(leaf.cashflows().dated_amounts()),
            PerformanceNode::Aggregate(agg) => {
                for (_, component) in agg.components() {
                    component.pooled_cashflows(out);
                }
            }
        }
    }
}

impl From<PerformanceResult> for PerformanceNode {
    fn from(leaf: PerformanceResult) -> Self {
        PerformanceNode::Leaf(Arc::new(leaf))
    }
}

impl From<Arc<PerformanceResult>> for PerformanceNode {
    fn from(leaf: Arc<PerformanceResult>) -> Self {
        PerformanceNode::Leaf(leaf)
    }
}

impl From<AggregatedPerformanceResult> for PerformanceNode {
    fn from(agg: AggregatedPerformanceResult) -> Self {
        PerformanceNode::Aggregate(Arc::new(agg))
    }
}

impl From<Arc<AggregatedPerformanceResult>> for PerformanceNode {
    fn from(agg: Arc<AggregatedPerformanceResult>) -> Self {
        PerformanceNode::Aggregate(agg)
    }
}

impl Performance for PerformanceNode {
    fn cost(&self) -> Decimal {
        match self {
            PerformanceNode::Leaf(r) => r.cost(),
            PerformanceNode::Aggregate(r) => r.cost(),
        }
    }

    fn distributions(&self) -> Decimal {
        match self {
            PerformanceNode::Leaf(r) => r.distributions(),
            PerformanceNode::Aggregate(r) => r.distributions(),
        }
    }

    fn nav(&self) -> Decimal {
        match self {
            PerformanceNode::Leaf(r) => r.nav(),
            PerformanceNode::Aggregate(r) => r.nav(),
        }
    }

    fn pnl(&self) -> Decimal {
        match self {
            PerformanceNode::Leaf(r) => r.pnl(),
            PerformanceNode::Aggregate(r) => r.pnl(),
        }
    }

    fn loss_ratio(&self) -> f64 {
        match self {
            PerformanceNode::Leaf(r) => r.loss_ratio(),
            PerformanceNode::Aggregate(r) => r.loss_ratio(),
        }
    }

    fn irr(&self) -> f64 {
        match self {
            PerformanceNode::Leaf(r) => r.irr(),
            PerformanceNode::Aggregate(r) => r.irr(),
        }
    }

    fn full_expanded_count(&self) -> usize {
        match self {
            PerformanceNode::Leaf(_) => 1,
            PerformanceNode::Aggregate(r) => r.full_expanded_count(),
        }
    }

    fn moic(&self) -> f64 {
        match self {
            PerformanceNode::Leaf(r) => r.moic(),
            PerformanceNode::Aggregate(r) => r.moic(),
        }
    }

    fn dpi(&self) -> f64 {
        match self {
            PerformanceNode::Leaf(r) => r.dpi(),
            PerformanceNode::Aggregate(r) => r.dpi(),
        }
    }

    fn rvpi(&self) -> f64 {
        match self {
            PerformanceNode::Leaf(r) => r.rvpi(),
            PerformanceNode::Aggregate(r) => r.rvpi(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct AggregateCache {
    cost: OnceCell<Decimal>,
    distributions: OnceCell<Decimal>,
    nav: OnceCell<Decimal>,
    pnl: OnceCell<Decimal>,
    loss_ratio: OnceCell<f64>,
    irr: OnceCell<f64>,
    leaf_count: OnceCell<usize>,
    multiples: OnceCell<Multiples>,
}

/// A named composition of component results.
///
/// `pnl`, `cost`, `distributions` and `nav` are sums over the components.
/// The loss ratio is cost-weighted, `Σ(lr_i × cost_i) / Σ cost_i`, and the
/// IRR is solved over the pooled cashflows of every leaf underneath.
#[derive(Debug, Clone)]
pub struct AggregatedPerformanceResult {
    name: String,
    components: Vec<(String, PerformanceNode)>,
    irr_config: IrrConfig,
    cache: AggregateCache,
}

impl AggregatedPerformanceResult {
    /// Creates an aggregate; components keep their given order for display.
    ///
    /// # Errors
    ///
    /// Returns `PerformanceError::EmptyAggregate` without components.
    pub fn new<I, S, N>(name: impl Into<String>, components: I) -> PerfResult<Self>
    where
        I: IntoIterator<Item = (S, N)>,
        S: Into<String>,
        N: Into<PerformanceNode>,
    {
        let name = name.into();
        let components: Vec<(String, PerformanceNode)> = components
            .into_iter()
            .map(|(n, c)| (n.into(), c.into()))
            .collect();
        if components.is_empty() {
            return Err(PerformanceError::empty_aggregate(name));
        }
        Ok(Self {
            name,
            components,
            irr_config: IrrConfig::default(),
            cache: AggregateCache::default(),
        })
    }

    /// Uses `config` for the pooled IRR solve.
    #[must_use]
    pub fn with_irr_config(mut self, config: IrrConfig) -> Self {
        self.irr_config = config;
        self.cache = AggregateCache::default();
        self
    }

    /// The aggregate's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Components in display order.
    #[must_use]
    pub fn components(&self) -> &[(String, PerformanceNode)] {
        &self.components
    }

    /// Looks up a direct component by name.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&PerformanceNode> {
        self.components
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// Flattens nested aggregates into `(leaf name, leaf)` pairs.
    ///
    /// Leaves keep the name under which their innermost aggregate holds
    /// them; order follows a depth-first walk of the components.
    #[must_use]
    pub fn expand(&self) -> Vec<(String, Arc<PerformanceResult>)> {
        let mut leaves = Vec::new();
        Self::expand_into(&self.components, &mut leaves);
        leaves
    }

    fn expand_into(
        components: &[(String, PerformanceNode)],
        out: &mut Vec<(String, Arc<PerformanceResult>)>,
    ) {
        for (name, component) in components {
            match component {
                PerformanceNode::Leaf(leaf) => out.push((name.clone(), Arc::clone(leaf))),
                PerformanceNode::Aggregate(agg) => Self::expand_into(&agg.components, out),
            }
        }
    }

    /// Dated amounts of every leaf underneath, in expansion order.
    #[must_use]
    pub fn pooled_cashflows(&self) -> Vec<(Date, Decimal)> {
        let mut flows = Vec::new();
        for (_, component) in &self.components {
            component.pooled_cashflows(&mut flows);
        }
        flows
    }

    /// Base row plus a `Name` label.
    #[must_use]
    pub fn to_named_row(&self, columns: &[Measure]) -> MeasureRow {
        self.to_row(columns).with_label(NAME_COLUMN, self.name.clone())
    }

    fn sum_of(&self, item: impl Fn(&PerformanceNode) -> Decimal) -> Decimal {
        self.components.iter().map(|(_, c)| item(c)).sum()
    }

    fn multiples(&self) -> Multiples {
        *self
            .cache
            .multiples
            .get_or_init(|| Multiples::of(self.pnl(), self.cost(), self.distributions()))
    }
}

impl Performance for AggregatedPerformanceResult {
    fn cost(&self) -> Decimal {
        *self.cache.cost.get_or_init(|| self.sum_of(Performance::cost))
    }

    fn distributions(&self) -> Decimal {
        *self
            .cache
            .distributions
            .get_or_init(|| self.sum_of(Performance::distributions))
    }

    fn nav(&self) -> Decimal {
        *self.cache.nav.get_or_init(|| self.sum_of(Performance::nav))
    }

    fn pnl(&self) -> Decimal {
        *self.cache.pnl.get_or_init(|| self.sum_of(Performance::pnl))
    }

    fn loss_ratio(&self) -> f64 {
        *self.cache.loss_ratio.get_or_init(|| {
            let total_cost = self.cost().to_f64().unwrap_or(f64::NAN);
            if total_cost == 0.0 {
                return f64::NAN;
            }
            // Zero-cost components carry no weight, even with an undefined ratio.
            let weighted: f64 = self
                .components
                .iter()
                .filter(|(_, c)| !c.cost().is_zero())
                .map(|(_, c)| c.loss_ratio() * c.cost().to_f64().unwrap_or(f64::NAN))
                .sum();
            weighted / total_cost
        })
    }

    fn irr(&self) -> f64 {
        *self.cache.irr.get_or_init(|| {
            solve_irr(
                &self.name,
                &self.pooled_cashflows(),
                self.pnl(),
                &self.irr_config,
            )
        })
    }

    fn full_expanded_count(&self) -> usize {
        *self.cache.leaf_count.get_or_init(|| {
            self.components
                .iter()
                .map(|(_, c)| c.full_expanded_count())
                .sum()
        })
    }

    fn moic(&self) -> f64 {
        self.multiples().moic
    }

    fn dpi(&self) -> f64 {
        self.multiples().dpi
    }

    fn rvpi(&self) -> f64 {
        self.multiples().rvpi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::MeasureValue;
    use approx::assert_relative_eq;
    use rollup_core::{CashflowKind, CashflowRecord, CashflowSet};
    use rust_decimal_macros::dec;

    fn leaf(cost: Decimal, value: Decimal) -> PerformanceResult {
        let as_of = Date::from_ymd(2024, 6, 30).unwrap();
        PerformanceResult::new(
            CashflowSet::new(vec![
                CashflowRecord::new(
                    Date::from_ymd(2020, 6, 30).unwrap(),
                    CashflowKind::Takedown,
                    cost,
                    as_of,
                ),
                CashflowRecord::new(as_of, CashflowKind::ResidualValue, value, as_of),
            ]),
            "ITD",
        )
    }

    #[test]
    fn test_empty_aggregate_rejected() {
        let none: Vec<(String, PerformanceNode)> = Vec::new();
        let err = AggregatedPerformanceResult::new("Empty", none).unwrap_err();
        assert_eq!(err, PerformanceError::empty_aggregate("Empty"));
    }

    #[test]
    fn test_sums_and_weighted_loss_ratio() {
        // Loss ratios -0.2 and 0 on costs -100 and -50.
        let agg = AggregatedPerformanceResult::new(
            "Fund",
            vec![("A", leaf(dec!(-100), dec!(80))), ("B", leaf(dec!(-50), dec!(70)))],
        )
        .unwrap();

        assert_eq!(agg.cost(), dec!(-150));
        assert_eq!(agg.pnl(), dec!(0));
        assert_eq!(agg.nav(), dec!(150));
        assert_relative_eq!(agg.loss_ratio(), (-0.2 * -100.0) / -150.0, epsilon = 1e-12);
        assert_relative_eq!(agg.moic(), 1.0);
        assert!(agg.cache.multiples.get().is_some());
        assert_eq!(agg.full_expanded_count(), 2);
    }

    #[test]
    fn test_expand_flattens_nested() {
        let inner = AggregatedPerformanceResult::new(
            "Inner",
            vec![("A", leaf(dec!(-10), dec!(12))), ("B", leaf(dec!(-10), dec!(8)))],
        )
        .unwrap();
        let outer = AggregatedPerformanceResult::new(
            "Outer",
            vec![
                ("Inner".to_string(), PerformanceNode::from(inner)),
                ("C".to_string(), PerformanceNode::from(leaf(dec!(-5), dec!(9)))),
            ],
        )
        .unwrap();

        let names: Vec<String> = outer.expand().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(outer.full_expanded_count(), 3);
        assert_eq!(outer.pnl(), dec!(4));
        assert_eq!(outer.pooled_cashflows().len(), 6);
    }

    #[test]
    fn test_zero_total_cost_is_undefined() {
        let agg = AggregatedPerformanceResult::new(
            "NoCost",
            vec![("A", leaf(dec!(0), dec!(10)))],
        )
        .unwrap();
        assert!(agg.loss_ratio().is_nan());
        assert!(agg.moic().is_nan());
    }

    #[test]
    fn test_zero_cost_component_carries_no_loss_weight() {
        let as_of = Date::from_ymd(2024, 6, 30).unwrap();
        let fees = PerformanceResult::new(
            CashflowSet::new(vec![CashflowRecord::new(
                Date::from_ymd(2022, 3, 31).unwrap(),
                CashflowKind::Other,
                dec!(-5),
                as_of,
            )]),
            "ITD",
        );
        assert!(fees.loss_ratio().is_nan());

        let agg = AggregatedPerformanceResult::new(
            "Fund",
            vec![
                ("A".to_string(), PerformanceNode::from(leaf(dec!(-100), dec!(80)))),
                ("Fees".to_string(), PerformanceNode::from(fees)),
            ],
        )
        .unwrap();
        assert_eq!(agg.cost(), dec!(-100));
        assert_eq!(agg.pnl(), dec!(-25));
        assert_relative_eq!(agg.loss_ratio(), -0.2, epsilon = 1e-12);

        let total = AggregatedPerformanceResult::new("Total", vec![("Fund", agg)]).unwrap();
        assert!(total.loss_ratio().is_finite());
    }

    #[test]
    fn test_named_row() {
        let agg =
            AggregatedPerformanceResult::new("Total", vec![("A", leaf(dec!(-10), dec!(15)))])
                .unwrap();
        let row = agg.to_named_row(&[Measure::Pnl, Measure::FullExpandedCount]);
        assert_eq!(row.label(NAME_COLUMN), Some("Total"));
        assert_eq!(row.get(Measure::Pnl), Some(&MeasureValue::Amount(dec!(5))));
        assert_eq!(row.get(Measure::FullExpandedCount), Some(&MeasureValue::Count(1)));
    }

    #[test]
    fn test_pooled_irr() {
        let agg = AggregatedPerformanceResult::new(
            "Pool",
            vec![("A", leaf(dec!(-100), dec!(120))), ("B", leaf(dec!(-100), dec!(140)))],
        )
        .unwrap();
        // Same dates on both legs: pooled IRR is the IRR of -200 -> 260.
        let single = leaf(dec!(-200), dec!(260));
        assert_relative_eq!(agg.irr(), single.irr(), epsilon = 1e-9);
    }
}
