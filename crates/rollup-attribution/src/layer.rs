//! Reporting layers: the nodes of an attribution tree.

use std::collections::BTreeSet;
use std::sync::Arc;

use rust_decimal::Decimal;

use rollup_math::IrrConfig;
use rollup_performance::measure::NAME_COLUMN;
use rollup_performance::{
    AggregatedPerformanceResult, Measure, MeasureRow, Performance, PerformanceNode,
    PerformanceResult,
};

use crate::error::AttributionResult;

/// One node of an attribution tree.
///
/// A leaf layer wraps one atom's result. An inner layer's result is the
/// aggregate of its children's results, so its measures always equal the
/// aggregation of the layers beneath it. Layers are immutable once built.
#[derive(Debug, Clone)]
pub struct ReportingLayer {
    name: String,
    result: PerformanceNode,
    investments: BTreeSet<String>,
    children: Vec<ReportingLayer>,
}

impl ReportingLayer {
    /// A leaf layer over one atom of one investment.
    #[must_use]
    pub fn leaf(
        name: impl Into<String>,
        result: Arc<PerformanceResult>,
        investment: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            result: PerformanceNode::Leaf(result),
            investments: BTreeSet::from([investment.into()]),
            children: Vec::new(),
        }
    }

    /// An inner layer aggregating `children` in their given order.
    ///
    /// # Errors
    ///
    /// Fails with `PerformanceError::EmptyAggregate` when `children` is empty.
    pub fn aggregate(
        name: impl Into<String>,
        children: Vec<ReportingLayer>,
        irr_config: &IrrConfig,
    ) -> AttributionResult<Self> {
        let name = name.into();
        let components = children
            .iter()
            .map(|child| (child.name.clone(), child.result.clone()));
        let result = AggregatedPerformanceResult::new(name.clone(), components)?
            .with_irr_config(*irr_config);
        let investments = children
            .iter()
            .flat_map(|child| child.investments.iter().cloned())
            .collect();

        Ok(Self {
            name,
            result: PerformanceNode::from(result),
            investments,
            children,
        })
    }

    /// Layer name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The layer's result.
    #[must_use]
    pub fn result(&self) -> &PerformanceNode {
        &self.result
    }

    /// Investments contributing to this layer.
    #[must_use]
    pub fn investments(&self) -> &BTreeSet<String> {
        &self.investments
    }

    /// Child layers in display order.
    #[must_use]
    pub fn children(&self) -> &[ReportingLayer] {
        &self.children
    }

    /// Returns true for an atom layer.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Direct child by name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&ReportingLayer> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Number of atom layers underneath (1 for a leaf).
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(ReportingLayer::leaf_count).sum()
        }
    }

    /// Levels from this layer down to its deepest leaf, counting both ends.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(ReportingLayer::depth)
            .max()
            .unwrap_or(0)
    }

    /// Every layer in pre-order, starting with this one.
    #[must_use]
    pub fn walk(&self) -> Vec<&ReportingLayer> {
        let mut out = Vec::new();
        self.walk_into(&mut out);
        out
    }

    fn walk_into<'a>(&'a self, out: &mut Vec<&'a ReportingLayer>) {
        out.push(self);
        for child in &self.children {
            child.walk_into(out);
        }
    }

    /// Atom layers in pre-order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&ReportingLayer> {
        self.walk().into_iter().filter(|l| l.is_leaf()).collect()
    }

    /// Flattens to `(atom name, leaf result)` pairs.
    #[must_use]
    pub fn expand(&self) -> Vec<(String, Arc<PerformanceResult>)> {
        match &self.result {
            PerformanceNode::Leaf(leaf) => vec![(self.name.clone(), Arc::clone(leaf))],
            PerformanceNode::Aggregate(agg) => agg.expand(),
        }
    }

    /// Row of the requested measures labeled with the layer name.
    #[must_use]
    pub fn to_named_row(&self, columns: &[Measure]) -> MeasureRow {
        self.result
            .to_row(columns)
            .with_label(NAME_COLUMN, self.name.clone())
    }
}

impl Performance for ReportingLayer {
    fn cost(&self) -> Decimal {
        self.result.cost()
    }

    fn distributions(&self) -> Decimal {
        self.result.distributions()
    }

    fn nav(&self) -> Decimal {
        self.result.nav()
    }

    fn pnl(&self) -> Decimal {
        self.result.pnl()
    }

    fn loss_ratio(&self) -> f64 {
        self.result.loss_ratio()
    }

    fn irr(&self) -> f64 {
        self.result.irr()
    }

    fn full_expanded_count(&self) -> usize {
        self.result.full_expanded_count()
    }

    fn moic(&self) -> f64 {
        self.result.moic()
    }

    fn dpi(&self) -> f64 {
        self.result.dpi()
    }

    fn rvpi(&self) -> f64 {
        self.result.rvpi()
    }
}
