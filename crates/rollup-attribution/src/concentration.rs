//! Concentration views: top-N atoms by P&L.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use rollup_math::IrrConfig;
use rollup_performance::measure::NAME_COLUMN;
use rollup_performance::{Measure, MeasureTable, Performance, PerformanceNode};

use crate::config::EngineConfig;
use crate::error::{AttributionError, AttributionResult};
use crate::layer::ReportingLayer;

/// Ranking direction for [`ConcentrationExtractor::top_n`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankOrder {
    /// Largest P&L first.
    #[default]
    Descending,
    /// Smallest P&L first.
    Ascending,
}

/// The selected atoms and, optionally, the rest.
#[derive(Debug, Clone)]
pub struct TopN {
    /// Aggregate named `Top {n}`.
    pub top: ReportingLayer,
    /// Aggregate named `Other [-{n}]`; `None` when nothing remains.
    pub other: Option<ReportingLayer>,
}

/// Top 1, 3 and 5 of one layer, plus what lies outside the top 5.
#[derive(Debug, Clone)]
pub struct Breakdown {
    /// Single largest atom.
    pub top_1: ReportingLayer,
    /// Three largest atoms.
    pub top_3: ReportingLayer,
    /// Five largest atoms.
    pub top_5: ReportingLayer,
    /// Everything outside the top 5.
    pub other_5: Option<ReportingLayer>,
    /// The layer the breakdown was taken from.
    pub total: PerformanceNode,
}

impl Breakdown {
    /// Rows `Top 1`, `Top 3`, `Top 5`, `Other [-5]` (when present) and
    /// `Total`, labeled under `Name`.
    #[must_use]
    pub fn to_table(&self, columns: &[Measure]) -> MeasureTable {
        let mut table: MeasureTable = [&self.top_1, &self.top_3, &self.top_5]
            .into_iter()
            .chain(self.other_5.as_ref())
            .map(|layer| layer.to_named_row(columns))
            .collect();
        table.push(self.total.to_row(columns).with_label(NAME_COLUMN, "Total"));
        table
    }
}

/// Picks the largest (or smallest) atoms of a layer.
#[derive(Debug, Clone, Default)]
pub struct ConcentrationExtractor {
    irr_config: IrrConfig,
}

impl ConcentrationExtractor {
    /// Creates an extractor using `irr_config` for the synthetic aggregates.
    #[must_use]
    pub fn new(irr_config: IrrConfig) -> Self {
        Self { irr_config }
    }

    /// Creates an extractor from the engine configuration.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.irr)
    }

    /// Ranks the atoms under `layer` by P&L and aggregates the first `n`.
    ///
    /// Ties are broken by atom name so the selection is deterministic.
    ///
    /// # Errors
    ///
    /// Returns `AttributionError::InvalidRequest` when `n` is zero.
    pub fn top_n(
        &self,
        layer: &ReportingLayer,
        n: usize,
        order: RankOrder,
        return_other: bool,
    ) -> AttributionResult<TopN> {
        if n == 0 {
            return Err(AttributionError::invalid_request("top_n needs n >= 1"));
        }

        let mut ranked: Vec<ReportingLayer> = layer.leaves().into_iter().cloned().collect();
        ranked.sort_by(|a, b| rank(a, b, order));

        let rest = ranked.split_off(n.min(ranked.len()));
        let top = ReportingLayer::aggregate(format!("Top {n}"), ranked, &self.irr_config)?;
        let other = if return_other && !rest.is_empty() {
            Some(ReportingLayer::aggregate(
                format!("Other [-{n}]"),
                rest,
                &self.irr_config,
            )?)
        } else {
            None
        };

        tracing::debug!(
            layer = %layer.name(),
            n,
            selected = top.leaf_count(),
            other = other.as_ref().map_or(0, ReportingLayer::leaf_count),
            "extracted top atoms"
        );
        Ok(TopN { top, other })
    }

    /// Top 1, top 3 and top 5 by descending P&L, with the remainder of the top 5.
    pub fn one_three_five_breakdown(&self, layer: &ReportingLayer) -> AttributionResult<Breakdown> {
        let top_1 = self.top_n(layer, 1, RankOrder::Descending, false)?.top;
        let top_3 = self.top_n(layer, 3, RankOrder::Descending, false)?.top;
        let TopN { top: top_5, other } = self.top_n(layer, 5, RankOrder::Descending, true)?;

        Ok(Breakdown {
            top_1,
            top_3,
            top_5,
            other_5: other,
            total: layer.result().clone(),
        })
    }
}

fn rank(a: &ReportingLayer, b: &ReportingLayer, order: RankOrder) -> Ordering {
    let by_pnl = match order {
        RankOrder::Descending => b.pnl().cmp(&a.pnl()),
        RankOrder::Ascending => a.pnl().cmp(&b.pnl()),
    };
    by_pnl.then_with(|| a.name().cmp(b.name()))
}
