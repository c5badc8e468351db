//! Report kinds and their row assignment.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use rollup_performance::measure::NAME_COLUMN;
use rollup_performance::{MeasureTable, Performance};

use crate::concentration::ConcentrationExtractor;
use crate::config::{EngineConfig, RealizationBucket};
use crate::error::{AttributionError, AttributionResult};
use crate::layer::ReportingLayer;
use crate::realization::RealizationBucketMatcher;

/// Label column holding a layer's depth below the reported layer.
pub const LEVEL_COLUMN: &str = "Level";
/// Label column holding a layer's parent name.
pub const PARENT_COLUMN: &str = "Parent";
/// Label column holding a realization bucket.
pub const BUCKET_COLUMN: &str = "Bucket";

/// The reports the engine can render from a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Every layer of the tree, pre-order.
    Attribution,
    /// Top 1 / 3 / 5 / other / total.
    Concentration,
    /// Realized and unrealized buckets plus the total.
    RealizationSplit,
}

impl ReportKind {
    /// All report kinds.
    pub const ALL: [ReportKind; 3] = [
        ReportKind::Attribution,
        ReportKind::Concentration,
        ReportKind::RealizationSplit,
    ];

    /// Snake-case report name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ReportKind::Attribution => "attribution",
            ReportKind::Concentration => "concentration",
            ReportKind::RealizationSplit => "realization_split",
        }
    }

    /// Label columns the report emits ahead of the measure columns.
    #[must_use]
    pub fn available_metas(&self) -> &'static [&'static str] {
        match self {
            ReportKind::Attribution => &[NAME_COLUMN, LEVEL_COLUMN, PARENT_COLUMN],
            ReportKind::Concentration => &[NAME_COLUMN],
            ReportKind::RealizationSplit => &[NAME_COLUMN, BUCKET_COLUMN],
        }
    }

    /// Renders `layer` into labeled rows of the configured measure columns.
    ///
    /// # Errors
    ///
    /// Propagates failures of the concentration or realization views.
    pub fn assign_components(
        &self,
        layer: &ReportingLayer,
        config: &EngineConfig,
    ) -> AttributionResult<MeasureTable> {
        let columns = &config.measure_columns;
        let table = match self {
            ReportKind::Attribution => {
                let mut table = MeasureTable::new();
                push_attribution_rows(&mut table, layer, None, 0, columns);
                table
            }
            ReportKind::Concentration => ConcentrationExtractor::from_config(config)
                .one_three_five_breakdown(layer)?
                .to_table(columns),
            ReportKind::RealizationSplit => {
                let split = RealizationBucketMatcher::from_config(config).split(layer)?;
                let mut table = MeasureTable::new();
                for bucket in RealizationBucket::ALL {
                    if let Some(side) = split.get(bucket) {
                        table.push(
                            side.to_named_row(columns)
                                .with_label(BUCKET_COLUMN, bucket.name()),
                        );
                    }
                }
                table.push(
                    layer
                        .result()
                        .to_row(columns)
                        .with_label(NAME_COLUMN, layer.name())
                        .with_label(BUCKET_COLUMN, "TOTAL"),
                );
                table
            }
        };

        tracing::debug!(
            report = %self,
            layer = %layer.name(),
            rows = table.len(),
            "assigned report rows"
        );
        Ok(table)
    }
}

fn push_attribution_rows(
    table: &mut MeasureTable,
    layer: &ReportingLayer,
    parent: Option<&str>,
    level: usize,
    columns: &[rollup_performance::Measure],
) {
    table.push(
        layer
            .to_named_row(columns)
            .with_label(LEVEL_COLUMN, level.to_string())
            .with_label(PARENT_COLUMN, parent.unwrap_or_default()),
    );
    for child in layer.children() {
        push_attribution_rows(table, child, Some(layer.name()), level + 1, columns);
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReportKind {
    type Err = AttributionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == needle)
            .ok_or_else(|| AttributionError::invalid_request(format!("unknown report kind '{s}'")))
    }
}
