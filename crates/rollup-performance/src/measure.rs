//! Measure enumeration and row-shaped output.
//!
//! Renderers consume one [`MeasureRow`] per result: a few label cells
//! (`Name`, a rank or bucket label) followed by one value per requested
//! [`Measure`]. A [`MeasureTable`] collects rows and exports them as a
//! string [`Table`], CSV, or JSON.

use std::fmt;
use std::io;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rollup_core::Table;

use crate::error::{PerfResult, PerformanceError};

/// Label column carrying a result's name.
pub const NAME_COLUMN: &str = "Name";

/// The fixed set of performance measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// Money-weighted internal rate of return.
    Irr,
    /// Multiple on invested capital.
    Moic,
    /// Loss over cost, zero when profitable.
    LossRatio,
    /// Profit and loss.
    Pnl,
    /// Paid-in capital, stored negative.
    Cost,
    /// Distributions received.
    Distributions,
    /// Residual value.
    Nav,
    /// Realized value (distributions).
    RealizedValue,
    /// Unrealized value (NAV).
    UnrealizedValue,
    /// Total value to paid-in.
    Tvpi,
    /// Number of leaf results underneath.
    #[serde(rename = "full_expanded_performance_results_count")]
    FullExpandedCount,
    /// Realized plus unrealized value.
    TotalValue,
    /// Distributions to paid-in.
    Dpi,
    /// Residual value to paid-in.
    Rvpi,
}

impl Measure {
    /// Every measure in canonical order.
    pub const ALL: [Measure; 14] = [
        Measure::Irr,
        Measure::Moic,
        Measure::LossRatio,
        Measure::Pnl,
        Measure::Cost,
        Measure::Distributions,
        Measure::Nav,
        Measure::RealizedValue,
        Measure::UnrealizedValue,
        Measure::Tvpi,
        Measure::FullExpandedCount,
        Measure::TotalValue,
        Measure::Dpi,
        Measure::Rvpi,
    ];

    /// The snake_case name used in configuration and column headers.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Measure::Irr => "irr",
            Measure::Moic => "moic",
            Measure::LossRatio => "loss_ratio",
            Measure::Pnl => "pnl",
            Measure::Cost => "cost",
            Measure::Distributions => "distributions",
            Measure::Nav => "nav",
            Measure::RealizedValue => "realized_value",
            Measure::UnrealizedValue => "unrealized_value",
            Measure::Tvpi => "tvpi",
            Measure::FullExpandedCount => "full_expanded_performance_results_count",
            Measure::TotalValue => "total_value",
            Measure::Dpi => "dpi",
            Measure::Rvpi => "rvpi",
        }
    }

    /// Returns true for ratio-valued measures.
    #[must_use]
    pub fn is_ratio(&self) -> bool {
        matches!(
            self,
            Measure::Irr
                | Measure::Moic
                | Measure::LossRatio
                | Measure::Tvpi
                | Measure::Dpi
                | Measure::Rvpi
        )
    }

    /// Parses a list of measure names.
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> PerfResult<Vec<Measure>> {
        names.iter().map(|n| n.as_ref().parse()).collect()
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Measure {
    type Err = PerformanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Measure::ALL
            .iter()
            .copied()
            .find(|m| m.name() == needle)
            .ok_or_else(|| PerformanceError::unknown_measure(s))
    }
}

/// A single measure value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MeasureValue {
    /// A money amount.
    Amount(Decimal),
    /// A ratio or rate; `NaN` when undefined.
    Ratio(f64),
    /// A count.
    Count(usize),
}

impl MeasureValue {
    /// The value as `f64` (`NaN` when not representable).
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            MeasureValue::Amount(d) => d.to_f64().unwrap_or(f64::NAN),
            MeasureValue::Ratio(r) => *r,
            MeasureValue::Count(c) => *c as f64,
        }
    }

    /// The money amount, if this is one.
    #[must_use]
    pub fn as_amount(&self) -> Option<Decimal> {
        match self {
            MeasureValue::Amount(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns true for an undefined ratio.
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, MeasureValue::Ratio(r) if r.is_nan())
    }
}

impl fmt::Display for MeasureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasureValue::Amount(d) => write!(f, "{d}"),
            MeasureValue::Ratio(r) => write!(f, "{r}"),
            MeasureValue::Count(c) => write!(f, "{c}"),
        }
    }
}

/// One output row: label cells then measure cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeasureRow {
    /// Label cells such as `Name` or a rank label.
    pub labels: Vec<(String, String)>,
    /// Measure cells in requested order.
    pub values: Vec<(Measure, MeasureValue)>,
}

impl MeasureRow {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a label cell.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_label(key, value);
        self
    }

    /// Adds or replaces a label cell in place.
    pub fn set_label(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.labels.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.labels.push((key, value)),
        }
    }

    /// Appends a measure cell.
    pub fn push(&mut self, measure: Measure, value: MeasureValue) {
        self.values.push((measure, value));
    }

    /// Looks up a label cell.
    #[must_use]
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Looks up a measure cell.
    #[must_use]
    pub fn get(&self, measure: Measure) -> Option<&MeasureValue> {
        self.values
            .iter()
            .find(|(m, _)| *m == measure)
            .map(|(_, v)| v)
    }
}

/// An ordered collection of [`MeasureRow`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeasureTable {
    rows: Vec<MeasureRow>,
}

impl MeasureTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row.
    pub fn push(&mut self, row: MeasureRow) {
        self.rows.push(row);
    }

    /// Rows in insertion order.
    #[must_use]
    pub fn rows(&self) -> &[MeasureRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds the first row whose `key` label equals `value`.
    #[must_use]
    pub fn find(&self, key: &str, value: &str) -> Option<&MeasureRow> {
        self.rows.iter().find(|r| r.label(key) == Some(value))
    }

    /// Header: label keys then measure names, each in first-seen order.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        let mut measures: Vec<Measure> = Vec::new();
        for row in &self.rows {
            for (key, _) in &row.labels {
                if !labels.contains(key) {
                    labels.push(key.clone());
                }
            }
            for (measure, _) in &row.values {
                if !measures.contains(measure) {
                    measures.push(*measure);
                }
            }
        }
        labels
            .into_iter()
            .chain(measures.iter().map(|m| m.name().to_string()))
            .collect()
    }

    /// Renders every cell as a string; absent cells are empty.
    pub fn to_table(&self, name: &str) -> PerfResult<Table> {
        let columns = self.columns();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|col| {
                        row.label(col).map(str::to_string).unwrap_or_else(|| {
                            col.parse::<Measure>()
                                .ok()
                                .and_then(|m| row.get(m))
                                .map(ToString::to_string)
                                .unwrap_or_default()
                        })
                    })
                    .collect()
            })
            .collect();
        Ok(Table::from_rows(name, columns, rows)?)
    }

    /// Writes the table as CSV with a header row.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> PerfResult<()> {
        let table = self.to_table("measures")?;
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(table.columns())?;
        for row in table.rows() {
            out.write_record(row)?;
        }
        out.flush().map_err(|e| PerformanceError::output(e.to_string()))?;
        Ok(())
    }

    /// Serializes the rows as pretty JSON.
    pub fn to_json(&self) -> PerfResult<String> {
        Ok(serde_json::to_string_pretty(&self.rows)?)
    }
}

impl FromIterator<MeasureRow> for MeasureTable {
    fn from_iter<I: IntoIterator<Item = MeasureRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}
