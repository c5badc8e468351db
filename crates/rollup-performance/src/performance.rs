//! The measure surface shared by leaf and aggregate results.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use rollup_core::Date;
use rollup_math::irr::{xirr, IrrConfig};

use crate::error::{PerfResult, PerformanceError};
use crate::measure::{Measure, MeasureRow, MeasureValue};

/// Performance measures of a leaf or an aggregate.
///
/// Implementors supply the base items and the three measures whose rule
/// differs between leaves and aggregates (`loss_ratio`, `irr`, and the leaf
/// count). Multiples and value splits are derived from the base items the
/// same way at every level.
///
/// Zero-cost policy: every ratio whose denominator is zero is `NaN`.
/// [`Performance::checked_measure`] turns that into an error.
pub trait Performance {
    /// Paid-in capital, `-|Σ takedowns|`.
    fn cost(&self) -> Decimal;

    /// Distributions received.
    fn distributions(&self) -> Decimal;

    /// Residual value.
    fn nav(&self) -> Decimal;

    /// Profit and loss.
    fn pnl(&self) -> Decimal;

    /// Loss ratio; zero when profitable.
    fn loss_ratio(&self) -> f64;

    /// Money-weighted internal rate of return.
    fn irr(&self) -> f64;

    /// Number of leaf results underneath (1 for a leaf).
    fn full_expanded_count(&self) -> usize;

    /// Realized value.
    fn realized_value(&self) -> Decimal {
        self.distributions()
    }

    /// Unrealized value.
    fn unrealized_value(&self) -> Decimal {
        self.nav()
    }

    /// Realized plus unrealized value.
    fn total_value(&self) -> Decimal {
        self.realized_value() + self.unrealized_value()
    }

    /// `1 + pnl / |cost|`.
    fn moic(&self) -> f64 {
        Multiples::of(self.pnl(), self.cost(), self.distributions()).moic
    }

    /// Alias of [`Performance::moic`].
    fn tvpi(&self) -> f64 {
        self.moic()
    }

    /// `-distributions / cost`.
    fn dpi(&self) -> f64 {
        Multiples::of(self.pnl(), self.cost(), self.distributions()).dpi
    }

    /// `tvpi - dpi`.
    fn rvpi(&self) -> f64 {
        Multiples::of(self.pnl(), self.cost(), self.distributions()).rvpi
    }

    /// Looks up one measure.
    fn get_measure(&self, measure: Measure) -> MeasureValue {
        match measure {
            Measure::Irr => MeasureValue::Ratio(self.irr()),
            Measure::Moic => MeasureValue::Ratio(self.moic()),
            Measure::LossRatio => MeasureValue::Ratio(self.loss_ratio()),
            Measure::Pnl => MeasureValue::Amount(self.pnl()),
            Measure::Cost => MeasureValue::Amount(self.cost()),
            Measure::Distributions => MeasureValue::Amount(self.distributions()),
            Measure::Nav => MeasureValue::Amount(self.nav()),
            Measure::RealizedValue => MeasureValue::Amount(self.realized_value()),
            Measure::UnrealizedValue => MeasureValue::Amount(self.unrealized_value()),
            Measure::Tvpi => MeasureValue::Ratio(self.tvpi()),
            Measure::FullExpandedCount => MeasureValue::Count(self.full_expanded_count()),
            Measure::TotalValue => MeasureValue::Amount(self.total_value()),
            Measure::Dpi => MeasureValue::Ratio(self.dpi()),
            Measure::Rvpi => MeasureValue::Ratio(self.rvpi()),
        }
    }

    /// Like [`Performance::get_measure`] but fails on an undefined ratio.
    fn checked_measure(&self, measure: Measure) -> PerfResult<MeasureValue> {
        let value = self.get_measure(measure);
        if value.is_undefined() {
            return Err(PerformanceError::undefined_ratio(measure.name()));
        }
        Ok(value)
    }

    /// One row with a cell per requested measure.
    fn to_row(&self, columns: &[Measure]) -> MeasureRow {
        let mut row = MeasureRow::new();
        for measure in columns {
            row.push(*measure, self.get_measure(*measure));
        }
        row
    }
}

/// MOIC, DPI and RVPI of one set of base items.
///
/// Leaf and aggregate results memoize this once alongside their base items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Multiples {
    pub(crate) moic: f64,
    pub(crate) dpi: f64,
    pub(crate) rvpi: f64,
}

impl Multiples {
    pub(crate) fn of(pnl: Decimal, cost: Decimal, distributions: Decimal) -> Self {
        let moic = pnl.checked_div(cost.abs()).map(|r| Decimal::ONE + r);
        let dpi = (-distributions).checked_div(cost);
        Self {
            moic: to_ratio(moic),
            dpi: to_ratio(dpi),
            rvpi: to_ratio(moic.zip(dpi).map(|(m, d)| m - d)),
        }
    }
}

/// Converts an optional decimal ratio; `None` (zero denominator) is `NaN`.
pub(crate) fn to_ratio(value: Option<Decimal>) -> f64 {
    value.and_then(|v| v.to_f64()).unwrap_or(f64::NAN)
}

/// `pnl / |cost|` when `pnl < 0`, else zero.
pub(crate) fn leaf_loss_ratio(pnl: Decimal, cost: Decimal) -> f64 {
    if pnl < Decimal::ZERO {
        to_ratio(pnl.checked_div(cost.abs()))
    } else {
        0.0
    }
}

/// Solves the IRR of dated amounts, seeding the guess from the sign of `pnl`.
///
/// A flow set with no inflows is a total loss (-100%). Any other solver
/// failure yields `NaN`.
pub(crate) fn solve_irr(
    label: &str,
    flows: &[(Date, Decimal)],
    pnl: Decimal,
    config: &IrrConfig,
) -> f64 {
    let Some(origin) = flows.iter().map(|(d, _)| *d).min() else {
        debug!(result = label, "IRR undefined for empty cashflows");
        return f64::NAN;
    };

    let points: Vec<(f64, f64)> = flows
        .iter()
        .map(|(date, amount)| {
            (
                origin.year_fraction(date, config.day_basis),
                amount.to_f64().unwrap_or(f64::NAN),
            )
        })
        .collect();

    let guess = if pnl > Decimal::ZERO { 0.1 } else { -0.1 };

    match xirr(&points, guess, config) {
        Ok(rate) => rate,
        Err(e) if e.is_total_loss() => -1.0,
        Err(e) => {
            warn!(result = label, error = %e, "IRR did not converge");
            f64::NAN
        }
    }
}
