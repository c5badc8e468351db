//! Leaf performance result over one cashflow set.

use once_cell::sync::OnceCell;
use rust_decimal::Decimal;

use rollup_core::{CashflowKind, CashflowSet};
use rollup_math::IrrConfig;

use crate::error::{PerfResult, PerformanceError};
use crate::performance::{leaf_loss_ratio, solve_irr, Multiples, Performance};

/// Base items set independently of the cashflows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Overrides {
    cost: Option<Decimal>,
    distributions: Option<Decimal>,
    nav: Option<Decimal>,
}

impl Overrides {
    fn any(&self) -> bool {
        self.cost.is_some() || self.distributions.is_some() || self.nav.is_some()
    }
}

/// Measures computed on first access.
#[derive(Debug, Clone, Default)]
struct Cache {
    cost: OnceCell<Decimal>,
    distributions: OnceCell<Decimal>,
    nav: OnceCell<Decimal>,
    pnl: OnceCell<Decimal>,
    loss_ratio: OnceCell<f64>,
    irr: OnceCell<f64>,
    multiples: OnceCell<Multiples>,
}

impl Cache {
    fn is_empty(&self) -> bool {
        self.cost.get().is_none()
            && self.distributions.get().is_none()
            && self.nav.get().is_none()
            && self.pnl.get().is_none()
            && self.loss_ratio.get().is_none()
            && self.irr.get().is_none()
            && self.multiples.get().is_none()
    }
}

/// Performance of exactly one cashflow set.
///
/// Every measure is computed lazily and memoized for the lifetime of the
/// instance; repeated reads return the same bits without recomputation.
///
/// # Example
///
/// ```rust
/// use rollup_core::{CashflowKind, CashflowRecord, CashflowSet, Date};
/// use rollup_performance::prelude::*;
/// use rust_decimal_macros::dec;
///
/// let as_of = Date::from_ymd(2024, 12, 31).unwrap();
/// let set = CashflowSet::new(vec![
///     CashflowRecord::new(
///         Date::from_ymd(2020, 1, 1).unwrap(),
///         CashflowKind::Takedown,
///         dec!(-100),
///         as_of,
///     ),
///     CashflowRecord::new(
///         Date::from_ymd(2022, 6, 30).unwrap(),
///         CashflowKind::Distribution,
///         dec!(40),
///         as_of,
///     ),
///     CashflowRecord::new(as_of, CashflowKind::ResidualValue, dec!(90), as_of),
/// ]);
///
/// let result = PerformanceResult::new(set, "ITD");
/// assert_eq!(result.pnl(), dec!(30));
/// assert!((result.moic() - 1.3).abs() < 1e-12);
/// assert!((result.dpi() - 0.4).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct PerformanceResult {
    cashflows: CashflowSet,
    interval: String,
    overrides: Overrides,
    irr_config: IrrConfig,
    cache: Cache,
}

impl PerformanceResult {
    /// Wraps a cashflow set tagged with its aggregation interval.
    #[must_use]
    pub fn new(cashflows: CashflowSet, interval: impl Into<String>) -> Self {
        Self {
            cashflows,
            interval: interval.into(),
            overrides: Overrides::default(),
            irr_config: IrrConfig::default(),
            cache: Cache::default(),
        }
    }

    /// Uses `config` for the IRR solve.
    #[must_use]
    pub fn with_irr_config(mut self, config: IrrConfig) -> Self {
        self.irr_config = config;
        self.cache = Cache::default();
        self
    }

    /// Overrides the cost base item.
    #[must_use]
    pub fn with_cost(mut self, cost: Decimal) -> Self {
        self.overrides.cost = Some(cost);
        self.cache = Cache::default();
        self
    }

    /// Overrides the distributions base item.
    #[must_use]
    pub fn with_distributions(mut self, distributions: Decimal) -> Self {
        self.overrides.distributions = Some(distributions);
        self.cache = Cache::default();
        self
    }

    /// Overrides the NAV base item.
    #[must_use]
    pub fn with_nav(mut self, nav: Decimal) -> Self {
        self.overrides.nav = Some(nav);
        self.cache = Cache::default();
        self
    }

    /// Overrides cost on an instance whose measures have not been read.
    pub fn set_cost(&mut self, cost: Decimal) -> PerfResult<()> {
        self.ensure_uncomputed("cost")?;
        self.overrides.cost = Some(cost);
        Ok(())
    }

    /// Overrides distributions on an instance whose measures have not been read.
    pub fn set_distributions(&mut self, distributions: Decimal) -> PerfResult<()> {
        self.ensure_uncomputed("distributions")?;
        self.overrides.distributions = Some(distributions);
        Ok(())
    }

    /// Overrides NAV on an instance whose measures have not been read.
    pub fn set_nav(&mut self, nav: Decimal) -> PerfResult<()> {
        self.ensure_uncomputed("nav")?;
        self.overrides.nav = Some(nav);
        Ok(())
    }

    fn ensure_uncomputed(&self, item: &'static str) -> PerfResult<()> {
        if self.cache.is_empty() {
            Ok(())
        } else {
            Err(PerformanceError::AlreadyComputed { item })
        }
    }

    /// The underlying cashflows.
    #[must_use]
    pub fn cashflows(&self) -> &CashflowSet {
        &self.cashflows
    }

    /// The aggregation interval tag.
    #[must_use]
    pub fn interval(&self) -> &str {
        &self.interval
    }

    /// The IRR solver settings.
    #[must_use]
    pub fn irr_config(&self) -> &IrrConfig {
        &self.irr_config
    }

    /// Returns true when any base item is overridden.
    #[must_use]
    pub fn is_overridden(&self) -> bool {
        self.overrides.any()
    }

    fn multiples(&self) -> Multiples {
        *self
            .cache
            .multiples
            .get_or_init(|| Multiples::of(self.pnl(), self.cost(), self.distributions()))
    }
}

impl Performance for PerformanceResult {
    fn cost(&self) -> Decimal {
        *self.cache.cost.get_or_init(|| {
            self.overrides
                .cost
                .unwrap_or_else(|| -self.cashflows.sum_of(CashflowKind::Takedown).abs())
        })
    }

    fn distributions(&self) -> Decimal {
        *self.cache.distributions.get_or_init(|| {
            self.overrides
                .distributions
                .unwrap_or_else(|| self.cashflows.sum_of(CashflowKind::Distribution))
        })
    }

    fn nav(&self) -> Decimal {
        *self.cache.nav.get_or_init(|| {
            self.overrides
                .nav
                .unwrap_or_else(|| self.cashflows.sum_of(CashflowKind::ResidualValue))
        })
    }

    fn pnl(&self) -> Decimal {
        *self.cache.pnl.get_or_init(|| {
            if self.overrides.any() {
                self.cost()
                    + self.distributions()
                    + self.nav()
                    + self.cashflows.sum_of(CashflowKind::Other)
            } else {
                self.cashflows.total()
            }
        })
    }

    fn loss_ratio(&self) -> f64 {
        *self
            .cache
            .loss_ratio
            .get_or_init(|| leaf_loss_ratio(self.pnl(), self.cost()))
    }

    fn irr(&self) -> f64 {
        *self.cache.irr.get_or_init(|| {
            solve_irr(
                &self.interval,
                &self.cashflows.dated_amounts(),
                self.pnl(),
                &self.irr_config,
            )
        })
    }

    fn full_expanded_count(&self) -> usize {
        1
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
