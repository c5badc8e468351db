//! Money-weighted rate of return over irregularly dated cashflows.
//!
//! Flows are `(t, amount)` pairs where `t` is a time offset in years. The
//! offsets are measured from the earliest flow, so callers may pass any
//! common origin.

use serde::{Deserialize, Serialize};

use crate::error::{MathError, MathResult};
use crate::solvers::{hybrid, SolverConfig};

/// Settings for the IRR solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrrConfig {
    /// Absolute NPV tolerance.
    pub tolerance: f64,
    /// Iteration cap shared by Newton and Brent.
    pub max_iterations: u32,
    /// Lowest admissible rate (must stay above -1).
    pub lower_bound: f64,
    /// Highest admissible rate.
    pub upper_bound: f64,
    /// Days per year used when converting dates to year offsets.
    pub day_basis: f64,
}

impl Default for IrrConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            max_iterations: 200,
            lower_bound: -0.9999,
            upper_bound: 100.0,
            day_basis: 365.0,
        }
    }
}

impl IrrConfig {
    /// Sets the solver tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the admissible rate interval.
    #[must_use]
    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    /// Sets the day basis.
    #[must_use]
    pub fn with_day_basis(mut self, day_basis: f64) -> Self {
        self.day_basis = day_basis;
        self
    }

    /// Root-finder settings derived from this configuration.
    #[must_use]
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig::new(self.tolerance, self.max_iterations)
    }

    /// Checks the configuration is usable.
    pub fn validate(&self) -> MathResult<()> {
        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            return Err(MathError::invalid_input("IRR tolerance must be positive"));
        }
        if self.max_iterations == 0 {
            return Err(MathError::invalid_input("IRR max_iterations must be non-zero"));
        }
        if self.lower_bound <= -1.0 || self.lower_bound >= self.upper_bound {
            return Err(MathError::invalid_input(format!(
                "IRR bounds must satisfy -1 < lower < upper, got [{}, {}]",
                self.lower_bound, self.upper_bound
            )));
        }
        if self.day_basis.is_nan() || self.day_basis <= 0.0 {
            return Err(MathError::invalid_input("IRR day basis must be positive"));
        }
        Ok(())
    }
}

/// Net present value of `flows` at `rate`.
pub fn npv(flows: &[(f64, f64)], rate: f64) -> f64 {
    let origin = earliest(flows);
    flows
        .iter()
        .map(|(t, amount)| amount / (1.0 + rate).powf(t - origin))
        .sum()
}

/// First derivative of [`npv`] with respect to the rate.
pub fn npv_derivative(flows: &[(f64, f64)], rate: f64) -> f64 {
    let origin = earliest(flows);
    flows
        .iter()
        .map(|(t, amount)| {
            let dt = t - origin;
            -dt * amount / (1.0 + rate).powf(dt + 1.0)
        })
        .sum()
}

fn earliest(flows: &[(f64, f64)]) -> f64 {
    flows.iter().map(|(t, _)| *t).fold(f64::INFINITY, f64::min)
}

/// Solves for the rate at which the NPV of `flows` is zero.
///
/// Errors with [`MathError::NoSignChange`] when every non-zero flow has the
/// same sign; the `"outflows"` case is a total loss and callers usually map
/// it to -100%.
///
/// # Example
///
/// ```rust
/// use rollup_math::irr::{xirr, IrrConfig};
///
/// // Invest 100, get 121 back two years later.
/// let flows = [(0.0, -100.0), (2.0, 121.0)];
/// let rate = xirr(&flows, 0.1, &IrrConfig::default()).unwrap();
/// assert!((rate - 0.10).abs() < 1e-8);
/// ```
pub fn xirr(flows: &[(f64, f64)], guess: f64, config: &IrrConfig) -> MathResult<f64> {
    if flows.is_empty() {
        return Err(MathError::insufficient_data(2, 0));
    }
    if flows.iter().any(|(t, a)| !t.is_finite() || !a.is_finite()) {
        return Err(MathError::invalid_input("cashflows must be finite"));
    }

    let has_inflow = flows.iter().any(|(_, a)| *a > 0.0);
    let has_outflow = flows.iter().any(|(_, a)| *a < 0.0);
    match (has_inflow, has_outflow) {
        (false, true) => return Err(MathError::NoSignChange { direction: "outflows" }),
        (true, false) => return Err(MathError::NoSignChange { direction: "inflows" }),
        (false, false) => return Err(MathError::insufficient_data(2, 0)),
        (true, true) => {}
    }

    let guess = guess.max(config.lower_bound).min(config.upper_bound);
    let result = hybrid(
        |r| npv(flows, r),
        |r| npv_derivative(flows, r),
        guess,
        Some((config.lower_bound, config.upper_bound)),
        &config.solver_config(),
    )?;

    Ok(result.root)
}
