//! Root-finding algorithms.
//!
//! - [`brent`]: Bracketing method, guaranteed to converge on a sign change
//! - [`hybrid`]: Monitored Newton-Raphson with Brent fallback
//!
//! | Solver | Speed | Reliability | Requires |
//! |--------|-------|-------------|----------|
//! | Brent | Fast (superlinear) | Guaranteed | Bracket |
//! | Hybrid | Fastest when Newton holds | Guaranteed* | Derivative, initial guess |
//!
//! *When a bracket is supplied or can be located inside the search domain.
//!
//! # Example: rate of return on a two-flow investment
//!
//! ```rust
//! use rollup_math::solvers::{hybrid, SolverConfig};
//!
//! // Pay 100 today, receive 121 in two years: the rate is 10%.
//! let npv = |r: f64| -100.0 + 121.0 / (1.0 + r).powi(2);
//! let d_npv = |r: f64| -2.0 * 121.0 / (1.0 + r).powi(3);
//!
//! let result = hybrid(npv, d_npv, 0.05, Some((-0.5, 1.0)), &SolverConfig::default()).unwrap();
//! assert!((result.root - 0.10).abs() < 1e-10);
//! ```

mod brent;
mod hybrid;

pub use brent::brent;
pub use hybrid::{find_bracket, hybrid};

use serde::{Deserialize, Serialize};

/// Default tolerance for root-finding algorithms.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default maximum iterations for root-finding algorithms.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Configuration for root-finding algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Tolerance for convergence.
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration.
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Sets the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Result of a root-finding iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverResult {
    /// The root found.
    pub root: f64,
    /// Number of iterations used.
    pub iterations: u32,
    /// Final residual (function value at root).
    pub residual: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_solver_config() {
        let config = SolverConfig::default()
            .with_tolerance(1e-8)
            .with_max_iterations(50);

        assert!((config.tolerance - 1e-8).abs() < f64::EPSILON);
        assert_eq!(config.max_iterations, 50);
    }

    /// Annual-period NPV of a flow schedule at rate `r`.
    fn npv(flows: &[f64], r: f64) -> f64 {
        flows
            .iter()
            .enumerate()
            .map(|(t, cf)| cf / (1.0 + r).powi(t as i32))
            .sum()
    }

    fn d_npv(flows: &[f64], r: f64) -> f64 {
        flows
            .iter()
            .enumerate()
            .map(|(t, cf)| -(t as f64) * cf / (1.0 + r).powi(t as i32 + 1))
            .sum()
    }

    #[test]
    fn test_brent_and_hybrid_agree_on_fund_irr() {
        // Two calls, an interim distribution, then a residual value.
        let flows = [-100.0, -50.0, 40.0, 30.0, 130.0];
        let config = SolverConfig::default();

        let brent_result = brent(|r| npv(&flows, r), -0.5, 1.0, &config).unwrap();
        let hybrid_result = hybrid(
            |r| npv(&flows, r),
            |r| d_npv(&flows, r),
            0.1,
            Some((-0.5, 1.0)),
            &config,
        )
        .unwrap();

        assert_relative_eq!(brent_result.root, hybrid_result.root, epsilon = 1e-8);
        assert!(npv(&flows, hybrid_result.root).abs() < 1e-8);
    }

    #[test]
    fn test_hybrid_needs_no_more_iterations_than_brent() {
        let flows = [-100.0, 10.0, 10.0, 110.0];
        let config = SolverConfig::default();

        let hybrid_result =
            hybrid(|r| npv(&flows, r), |r| d_npv(&flows, r), 0.05, None, &config).unwrap();
        let brent_result = brent(|r| npv(&flows, r), 0.0, 0.5, &config).unwrap();

        assert_relative_eq!(hybrid_result.root, 0.10, epsilon = 1e-9);
        assert!(hybrid_result.iterations <= brent_result.iterations);
    }
}
