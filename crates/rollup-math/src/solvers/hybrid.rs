//! Hybrid root-finding algorithm.
//!
//! Combines Newton-Raphson with Brent's method for robust convergence.

use log::debug;

use crate::error::{MathError, MathResult};
use crate::solvers::{brent, SolverConfig, SolverResult};

/// Divergent Newton steps tolerated before switching to Brent.
const MAX_DIVERGENCE: u32 = 3;

/// Hybrid root-finding algorithm.
///
/// Starts with Newton-Raphson and falls back to Brent's method if Newton
/// diverges, hits a flat derivative, or leaves the real line. When no
/// bracket is supplied one is searched for around the initial guess.
///
/// # Example
///
/// ```rust
/// use rollup_math::solvers::{hybrid, SolverConfig};
///
/// let npv = |r: f64| -100.0 + 50.0 / (1.0 + r) + 70.0 / (1.0 + r).powi(2);
/// let d_npv = |r: f64| -50.0 / (1.0 + r).powi(2) - 140.0 / (1.0 + r).powi(3);
///
/// let result = hybrid(npv, d_npv, 0.1, Some((-0.5, 1.0)), &SolverConfig::default()).unwrap();
/// assert!(npv(result.root).abs() < 1e-10);
/// ```
pub fn hybrid<F, DF>(
    f: F,
    df: DF,
    initial_guess: f64,
    bounds: Option<(f64, f64)>,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
    DF: Fn(f64) -> f64,
{
    match newton_with_monitoring(&f, &df, initial_guess, bounds, config) {
        Ok(result) => Ok(result),
        Err(newton_err) => {
            debug!(
                "Newton-Raphson failed from guess {initial_guess}: {newton_err}; \
                 falling back to Brent"
            );
            let (a, b) = match bounds {
                Some((lo, hi)) => find_bracket(&f, initial_guess, lo, hi).unwrap_or((lo, hi)),
                None => find_bracket(&f, initial_guess, f64::MIN, f64::MAX).ok_or_else(|| {
                    MathError::invalid_input(
                        "Newton-Raphson failed and could not find bracketing interval for Brent",
                    )
                })?,
            };
            brent(&f, a, b, config)
        }
    }
}

/// Newton-Raphson that gives up early on divergence or on leaving `bounds`.
fn newton_with_monitoring<F, DF>(
    f: &F,
    df: &DF,
    initial_guess: f64,
    bounds: Option<(f64, f64)>,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
    DF: Fn(f64) -> f64,
{
    let mut x = initial_guess;
    let mut prev_residual = f64::MAX;
    let mut divergence_count = 0;

    // Fail fast: Brent is the safety net.
    let newton_max_iter = config.max_iterations.min(20);

    for iteration in 0..newton_max_iter {
        let fx = f(x);
        let residual = fx.abs();

        if residual < config.tolerance {
            return Ok(SolverResult {
                root: x,
                iterations: iteration,
                residual: fx,
            });
        }

        if residual > prev_residual * 2.0 {
            divergence_count += 1;
            if divergence_count >= MAX_DIVERGENCE {
                return Err(MathError::invalid_input("Newton-Raphson diverging"));
            }
        } else {
            divergence_count = 0;
        }
        prev_residual = residual;

        let dfx = df(x);
        if dfx.abs() < 1e-15 || !dfx.is_finite() {
            return Err(MathError::DivisionByZero { value: dfx });
        }

        let step = fx / dfx;
        x -= step;

        if !x.is_finite() {
            return Err(MathError::invalid_input("Newton produced non-finite value"));
        }
        if let Some((lo, hi)) = bounds {
            if x <= lo.min(hi) || x >= lo.max(hi) {
                return Err(MathError::invalid_input("Newton left the search interval"));
            }
        }

        if step.abs() < config.tolerance {
            return Ok(SolverResult {
                root: x,
                iterations: iteration + 1,
                residual: f(x),
            });
        }
    }

    Err(MathError::convergence_failed(newton_max_iter, f(x).abs()))
}

/// Looks for a sign change of `f` around `initial_guess` within `[lower, upper]`.
///
/// Expands outward from the guess with doubling steps, clamped to the
/// interval. Returns the tightest bracket found first.
pub fn find_bracket<F>(f: &F, initial_guess: f64, lower: f64, upper: f64) -> Option<(f64, f64)>
where
    F: Fn(f64) -> f64,
{
    let (lower, upper) = (lower.min(upper), lower.max(upper));
    let guess = initial_guess.clamp(lower, upper);
    let f_guess = f(guess);
    if !f_guess.is_finite() {
        return None;
    }

    let mut left = guess;
    let mut right = guess;
    let mut f_left = f_guess;
    let mut f_right = f_guess;
    let mut delta = 0.05;

    for _ in 0..60 {
        let next_left = (left - delta).max(lower);
        let next_right = (right + delta).min(upper);

        let f_next_left = f(next_left);
        if f_next_left.is_finite() && f_next_left * f_left <= 0.0 && next_left < left {
            return Some((next_left, left));
        }
        let f_next_right = f(next_right);
        if f_next_right.is_finite() && f_next_right * f_right <= 0.0 && next_right > right {
            return Some((right, next_right));
        }

        if f_next_left.is_finite() {
            left = next_left;
            f_left = f_next_left;
        }
        if f_next_right.is_finite() {
            right = next_right;
            f_right = f_next_right;
        }
        if left <= lower && right >= upper {
            break;
        }

        delta *= 2.0;
    }

    None
}
