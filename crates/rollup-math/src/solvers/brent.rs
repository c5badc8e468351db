//! Brent's root-finding algorithm.

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult};

/// Brent's root-finding algorithm.
///
/// Brent-Dekker iteration: inverse quadratic or secant steps while they
/// shrink the bracket fast enough, bisection otherwise. Requires
/// `f(a) * f(b) <= 0`; the endpoints may be given in either order.
///
/// # Example
///
/// ```rust
/// use rollup_math::solvers::{brent, SolverConfig};
///
/// let npv = |r: f64| -100.0 + 60.0 / (1.0 + r) + 60.0 / (1.0 + r).powi(2);
///
/// let result = brent(npv, 0.0, 0.5, &SolverConfig::default()).unwrap();
/// assert!(npv(result.root).abs() < 1e-10);
/// ```
pub fn brent<F>(f: F, a: f64, b: f64, config: &SolverConfig) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
{
    let (fa, fb) = (f(a), f(b));
    if fa * fb > 0.0 {
        return Err(MathError::InvalidBracket { a, b, fa, fb });
    }

    // `best` is the current estimate, `prev` the one before it, and the root
    // always lies between `best` and `contra`.
    let (mut prev, mut f_prev) = (a, fa);
    let (mut best, mut f_best) = (b, fb);
    let (mut contra, mut f_contra) = (a, fa);
    let mut step = best - prev;
    let mut last_step = step;

    for iteration in 0..config.max_iterations {
        if f_best * f_contra > 0.0 {
            contra = prev;
            f_contra = f_prev;
            step = best - prev;
            last_step = step;
        }
        if f_contra.abs() < f_best.abs() {
            prev = best;
            best = contra;
            contra = prev;
            f_prev = f_best;
            f_best = f_contra;
            f_contra = f_prev;
        }

        let tol = 2.0 * f64::EPSILON * best.abs() + 0.5 * config.tolerance;
        let half_width = 0.5 * (contra - best);
        if f_best.abs() < config.tolerance || half_width.abs() <= tol {
            return Ok(SolverResult {
                root: best,
                iterations: iteration,
                residual: f_best,
            });
        }

        if last_step.abs() >= tol && f_prev.abs() > f_best.abs() {
            let (p, q) = interpolation_step(
                (prev, f_prev),
                (best, f_best),
                (contra, f_contra),
                half_width,
            );
            let limit = (3.0 * half_width * q - (tol * q).abs()).min((last_step * q).abs());
            if 2.0 * p < limit {
                last_step = step;
                step = p / q;
            } else {
                step = half_width;
                last_step = step;
            }
        } else {
            step = half_width;
            last_step = step;
        }

        prev = best;
        f_prev = f_best;
        best += if step.abs() > tol {
            step
        } else {
            tol.copysign(half_width)
        };
        f_best = f(best);
    }

    Err(MathError::convergence_failed(config.max_iterations, f_best.abs()))
}

/// Secant (two distinct points) or inverse quadratic (three) step as `p / q`,
/// with `p` made non-negative.
#[allow(clippy::float_cmp)]
fn interpolation_step(
    (prev, f_prev): (f64, f64),
    (best, f_best): (f64, f64),
    (contra, f_contra): (f64, f64),
    half_width: f64,
) -> (f64, f64) {
    let s = f_best / f_prev;
    let (p, q) = if prev == contra {
        (2.0 * half_width * s, 1.0 - s)
    } else {
        let q = f_prev / f_contra;
        let r = f_best / f_contra;
        (
            s * (2.0 * half_width * q * (q - r) - (best - prev) * (r - 1.0)),
            (q - 1.0) * (r - 1.0) * (s - 1.0),
        )
    };
    if p > 0.0 {
        (p, -q)
    } else {
        (-p, q)
    }
}
