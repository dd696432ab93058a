//! Brent's root-finding algorithm.

use crate::error::{MathError, MathResult};
use crate::solvers::{check_finite, Bracket, SolverConfig, SolverResult};

/// Brent's method on an infallible objective.
///
/// Requires: `f(a) * f(b) <= 0`.
///
/// # Example
///
/// ```rust
/// use bermuda_math::solvers::{brent, SolverConfig};
///
/// let result = brent(|x: f64| x * x - 2.0, 1.0, 2.0, &SolverConfig::default()).unwrap();
/// assert!((result.root - std::f64::consts::SQRT_2).abs() < 1e-10);
/// ```
pub fn brent<F>(f: F, a: f64, b: f64, config: &SolverConfig) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
{
    try_brent(|x| Ok::<f64, MathError>(f(x)), a, b, config)
}

/// Brent's method on a fallible objective.
///
/// Errors returned by `f` abort the search and are passed through unchanged.
pub fn try_brent<F, E>(mut f: F, a: f64, b: f64, config: &SolverConfig) -> Result<SolverResult, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<MathError>,
{
    let fa = check_finite(a, f(a)?)?;
    let fb = check_finite(b, f(b)?)?;
    try_brent_in(
        f,
        &Bracket {
            lo: a,
            hi: b,
            f_lo: fa,
            f_hi: fb,
            expansions: 0,
        },
        config,
    )
}

/// Brent's method starting from an already evaluated bracket.
///
/// Used after [`expand_bracket`](crate::solvers::expand_bracket) so the
/// endpoint evaluations are not repeated.
#[allow(clippy::float_cmp)]
pub fn try_brent_in<F, E>(mut f: F, bracket: &Bracket, config: &SolverConfig) -> Result<SolverResult, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<MathError>,
{
    let (mut a, mut b) = (bracket.lo, bracket.hi);
    let (mut fa, mut fb) = (bracket.f_lo, bracket.f_hi);

    if fa * fb > 0.0 {
        return Err(MathError::InvalidBracket { a, b, fa, fb }.into());
    }
    if fa.abs() <= config.tolerance && fa.abs() < fb.abs() {
        return Ok(SolverResult {
            root: a,
            iterations: 0,
            residual: fa,
        });
    }

    let mut c = b;
    let mut fc = fb;
    let mut d = b - a;
    let mut e = d;

    for iteration in 0..config.max_iterations {
        // Keep the root between b and c
        if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        // b is the best estimate so far
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * config.x_tolerance;
        let xm = 0.5 * (c - b);

        if fb.abs() <= config.tolerance || xm.abs() <= tol1 || fb == 0.0 {
            return Ok(SolverResult {
                root: b,
                iterations: iteration,
                residual: fb,
            });
        }

        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                // Secant step
                (2.0 * xm * s, 1.0 - s)
            } else {
                // Inverse quadratic interpolation
                let q0 = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q0 * (q0 - r) - (b - a) * (r - 1.0)),
                    (q0 - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();

            let min1 = 3.0 * xm * q - (tol1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol1 { d } else { tol1.copysign(xm) };
        fb = check_finite(b, f(b)?)?;
    }

    Err(MathError::convergence_failed(config.max_iterations, fb.abs()).into())
}
