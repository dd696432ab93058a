//! Safeguarded secant (bisection refined by secant steps).

use crate::error::MathError;
use crate::solvers::{check_finite, Bracket, SolverConfig, SolverResult};

/// Bracketed root search: secant steps, bisection whenever a step would
/// leave the interior of the bracket or the same endpoint has been kept
/// twice in a row.
///
/// The bracket only ever shrinks, so convergence is guaranteed for a
/// continuous objective; the secant step gives superlinear progress on
/// smooth ones such as option premia in volatility.
///
/// # Example
///
/// ```rust
/// use bermuda_math::solvers::{expand_bracket, try_bracketed_secant, BracketExpansion, SolverConfig};
/// use bermuda_math::MathError;
///
/// let mut f = |x: f64| Ok::<f64, MathError>(x.exp() - 3.0);
/// let bracket = expand_bracket(&mut f, 0.5, 1.0, BracketExpansion::Geometric { factor: 2.0 }, 10).unwrap();
/// let result = try_bracketed_secant(f, &bracket, &SolverConfig::default()).unwrap();
/// assert!((result.root - 3f64.ln()).abs() < 1e-9);
/// ```
pub fn try_bracketed_secant<F, E>(
    mut f: F,
    bracket: &Bracket,
    config: &SolverConfig,
) -> Result<SolverResult, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<MathError>,
{
    let (mut lo, mut hi) = (bracket.lo, bracket.hi);
    let (mut f_lo, mut f_hi) = (bracket.f_lo, bracket.f_hi);

    if f_lo * f_hi > 0.0 {
        return Err(MathError::InvalidBracket {
            a: lo,
            b: hi,
            fa: f_lo,
            fb: f_hi,
        }
        .into());
    }
    if f_lo.abs() <= config.tolerance {
        return Ok(SolverResult {
            root: lo,
            iterations: 0,
            residual: f_lo,
        });
    }
    if f_hi.abs() <= config.tolerance {
        return Ok(SolverResult {
            root: hi,
            iterations: 0,
            residual: f_hi,
        });
    }

    // +1 when lo was kept on the last step, -1 when hi was kept
    let mut kept = 0i32;

    for iteration in 1..=config.max_iterations {
        let (left, right) = (lo.min(hi), lo.max(hi));
        let margin = 1e-3 * (right - left);
        let secant = hi - f_hi * (hi - lo) / (f_hi - f_lo);

        let x = if kept.abs() >= 2
            || !secant.is_finite()
            || secant <= left + margin
            || secant >= right - margin
        {
            0.5 * (lo + hi)
        } else {
            secant
        };

        let fx = check_finite(x, f(x)?)?;

        if fx.abs() <= config.tolerance {
            return Ok(SolverResult {
                root: x,
                iterations: iteration,
                residual: fx,
            });
        }

        if (fx < 0.0) == (f_lo < 0.0) {
            lo = x;
            f_lo = fx;
            kept = if kept < 0 { kept - 1 } else { -1 };
        } else {
            hi = x;
            f_hi = fx;
            kept = if kept > 0 { kept + 1 } else { 1 };
        }

        if 0.5 * (hi - lo).abs() <= config.x_tolerance {
            return Ok(SolverResult {
                root: x,
                iterations: iteration,
                residual: fx,
            });
        }
    }

    let residual = f_lo.abs().min(f_hi.abs());
    Err(MathError::convergence_failed(config.max_iterations, residual).into())
}
