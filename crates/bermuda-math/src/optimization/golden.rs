//! Golden-section search.

use crate::error::MathError;
use crate::optimization::MinimizeResult;
use crate::solvers::check_finite;

const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Golden-section search on an infallible objective.
///
/// # Example
///
/// ```rust
/// use bermuda_math::optimization::golden_section;
///
/// let r = golden_section(|x| (x - 0.2).powi(2), 0.0, 1.0, 1e-8, 200).unwrap();
/// assert!((r.x - 0.2).abs() < 1e-6);
/// ```
pub fn golden_section<F>(
    f: F,
    a: f64,
    b: f64,
    tolerance: f64,
    max_iterations: u32,
) -> Result<MinimizeResult, MathError>
where
    F: Fn(f64) -> f64,
{
    try_golden_section(|x| Ok::<f64, MathError>(f(x)), a, b, tolerance, max_iterations)
}

/// Golden-section search for the minimum of a unimodal objective on `[a, b]`.
///
/// Stops when the interval is narrower than `tolerance` or after
/// `max_iterations`; in the latter case the best point found is returned
/// with `converged = false`.
pub fn try_golden_section<F, E>(
    mut f: F,
    a: f64,
    b: f64,
    tolerance: f64,
    max_iterations: u32,
) -> Result<MinimizeResult, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<MathError>,
{
    if !(a < b) {
        return Err(MathError::invalid_input(format!("interval [{a}, {b}] is empty")).into());
    }

    let (mut lo, mut hi) = (a, b);
    let mut x1 = hi - INV_PHI * (hi - lo);
    let mut x2 = lo + INV_PHI * (hi - lo);
    let mut f1 = check_finite(x1, f(x1)?)?;
    let mut f2 = check_finite(x2, f(x2)?)?;

    for iteration in 1..=max_iterations {
        if hi - lo <= tolerance {
            let (x, value) = if f1 <= f2 { (x1, f1) } else { (x2, f2) };
            return Ok(MinimizeResult {
                x,
                value,
                iterations: iteration,
                converged: true,
            });
        }

        if f1 <= f2 {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - INV_PHI * (hi - lo);
            f1 = check_finite(x1, f(x1)?)?;
        } else {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + INV_PHI * (hi - lo);
            f2 = check_finite(x2, f(x2)?)?;
        }
    }

    let (x, value) = if f1 <= f2 { (x1, f1) } else { (x2, f2) };
    Ok(MinimizeResult {
        x,
        value,
        iterations: max_iterations,
        converged: hi - lo <= tolerance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quadratic() {
        let r = golden_section(|x| 3.0 * (x - 1.7).powi(2) + 2.0, -5.0, 5.0, 1e-9, 500).unwrap();
        assert!(r.converged);
        assert_relative_eq!(r.x, 1.7, epsilon = 1e-6);
        assert_relative_eq!(r.value, 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_minimum_at_boundary() {
        let r = golden_section(|x| x, 0.001, 0.5, 1e-8, 500).unwrap();
        assert!(r.x < 0.001 + 1e-6);
    }

    #[test]
    fn test_iteration_cap_returns_best() {
        let r = golden_section(|x| (x - 0.3).powi(2), 0.0, 1.0, 1e-12, 5).unwrap();
        assert!(!r.converged);
        assert!((r.x - 0.3).abs() < 0.1);
    }
}
