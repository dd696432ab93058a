//! Bounded bracket expansion.

use crate::error::MathError;
use crate::solvers::check_finite;

/// An interval `[lo, hi]` with its objective values.
///
/// When produced by [`expand_bracket`] the endpoint values straddle zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    /// Lower end.
    pub lo: f64,
    /// Upper end.
    pub hi: f64,
    /// Objective at `lo`.
    pub f_lo: f64,
    /// Objective at `hi`.
    pub f_hi: f64,
    /// Number of expansions that were needed.
    pub expansions: u32,
}

impl Bracket {
    /// Returns true if the endpoint values have opposite signs (or one is zero).
    #[must_use]
    pub fn straddles(&self) -> bool {
        self.f_lo * self.f_hi <= 0.0
    }
}

/// How to widen a bracket that does not straddle a root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BracketExpansion {
    /// For strictly positive unknowns: `hi *= factor`, `lo /= factor`.
    Geometric {
        /// Growth factor, > 1.
        factor: f64,
    },
    /// Both ends move outward by the current width; `lo` never goes below
    /// `floor`.
    Symmetric {
        /// Optional lower limit for `lo`.
        floor: Option<f64>,
    },
}

/// Widens `[lo, hi]` until the objective changes sign.
///
/// Endpoints are only re-evaluated when they move. Fails with
/// [`MathError::BracketNotFound`] after `max_expansions` unsuccessful widenings.
///
/// # Example
///
/// ```rust
/// use bermuda_math::solvers::{expand_bracket, BracketExpansion};
/// use bermuda_math::MathError;
///
/// let mut f = |x: f64| Ok::<f64, MathError>(x - 7.0);
/// let b = expand_bracket(&mut f, -1.0, 1.0, BracketExpansion::Symmetric { floor: None }, 10).unwrap();
/// assert!(b.lo <= 7.0 && b.hi >= 7.0);
/// assert_eq!(b.expansions, 2);
/// ```
#[allow(clippy::float_cmp)]
pub fn expand_bracket<F, E>(
    f: &mut F,
    lo: f64,
    hi: f64,
    policy: BracketExpansion,
    max_expansions: u32,
) -> Result<Bracket, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<MathError>,
{
    if !(lo < hi) {
        return Err(MathError::invalid_input(format!("bracket [{lo}, {hi}] is empty")).into());
    }
    if let BracketExpansion::Geometric { factor } = policy {
        if lo <= 0.0 || factor <= 1.0 {
            return Err(MathError::invalid_input(
                "geometric expansion needs lo > 0 and factor > 1",
            )
            .into());
        }
    }

    let mut bracket = Bracket {
        lo,
        hi,
        f_lo: check_finite(lo, f(lo)?)?,
        f_hi: check_finite(hi, f(hi)?)?,
        expansions: 0,
    };

    while !bracket.straddles() {
        if bracket.expansions >= max_expansions {
            return Err(MathError::BracketNotFound {
                lo: bracket.lo,
                hi: bracket.hi,
                expansions: bracket.expansions,
            }
            .into());
        }

        let (new_lo, new_hi) = match policy {
            BracketExpansion::Geometric { factor } => (bracket.lo / factor, bracket.hi * factor),
            BracketExpansion::Symmetric { floor } => {
                let width = bracket.hi - bracket.lo;
                let lo = bracket.lo - width;
                (floor.map_or(lo, |fl| lo.max(fl)), bracket.hi + width)
            }
        };

        if new_lo != bracket.lo {
            bracket.lo = new_lo;
            bracket.f_lo = check_finite(new_lo, f(new_lo)?)?;
        }
        bracket.hi = new_hi;
        bracket.f_hi = check_finite(new_hi, f(new_hi)?)?;
        bracket.expansions += 1;

        log::trace!(
            "bracket expansion {}: [{:.6e}, {:.6e}] -> f = ({:.3e}, {:.3e})",
            bracket.expansions,
            bracket.lo,
            bracket.hi,
            bracket.f_lo,
            bracket.f_hi
        );
    }

    Ok(bracket)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_straddles() {
        let mut f = |x: f64| Ok::<f64, MathError>(x);
        let b = expand_bracket(&mut f, -1.0, 1.0, BracketExpansion::Symmetric { floor: None }, 5).unwrap();
        assert_eq!(b.expansions, 0);
    }

    #[test]
    fn test_geometric_finds_small_root() {
        let mut f = |x: f64| Ok::<f64, MathError>(x - 1e-4);
        let b = expand_bracket(&mut f, 0.01, 0.02, BracketExpansion::Geometric { factor: 2.0 }, 20).unwrap();
        assert!(b.lo <= 1e-4 && b.hi >= 1e-4);
        assert!(b.lo > 0.0);
    }

    #[test]
    fn test_floor_respected() {
        let mut calls = Vec::new();
        let mut f = |x: f64| {
            calls.push(x);
            Ok::<f64, MathError>(x + 5.0)
        };
        let result = expand_bracket(
            &mut f,
            -0.5,
            0.5,
            BracketExpansion::Symmetric { floor: Some(-0.9) },
            6,
        );
        assert!(matches!(result, Err(MathError::BracketNotFound { expansions: 6, .. })));
        assert!(calls.iter().all(|&x| x >= -0.9));
    }

    #[test]
    fn test_rejects_empty_interval() {
        let mut f = |x: f64| Ok::<f64, MathError>(x);
        assert!(expand_bracket(&mut f, 1.0, 1.0, BracketExpansion::Symmetric { floor: None }, 5).is_err());
    }
}
