//! Curve bumping for scenario re-pricing.
//!
//! Bumps shift the continuously-compounded zero rate and materialise a new
//! [`DiscountCurve`]; the base curve is never mutated.

use crate::discount::DiscountCurve;
use crate::error::{CurveError, CurveResult};

/// A parallel (uniform) zero-rate shift.
///
/// # Example
///
/// ```rust
/// use bermuda_curves::bumping::ParallelBump;
///
/// let (up, down) = ParallelBump::symmetric(1.0);
/// assert_eq!(up.shift_bps(), 1.0);
/// assert_eq!(down.shift_decimal(), -0.0001);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallelBump {
    shift_bps: f64,
}

impl ParallelBump {
    /// Creates a new parallel bump of `shift_bps` basis points.
    #[must_use]
    pub fn new(shift_bps: f64) -> Self {
        Self { shift_bps }
    }

    /// Creates symmetric up/down bumps for central differences.
    ///
    /// Returns `(up, down)`.
    #[must_use]
    pub fn symmetric(half_shift_bps: f64) -> (Self, Self) {
        (Self::new(half_shift_bps), Self::new(-half_shift_bps))
    }

    /// Returns the shift in basis points.
    #[must_use]
    pub fn shift_bps(&self) -> f64 {
        self.shift_bps
    }

    /// Returns the shift as a decimal (0.0001 = 1bp).
    #[must_use]
    pub fn shift_decimal(&self) -> f64 {
        self.shift_bps / 10_000.0
    }

    /// Returns the bumped curve: `P'(t) = P(t) e^{-s t}`.
    pub fn apply(&self, curve: &DiscountCurve) -> CurveResult<DiscountCurve> {
        if !self.shift_bps.is_finite() {
            return Err(CurveError::invalid_bump(format!(
                "parallel shift {} is not finite",
                self.shift_bps
            )));
        }
        let s = self.shift_decimal();
        curve.shifted(|_| s)
    }
}

impl Default for ParallelBump {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// A linear slope shift between two pivot maturities.
///
/// The zero rate moves by `-shift` at and before the short pivot, by
/// `+shift` at and beyond the long pivot, and linearly in between, so a
/// positive bump steepens the curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwistBump {
    shift_bps: f64,
    short_pivot: f64,
    long_pivot: f64,
}

impl TwistBump {
    /// Creates a twist with pivots in years.
    ///
    /// # Errors
    ///
    /// `CurveError::InvalidBump` unless `0 <= short_pivot < long_pivot`.
    pub fn new(shift_bps: f64, short_pivot: f64, long_pivot: f64) -> CurveResult<Self> {
        if !(short_pivot >= 0.0 && long_pivot > short_pivot && shift_bps.is_finite()) {
            return Err(CurveError::invalid_bump(format!(
                "twist needs 0 <= short < long pivot, got {short_pivot}/{long_pivot} ({shift_bps}bp)"
            )));
        }
        Ok(Self {
            shift_bps,
            short_pivot,
            long_pivot,
        })
    }

    /// Same pivots, opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            shift_bps: -self.shift_bps,
            ..*self
        }
    }

    /// Returns the shift in basis points at the long end.
    #[must_use]
    pub fn shift_bps(&self) -> f64 {
        self.shift_bps
    }

    /// Zero-rate shift (decimal) at time `t`.
    #[must_use]
    pub fn shift_at(&self, t: f64) -> f64 {
        let w = 2.0 * (t - self.short_pivot) / (self.long_pivot - self.short_pivot) - 1.0;
        self.shift_bps / 10_000.0 * w.clamp(-1.0, 1.0)
    }

    /// Returns the twisted curve.
    pub fn apply(&self, curve: &DiscountCurve) -> CurveResult<DiscountCurve> {
        curve.shifted(|t| self.shift_at(t))
    }
}
