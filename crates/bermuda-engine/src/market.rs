//! Market snapshot consumed by the pipeline.

use bermuda_core::types::Date;
use bermuda_curves::{DiscountCurve, VolSurface};
use serde::{Deserialize, Serialize};

/// External benchmark figures for the comparison table.
///
/// Every field is optional; missing figures are reported as blanks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceQuotes {
    /// Reference NPV as displayed by the vendor.
    #[serde(default)]
    pub npv: Option<f64>,
    /// DV01.
    #[serde(default)]
    pub dv01: Option<f64>,
    /// Gamma per 1bp.
    #[serde(default)]
    pub gamma: Option<f64>,
    /// Vega per 1bp.
    #[serde(default)]
    pub vega: Option<f64>,
    /// One-day theta.
    #[serde(default)]
    pub theta: Option<f64>,
    /// Hedge delta.
    #[serde(default)]
    pub delta: Option<f64>,
    /// Underlying swap DV01.
    #[serde(default)]
    pub underlying_dv01: Option<f64>,
    /// ATM strike (fair rate) as a decimal.
    #[serde(default)]
    pub atm_strike: Option<f64>,
    /// Yield value of one basis point.
    #[serde(default)]
    pub yield_value: Option<f64>,
    /// Premium in percent of notional.
    #[serde(default)]
    pub premium: Option<f64>,
}

/// Curve, surface and reference price as of one date.
///
/// Immutable; scenario builders return modified copies.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    curve: DiscountCurve,
    surface: VolSurface,
    reference_npv: Option<f64>,
    quotes: Option<ReferenceQuotes>,
}

impl MarketSnapshot {
    /// Creates a snapshot with no reference price.
    #[must_use]
    pub fn new(curve: DiscountCurve, surface: VolSurface) -> Self {
        Self {
            curve,
            surface,
            reference_npv: None,
            quotes: None,
        }
    }

    /// Sets the reference NPV the spread is solved against.
    #[must_use]
    pub fn with_reference_npv(mut self, npv: Option<f64>) -> Self {
        self.reference_npv = npv;
        self
    }

    /// Attaches benchmark quotes.
    #[must_use]
    pub fn with_quotes(mut self, quotes: ReferenceQuotes) -> Self {
        self.quotes = Some(quotes);
        self
    }

    /// Replaces the curve.
    #[must_use]
    pub fn with_curve(&self, curve: DiscountCurve) -> Self {
        Self {
            curve,
            ..self.clone()
        }
    }

    /// Replaces the surface.
    #[must_use]
    pub fn with_surface(&self, surface: VolSurface) -> Self {
        Self {
            surface,
            ..self.clone()
        }
    }

    /// As-of date of the curve.
    pub fn as_of(&self) -> Date {
        self.curve.as_of()
    }

    /// Discount curve.
    pub fn curve(&self) -> &DiscountCurve {
        &self.curve
    }

    /// ATM normal vol surface.
    pub fn surface(&self) -> &VolSurface {
        &self.surface
    }

    /// Reference NPV as supplied.
    pub fn reference_npv(&self) -> Option<f64> {
        self.reference_npv
    }

    /// Benchmark quotes, if any.
    pub fn quotes(&self) -> Option<&ReferenceQuotes> {
        self.quotes.as_ref()
    }

    /// Target for the spread solve; zero or non-finite counts as absent.
    pub fn target_npv(&self) -> Option<f64> {
        self.reference_npv.filter(|v| v.is_finite() && *v != 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_reference_is_no_target() {
        let as_of = Date::from_ymd(2025, 1, 2).unwrap();
        let snap = MarketSnapshot::new(
            DiscountCurve::flat(as_of, 0.03, 20).unwrap(),
            VolSurface::flat(60.0).unwrap(),
        );
        assert_eq!(snap.target_npv(), None);
        assert_eq!(snap.clone().with_reference_npv(Some(0.0)).target_npv(), None);
        assert_eq!(snap.with_reference_npv(Some(1250.0)).target_npv(), Some(1250.0));
    }
}
