//! Lattice pricing of the Bermudan swaption.

use bermuda_core::types::Date;
use bermuda_curves::DiscountCurve;
use bermuda_models::{bermudan_swaption, HullWhiteParams, TimeGrid, TrinomialLattice};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ModelConfig;
use crate::deal::Deal;
use crate::error::EngineResult;
use crate::greeks::Greek;

/// Exercise region edge on one live exercise date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseBoundary {
    /// Exercise date.
    pub date: Date,
    /// Years from the as-of date.
    pub time: f64,
    /// Short rate at the critical node; `None` if no node exercises.
    pub short_rate: Option<f64>,
    /// Lattice state at the critical node.
    pub state: Option<f64>,
    /// Probability of exercising on this date and not before.
    pub probability: f64,
}

/// Lattice NPV with its exercise boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatticePrice {
    /// NPV in currency.
    pub npv: f64,
    /// One entry per live exercise date.
    pub boundary: Vec<ExerciseBoundary>,
    /// Lattice time steps used.
    pub steps: usize,
}

/// Builds the trinomial lattice for a deal and rolls it back.
///
/// The grid carries every live exercise and payment time, filled to
/// `steps_per_year`. A fresh lattice is built on every call.
#[derive(Debug, Clone, Copy)]
pub struct BermudanPricer<'a> {
    model: &'a ModelConfig,
}

impl<'a> BermudanPricer<'a> {
    /// Creates a pricer.
    pub fn new(model: &'a ModelConfig) -> Self {
        Self { model }
    }

    /// Prices `deal` on `curve` under `params`.
    ///
    /// With no exercise date left after the as-of date the NPV is 0.
    ///
    /// # Errors
    ///
    /// `EngineError::LatticeInstability` if the lattice cannot be built
    /// within bounds.
    pub fn price(&self, deal: &Deal, curve: &DiscountCurve, params: &HullWhiteParams) -> EngineResult<LatticePrice> {
        let live = deal.live_exercise_dates(curve.as_of());
        if live.is_empty() {
            return Ok(LatticePrice::default());
        }

        let leg = deal.fixed_leg(curve)?;
        let exercise_times: Vec<f64> = live.iter().map(|d| curve.time(*d)).collect();
        let mut mandatory = leg.times().to_vec();
        mandatory.extend_from_slice(&exercise_times);

        let grid = TimeGrid::new(&mandatory, self.model.steps_per_year, self.model.max_lattice_steps)?;
        let lattice = TrinomialLattice::build(params, curve, grid)?;
        let valuation = bermudan_swaption(&lattice, &leg, &exercise_times, deal.side())?;

        let boundary = live
            .iter()
            .zip(valuation.boundary)
            .map(|(date, point)| ExerciseBoundary {
                date: *date,
                time: point.time,
                short_rate: point.short_rate,
                state: point.state,
                probability: point.probability,
            })
            .collect();

        let npv = deal.notional_f64() * valuation.value;
        debug!(npv, steps = lattice.steps(), exercises = live.len(), "lattice priced");
        Ok(LatticePrice {
            npv,
            boundary,
            steps: lattice.steps(),
        })
    }
}

/// Final valuation of the deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    /// Lattice NPV at σ_total.
    pub npv: f64,
    /// Exercise boundary per live exercise date.
    pub boundary: Vec<ExerciseBoundary>,
    /// Lattice time steps used.
    pub lattice_steps: usize,
    /// Underlying swap NPV from the holder's side.
    pub underlying_npv: f64,
    /// Par rate of the remaining swap.
    pub fair_rate: f64,
    /// Fixed leg value of one basis point, signed.
    pub fixed_leg_bps: f64,
    /// NPV in basis points of running fixed leg.
    pub yield_value: f64,
    /// NPV as a percentage of notional.
    pub premium_pct: f64,
    /// Strike minus fair rate, in bp.
    pub moneyness_bp: f64,
    /// Sensitivities, in report order.
    pub greeks: Vec<Greek>,
}

impl PricingResult {
    /// Completes a lattice price with the swap analytics.
    pub fn from_lattice(deal: &Deal, curve: &DiscountCurve, lattice: LatticePrice) -> EngineResult<Self> {
        let fair_rate = deal.fair_rate(curve)?;
        let fixed_leg_bps = deal.fixed_leg_bps(curve)?;
        let yield_value = if fixed_leg_bps == 0.0 {
            0.0
        } else {
            lattice.npv / fixed_leg_bps.abs()
        };
        Ok(Self {
            npv: lattice.npv,
            boundary: lattice.boundary,
            lattice_steps: lattice.steps,
            underlying_npv: deal.swap_npv(curve)?,
            fair_rate,
            fixed_leg_bps,
            yield_value,
            premium_pct: lattice.npv / deal.notional_f64() * 100.0,
            moneyness_bp: (deal.fixed_rate_f64() - fair_rate) * 1e4,
            greeks: Vec::new(),
        })
    }

    /// Looks up a Greek by name.
    pub fn greek(&self, name: &str) -> Option<&Greek> {
        self.greeks.iter().find(|g| g.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::ExerciseSchedule;
    use bermuda_core::types::Frequency;
    use bermuda_models::SwaptionSide;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn deal(side: SwaptionSide) -> Deal {
        Deal::builder()
            .notional(dec!(5_000_000))
            .fixed_rate(dec!(0.03))
            .side(side)
            .start(d(2026, 3, 2))
            .maturity(d(2033, 3, 2))
            .frequency(Frequency::Annual)
            .exercise(ExerciseSchedule::Auto)
            .build()
            .unwrap()
    }

    #[test]
    fn test_prices_and_reports_boundary() {
        let curve = DiscountCurve::flat(d(2025, 3, 3), 0.03, 20).unwrap();
        let params = HullWhiteParams::flat(0.03, 0.009).unwrap();
        let model = ModelConfig::default();
        let price = BermudanPricer::new(&model)
            .price(&deal(SwaptionSide::Payer), &curve, &params)
            .unwrap();
        assert!(price.npv > 0.0);
        assert_eq!(price.boundary.len(), 7);
        assert_eq!(price.boundary[0].date, d(2026, 3, 2));
        let total: f64 = price.boundary.iter().map(|b| b.probability).sum();
        assert!(total > 0.0 && total <= 1.0 + 1e-9);
    }

    #[test]
    fn test_nothing_left_to_exercise() {
        let curve = DiscountCurve::flat(d(2032, 6, 1), 0.03, 5).unwrap();
        let params = HullWhiteParams::flat(0.03, 0.009).unwrap();
        let model = ModelConfig::default();
        let price = BermudanPricer::new(&model)
            .price(&deal(SwaptionSide::Receiver), &curve, &params)
            .unwrap();
        assert_eq!(price.npv, 0.0);
        assert!(price.boundary.is_empty());
    }

    #[test]
    fn test_step_limit_is_enforced() {
        let curve = DiscountCurve::flat(d(2025, 3, 3), 0.03, 20).unwrap();
        let params = HullWhiteParams::flat(0.03, 0.009).unwrap();
        let model = ModelConfig {
            steps_per_year: 400,
            max_lattice_steps: 500,
            ..ModelConfig::default()
        };
        let err = BermudanPricer::new(&model)
            .price(&deal(SwaptionSide::Payer), &curve, &params)
            .unwrap_err();
        assert!(matches!(err, crate::error::EngineError::LatticeInstability { .. }));
    }
}
