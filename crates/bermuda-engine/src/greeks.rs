//! Finite-difference Greeks by scenario re-pricing.
//!
//! Every scenario builds its own market, calibration and lattice from the
//! base inputs, so scenarios are independent and may run in parallel. A
//! failed scenario only fails the Greeks that need it.

use bermuda_curves::bumping::{ParallelBump, TwistBump};
use bermuda_curves::DiscountCurve;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calibration::{fit_mean_reversion, AtmCalibrator, CalibrationResult, SigmaSchedule};
use crate::config::{EngineConfig, MeanReversion, RecalibrationPolicy};
use crate::deal::Deal;
use crate::error::EngineResult;
use crate::market::MarketSnapshot;
use crate::pricer::BermudanPricer;

/// Curve delta, `(P- - P+) / 2bp`.
pub const DV01: &str = "DV01";
/// Curve convexity, `(P+ - 2P0 + P-) / bp²`.
pub const GAMMA: &str = "Gamma";
/// Hybrid vega per bp of ATM normal vol.
pub const VEGA: &str = "Vega";
/// Value change per bp of curve steepening.
pub const SLOPE: &str = "Slope";
/// Value change over the roll period.
pub const THETA: &str = "Theta";
/// DV01 of the underlying swap.
pub const UNDERLYING_DV01: &str = "Underlying DV01";
/// Hedge ratio, DV01 over underlying DV01.
pub const DELTA: &str = "Delta";

/// A sensitivity, or the reason it could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Greek {
    /// Greek name.
    pub name: String,
    /// Bump size in the Greek's own unit.
    pub bump: f64,
    /// Unit of `value`.
    pub unit: String,
    /// Value, NaN on failure.
    pub value: f64,
    /// False if a scenario failed.
    pub success: bool,
    /// Failure reason.
    pub reason: Option<String>,
}

impl Greek {
    fn ok(name: &str, bump: f64, unit: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            bump,
            unit: unit.to_string(),
            value,
            success: true,
            reason: None,
        }
    }

    fn failed(name: &str, bump: f64, unit: &str, reason: String) -> Self {
        Self {
            name: name.to_string(),
            bump,
            unit: unit.to_string(),
            value: f64::NAN,
            success: false,
            reason: Some(reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scenario {
    CurveUp,
    CurveDown,
    VolUp,
    VolDown,
    TwistUp,
    TwistDown,
    Theta,
}

/// Re-prices the deal under bumped markets.
///
/// Curve and twist scenarios follow the configured
/// [`RecalibrationPolicy`]; vega always re-runs the ATM bootstrap on the
/// bumped surface, refitting the mean reversion first when the base run
/// fitted it. The base spread is never re-solved.
#[derive(Debug, Clone, Copy)]
pub struct GreeksEngine<'a> {
    config: &'a EngineConfig,
    deal: &'a Deal,
    market: &'a MarketSnapshot,
    calibration: &'a CalibrationResult,
    base_npv: f64,
}

impl<'a> GreeksEngine<'a> {
    /// Creates the engine around a base calibration and NPV.
    pub fn new(
        config: &'a EngineConfig,
        deal: &'a Deal,
        market: &'a MarketSnapshot,
        calibration: &'a CalibrationResult,
        base_npv: f64,
    ) -> Self {
        Self {
            config,
            deal,
            market,
            calibration,
            base_npv,
        }
    }

    /// Computes every configured Greek, in a fixed order.
    pub fn compute(&self) -> Vec<Greek> {
        let settings = &self.config.greeks;
        if !settings.enabled {
            return Vec::new();
        }

        // Result indices below follow this order.
        let mut scenarios = vec![
            Scenario::CurveUp,
            Scenario::CurveDown,
            Scenario::VolUp,
            Scenario::VolDown,
            Scenario::TwistUp,
            Scenario::TwistDown,
        ];
        if settings.theta {
            scenarios.push(Scenario::Theta);
        }

        let results: Vec<EngineResult<f64>> = if settings.parallel {
            scenarios.par_iter().map(|s| self.run_logged(*s)).collect()
        } else {
            scenarios.iter().map(|s| self.run_logged(*s)).collect()
        };

        let bp = settings.curve_bump_bp;
        let base = self.base_npv;
        let (up, down) = (&results[0], &results[1]);

        let mut greeks = vec![
            combine(DV01, bp, "per bp", &[up, down], |v| (v[1] - v[0]) / (2.0 * bp)),
            combine(GAMMA, bp, "per bp^2", &[up, down], |v| (v[0] - 2.0 * base + v[1]) / (bp * bp)),
            combine(
                VEGA,
                settings.vega_bump_bp,
                "per bp vol",
                &[&results[2], &results[3]],
                |v| (v[0] - v[1]) / (2.0 * settings.vega_bump_bp),
            ),
            combine(
                SLOPE,
                settings.slope_bump_bp,
                "per bp twist",
                &[&results[4], &results[5]],
                |v| (v[0] - v[1]) / (2.0 * settings.slope_bump_bp),
            ),
        ];
        if settings.theta {
            let days = settings.theta_roll_days as f64;
            greeks.push(combine(THETA, days, "per roll", &[&results[6]], |v| v[0] - base));
        }

        let underlying = self.underlying_dv01(bp);
        let underlying_greek = match &underlying {
            Ok(v) => Greek::ok(UNDERLYING_DV01, bp, "per bp", *v),
            Err(e) => {
                warn!(error = %e, "underlying swap bump failed");
                Greek::failed(UNDERLYING_DV01, bp, "per bp", e.to_string())
            }
        };
        let delta = match (&greeks[0], &underlying_greek) {
            (dv01, udv01) if dv01.success && udv01.success => {
                let value = if udv01.value.abs() > 1e-12 {
                    dv01.value / udv01.value
                } else {
                    0.0
                };
                Greek::ok(DELTA, bp, "ratio", value)
            }
            (dv01, udv01) => Greek::failed(
                DELTA,
                bp,
                "ratio",
                dv01.reason.clone().or_else(|| udv01.reason.clone()).unwrap_or_default(),
            ),
        };
        greeks.push(underlying_greek);
        greeks.push(delta);

        info!(
            computed = greeks.iter().filter(|g| g.success).count(),
            failed = greeks.iter().filter(|g| !g.success).count(),
            "greeks complete"
        );
        greeks
    }

    fn run_logged(&self, scenario: Scenario) -> EngineResult<f64> {
        let result = self.run(scenario);
        if let Err(e) = &result {
            warn!(scenario = ?scenario, error = %e, "greek scenario failed");
        }
        result
    }

    fn run(&self, scenario: Scenario) -> EngineResult<f64> {
        let settings = &self.config.greeks;
        let curve = self.market.curve();
        match scenario {
            Scenario::CurveUp | Scenario::CurveDown => {
                let bp = if scenario == Scenario::CurveUp {
                    settings.curve_bump_bp
                } else {
                    -settings.curve_bump_bp
                };
                self.reprice_on_curve(ParallelBump::new(bp).apply(curve)?)
            }
            Scenario::TwistUp | Scenario::TwistDown => {
                let twist = TwistBump::new(
                    settings.slope_bump_bp,
                    settings.slope_short_pivot,
                    settings.slope_long_pivot,
                )?;
                let twist = if scenario == Scenario::TwistUp { twist } else { twist.reversed() };
                self.reprice_on_curve(twist.apply(curve)?)
            }
            Scenario::VolUp | Scenario::VolDown => {
                let bp = if scenario == Scenario::VolUp {
                    settings.vega_bump_bp
                } else {
                    -settings.vega_bump_bp
                };
                let bumped = self.market.with_surface(self.market.surface().bumped(bp));
                let a = self.vega_mean_reversion(&bumped)?;
                let sigma = self.recalibrate(&bumped, a)?;
                self.price(bumped.curve(), sigma.as_ref(), a)
            }
            Scenario::Theta => {
                let rolled = curve.roll_to(curve.as_of().add_days(settings.theta_roll_days))?;
                self.price(&rolled, self.calibration.sigma_total.as_ref(), self.calibration.mean_reversion)
            }
        }
    }

    fn reprice_on_curve(&self, curve: DiscountCurve) -> EngineResult<f64> {
        let a = self.calibration.mean_reversion;
        match self.config.greeks.recalibration {
            RecalibrationPolicy::RecalibrateAtm => {
                let bumped = self.market.with_curve(curve);
                let sigma = self.recalibrate(&bumped, a)?;
                self.price(bumped.curve(), sigma.as_ref(), a)
            }
            RecalibrationPolicy::HoldTotalVol => self.price(&curve, self.calibration.sigma_total.as_ref(), a),
        }
    }

    /// Mean reversion for a vol scenario: refitted on the bumped surface
    /// under [`MeanReversion::Calibrate`], the base value otherwise.
    fn vega_mean_reversion(&self, bumped: &MarketSnapshot) -> EngineResult<f64> {
        match self.config.model.mean_reversion {
            MeanReversion::Calibrate { lower, upper } if self.calibration.mean_reversion_calibrated => {
                fit_mean_reversion(self.deal, bumped, lower, upper)
            }
            _ => Ok(self.calibration.mean_reversion),
        }
    }

    /// ATM bootstrap on `market` at mean reversion `a`, plus the base spread.
    fn recalibrate(&self, market: &MarketSnapshot, a: f64) -> EngineResult<Option<SigmaSchedule>> {
        let atm = AtmCalibrator::new(&self.config.solver).calibrate(self.deal, market, a)?;
        atm.sigma.map(|s| s.shifted(self.calibration.spread)).transpose()
    }

    fn price(&self, curve: &DiscountCurve, sigma: Option<&SigmaSchedule>, a: f64) -> EngineResult<f64> {
        let Some(sigma) = sigma else {
            return Ok(0.0);
        };
        let params = sigma.params(a, curve)?;
        Ok(BermudanPricer::new(&self.config.model)
            .price(self.deal, curve, &params)?
            .npv)
    }

    fn underlying_dv01(&self, bp: f64) -> EngineResult<f64> {
        let curve = self.market.curve();
        let up = self.deal.swap_npv(&ParallelBump::new(bp).apply(curve)?)?;
        let down = self.deal.swap_npv(&ParallelBump::new(-bp).apply(curve)?)?;
        Ok((down - up) / (2.0 * bp))
    }
}

fn combine(
    name: &str,
    bump: f64,
    unit: &str,
    inputs: &[&EngineResult<f64>],
    value: impl FnOnce(&[f64]) -> f64,
) -> Greek {
    let mut values = Vec::with_capacity(inputs.len());
    for input in inputs {
        match input {
            Ok(v) => values.push(*v),
            Err(e) => return Greek::failed(name, bump, unit, e.to_string()),
        }
    }
    Greek::ok(name, bump, unit, value(&values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use bermuda_core::types::{Date, Frequency};
    use bermuda_curves::VolSurface;
    use rust_decimal_macros::dec;

    #[test]
    fn test_combine_propagates_first_failure() {
        let up: EngineResult<f64> = Ok(101.0);
        let down: EngineResult<f64> = Err(EngineError::market_data("curve roll failed"));
        let greek = combine(DV01, 1.0, "per bp", &[&up, &down], |v| v[1] - v[0]);
        assert!(!greek.success);
        assert!(greek.value.is_nan());
        assert!(greek.reason.unwrap().contains("curve roll failed"));
    }

    #[test]
    fn test_combine_central_difference() {
        let up: EngineResult<f64> = Ok(98.0);
        let down: EngineResult<f64> = Ok(102.0);
        let greek = combine(DV01, 1.0, "per bp", &[&up, &down], |v| (v[1] - v[0]) / 2.0);
        assert!(greek.success);
        assert_eq!(greek.value, 2.0);
        assert_eq!(greek.unit, "per bp");
    }

    fn fixture() -> (MarketSnapshot, Deal) {
        let as_of = Date::from_ymd(2025, 1, 2).unwrap();
        let market = MarketSnapshot::new(
            DiscountCurve::flat(as_of, 0.03, 10).unwrap(),
            VolSurface::flat(80.0).unwrap(),
        );
        let deal = Deal::builder()
            .notional(dec!(1_000_000))
            .fixed_rate(dec!(0.03))
            .start(Date::from_ymd(2026, 1, 2).unwrap())
            .maturity(Date::from_ymd(2030, 1, 2).unwrap())
            .frequency(Frequency::Annual)
            .build()
            .unwrap();
        (market, deal)
    }

    fn calibration(mean_reversion: f64, fitted: bool) -> CalibrationResult {
        CalibrationResult {
            mean_reversion,
            mean_reversion_calibrated: fitted,
            sigma_atm: None,
            spread: 0.0,
            sigma_total: None,
            atm_iterations: Vec::new(),
            spread_iterations: 0,
            residual: None,
            converged: true,
            basket: Vec::new(),
        }
    }

    #[test]
    fn test_disabled_greeks_are_empty() {
        let (market, deal) = fixture();
        let calibration = calibration(0.03, false);
        let mut config = EngineConfig::default();
        config.greeks.enabled = false;
        assert!(GreeksEngine::new(&config, &deal, &market, &calibration, 0.0).compute().is_empty());
    }

    #[test]
    fn test_vega_refits_calibrated_mean_reversion() {
        let (market, deal) = fixture();
        let bumped = market.with_surface(market.surface().bumped(1.0));
        let mut config = EngineConfig::default();
        config.model.mean_reversion = MeanReversion::Calibrate { lower: 0.001, upper: 0.5 };

        let fitted = calibration(0.2, true);
        let engine = GreeksEngine::new(&config, &deal, &market, &fitted, 0.0);
        let expected = fit_mean_reversion(&deal, &bumped, 0.001, 0.5).unwrap();
        assert_eq!(engine.vega_mean_reversion(&bumped).unwrap().to_bits(), expected.to_bits());

        let fixed = calibration(0.2, false);
        config.model.mean_reversion = MeanReversion::Fixed { value: 0.2 };
        let engine = GreeksEngine::new(&config, &deal, &market, &fixed, 0.0);
        assert_eq!(engine.vega_mean_reversion(&bumped).unwrap(), 0.2);
    }
}
