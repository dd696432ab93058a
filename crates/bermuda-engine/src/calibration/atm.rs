//! ATM term-structure bootstrap and mean reversion fit.

use bermuda_math::optimization::try_golden_section;
use bermuda_math::solvers::{expand_bracket, try_bracketed_secant, BracketExpansion, SolverConfig};
use bermuda_models::{european_swaption, CouponLeg, HullWhiteParams, VolTermStructure};
use tracing::{debug, info};

use super::{build_basket, BasketInstrument, SigmaSchedule};
use crate::config::SolverSettings;
use crate::deal::Deal;
use crate::error::{CalibrationStage, EngineError, EngineResult};
use crate::market::MarketSnapshot;

/// Smallest starting guess for a bucket σ.
const MIN_SEED: f64 = 1e-4;

/// Flat σ search range for the mean reversion fit, in log space.
const LN_SIGMA_RANGE: (f64, f64) = (-9.21, -2.30);

/// Result of the ATM bootstrap.
#[derive(Debug, Clone, PartialEq)]
pub struct AtmCalibration {
    /// Mean reversion the buckets were fitted at.
    pub mean_reversion: f64,
    /// Fitted σ per live exercise date; `None` if nothing is left to exercise.
    pub sigma: Option<SigmaSchedule>,
    /// The co-terminal basket.
    pub basket: Vec<BasketInstrument>,
    /// Solver iterations per bucket.
    pub iterations: Vec<u32>,
    /// Largest absolute repricing error per unit notional.
    pub max_abs_error: f64,
}

/// Bootstraps σ bucket by bucket so each co-terminal European reprices
/// its Bachelier premium.
///
/// Bucket `i` is solved with buckets `i..` set to the trial σ and
/// `0..i` frozen at their solved values.
#[derive(Debug, Clone, Copy)]
pub struct AtmCalibrator<'a> {
    settings: &'a SolverSettings,
}

impl<'a> AtmCalibrator<'a> {
    /// Creates a calibrator.
    pub fn new(settings: &'a SolverSettings) -> Self {
        Self { settings }
    }

    /// Runs the bootstrap at mean reversion `mean_reversion`.
    ///
    /// # Errors
    ///
    /// `EngineError::CalibrationDivergence` naming the bucket whose bracket
    /// or solve failed.
    pub fn calibrate(&self, deal: &Deal, market: &MarketSnapshot, mean_reversion: f64) -> EngineResult<AtmCalibration> {
        let basket = build_basket(deal, market)?;
        if basket.is_empty() {
            return Ok(AtmCalibration {
                mean_reversion,
                sigma: None,
                basket,
                iterations: Vec::new(),
                max_abs_error: 0.0,
            });
        }

        let curve = market.curve();
        let leg = deal.fixed_leg(curve)?;
        let breaks = basket[..basket.len() - 1].iter().map(|b| b.expiry_time).collect();
        let seed = basket[0].normal_vol.max(MIN_SEED);
        let mut params = HullWhiteParams::new(mean_reversion, VolTermStructure::uniform(breaks, seed)?)?;

        let config = SolverConfig::new(self.settings.atm_tolerance, self.settings.atm_max_iterations);
        let mut iterations = Vec::with_capacity(basket.len());
        let mut max_abs_error: f64 = 0.0;

        for (i, inst) in basket.iter().enumerate() {
            let tail = leg.after(inst.expiry_time)?;
            let guess = inst.normal_vol.max(MIN_SEED);
            let solved = {
                let mut objective = |sigma: f64| -> EngineResult<f64> {
                    let trial = params.with_vol(params.vol().with_bucket_from(i, sigma)?);
                    Ok(european_swaption(&trial, curve, inst.expiry_time, &tail, deal.side())? - inst.market_price)
                };
                expand_bracket(
                    &mut objective,
                    guess / 2.0,
                    guess * 2.0,
                    BracketExpansion::Geometric { factor: 2.0 },
                    self.settings.atm_max_expansions,
                )
                .and_then(|bracket| try_bracketed_secant(&mut objective, &bracket, &config))
                .map_err(|e: EngineError| e.in_stage(CalibrationStage::Atm { bucket: i }))?
            };

            debug!(
                bucket = i,
                expiry = %inst.expiry,
                sigma = solved.root,
                iterations = solved.iterations,
                residual = solved.residual,
                "ATM bucket calibrated"
            );
            params = params.with_vol(params.vol().with_bucket_from(i, solved.root)?);
            iterations.push(solved.iterations);
            max_abs_error = max_abs_error.max(solved.residual.abs());
        }

        let dates = basket.iter().map(|b| b.expiry).collect();
        let sigma = SigmaSchedule::new(dates, params.vol().sigmas().to_vec())?;
        info!(
            buckets = basket.len(),
            mean_reversion,
            min_sigma = sigma.min_sigma(),
            max_abs_error,
            "ATM calibration complete"
        );

        Ok(AtmCalibration {
            mean_reversion,
            sigma: Some(sigma),
            basket,
            iterations,
            max_abs_error,
        })
    }
}

/// Fits mean reversion on `[lower, upper]` to the co-terminal basket.
///
/// For each trial `a` a flat σ is fitted by golden section on `ln σ`; the
/// outer golden section minimises the resulting error
/// `Σ (N(model - market))² / max(1, N|market|)`.
///
/// # Errors
///
/// `EngineError::InvalidDeal` with no live exercise date, and
/// `EngineError::CalibrationDivergence` if a search fails.
pub fn fit_mean_reversion(deal: &Deal, market: &MarketSnapshot, lower: f64, upper: f64) -> EngineResult<f64> {
    let basket = build_basket(deal, market)?;
    if basket.is_empty() {
        return Err(EngineError::invalid_deal("no live exercise date to fit mean reversion"));
    }
    let curve = market.curve();
    let leg = deal.fixed_leg(curve)?;
    let tails = basket
        .iter()
        .map(|b| leg.after(b.expiry_time))
        .collect::<Result<Vec<CouponLeg>, _>>()?;
    let notional = deal.notional_f64();

    let basket_error = |a: f64, sigma: f64| -> EngineResult<f64> {
        let params = HullWhiteParams::flat(a, sigma)?;
        basket.iter().zip(&tails).try_fold(0.0, |acc, (inst, tail)| {
            let model = european_swaption(&params, curve, inst.expiry_time, tail, deal.side())?;
            let diff = notional * (model - inst.market_price);
            Ok(acc + diff * diff / (notional * inst.market_price.abs()).max(1.0))
        })
    };
    let flat_fit = |a: f64| {
        try_golden_section(
            |ln_sigma: f64| basket_error(a, ln_sigma.exp()),
            LN_SIGMA_RANGE.0,
            LN_SIGMA_RANGE.1,
            1e-6,
            200,
        )
    };

    let best = try_golden_section(|a: f64| Ok(flat_fit(a)?.value), lower, upper, 1e-5, 200)
        .map_err(|e: EngineError| e.in_stage(CalibrationStage::MeanReversion))?;
    info!(
        mean_reversion = best.x,
        error = best.value,
        iterations = best.iterations,
        "mean reversion fitted"
    );
    Ok(best.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::ExerciseSchedule;
    use approx::assert_relative_eq;
    use bermuda_core::types::{Date, Frequency};
    use bermuda_curves::{DiscountCurve, VolSurface};
    use ndarray::array;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn deal() -> Deal {
        Deal::builder()
            .notional(dec!(10_000_000))
            .fixed_rate(dec!(0.032))
            .start(d(2026, 1, 5))
            .maturity(d(2031, 1, 6))
            .frequency(Frequency::Annual)
            .exercise(ExerciseSchedule::Custom(vec![
                d(2026, 1, 5),
                d(2027, 1, 5),
                d(2028, 1, 5),
                d(2029, 1, 5),
            ]))
            .build()
            .unwrap()
    }

    fn market() -> MarketSnapshot {
        let as_of = d(2025, 1, 3);
        let curve = DiscountCurve::new(
            as_of,
            vec![(d(2027, 1, 4), 0.945), (d(2030, 1, 3), 0.86), (d(2035, 1, 3), 0.73)],
        )
        .unwrap();
        let surface = VolSurface::from_labels(
            &["1Yr", "2Yr", "5Yr"],
            &["2Y", "5Y"],
            array![[95.0, 90.0], [90.0, 86.0], [82.0, 78.0]],
        )
        .unwrap();
        MarketSnapshot::new(curve, surface)
    }

    #[test]
    fn test_buckets_reprice_basket() {
        let settings = SolverSettings::default();
        let (deal, market) = (deal(), market());
        let atm = AtmCalibrator::new(&settings).calibrate(&deal, &market, 0.03).unwrap();
        let sigma = atm.sigma.unwrap();
        assert_eq!(sigma.sigmas().len(), 4);
        assert!(sigma.sigmas().iter().all(|s| *s > 0.002 && *s < 0.02));

        let params = sigma.params(0.03, market.curve()).unwrap();
        let leg = deal.fixed_leg(market.curve()).unwrap();
        for inst in &atm.basket {
            let tail = leg.after(inst.expiry_time).unwrap();
            let model = european_swaption(&params, market.curve(), inst.expiry_time, &tail, deal.side()).unwrap();
            assert_relative_eq!(model, inst.market_price, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_expired_deal_has_no_buckets() {
        let settings = SolverSettings::default();
        let late = MarketSnapshot::new(
            DiscountCurve::flat(d(2029, 6, 1), 0.03, 10).unwrap(),
            VolSurface::flat(80.0).unwrap(),
        );
        let atm = AtmCalibrator::new(&settings).calibrate(&deal(), &late, 0.03).unwrap();
        assert!(atm.sigma.is_none());
        assert!(atm.iterations.is_empty());
    }

    #[test]
    fn test_mean_reversion_fit_stays_in_bounds() {
        let a = fit_mean_reversion(&deal(), &market(), 0.001, 0.5).unwrap();
        assert!((0.001..=0.5).contains(&a));
        let again = fit_mean_reversion(&deal(), &market(), 0.001, 0.5).unwrap();
        assert_eq!(a, again);
    }
}
