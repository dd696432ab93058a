//! Hybrid volatility calibration.
//!
//! The ATM stage bootstraps one Hull-White σ per live exercise date against
//! the co-terminal European basket priced off the surface. The spread stage
//! then shifts every bucket by one scalar so the Bermudan matches the
//! reference NPV.

mod atm;
mod spread;

pub use atm::{fit_mean_reversion, AtmCalibration, AtmCalibrator};
pub use spread::{SpreadSolution, SpreadSolver};

use bermuda_core::types::Date;
use bermuda_curves::discount::year_fraction;
use bermuda_curves::DiscountCurve;
use bermuda_math::bachelier::{bachelier_payer, bachelier_receiver};
use bermuda_models::{HullWhiteParams, ModelError, SwaptionSide, VolTermStructure};
use serde::{Deserialize, Serialize};

use crate::deal::{annuity_after, Deal};
use crate::error::{EngineError, EngineResult};
use crate::market::MarketSnapshot;

/// One σ per exercise date; bucket `i` covers `(date[i-1], date[i]]` and the
/// last bucket extends flat to maturity.
///
/// Keyed by date so a schedule survives a change of as-of date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigmaSchedule {
    dates: Vec<Date>,
    sigmas: Vec<f64>,
}

impl SigmaSchedule {
    /// Creates a schedule.
    ///
    /// # Errors
    ///
    /// `EngineError::Model` for mismatched lengths, unordered dates or
    /// non-positive σ.
    pub fn new(dates: Vec<Date>, sigmas: Vec<f64>) -> EngineResult<Self> {
        if dates.is_empty() || dates.len() != sigmas.len() {
            return Err(EngineError::Model(ModelError::invalid_parameter(
                "sigma",
                sigmas.len() as f64,
                format!("{} buckets for {} dates", sigmas.len(), dates.len()),
            )));
        }
        if dates.windows(2).any(|w| w[1] <= w[0]) {
            return Err(EngineError::Model(ModelError::invalid_parameter(
                "sigma",
                f64::NAN,
                "bucket dates must be strictly increasing",
            )));
        }
        if let Some(s) = sigmas.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(EngineError::Model(ModelError::invalid_parameter(
                "sigma",
                *s,
                "must be positive",
            )));
        }
        Ok(Self { dates, sigmas })
    }

    /// Bucket end dates.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Bucket volatilities.
    pub fn sigmas(&self) -> &[f64] {
        &self.sigmas
    }

    /// Smallest bucket σ.
    pub fn min_sigma(&self) -> f64 {
        self.sigmas.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Every bucket shifted by `delta`.
    ///
    /// # Errors
    ///
    /// `EngineError::Model` if a bucket would become non-positive.
    pub fn shifted(&self, delta: f64) -> EngineResult<Self> {
        Self::new(self.dates.clone(), self.sigmas.iter().map(|s| s + delta).collect())
    }

    /// Step function on `curve`'s time axis.
    ///
    /// Buckets ending on or before the as-of date are dropped; if none is
    /// left, the last σ applies everywhere.
    pub fn term_structure(&self, curve: &DiscountCurve) -> EngineResult<VolTermStructure> {
        let as_of = curve.as_of();
        let first = self.dates.partition_point(|d| *d <= as_of);
        if first == self.dates.len() {
            return Ok(VolTermStructure::flat(self.sigmas[self.sigmas.len() - 1])?);
        }
        let live = &self.dates[first..];
        let breaks = live[..live.len() - 1].iter().map(|d| curve.time(*d)).collect();
        Ok(VolTermStructure::new(breaks, self.sigmas[first..].to_vec())?)
    }

    /// Hull-White parameters on `curve` with mean reversion `a`.
    pub fn params(&self, mean_reversion: f64, curve: &DiscountCurve) -> EngineResult<HullWhiteParams> {
        Ok(HullWhiteParams::new(mean_reversion, self.term_structure(curve)?)?)
    }
}

/// One co-terminal European swaption of the calibration basket.
///
/// Prices are per unit notional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketInstrument {
    /// Exercise (expiry) date.
    pub expiry: Date,
    /// Expiry in years from the as-of date.
    pub expiry_time: f64,
    /// Remaining swap tenor in years.
    pub tenor: f64,
    /// Forward swap rate.
    pub forward: f64,
    /// Strike, the deal's fixed rate.
    pub strike: f64,
    /// Forward annuity.
    pub annuity: f64,
    /// ATM normal vol from the surface.
    pub normal_vol: f64,
    /// Bachelier premium.
    pub market_price: f64,
}

/// Co-terminal basket struck at the deal rate, one per live exercise date.
pub fn build_basket(deal: &Deal, market: &MarketSnapshot) -> EngineResult<Vec<BasketInstrument>> {
    let curve = market.curve();
    let maturity = deal.maturity();
    let strike = deal.fixed_rate_f64();
    let p_end = curve.discount_factor(maturity)?;

    deal.live_exercise_dates(curve.as_of())
        .into_iter()
        .map(|expiry| {
            let annuity = annuity_after(deal, curve, expiry)?;
            let forward = (curve.discount_factor(expiry)? - p_end) / annuity;
            let expiry_time = curve.time(expiry);
            let tenor = year_fraction(expiry, maturity);
            let normal_vol = market.surface().normal_vol(expiry_time, tenor);
            let unit = match deal.side() {
                SwaptionSide::Receiver => bachelier_receiver(forward, strike, normal_vol, expiry_time),
                SwaptionSide::Payer => bachelier_payer(forward, strike, normal_vol, expiry_time),
            };
            Ok(BasketInstrument {
                expiry,
                expiry_time,
                tenor,
                forward,
                strike,
                annuity,
                normal_vol,
                market_price: unit * annuity,
            })
        })
        .collect()
}

/// Outcome of the full calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// Mean reversion used.
    pub mean_reversion: f64,
    /// True if the mean reversion was fitted rather than fixed.
    pub mean_reversion_calibrated: bool,
    /// σ from the ATM bootstrap.
    pub sigma_atm: Option<SigmaSchedule>,
    /// Scalar spread added to every bucket.
    pub spread: f64,
    /// σ_ATM + spread.
    pub sigma_total: Option<SigmaSchedule>,
    /// Iterations per ATM bucket.
    pub atm_iterations: Vec<u32>,
    /// Spread solver iterations.
    pub spread_iterations: u32,
    /// Final lattice NPV minus the reference, if there was a target.
    pub residual: Option<f64>,
    /// True if every stage met its tolerance.
    pub converged: bool,
    /// Calibration basket.
    pub basket: Vec<BasketInstrument>,
}
