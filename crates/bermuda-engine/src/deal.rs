//! Bermudan swaption contract terms.

use bermuda_core::daycounts::DayCountConvention;
use bermuda_core::schedule::Schedule;
use bermuda_core::types::{Date, Frequency};
use bermuda_curves::DiscountCurve;
use bermuda_models::{CouponLeg, SwaptionSide};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Which reset dates carry an exercise right.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExerciseSchedule {
    /// Every reset date of the fixed leg.
    #[default]
    Auto,
    /// Explicit dates; each must be a reset date or the maturity.
    Custom(Vec<Date>),
}

/// A Bermudan swaption on a fixed-for-floating swap.
///
/// The floating leg is valued at par on its reset dates, so only the fixed
/// leg schedule is carried.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deal {
    notional: Decimal,
    fixed_rate: Decimal,
    notional_f64: f64,
    fixed_rate_f64: f64,
    side: SwaptionSide,
    schedule: Schedule,
    day_count: DayCountConvention,
    exercise_dates: Vec<Date>,
}

impl Deal {
    /// Starts a builder.
    #[must_use]
    pub fn builder() -> DealBuilder {
        DealBuilder::default()
    }

    /// Notional.
    pub fn notional(&self) -> Decimal {
        self.notional
    }

    /// Fixed rate as a decimal (0.035 = 3.5%).
    pub fn fixed_rate(&self) -> Decimal {
        self.fixed_rate
    }

    /// Notional as `f64`.
    pub fn notional_f64(&self) -> f64 {
        self.notional_f64
    }

    /// Fixed rate as `f64`.
    pub fn fixed_rate_f64(&self) -> f64 {
        self.fixed_rate_f64
    }

    /// Payer or receiver.
    pub fn side(&self) -> SwaptionSide {
        self.side
    }

    /// Fixed leg schedule.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Fixed leg day count.
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    /// Underlying start date.
    pub fn start(&self) -> Date {
        self.schedule.start()
    }

    /// Final maturity.
    pub fn maturity(&self) -> Date {
        self.schedule.end()
    }

    /// All contractual exercise dates.
    pub fn exercise_dates(&self) -> &[Date] {
        &self.exercise_dates
    }

    /// Exercise dates strictly after `as_of` and before maturity.
    pub fn live_exercise_dates(&self, as_of: Date) -> Vec<Date> {
        let maturity = self.maturity();
        self.exercise_dates
            .iter()
            .copied()
            .filter(|d| *d > as_of && *d < maturity)
            .collect()
    }

    /// Fixed leg per unit notional (coupons plus principal) paid after the
    /// curve's as-of date, on the curve's time axis.
    pub fn fixed_leg(&self, curve: &DiscountCurve) -> EngineResult<CouponLeg> {
        let as_of = curve.as_of();
        let (times, accruals): (Vec<f64>, Vec<f64>) = self
            .schedule
            .periods()
            .into_iter()
            .filter(|p| p.end > as_of)
            .map(|p| (curve.time(p.end), self.day_count.year_fraction(p.start, p.end)))
            .unzip();
        if times.is_empty() {
            return Err(EngineError::invalid_deal(format!(
                "deal matured on {} before {as_of}",
                self.maturity()
            )));
        }
        Ok(CouponLeg::from_accruals(times, &accruals, self.fixed_rate_f64)?)
    }

    /// Annuity `Σ τ_i P(T_i)` of the remaining fixed periods, per unit notional.
    pub fn annuity(&self, curve: &DiscountCurve) -> EngineResult<f64> {
        annuity_after(self, curve, curve.as_of())
    }

    /// Floating leg value per unit notional: `P(max(start, as_of)) - P(maturity)`.
    pub fn floating_leg_value(&self, curve: &DiscountCurve) -> EngineResult<f64> {
        let first = self.start().max(curve.as_of());
        Ok(curve.discount_factor(first)? - curve.discount_factor(self.maturity())?)
    }

    /// Par rate of the remaining swap.
    pub fn fair_rate(&self, curve: &DiscountCurve) -> EngineResult<f64> {
        let annuity = self.annuity(curve)?;
        if annuity <= 0.0 {
            return Err(EngineError::invalid_deal("remaining annuity is zero"));
        }
        Ok(self.floating_leg_value(curve)? / annuity)
    }

    /// Value of one basis point on the fixed leg, signed from the holder's
    /// side once exercised (positive for receivers).
    pub fn fixed_leg_bps(&self, curve: &DiscountCurve) -> EngineResult<f64> {
        let bps = self.notional_f64 * self.annuity(curve)? * 1e-4;
        Ok(match self.side {
            SwaptionSide::Receiver => bps,
            SwaptionSide::Payer => -bps,
        })
    }

    /// NPV of the underlying swap from the holder's side.
    pub fn swap_npv(&self, curve: &DiscountCurve) -> EngineResult<f64> {
        let fixed = self.fixed_rate_f64 * self.annuity(curve)?;
        let float = self.floating_leg_value(curve)?;
        let per_unit = match self.side {
            SwaptionSide::Receiver => fixed - float,
            SwaptionSide::Payer => float - fixed,
        };
        Ok(self.notional_f64 * per_unit)
    }
}

/// Annuity of the fixed periods ending after `from`.
pub(crate) fn annuity_after(deal: &Deal, curve: &DiscountCurve, from: Date) -> EngineResult<f64> {
    deal.schedule
        .periods()
        .into_iter()
        .filter(|p| p.end > from)
        .try_fold(0.0, |acc, p| {
            Ok(acc + deal.day_count.year_fraction(p.start, p.end) * curve.discount_factor(p.end)?)
        })
}

/// Builder for [`Deal`].
#[derive(Debug, Clone, Default)]
pub struct DealBuilder {
    notional: Option<Decimal>,
    fixed_rate: Option<Decimal>,
    side: SwaptionSide,
    start: Option<Date>,
    maturity: Option<Date>,
    frequency: Frequency,
    day_count: DayCountConvention,
    exercise: ExerciseSchedule,
}

impl DealBuilder {
    /// Sets the notional.
    #[must_use]
    pub fn notional(mut self, notional: Decimal) -> Self {
        self.notional = Some(notional);
        self
    }

    /// Sets the fixed rate as a decimal.
    #[must_use]
    pub fn fixed_rate(mut self, rate: Decimal) -> Self {
        self.fixed_rate = Some(rate);
        self
    }

    /// Sets payer or receiver (default receiver).
    #[must_use]
    pub fn side(mut self, side: SwaptionSide) -> Self {
        self.side = side;
        self
    }

    /// Sets the underlying start date.
    #[must_use]
    pub fn start(mut self, start: Date) -> Self {
        self.start = Some(start);
        self
    }

    /// Sets the final maturity.
    #[must_use]
    pub fn maturity(mut self, maturity: Date) -> Self {
        self.maturity = Some(maturity);
        self
    }

    /// Sets the fixed leg frequency (default semi-annual).
    #[must_use]
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Sets the fixed leg day count (default ACT/365F).
    #[must_use]
    pub fn day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }

    /// Sets the exercise schedule (default every reset date).
    #[must_use]
    pub fn exercise(mut self, exercise: ExerciseSchedule) -> Self {
        self.exercise = exercise;
        self
    }

    /// Validates the terms and builds the deal.
    ///
    /// # Errors
    ///
    /// `EngineError::InvalidDeal` for missing or inconsistent terms.
    pub fn build(self) -> EngineResult<Deal> {
        let notional = self.notional.ok_or_else(|| EngineError::invalid_deal("notional is required"))?;
        let fixed_rate = self
            .fixed_rate
            .ok_or_else(|| EngineError::invalid_deal("fixed rate is required"))?;
        let start = self.start.ok_or_else(|| EngineError::invalid_deal("start date is required"))?;
        let maturity = self
            .maturity
            .ok_or_else(|| EngineError::invalid_deal("maturity is required"))?;

        if notional <= Decimal::ZERO {
            return Err(EngineError::invalid_deal(format!("notional {notional} must be positive")));
        }
        let notional_f64 = notional
            .to_f64()
            .ok_or_else(|| EngineError::invalid_deal(format!("notional {notional} is not representable")))?;
        let fixed_rate_f64 = fixed_rate
            .to_f64()
            .ok_or_else(|| EngineError::invalid_deal(format!("fixed rate {fixed_rate} is not representable")))?;

        let schedule = Schedule::generate(start, maturity, self.frequency)?;
        let exercise_dates = match self.exercise {
            ExerciseSchedule::Auto => schedule.reset_dates().to_vec(),
            ExerciseSchedule::Custom(dates) => {
                if dates.is_empty() {
                    return Err(EngineError::invalid_deal("no exercise dates"));
                }
                if let Some(w) = dates.windows(2).find(|w| w[1] <= w[0]) {
                    return Err(EngineError::invalid_deal(format!(
                        "exercise dates not strictly increasing at {} -> {}",
                        w[0], w[1]
                    )));
                }
                if let Some(d) = dates.iter().find(|d| **d != maturity && !schedule.is_reset_date(**d)) {
                    return Err(EngineError::invalid_deal(format!(
                        "exercise date {d} is not a reset date of the fixed leg"
                    )));
                }
                dates
            }
        };

        Ok(Deal {
            notional,
            fixed_rate,
            notional_f64,
            fixed_rate_f64,
            side: self.side,
            schedule,
            day_count: self.day_count,
            exercise_dates,
        })
    }
}
