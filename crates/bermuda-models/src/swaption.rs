//! Fixed coupon legs and analytic European swaptions.
//!
//! A swap with the floating leg at par on its reset date is a coupon bond
//! minus par, so a European swaption is an option on a coupon bond struck at
//! 1. In a one-factor model that option decomposes into a portfolio of
//! zero-coupon bond options (Jamshidian).

use bermuda_curves::DiscountCurve;
use bermuda_math::solvers::{expand_bracket, try_brent_in, BracketExpansion, SolverConfig};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::hull_white::HullWhiteParams;

/// Payer (pay fixed) or receiver (receive fixed) swaption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SwaptionSide {
    /// Right to enter a swap paying fixed; gains when rates rise.
    Payer,
    /// Right to enter a swap receiving fixed; gains when rates fall.
    #[default]
    Receiver,
}

impl SwaptionSide {
    /// Exercise value per unit notional given the coupon bond value.
    ///
    /// Receiver: `CB - 1`; payer: `1 - CB`.
    #[must_use]
    pub fn intrinsic(self, coupon_bond: f64) -> f64 {
        match self {
            SwaptionSide::Receiver => coupon_bond - 1.0,
            SwaptionSide::Payer => 1.0 - coupon_bond,
        }
    }

    /// Label used in reports.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SwaptionSide::Payer => "Payer",
            SwaptionSide::Receiver => "Receiver",
        }
    }
}

/// Fixed-leg payments per unit notional, principal included on the last one.
///
/// `amounts[i] = K τ_i` for coupons, plus 1 on the final payment.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponLeg {
    times: Vec<f64>,
    amounts: Vec<f64>,
}

impl CouponLeg {
    /// Creates a leg from payment times (years) and amounts.
    ///
    /// # Errors
    ///
    /// `ModelError::InvalidLeg` if empty, lengths differ, or times are not
    /// strictly increasing.
    pub fn new(times: Vec<f64>, amounts: Vec<f64>) -> ModelResult<Self> {
        if times.is_empty() || times.len() != amounts.len() {
            return Err(ModelError::invalid_leg(format!(
                "{} payment times for {} amounts",
                times.len(),
                amounts.len()
            )));
        }
        if times.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ModelError::invalid_leg("payment times must be strictly increasing"));
        }
        Ok(Self { times, amounts })
    }

    /// Coupon bond from accrual fractions and a fixed rate.
    pub fn from_accruals(times: Vec<f64>, accruals: &[f64], rate: f64) -> ModelResult<Self> {
        let mut amounts: Vec<f64> = accruals.iter().map(|tau| rate * tau).collect();
        if let Some(last) = amounts.last_mut() {
            *last += 1.0;
        }
        Self::new(times, amounts)
    }

    /// Payment times.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Payment amounts.
    #[must_use]
    pub fn amounts(&self) -> &[f64] {
        &self.amounts
    }

    /// Payments strictly after `t`.
    ///
    /// # Errors
    ///
    /// `ModelError::InvalidLeg` if nothing is paid after `t`.
    pub fn after(&self, t: f64) -> ModelResult<Self> {
        let first = self.times.partition_point(|s| *s <= t);
        Self::new(self.times[first..].to_vec(), self.amounts[first..].to_vec())
    }

    /// Coupon bond value at time `t` in state `x`.
    pub fn value_at(&self, params: &HullWhiteParams, curve: &DiscountCurve, t: f64, x: f64) -> ModelResult<f64> {
        self.times
            .iter()
            .zip(&self.amounts)
            .try_fold(0.0, |acc, (&s, &c)| Ok(acc + c * params.bond_price(curve, t, s, x)?))
    }

    /// Coupon bond value today from the curve.
    pub fn present_value(&self, curve: &DiscountCurve) -> ModelResult<f64> {
        self.times
            .iter()
            .zip(&self.amounts)
            .try_fold(0.0, |acc, (&s, &c)| Ok(acc + c * curve.discount(s)?))
    }
}

/// European swaption per unit notional by Jamshidian decomposition.
///
/// `leg` holds the payments after `expiry`; the floating leg is worth par at
/// `expiry`. A non-positive expiry returns intrinsic value from the curve.
///
/// # Errors
///
/// `ModelError::InvalidLeg` if a payment falls on or before the expiry, or
/// the critical state cannot be bracketed.
pub fn european_swaption(
    params: &HullWhiteParams,
    curve: &DiscountCurve,
    expiry: f64,
    leg: &CouponLeg,
    side: SwaptionSide,
) -> ModelResult<f64> {
    if leg.times()[0] <= expiry {
        return Err(ModelError::invalid_leg(format!(
            "payment at {:.4} is not after expiry {expiry:.4}",
            leg.times()[0]
        )));
    }
    if expiry <= 0.0 {
        let intrinsic = side.intrinsic(leg.present_value(curve)?);
        return Ok(intrinsic.max(0.0));
    }

    let x_star = critical_state(params, curve, expiry, leg)?;

    let mut total = 0.0;
    for (&s, &c) in leg.times().iter().zip(leg.amounts()) {
        let strike = params.bond_price(curve, expiry, s, x_star)?;
        total += c * match side {
            SwaptionSide::Receiver => params.zero_bond_call(curve, expiry, s, strike)?,
            SwaptionSide::Payer => params.zero_bond_put(curve, expiry, s, strike)?,
        };
    }
    Ok(total)
}

/// State `x*` at which the coupon bond is worth exactly par at `expiry`.
fn critical_state(
    params: &HullWhiteParams,
    curve: &DiscountCurve,
    expiry: f64,
    leg: &CouponLeg,
) -> ModelResult<f64> {
    let mut objective = |x: f64| -> ModelResult<f64> { Ok(leg.value_at(params, curve, expiry, x)? - 1.0) };
    let bracket = expand_bracket(
        &mut objective,
        -0.05,
        0.05,
        BracketExpansion::Symmetric { floor: None },
        20,
    )?;
    let config = SolverConfig::default().with_tolerance(1e-14);
    let result = try_brent_in(objective, &bracket, &config)?;
    log::trace!(
        "jamshidian x* = {:.8} at expiry {expiry:.4} ({} iterations)",
        result.root,
        result.iterations
    );
    Ok(result.root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bermuda_core::types::Date;

    fn curve() -> DiscountCurve {
        DiscountCurve::flat(Date::from_ymd(2025, 1, 1).unwrap(), 0.03, 40).unwrap()
    }

    fn annual_leg(start: f64, end: u32, rate: f64) -> CouponLeg {
        let times: Vec<f64> = (1..=end).map(|k| start + f64::from(k)).collect();
        let accruals = vec![1.0; times.len()];
        CouponLeg::from_accruals(times, &accruals, rate).unwrap()
    }

    #[test]
    fn test_put_call_parity_on_swaptions() {
        let hw = HullWhiteParams::flat(0.03, 0.01).unwrap();
        let c = curve();
        let leg = annual_leg(5.0, 5, 0.035);
        let rec = european_swaption(&hw, &c, 5.0, &leg, SwaptionSide::Receiver).unwrap();
        let pay = european_swaption(&hw, &c, 5.0, &leg, SwaptionSide::Payer).unwrap();
        let forward_bond = leg.present_value(&c).unwrap() - c.discount(5.0).unwrap();
        assert_relative_eq!(rec - pay, forward_bond, epsilon = 1e-12);
    }

    #[test]
    fn test_price_increases_with_vol() {
        let c = curve();
        let leg = annual_leg(3.0, 7, 0.03);
        let low = HullWhiteParams::flat(0.03, 0.006).unwrap();
        let high = HullWhiteParams::flat(0.03, 0.012).unwrap();
        let p_low = european_swaption(&low, &c, 3.0, &leg, SwaptionSide::Receiver).unwrap();
        let p_high = european_swaption(&high, &c, 3.0, &leg, SwaptionSide::Receiver).unwrap();
        assert!(p_high > p_low && p_low > 0.0);
    }

    #[test]
    fn test_leg_after() {
        let leg = annual_leg(0.0, 5, 0.03);
        let tail = leg.after(2.0).unwrap();
        assert_eq!(tail.times(), &[3.0, 4.0, 5.0]);
        assert!(leg.after(5.0).is_err());
    }

    #[test]
    fn test_rejects_payment_before_expiry() {
        let hw = HullWhiteParams::flat(0.03, 0.01).unwrap();
        let leg = annual_leg(0.0, 5, 0.03);
        assert!(european_swaption(&hw, &curve(), 2.5, &leg, SwaptionSide::Payer).is_err());
    }

    #[test]
    fn test_intrinsic() {
        assert_relative_eq!(SwaptionSide::Receiver.intrinsic(1.02), 0.02, epsilon = 1e-15);
        assert_relative_eq!(SwaptionSide::Payer.intrinsic(1.02), -0.02, epsilon = 1e-15);
    }
}
