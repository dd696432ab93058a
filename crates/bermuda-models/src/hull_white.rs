//! Hull-White one-factor short rate model with piecewise-constant volatility.
//!
//! The model is written in the shifted state `x = r - φ(t)`:
//!
//! ```text
//! dx = (y(t) - a x) dt + σ(t) dW,    x(0) = 0
//! y(t) = ∫₀ᵗ σ(u)² e^{-2a(t-u)} du
//! ```
//!
//! where `φ` is fixed by the initial discount curve, so the model reprices
//! it exactly. Zero-coupon bonds are affine in `x`:
//!
//! ```text
//! P(t,T | x) = P(0,T)/P(0,t) · exp(-B(t,T) x - ½ B(t,T)² y(t))
//! B(t,T) = (1 - e^{-a(T-t)}) / a
//! ```

use bermuda_curves::DiscountCurve;
use bermuda_math::distributions::norm_cdf;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Piecewise-constant short-rate volatility.
///
/// Bucket `i` covers `(breaks[i-1], breaks[i]]`; the last bucket extends flat
/// to infinity. With one bucket per exercise date the breaks are the
/// exercise times except the last.
///
/// # Example
///
/// ```rust
/// use bermuda_models::VolTermStructure;
///
/// let vol = VolTermStructure::new(vec![1.0, 2.0], vec![0.010, 0.012, 0.011]).unwrap();
/// assert_eq!(vol.sigma_at(0.5), 0.010);
/// assert_eq!(vol.sigma_at(1.0), 0.010);
/// assert_eq!(vol.sigma_at(1.5), 0.012);
/// assert_eq!(vol.sigma_at(40.0), 0.011);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolTermStructure {
    breaks: Vec<f64>,
    sigmas: Vec<f64>,
}

impl VolTermStructure {
    /// Creates a term structure from bucket ends and bucket vols.
    ///
    /// # Errors
    ///
    /// `ModelError::InvalidParameter` unless `sigmas.len() == breaks.len() + 1`,
    /// breaks are positive and strictly increasing, and every σ is positive
    /// and finite.
    pub fn new(breaks: Vec<f64>, sigmas: Vec<f64>) -> ModelResult<Self> {
        if sigmas.len() != breaks.len() + 1 {
            return Err(ModelError::invalid_parameter(
                "sigmas",
                sigmas.len() as f64,
                format!("expected {} buckets for {} breaks", breaks.len() + 1, breaks.len()),
            ));
        }
        if let Some(&b) = breaks.iter().find(|b| !(b.is_finite() && **b > 0.0)) {
            return Err(ModelError::invalid_parameter("break", b, "must be positive"));
        }
        if let Some(w) = breaks.windows(2).find(|w| w[1] <= w[0]) {
            return Err(ModelError::invalid_parameter(
                "break",
                w[1],
                "breaks must be strictly increasing",
            ));
        }
        if let Some(&s) = sigmas.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(ModelError::invalid_parameter("sigma", s, "must be positive and finite"));
        }
        Ok(Self { breaks, sigmas })
    }

    /// Constant volatility.
    pub fn flat(sigma: f64) -> ModelResult<Self> {
        Self::new(Vec::new(), vec![sigma])
    }

    /// Same σ in every bucket delimited by `breaks`.
    pub fn uniform(breaks: Vec<f64>, sigma: f64) -> ModelResult<Self> {
        let n = breaks.len() + 1;
        Self::new(breaks, vec![sigma; n])
    }

    /// Volatility at time `t`.
    #[must_use]
    pub fn sigma_at(&self, t: f64) -> f64 {
        self.sigmas[self.breaks.partition_point(|b| *b < t)]
    }

    /// Bucket volatilities.
    #[must_use]
    pub fn sigmas(&self) -> &[f64] {
        &self.sigmas
    }

    /// Bucket ends.
    #[must_use]
    pub fn breaks(&self) -> &[f64] {
        &self.breaks
    }

    /// Number of buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sigmas.len()
    }

    /// Always false; a term structure has at least one bucket.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sigmas.is_empty()
    }

    /// Smallest bucket volatility.
    #[must_use]
    pub fn min_sigma(&self) -> f64 {
        self.sigmas.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Every bucket shifted by `delta`.
    ///
    /// # Errors
    ///
    /// Fails if a shifted bucket is not strictly positive.
    pub fn shifted(&self, delta: f64) -> ModelResult<Self> {
        Self::new(
            self.breaks.clone(),
            self.sigmas.iter().map(|s| s + delta).collect(),
        )
    }

    /// Sets bucket `index` and every later bucket to `sigma`.
    ///
    /// Later buckets are overwritten so the next bootstrap stage starts from
    /// the latest solved level.
    pub fn with_bucket_from(&self, index: usize, sigma: f64) -> ModelResult<Self> {
        let mut sigmas = self.sigmas.clone();
        for s in sigmas.iter_mut().skip(index) {
            *s = sigma;
        }
        Self::new(self.breaks.clone(), sigmas)
    }

    /// Segments `(u0, u1, σ)` of constant volatility covering `[s, t]`.
    fn segments(&self, s: f64, t: f64) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        let inner = self.breaks.iter().copied().filter(move |b| *b > s && *b < t);
        let edges: Vec<f64> = std::iter::once(s).chain(inner).chain(std::iter::once(t)).collect();
        (0..edges.len() - 1).map(move |k| {
            let (u0, u1) = (edges[k], edges[k + 1]);
            (u0, u1, self.sigma_at(0.5 * (u0 + u1)))
        })
    }
}

/// Hull-White one-factor parameters: mean reversion `a` and σ(t).
///
/// # Example
///
/// ```rust
/// use bermuda_models::HullWhiteParams;
///
/// let hw = HullWhiteParams::flat(0.03, 0.01).unwrap();
/// let b = hw.b(0.0, 1.0);
/// assert!((b - (1.0 - (-0.03f64).exp()) / 0.03).abs() < 1e-14);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HullWhiteParams {
    mean_reversion: f64,
    vol: VolTermStructure,
}

impl HullWhiteParams {
    /// Creates model parameters.
    ///
    /// # Errors
    ///
    /// `ModelError::InvalidParameter` if `a` is not positive and finite.
    pub fn new(mean_reversion: f64, vol: VolTermStructure) -> ModelResult<Self> {
        if !(mean_reversion.is_finite() && mean_reversion > 0.0) {
            return Err(ModelError::invalid_parameter(
                "mean_reversion",
                mean_reversion,
                "must be positive",
            ));
        }
        Ok(Self {
            mean_reversion,
            vol,
        })
    }

    /// Constant-volatility model.
    pub fn flat(mean_reversion: f64, sigma: f64) -> ModelResult<Self> {
        Self::new(mean_reversion, VolTermStructure::flat(sigma)?)
    }

    /// Mean reversion speed `a`.
    #[must_use]
    pub fn mean_reversion(&self) -> f64 {
        self.mean_reversion
    }

    /// Volatility term structure.
    #[must_use]
    pub fn vol(&self) -> &VolTermStructure {
        &self.vol
    }

    /// Same mean reversion, new volatility.
    #[must_use]
    pub fn with_vol(&self, vol: VolTermStructure) -> Self {
        Self {
            mean_reversion: self.mean_reversion,
            vol,
        }
    }

    /// `B(t,T) = (1 - e^{-a(T-t)}) / a`.
    #[must_use]
    pub fn b(&self, t: f64, maturity: f64) -> f64 {
        let tau = maturity - t;
        if tau <= 0.0 {
            return 0.0;
        }
        -(-self.mean_reversion * tau).exp_m1() / self.mean_reversion
    }

    /// Variance of `x` accumulated from `s` to `t`: `∫ₛᵗ σ(u)² e^{-2a(t-u)} du`.
    #[must_use]
    pub fn conditional_variance(&self, s: f64, t: f64) -> f64 {
        if t <= s {
            return 0.0;
        }
        let two_a = 2.0 * self.mean_reversion;
        self.vol
            .segments(s, t)
            .map(|(u0, u1, sigma)| {
                let decay = (-two_a * (t - u1)).exp();
                -sigma * sigma * decay * (-two_a * (u1 - u0)).exp_m1() / two_a
            })
            .sum()
    }

    /// `y(t)`, the variance of `x(t)` seen from time 0.
    #[must_use]
    pub fn variance(&self, t: f64) -> f64 {
        self.conditional_variance(0.0, t.max(0.0))
    }

    /// Zero-coupon bond price `P(t,T)` in state `x`.
    ///
    /// # Errors
    ///
    /// Propagates curve lookups; fails for `t < 0`.
    pub fn bond_price(&self, curve: &DiscountCurve, t: f64, maturity: f64, x: f64) -> ModelResult<f64> {
        let b = self.b(t, maturity);
        let ratio = curve.discount(maturity)? / curve.discount(t)?;
        Ok(ratio * (-b * x - 0.5 * b * b * self.variance(t)).exp())
    }

    /// Standard deviation of `ln P(T,S)` at option expiry `T`.
    fn bond_vol(&self, expiry: f64, maturity: f64) -> f64 {
        self.b(expiry, maturity) * self.variance(expiry).sqrt()
    }

    /// European call on the zero-coupon bond `P(T,S)` with strike `K`, seen at 0.
    ///
    /// ```text
    /// ZBC = P(0,S) Φ(h) - K P(0,T) Φ(h - σp)
    /// h   = ln(P(0,S) / (K P(0,T))) / σp + σp / 2
    /// ```
    pub fn zero_bond_call(
        &self,
        curve: &DiscountCurve,
        expiry: f64,
        maturity: f64,
        strike: f64,
    ) -> ModelResult<f64> {
        let p_t = curve.discount(expiry)?;
        let p_s = curve.discount(maturity)?;
        let sigma_p = self.bond_vol(expiry, maturity);
        if sigma_p <= 0.0 {
            return Ok((p_s - strike * p_t).max(0.0));
        }
        let h = (p_s / (strike * p_t)).ln() / sigma_p + 0.5 * sigma_p;
        Ok(p_s * norm_cdf(h) - strike * p_t * norm_cdf(h - sigma_p))
    }

    /// European put on the zero-coupon bond `P(T,S)` with strike `K`, seen at 0.
    pub fn zero_bond_put(
        &self,
        curve: &DiscountCurve,
        expiry: f64,
        maturity: f64,
        strike: f64,
    ) -> ModelResult<f64> {
        let p_t = curve.discount(expiry)?;
        let p_s = curve.discount(maturity)?;
        let sigma_p = self.bond_vol(expiry, maturity);
        if sigma_p <= 0.0 {
            return Ok((strike * p_t - p_s).max(0.0));
        }
        let h = (p_s / (strike * p_t)).ln() / sigma_p + 0.5 * sigma_p;
        Ok(strike * p_t * norm_cdf(sigma_p - h) - p_s * norm_cdf(-h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bermuda_core::types::Date;

    fn curve() -> DiscountCurve {
        DiscountCurve::flat(Date::from_ymd(2025, 1, 1).unwrap(), 0.03, 30).unwrap()
    }

    #[test]
    fn test_flat_variance_closed_form() {
        let (a, sigma) = (0.05, 0.01);
        let hw = HullWhiteParams::flat(a, sigma).unwrap();
        let t = 4.0;
        let expected = sigma * sigma * (1.0 - (-2.0 * a * t).exp()) / (2.0 * a);
        assert_relative_eq!(hw.variance(t), expected, epsilon = 1e-16);
    }

    #[test]
    fn test_piecewise_variance_additivity() {
        let vol = VolTermStructure::new(vec![1.0, 3.0], vec![0.008, 0.012, 0.010]).unwrap();
        let hw = HullWhiteParams::new(0.04, vol).unwrap();
        let (s, t): (f64, f64) = (2.0, 5.0);
        let decay = (-2.0 * 0.04 * (t - s)).exp();
        assert_relative_eq!(
            hw.variance(t),
            hw.variance(s) * decay + hw.conditional_variance(s, t),
            epsilon = 1e-16
        );
    }

    #[test]
    fn test_bond_price_at_zero_state_reprices_forward() {
        let hw = HullWhiteParams::flat(0.03, 0.01).unwrap();
        let c = curve();
        let p0 = hw.bond_price(&c, 0.0, 7.0, 0.0).unwrap();
        assert_relative_eq!(p0, c.discount(7.0).unwrap(), epsilon = 1e-14);
        assert!(hw.bond_price(&c, 2.0, 7.0, 0.01).unwrap() < hw.bond_price(&c, 2.0, 7.0, 0.0).unwrap());
    }

    #[test]
    fn test_zero_bond_put_call_parity() {
        let hw = HullWhiteParams::flat(0.03, 0.012).unwrap();
        let c = curve();
        let (t, s, k) = (2.0, 7.0, 0.88);
        let call = hw.zero_bond_call(&c, t, s, k).unwrap();
        let put = hw.zero_bond_put(&c, t, s, k).unwrap();
        let forward = c.discount(s).unwrap() - k * c.discount(t).unwrap();
        assert_relative_eq!(call - put, forward, epsilon = 1e-14);
        assert!(call > 0.0 && put > 0.0);
    }

    #[test]
    fn test_validation() {
        assert!(HullWhiteParams::flat(0.0, 0.01).is_err());
        assert!(VolTermStructure::flat(-0.01).is_err());
        assert!(VolTermStructure::new(vec![2.0, 1.0], vec![0.01; 3]).is_err());
        assert!(VolTermStructure::new(vec![1.0], vec![0.01]).is_err());
        assert!(VolTermStructure::flat(0.01).unwrap().shifted(-0.02).is_err());
    }

    #[test]
    fn test_bucket_overwrite() {
        let vol = VolTermStructure::uniform(vec![1.0, 2.0], 0.01).unwrap();
        let next = vol.with_bucket_from(1, 0.015).unwrap();
        assert_eq!(next.sigmas(), &[0.01, 0.015, 0.015]);
        assert_relative_eq!(next.min_sigma(), 0.01);
    }
}
