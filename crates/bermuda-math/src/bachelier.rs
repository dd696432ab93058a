//! Bachelier (normal) option formulae on a forward rate.
//!
//! Prices are undiscounted and per unit annuity; multiply by the annuity
//! (PV01) to get a swaption premium.

use crate::distributions::{norm_cdf, norm_pdf};

/// Payer (call on the rate) price: `(F-K)Φ(d) + sφ(d)`, `s = σ√T`, `d = (F-K)/s`.
///
/// Returns intrinsic value when `sigma <= 0` or `expiry <= 0`.
#[must_use]
pub fn bachelier_payer(forward: f64, strike: f64, sigma: f64, expiry: f64) -> f64 {
    if sigma <= 0.0 || expiry <= 0.0 {
        return (forward - strike).max(0.0);
    }
    let s = sigma * expiry.sqrt();
    let d = (forward - strike) / s;
    (forward - strike) * norm_cdf(d) + s * norm_pdf(d)
}

/// Receiver (put on the rate) price: `(K-F)Φ(-d) + sφ(d)`.
///
/// Returns intrinsic value when `sigma <= 0` or `expiry <= 0`.
#[must_use]
pub fn bachelier_receiver(forward: f64, strike: f64, sigma: f64, expiry: f64) -> f64 {
    if sigma <= 0.0 || expiry <= 0.0 {
        return (strike - forward).max(0.0);
    }
    let s = sigma * expiry.sqrt();
    let d = (forward - strike) / s;
    (strike - forward) * norm_cdf(-d) + s * norm_pdf(d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_atm_value() {
        let (sigma, t) = (0.0060_f64, 5.0_f64);
        let atm = sigma * t.sqrt() / (2.0 * std::f64::consts::PI).sqrt();
        assert_relative_eq!(bachelier_payer(0.03, 0.03, sigma, t), atm, epsilon = 1e-15);
        assert_relative_eq!(bachelier_receiver(0.03, 0.03, sigma, t), atm, epsilon = 1e-15);
    }

    #[test]
    fn test_put_call_parity() {
        for (f, k) in [(0.03, 0.02), (0.01, 0.04), (-0.002, 0.001)] {
            let diff = bachelier_payer(f, k, 0.008, 3.0) - bachelier_receiver(f, k, 0.008, 3.0);
            assert_relative_eq!(diff, f - k, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_degenerate_inputs_give_intrinsic() {
        assert_eq!(bachelier_payer(0.05, 0.03, 0.0, 1.0), 0.05 - 0.03);
        assert_eq!(bachelier_receiver(0.05, 0.03, 0.01, 0.0), 0.0);
    }
}
