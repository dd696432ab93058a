//! Standard normal distribution helpers.

use statrs::distribution::{Continuous, ContinuousCDF, Normal};

fn standard_normal() -> Normal {
    Normal::standard()
}

/// Standard normal cumulative distribution function Φ(x).
#[must_use]
pub fn norm_cdf(x: f64) -> f64 {
    standard_normal().cdf(x)
}

/// Standard normal density φ(x).
#[must_use]
pub fn norm_pdf(x: f64) -> f64 {
    standard_normal().pdf(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_known_values() {
        assert_relative_eq!(norm_cdf(0.0), 0.5, epsilon = 1e-15);
        assert_relative_eq!(norm_cdf(1.96), 0.975_002_104_851_780, epsilon = 1e-12);
        assert_relative_eq!(norm_pdf(0.0), 0.398_942_280_401_432_7, epsilon = 1e-15);
    }

    #[test]
    fn test_symmetry() {
        for x in [-3.0, -0.7, 0.2, 1.4, 4.0] {
            assert_relative_eq!(norm_cdf(x) + norm_cdf(-x), 1.0, epsilon = 1e-14);
            assert_relative_eq!(norm_pdf(x), norm_pdf(-x), epsilon = 1e-16);
        }
    }
}
