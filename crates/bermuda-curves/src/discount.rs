//! Discount curve over market discount-factor nodes.

use bermuda_core::daycounts::{Act365Fixed, DayCount};
use bermuda_core::types::Date;
use bermuda_math::interpolation::{Interpolator, LogLinearInterpolator};

use crate::error::{CurveError, CurveResult};

const ANCHOR_TOLERANCE: f64 = 1e-10;

/// Discount factors above this level are accepted but logged.
const SUSPICIOUS_DF: f64 = 1.05;

/// Immutable discount curve.
///
/// Nodes are `(date, discount factor)` pairs. Time is ACT/365F years from the
/// as-of date. Between nodes the curve is log-linear in the discount factor
/// (linear in `t * z(t)`); beyond the last node the zero rate is held flat.
/// A node at the as-of date must carry 1.0; if absent, `(as_of, 1.0)` is
/// prepended.
///
/// # Example
///
/// ```rust
/// use bermuda_core::types::Date;
/// use bermuda_curves::DiscountCurve;
///
/// let t0 = Date::from_ymd(2025, 1, 1).unwrap();
/// let curve = DiscountCurve::new(
///     t0,
///     vec![
///         (t0, 1.0),
///         (t0.add_years(5).unwrap(), 0.90),
///         (t0.add_years(10).unwrap(), 0.80),
///     ],
/// )
/// .unwrap();
///
/// assert_eq!(curve.discount_factor(t0.add_years(5).unwrap()).unwrap(), 0.90);
/// ```
#[derive(Debug, Clone)]
pub struct DiscountCurve {
    as_of: Date,
    nodes: Vec<(Date, f64)>,
    interpolator: LogLinearInterpolator,
}

impl DiscountCurve {
    /// Builds a curve from nodes.
    ///
    /// # Errors
    ///
    /// `CurveError` if fewer than two nodes are supplied, dates are not
    /// strictly increasing, a node precedes `as_of`, a discount factor is not
    /// positive and finite, or the as-of node is not 1.
    pub fn new(as_of: Date, nodes: Vec<(Date, f64)>) -> CurveResult<Self> {
        if nodes.len() < 2 {
            return Err(CurveError::InsufficientPoints {
                required: 2,
                got: nodes.len(),
            });
        }

        for (i, w) in nodes.windows(2).enumerate() {
            if w[1].0 <= w[0].0 {
                return Err(CurveError::NonIncreasingDates {
                    index: i + 1,
                    prev: w[0].0,
                    current: w[1].0,
                });
            }
        }

        for &(date, df) in &nodes {
            if date < as_of {
                return Err(CurveError::NodeBeforeAsOf { date, as_of });
            }
            if !(df > 0.0 && df.is_finite()) {
                return Err(CurveError::InvalidDiscountFactor { date, value: df });
            }
            if df > SUSPICIOUS_DF {
                log::warn!("discount factor {df:.6} > {SUSPICIOUS_DF} at {date}; check curve data");
            }
        }

        for w in nodes.windows(2) {
            if w[1].1 > w[0].1 + 1e-6 {
                log::warn!(
                    "non-monotone discount factors: {}={:.6} -> {}={:.6}",
                    w[0].0,
                    w[0].1,
                    w[1].0,
                    w[1].1
                );
            }
        }

        let mut nodes = nodes;
        if nodes[0].0 == as_of {
            if (nodes[0].1 - 1.0).abs() > ANCHOR_TOLERANCE {
                return Err(CurveError::AnchorNotUnity { value: nodes[0].1 });
            }
            nodes[0].1 = 1.0;
        } else {
            nodes.insert(0, (as_of, 1.0));
        }

        let times = nodes.iter().map(|(d, _)| year_fraction(as_of, *d)).collect();
        let dfs = nodes.iter().map(|(_, df)| *df).collect();
        let interpolator = LogLinearInterpolator::new(times, dfs)?;

        Ok(Self {
            as_of,
            nodes,
            interpolator,
        })
    }

    /// Flat continuously-compounded curve, mostly for tests and examples.
    ///
    /// # Errors
    ///
    /// Propagates date arithmetic errors.
    pub fn flat(as_of: Date, rate: f64, horizon_years: i32) -> CurveResult<Self> {
        let end = as_of.add_years(horizon_years)?;
        let t = year_fraction(as_of, end);
        Self::new(as_of, vec![(as_of, 1.0), (end, (-rate * t).exp())])
    }

    /// Valuation date.
    #[must_use]
    pub fn as_of(&self) -> Date {
        self.as_of
    }

    /// Nodes including the as-of anchor.
    #[must_use]
    pub fn nodes(&self) -> &[(Date, f64)] {
        &self.nodes
    }

    /// Model time of a date: ACT/365F years from the as-of date.
    #[must_use]
    pub fn time(&self, date: Date) -> f64 {
        year_fraction(self.as_of, date)
    }

    /// Last node time.
    #[must_use]
    pub fn max_time(&self) -> f64 {
        self.interpolator.max_x()
    }

    /// Discount factor at a date.
    ///
    /// # Errors
    ///
    /// `CurveError::NegativeTime` for dates before the as-of date.
    pub fn discount_factor(&self, date: Date) -> CurveResult<f64> {
        self.discount(self.time(date))
    }

    /// Discount factor at model time `t`.
    ///
    /// # Errors
    ///
    /// `CurveError::NegativeTime` for `t < 0`.
    pub fn discount(&self, t: f64) -> CurveResult<f64> {
        if t < 0.0 {
            return Err(CurveError::NegativeTime { t });
        }
        let t_max = self.max_time();
        if t <= t_max {
            Ok(self.interpolator.interpolate(t)?)
        } else {
            let last = self.nodes[self.nodes.len() - 1].1;
            Ok((last.ln() * t / t_max).exp())
        }
    }

    /// Continuously-compounded zero rate to `t`.
    ///
    /// At `t = 0` this is the instantaneous forward of the first segment.
    pub fn zero_rate(&self, t: f64) -> CurveResult<f64> {
        if t <= 0.0 {
            return self.instantaneous_forward(0.0);
        }
        Ok(-self.discount(t)?.ln() / t)
    }

    /// Continuously-compounded forward rate between `t1` and `t2`.
    ///
    /// # Errors
    ///
    /// `CurveError::Math` if `t2 <= t1`.
    pub fn forward_rate(&self, t1: f64, t2: f64) -> CurveResult<f64> {
        if t2 <= t1 {
            return Err(CurveError::Math(bermuda_math::MathError::invalid_input(format!(
                "forward period [{t1}, {t2}] is empty"
            ))));
        }
        Ok((self.discount(t1)? / self.discount(t2)?).ln() / (t2 - t1))
    }

    /// Instantaneous forward rate `-d ln P / dt`.
    pub fn instantaneous_forward(&self, t: f64) -> CurveResult<f64> {
        if t < 0.0 {
            return Err(CurveError::NegativeTime { t });
        }
        if t < self.max_time() {
            let df = self.interpolator.interpolate(t)?;
            Ok(-self.interpolator.derivative(t)? / df)
        } else {
            self.zero_rate(self.max_time())
        }
    }

    /// Curve seen from a later valuation date.
    ///
    /// Nodes on or before `new_as_of` are dropped and the remaining factors
    /// are re-anchored so that the discount factor at `new_as_of` is 1.
    ///
    /// # Errors
    ///
    /// `CurveError::NodeBeforeAsOf` if `new_as_of` precedes the current
    /// as-of date, `CurveError::InsufficientPoints` if no node survives.
    pub fn roll_to(&self, new_as_of: Date) -> CurveResult<Self> {
        if new_as_of < self.as_of {
            return Err(CurveError::NodeBeforeAsOf {
                date: new_as_of,
                as_of: self.as_of,
            });
        }
        let anchor = self.discount_factor(new_as_of)?;
        let mut nodes = vec![(new_as_of, 1.0)];
        nodes.extend(
            self.nodes
                .iter()
                .filter(|(d, _)| *d > new_as_of)
                .map(|&(d, df)| (d, df / anchor)),
        );
        Self::new(new_as_of, nodes)
    }

    /// Applies a zero-rate shift `s(t)` to every node: `P'(t) = P(t) e^{-s(t) t}`.
    ///
    /// For a constant shift this is exact everywhere, since the shift is
    /// linear in `ln P`.
    pub(crate) fn shifted(&self, shift: impl Fn(f64) -> f64) -> CurveResult<Self> {
        let nodes = self
            .nodes
            .iter()
            .map(|&(d, df)| {
                let t = self.time(d);
                (d, df * (-shift(t) * t).exp())
            })
            .collect();
        Self::new(self.as_of, nodes)
    }
}

/// ACT/365F year fraction between two dates.
#[must_use]
pub fn year_fraction(start: Date, end: Date) -> f64 {
    Act365Fixed.year_fraction(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn t0() -> Date {
        Date::from_ymd(2025, 1, 1).unwrap()
    }

    fn sample() -> DiscountCurve {
        let t0 = t0();
        DiscountCurve::new(
            t0,
            vec![
                (t0, 1.0),
                (t0.add_years(5).unwrap(), 0.90),
                (t0.add_years(10).unwrap(), 0.80),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_reproduces_nodes() {
        let curve = sample();
        for &(date, df) in curve.nodes() {
            assert_relative_eq!(curve.discount_factor(date).unwrap(), df, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_anchor_prepended() {
        let t0 = t0();
        let curve = DiscountCurve::new(
            t0,
            vec![(t0.add_years(1).unwrap(), 0.97), (t0.add_years(2).unwrap(), 0.94)],
        )
        .unwrap();
        assert_eq!(curve.nodes().len(), 3);
        assert_eq!(curve.discount(0.0).unwrap(), 1.0);
    }

    #[test]
    fn test_flat_zero_extrapolation() {
        let curve = sample();
        let t_max = curve.max_time();
        let z = curve.zero_rate(t_max).unwrap();
        assert_relative_eq!(curve.zero_rate(t_max + 7.0).unwrap(), z, epsilon = 1e-12);
        assert_relative_eq!(curve.instantaneous_forward(t_max + 1.0).unwrap(), z, epsilon = 1e-12);
    }

    #[test]
    fn test_forward_rates() {
        let curve = sample();
        let t5 = curve.time(t0().add_years(5).unwrap());
        let t10 = curve.time(t0().add_years(10).unwrap());
        let fwd = curve.forward_rate(t5, t10).unwrap();
        assert_relative_eq!(fwd, (0.90f64 / 0.80).ln() / (t10 - t5), epsilon = 1e-12);
        assert_relative_eq!(curve.instantaneous_forward(7.0).unwrap(), fwd, epsilon = 1e-10);
    }

    #[test]
    fn test_rejects_malformed() {
        let t0 = t0();
        let d1 = t0.add_years(1).unwrap();
        assert!(matches!(
            DiscountCurve::new(t0, vec![(d1, 0.97)]),
            Err(CurveError::InsufficientPoints { .. })
        ));
        assert!(matches!(
            DiscountCurve::new(t0, vec![(d1, 0.97), (d1, 0.96)]),
            Err(CurveError::NonIncreasingDates { .. })
        ));
        assert!(matches!(
            DiscountCurve::new(t0, vec![(t0, 1.0), (d1, -0.5)]),
            Err(CurveError::InvalidDiscountFactor { .. })
        ));
        assert!(matches!(
            DiscountCurve::new(t0, vec![(t0, 0.99), (d1, 0.97)]),
            Err(CurveError::AnchorNotUnity { .. })
        ));
        assert!(matches!(
            DiscountCurve::new(d1, vec![(t0, 1.0), (d1.add_years(1).unwrap(), 0.97)]),
            Err(CurveError::NodeBeforeAsOf { .. })
        ));
    }

    #[test]
    fn test_roll_reanchors() {
        let curve = sample();
        let next = t0().add_days(1);
        let rolled = curve.roll_to(next).unwrap();
        assert_eq!(rolled.as_of(), next);
        assert_eq!(rolled.discount(0.0).unwrap(), 1.0);

        let d5 = t0().add_years(5).unwrap();
        let expected = 0.90 / curve.discount_factor(next).unwrap();
        assert_relative_eq!(rolled.discount_factor(d5).unwrap(), expected, epsilon = 1e-14);
        assert!(curve.roll_to(t0().add_days(-1)).is_err());
    }

    #[test]
    fn test_negative_time_rejected() {
        assert!(sample().discount(-0.01).is_err());
    }
}
