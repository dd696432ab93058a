//! Log-linear interpolation.
//!
//! Interpolates the logarithm of values, the standard choice for discount
//! factors: interpolated values stay positive and forwards are piecewise flat.

use crate::error::{MathError, MathResult};
use crate::interpolation::{find_segment, validate_axis, Interpolator};

/// Log-linear interpolation between data points.
///
/// ```text
/// y(x) = exp(linear_interpolate(x, ln(y)))
/// ```
///
/// # Example
///
/// ```rust
/// use bermuda_math::interpolation::{LogLinearInterpolator, Interpolator};
///
/// let times = vec![0.0, 1.0, 2.0, 3.0];
/// let discount_factors = vec![1.0, 0.97, 0.94, 0.91];
///
/// let interp = LogLinearInterpolator::new(times, discount_factors).unwrap();
/// let df = interp.interpolate(1.5).unwrap();
/// assert!(df < 0.97 && df > 0.94);
/// ```
#[derive(Debug, Clone)]
pub struct LogLinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    log_ys: Vec<f64>,
}

impl LogLinearInterpolator {
    /// Creates a new log-linear interpolator.
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than 2 points, the lengths
    /// differ, x values are not strictly increasing, or any y value is not
    /// positive and finite.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        if xs.len() != ys.len() {
            return Err(MathError::invalid_input(format!(
                "xs and ys must have same length: {} vs {}",
                xs.len(),
                ys.len()
            )));
        }
        validate_axis("x", &xs, 2)?;

        let log_ys = ys
            .iter()
            .enumerate()
            .map(|(i, &y)| {
                if y > 0.0 && y.is_finite() {
                    Ok(y.ln())
                } else {
                    Err(MathError::invalid_input(format!(
                        "y[{i}] = {y} is not positive; log-linear requires positive values"
                    )))
                }
            })
            .collect::<MathResult<Vec<_>>>()?;

        Ok(Self { xs, ys, log_ys })
    }

    /// Returns the x values.
    #[must_use]
    pub fn x_values(&self) -> &[f64] {
        &self.xs
    }

    /// Returns the original y values.
    #[must_use]
    pub fn y_values(&self) -> &[f64] {
        &self.ys
    }

    fn check_range(&self, x: f64) -> MathResult<()> {
        if self.in_range(x) {
            Ok(())
        } else {
            Err(MathError::ExtrapolationNotAllowed {
                x,
                min: self.min_x(),
                max: self.max_x(),
            })
        }
    }

    fn log_value(&self, x: f64) -> (f64, f64) {
        let i = find_segment(&self.xs, x);
        let slope = (self.log_ys[i + 1] - self.log_ys[i]) / (self.xs[i + 1] - self.xs[i]);
        (self.log_ys[i] + slope * (x - self.xs[i]), slope)
    }
}

impl Interpolator for LogLinearInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        self.check_range(x)?;
        Ok(self.log_value(x).0.exp())
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        self.check_range(x)?;
        let (log_y, slope) = self.log_value(x);
        Ok(log_y.exp() * slope)
    }

    fn min_x(&self) -> f64 {
        self.xs[0]
    }

    fn max_x(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }
}
