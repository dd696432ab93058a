//! Interpolation methods.
//!
//! - [`LogLinearInterpolator`]: linear in `ln(y)`, used for discount factors
//! - [`BilinearInterpolator`]: clamped bilinear on a 2-D grid, used for
//!   volatility surfaces

mod bilinear;
mod log_linear;

pub use bilinear::BilinearInterpolator;
pub use log_linear::LogLinearInterpolator;

use crate::error::{MathError, MathResult};

/// Trait for one-dimensional interpolation methods.
pub trait Interpolator: Send + Sync {
    /// Returns the interpolated value at x.
    fn interpolate(&self, x: f64) -> MathResult<f64>;

    /// Returns the first derivative at x.
    fn derivative(&self, x: f64) -> MathResult<f64>;

    /// Returns the minimum x value in the data.
    fn min_x(&self) -> f64;

    /// Returns the maximum x value in the data.
    fn max_x(&self) -> f64;

    /// Checks if x is within the interpolation range.
    fn in_range(&self, x: f64) -> bool {
        x >= self.min_x() && x <= self.max_x()
    }
}

/// Checks that an axis has at least `min_len` finite, strictly increasing points.
pub fn validate_axis(name: &str, xs: &[f64], min_len: usize) -> MathResult<()> {
    if xs.len() < min_len {
        return Err(MathError::insufficient_data(min_len, xs.len()));
    }
    if let Some(x) = xs.iter().find(|x| !x.is_finite()) {
        return Err(MathError::invalid_input(format!("{name} contains non-finite value {x}")));
    }
    if let Some(i) = (1..xs.len()).find(|&i| xs[i] <= xs[i - 1]) {
        return Err(MathError::invalid_input(format!(
            "{name} must be strictly increasing: [{}] = {} after {}",
            i,
            xs[i],
            xs[i - 1]
        )));
    }
    Ok(())
}

/// Index `i` with `xs[i] <= x <= xs[i+1]`, clamped to the first/last segment.
///
/// `xs` must hold at least two points.
pub(crate) fn find_segment(xs: &[f64], x: f64) -> usize {
    let upper = xs.partition_point(|&knot| knot <= x);
    upper.saturating_sub(1).min(xs.len() - 2)
}
