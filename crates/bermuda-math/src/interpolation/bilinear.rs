//! Clamped bilinear interpolation on a rectangular grid.

use ndarray::Array2;

use crate::error::{MathError, MathResult};
use crate::interpolation::{find_segment, validate_axis};

/// Bilinear interpolation over `values[[i, j]]` at `(xs[i], ys[j])`.
///
/// Queries outside the grid are clamped to the nearest edge, so the
/// surface is flat beyond its last row/column. A single-point axis is
/// allowed and treated as constant along that direction.
///
/// # Example
///
/// ```rust
/// use bermuda_math::interpolation::BilinearInterpolator;
/// use ndarray::array;
///
/// let grid = BilinearInterpolator::new(
///     vec![1.0, 2.0],
///     vec![5.0, 10.0],
///     array![[60.0, 70.0], [80.0, 90.0]],
/// )
/// .unwrap();
///
/// assert!((grid.interpolate(1.5, 7.5) - 75.0).abs() < 1e-12);
/// assert!((grid.interpolate(0.1, 30.0) - 70.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct BilinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    values: Array2<f64>,
}

impl BilinearInterpolator {
    /// Creates a new grid interpolator.
    ///
    /// # Errors
    ///
    /// Returns an error if an axis is empty or not strictly increasing, or
    /// the value matrix shape is not `(xs.len(), ys.len())`.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>, values: Array2<f64>) -> MathResult<Self> {
        validate_axis("x axis", &xs, 1)?;
        validate_axis("y axis", &ys, 1)?;
        if values.dim() != (xs.len(), ys.len()) {
            return Err(MathError::invalid_input(format!(
                "value grid is {:?}, expected ({}, {})",
                values.dim(),
                xs.len(),
                ys.len()
            )));
        }
        Ok(Self { xs, ys, values })
    }

    /// Interpolated value at `(x, y)`, clamped to the grid.
    #[must_use]
    pub fn interpolate(&self, x: f64, y: f64) -> f64 {
        let (i0, i1, wx) = Self::weights(&self.xs, x);
        let (j0, j1, wy) = Self::weights(&self.ys, y);
        let v = &self.values;

        (1.0 - wy) * ((1.0 - wx) * v[[i0, j0]] + wx * v[[i1, j0]])
            + wy * ((1.0 - wx) * v[[i0, j1]] + wx * v[[i1, j1]])
    }

    /// Same axes with `f` applied to every grid value.
    #[must_use]
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            xs: self.xs.clone(),
            ys: self.ys.clone(),
            values: self.values.mapv(f),
        }
    }

    /// X axis.
    #[must_use]
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// Y axis.
    #[must_use]
    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    /// Value grid.
    #[must_use]
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    fn weights(axis: &[f64], q: f64) -> (usize, usize, f64) {
        if axis.len() == 1 {
            return (0, 0, 0.0);
        }
        let q = q.clamp(axis[0], axis[axis.len() - 1]);
        let i = find_segment(axis, q);
        (i, i + 1, (q - axis[i]) / (axis[i + 1] - axis[i]))
    }
}
