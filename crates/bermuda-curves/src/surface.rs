//! ATM normal swaption volatility surface.

use bermuda_core::types::Tenor;
use bermuda_math::interpolation::BilinearInterpolator;
use ndarray::Array2;

use crate::error::{CurveError, CurveResult};

/// Grid of ATM normal volatilities in basis points, indexed by
/// (option expiry, underlying swap tenor), both in years.
///
/// Lookups are bilinear and clamped to the grid edges.
///
/// # Example
///
/// ```rust
/// use bermuda_curves::VolSurface;
/// use ndarray::array;
///
/// let surface = VolSurface::from_labels(
///     &["1Yr", "5Yr"],
///     &["1Y", "10Y"],
///     array![[80.0, 70.0], [75.0, 65.0]],
/// )
/// .unwrap();
///
/// assert_eq!(surface.vol_bp(5.0, 10.0), 65.0);
/// assert_eq!(surface.normal_vol(50.0, 50.0), 0.0065);
/// ```
#[derive(Debug, Clone)]
pub struct VolSurface {
    grid: BilinearInterpolator,
    expiry_labels: Vec<String>,
    tenor_labels: Vec<String>,
}

impl VolSurface {
    /// Creates a surface from axes in years and a `(expiries, tenors)` grid.
    ///
    /// # Errors
    ///
    /// `CurveError::InvalidSurface` for negative or non-finite vols, and the
    /// underlying grid errors for malformed axes.
    pub fn new(expiries: Vec<f64>, tenors: Vec<f64>, vols_bp: Array2<f64>) -> CurveResult<Self> {
        let expiry_labels = expiries.iter().map(|e| format!("{e}Y")).collect();
        let tenor_labels = tenors.iter().map(|t| format!("{t}Y")).collect();
        Self::build(expiries, tenors, vols_bp, expiry_labels, tenor_labels)
    }

    /// Creates a surface from vendor-style axis labels (`"3Mo"`, `"1Yr"`, `"10Y"`).
    pub fn from_labels(
        expiry_labels: &[&str],
        tenor_labels: &[&str],
        vols_bp: Array2<f64>,
    ) -> CurveResult<Self> {
        let parse = |labels: &[&str]| -> CurveResult<Vec<f64>> {
            labels
                .iter()
                .map(|l| -> CurveResult<f64> { Ok(l.parse::<Tenor>()?.years()) })
                .collect()
        };
        let expiries = parse(expiry_labels)?;
        let tenors = parse(tenor_labels)?;
        Self::build(
            expiries,
            tenors,
            vols_bp,
            expiry_labels.iter().map(|s| (*s).to_string()).collect(),
            tenor_labels.iter().map(|s| (*s).to_string()).collect(),
        )
    }

    /// Single-point surface with the same vol everywhere.
    pub fn flat(vol_bp: f64) -> CurveResult<Self> {
        Self::new(vec![1.0], vec![1.0], Array2::from_elem((1, 1), vol_bp))
    }

    fn build(
        expiries: Vec<f64>,
        tenors: Vec<f64>,
        vols_bp: Array2<f64>,
        expiry_labels: Vec<String>,
        tenor_labels: Vec<String>,
    ) -> CurveResult<Self> {
        if let Some(((i, j), v)) = vols_bp
            .indexed_iter()
            .find(|(_, v)| !(v.is_finite() && **v >= 0.0))
        {
            return Err(CurveError::invalid_surface(format!(
                "vol[{i}, {j}] = {v} must be finite and non-negative"
            )));
        }
        if expiries.iter().chain(tenors.iter()).any(|x| *x <= 0.0) {
            return Err(CurveError::invalid_surface("axes must be positive"));
        }
        let grid = BilinearInterpolator::new(expiries, tenors, vols_bp)?;
        Ok(Self {
            grid,
            expiry_labels,
            tenor_labels,
        })
    }

    /// ATM normal vol in basis points.
    #[must_use]
    pub fn vol_bp(&self, expiry: f64, tenor: f64) -> f64 {
        self.grid.interpolate(expiry, tenor)
    }

    /// ATM normal vol as a decimal rate (bp / 10 000).
    #[must_use]
    pub fn normal_vol(&self, expiry: f64, tenor: f64) -> f64 {
        self.vol_bp(expiry, tenor) / 10_000.0
    }

    /// Surface with every cell shifted by `shift_bp`, floored at zero.
    #[must_use]
    pub fn bumped(&self, shift_bp: f64) -> Self {
        Self {
            grid: self.grid.map_values(|v| (v + shift_bp).max(0.0)),
            expiry_labels: self.expiry_labels.clone(),
            tenor_labels: self.tenor_labels.clone(),
        }
    }

    /// Expiry axis in years.
    #[must_use]
    pub fn expiries(&self) -> &[f64] {
        self.grid.xs()
    }

    /// Tenor axis in years.
    #[must_use]
    pub fn tenors(&self) -> &[f64] {
        self.grid.ys()
    }

    /// Vol grid in basis points.
    #[must_use]
    pub fn vols_bp(&self) -> &Array2<f64> {
        self.grid.values()
    }

    /// Expiry labels, for reporting.
    #[must_use]
    pub fn expiry_labels(&self) -> &[String] {
        &self.expiry_labels
    }

    /// Tenor labels, for reporting.
    #[must_use]
    pub fn tenor_labels(&self) -> &[String] {
        &self.tenor_labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn surface() -> VolSurface {
        VolSurface::from_labels(
            &["3Mo", "1Yr", "5Yr"],
            &["1Y", "5Y", "10Y"],
            array![[90.0, 85.0, 80.0], [88.0, 82.0, 78.0], [80.0, 75.0, 70.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_and_clamp() {
        let s = surface();
        assert_relative_eq!(s.vol_bp(1.0, 5.0), 82.0);
        assert_relative_eq!(s.vol_bp(0.01, 0.5), 90.0);
        assert_relative_eq!(s.vol_bp(30.0, 30.0), 70.0);
        assert_relative_eq!(s.vol_bp(3.0, 10.0), 74.0, epsilon = 1e-12);
        assert_relative_eq!(s.normal_vol(1.0, 5.0), 0.0082);
    }

    #[test]
    fn test_labels_kept() {
        let s = surface();
        assert_eq!(s.expiry_labels(), ["3Mo", "1Yr", "5Yr"]);
        assert_relative_eq!(s.expiries()[0], 0.25);
    }

    #[test]
    fn test_bump_floors_at_zero() {
        let s = VolSurface::new(vec![1.0, 2.0], vec![5.0], array![[0.5], [10.0]]).unwrap();
        let down = s.bumped(-1.0);
        assert_eq!(down.vol_bp(1.0, 5.0), 0.0);
        assert_relative_eq!(down.vol_bp(2.0, 5.0), 9.0);
        assert_relative_eq!(s.bumped(1.0).vol_bp(1.5, 5.0), 6.25);
    }

    #[test]
    fn test_rejects_bad_grid() {
        assert!(VolSurface::new(vec![1.0], vec![1.0], array![[-1.0]]).is_err());
        assert!(VolSurface::new(vec![1.0], vec![1.0], array![[f64::NAN]]).is_err());
        assert!(VolSurface::new(vec![2.0, 1.0], vec![1.0], array![[1.0], [1.0]]).is_err());
        assert!(VolSurface::from_labels(&["1Q"], &["1Y"], array![[1.0]]).is_err());
    }
}
