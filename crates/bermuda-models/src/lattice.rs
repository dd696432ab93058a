//! Recombining trinomial lattice for the Hull-White state variable.
//!
//! The lattice discretises the zero-mean Ornstein-Uhlenbeck process
//! `dx = -a x dt + σ(t) dW` on a non-uniform time grid. Node spacing at each
//! layer matches the conditional variance of the step that reaches it
//! (`Δx = √(3V)`), each node branches to the three nodes around its
//! conditional mean, and the width is capped at `j_max = ⌈0.184 / (aΔt)⌉`.
//! The short rate at node `j` of step `i` is `r = α_i + x_j`, with `α_i`
//! fitted by forward induction of Arrow-Debreu prices so that the lattice
//! reprices the discount curve at every grid time.

use bermuda_curves::DiscountCurve;

use crate::error::{ModelError, ModelResult};
use crate::hull_white::HullWhiteParams;

/// Times closer than this are treated as the same grid point.
const TIME_TOLERANCE: f64 = 1e-9;

/// Time grid containing every mandatory time, refined to a step density.
///
/// # Example
///
/// ```rust
/// use bermuda_models::TimeGrid;
///
/// let grid = TimeGrid::new(&[1.0, 1.5], 4, 1000).unwrap();
/// assert_eq!(grid.times(), &[0.0, 0.25, 0.5, 0.75, 1.0, 1.25, 1.5]);
/// assert_eq!(grid.index_of(1.0), Some(4));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    times: Vec<f64>,
}

impl TimeGrid {
    /// Builds a grid from 0 through every positive mandatory time.
    ///
    /// Each interval between consecutive mandatory times is split into
    /// `⌈length · steps_per_year⌉` equal steps.
    ///
    /// # Errors
    ///
    /// `ModelError::InvalidParameter` for zero density or no positive time,
    /// `ModelError::LatticeTooLarge` if the grid exceeds `max_steps`.
    pub fn new(mandatory: &[f64], steps_per_year: usize, max_steps: usize) -> ModelResult<Self> {
        if steps_per_year == 0 {
            return Err(ModelError::invalid_parameter(
                "steps_per_year",
                0.0,
                "must be at least 1",
            ));
        }
        let mut points: Vec<f64> = mandatory
            .iter()
            .copied()
            .filter(|t| t.is_finite() && *t > TIME_TOLERANCE)
            .collect();
        points.sort_by(f64::total_cmp);
        points.dedup_by(|b, a| (*b - *a).abs() <= TIME_TOLERANCE);
        if points.is_empty() {
            return Err(ModelError::invalid_parameter(
                "mandatory_times",
                0.0,
                "no time after the valuation date",
            ));
        }

        let mut times = vec![0.0];
        let mut prev = 0.0;
        for &p in &points {
            let n = (((p - prev) * steps_per_year as f64).ceil() as usize).max(1);
            let h = (p - prev) / n as f64;
            times.extend((1..n).map(|k| prev + k as f64 * h));
            times.push(p);
            prev = p;
            if times.len() - 1 > max_steps {
                break;
            }
        }

        let steps = times.len() - 1;
        if steps > max_steps {
            return Err(ModelError::LatticeTooLarge {
                steps,
                max: max_steps,
            });
        }
        Ok(Self { times })
    }

    /// Grid times, starting at 0.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Number of steps (one less than the number of times).
    #[must_use]
    pub fn steps(&self) -> usize {
        self.times.len() - 1
    }

    /// Index of `t` on the grid, if present.
    #[must_use]
    pub fn index_of(&self, t: f64) -> Option<usize> {
        let i = self.times.partition_point(|s| *s < t - TIME_TOLERANCE);
        (i < self.times.len() && (self.times[i] - t).abs() <= TIME_TOLERANCE).then_some(i)
    }
}

/// Branching from one node: centre index at the next layer and probabilities.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Branch {
    centre: usize,
    up: f64,
    mid: f64,
    down: f64,
}

/// Trinomial lattice fitted to a discount curve.
#[derive(Debug, Clone)]
pub struct TrinomialLattice {
    grid: TimeGrid,
    dx: Vec<f64>,
    widths: Vec<usize>,
    alpha: Vec<f64>,
    discounts: Vec<Vec<f64>>,
    branches: Vec<Vec<Branch>>,
}

impl TrinomialLattice {
    /// Builds the lattice for `params` on `grid` and fits it to `curve`.
    ///
    /// # Errors
    ///
    /// `ModelError::LatticeInstability` if a step has no variance or a
    /// branching probability leaves [0, 1] after renormalisation.
    pub fn build(params: &HullWhiteParams, curve: &DiscountCurve, grid: TimeGrid) -> ModelResult<Self> {
        let t = grid.times();
        let n = grid.steps();
        let a = params.mean_reversion();

        let mut dx = Vec::with_capacity(n + 1);
        let mut widths = Vec::with_capacity(n + 1);
        let mut branches = Vec::with_capacity(n);
        dx.push(0.0);
        widths.push(0usize);

        for i in 0..n {
            let dt = t[i + 1] - t[i];
            let variance = params.conditional_variance(t[i], t[i + 1]);
            if !(variance.is_finite() && variance > 0.0) {
                return Err(ModelError::instability(
                    i,
                    0,
                    format!("step variance {variance:e} is not positive"),
                ));
            }
            let dx_next = (3.0 * variance).sqrt();
            let decay = (-a * dt).exp();
            let cap = (((0.184 / (a * dt)).ceil()) as usize).max(1);

            let w = widths[i] as i64;
            let means: Vec<f64> = (-w..=w).map(|j| j as f64 * dx[i] * decay).collect();
            let natural = means
                .iter()
                .map(|m| (m / dx_next).round().abs() as usize + 1)
                .max()
                .unwrap_or(1);
            let w_next = natural.min(cap);
            let k_max = w_next as i64 - 1;

            let mut layer = Vec::with_capacity(means.len());
            for (idx, &m) in means.iter().enumerate() {
                let k = ((m / dx_next).round() as i64).clamp(-k_max, k_max);
                let eta = m - k as f64 * dx_next;
                let spread = (variance + eta * eta) / (dx_next * dx_next);
                let skew = eta / (2.0 * dx_next);
                let (mut up, mut mid, mut down) = (0.5 * spread + skew, 1.0 - spread, 0.5 * spread - skew);
                if mid < 0.0 {
                    let total = up + down;
                    mid = 0.0;
                    up /= total;
                    down /= total;
                }
                let j = idx as i64 - w;
                for p in [up, mid, down] {
                    if !(p.is_finite() && (0.0..=1.0).contains(&p)) {
                        return Err(ModelError::instability(
                            i,
                            j,
                            format!("probabilities ({up:.6}, {mid:.6}, {down:.6}) outside [0, 1]"),
                        ));
                    }
                }
                layer.push(Branch {
                    centre: (k + w_next as i64) as usize,
                    up,
                    mid,
                    down,
                });
            }

            dx.push(dx_next);
            widths.push(w_next);
            branches.push(layer);
        }

        let mut lattice = Self {
            grid,
            dx,
            widths,
            alpha: Vec::with_capacity(n),
            discounts: Vec::with_capacity(n),
            branches,
        };
        lattice.fit(curve)?;
        log::debug!(
            "trinomial lattice: {} steps, max width {}",
            n,
            lattice.widths.iter().max().copied().unwrap_or(0)
        );
        Ok(lattice)
    }

    /// Forward induction of Arrow-Debreu prices to fit `α_i`.
    fn fit(&mut self, curve: &DiscountCurve) -> ModelResult<()> {
        let t = self.grid.times().to_vec();
        let mut prices = vec![1.0];
        for i in 0..self.grid.steps() {
            let dt = t[i + 1] - t[i];
            let target = curve.discount(t[i + 1])?;
            let states: Vec<f64> = (0..prices.len()).map(|idx| self.state(i, idx)).collect();
            let sum: f64 = prices
                .iter()
                .zip(&states)
                .map(|(q, x)| q * (-x * dt).exp())
                .sum();
            let alpha = (sum / target).ln() / dt;
            let discounts: Vec<f64> = states.iter().map(|x| (-(alpha + x) * dt).exp()).collect();

            let mut next = vec![0.0; self.layer_len(i + 1)];
            for (idx, b) in self.branches[i].iter().enumerate() {
                let q = prices[idx] * discounts[idx];
                next[b.centre + 1] += q * b.up;
                next[b.centre] += q * b.mid;
                next[b.centre - 1] += q * b.down;
            }

            self.alpha.push(alpha);
            self.discounts.push(discounts);
            prices = next;
        }
        Ok(())
    }

    /// Time grid.
    #[must_use]
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Number of time steps.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.grid.steps()
    }

    /// Number of nodes at layer `i`.
    #[must_use]
    pub fn layer_len(&self, i: usize) -> usize {
        2 * self.widths[i] + 1
    }

    /// Half-width `j_max` at layer `i`.
    #[must_use]
    pub fn width(&self, i: usize) -> usize {
        self.widths[i]
    }

    /// State `x` at node `idx` of layer `i`.
    #[must_use]
    pub fn state(&self, i: usize, idx: usize) -> f64 {
        (idx as f64 - self.widths[i] as f64) * self.dx[i]
    }

    /// Short rate `α + x` at node `idx` of layer `i` over the following step.
    ///
    /// The last layer has no following step and reuses the final `α`.
    #[must_use]
    pub fn short_rate(&self, i: usize, idx: usize) -> f64 {
        let step = i.min(self.alpha.len().saturating_sub(1));
        self.alpha.get(step).copied().unwrap_or(0.0) + self.state(i, idx)
    }

    /// Discounted expectation of layer `i + 1` values at layer `i`.
    #[must_use]
    pub fn rollback(&self, i: usize, next: &[f64]) -> Vec<f64> {
        self.branches[i]
            .iter()
            .zip(&self.discounts[i])
            .map(|(b, df)| {
                df * (b.up * next[b.centre + 1] + b.mid * next[b.centre] + b.down * next[b.centre - 1])
            })
            .collect()
    }

    /// Pushes a probability distribution from layer `i` to layer `i + 1`.
    #[must_use]
    pub fn propagate(&self, i: usize, dist: &[f64]) -> Vec<f64> {
        let mut next = vec![0.0; self.layer_len(i + 1)];
        for (b, p) in self.branches[i].iter().zip(dist) {
            next[b.centre + 1] += p * b.up;
            next[b.centre] += p * b.mid;
            next[b.centre - 1] += p * b.down;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bermuda_core::types::Date;
    use proptest::prelude::*;

    fn curve() -> DiscountCurve {
        let t0 = Date::from_ymd(2025, 1, 1).unwrap();
        DiscountCurve::new(
            t0,
            vec![
                (t0.add_years(1).unwrap(), 0.975),
                (t0.add_years(5).unwrap(), 0.87),
                (t0.add_years(10).unwrap(), 0.74),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_grid_contains_mandatory_times() {
        let grid = TimeGrid::new(&[0.7, 2.0, 2.0, 0.0, -1.0], 3, 1000).unwrap();
        assert_eq!(grid.times()[0], 0.0);
        assert!(grid.index_of(0.7).is_some());
        assert!(grid.index_of(2.0).is_some());
        assert_eq!(*grid.times().last().unwrap(), 2.0);
        assert!(grid.index_of(1.1).is_none());
    }

    #[test]
    fn test_grid_limit() {
        assert!(matches!(
            TimeGrid::new(&[30.0], 100, 500),
            Err(ModelError::LatticeTooLarge { .. })
        ));
        assert!(TimeGrid::new(&[], 10, 500).is_err());
        assert!(TimeGrid::new(&[1.0], 0, 500).is_err());
    }

    #[test]
    fn test_reprices_curve_at_every_grid_time() {
        let c = curve();
        let hw = HullWhiteParams::flat(0.05, 0.01).unwrap();
        let grid = TimeGrid::new(&[3.0, 10.0], 12, 2000).unwrap();
        let lattice = TrinomialLattice::build(&hw, &c, grid).unwrap();

        for target in [1, 25, 60, lattice.steps()] {
            let mut values = vec![1.0; lattice.layer_len(target)];
            for i in (0..target).rev() {
                values = lattice.rollback(i, &values);
            }
            let t = lattice.grid().times()[target];
            assert_relative_eq!(values[0], c.discount(t).unwrap(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_width_is_capped() {
        let c = curve();
        let hw = HullWhiteParams::flat(0.5, 0.01).unwrap();
        let grid = TimeGrid::new(&[10.0], 4, 1000).unwrap();
        let lattice = TrinomialLattice::build(&hw, &c, grid).unwrap();
        let cap = (0.184f64 / (0.5 * 0.25)).ceil() as usize;
        assert!((0..=lattice.steps()).all(|i| lattice.width(i) <= cap));
        assert_eq!(lattice.width(lattice.steps()), cap);
    }

    proptest! {
        #[test]
        fn transition_probabilities_sum_to_one(
            a in 0.005f64..0.3,
            sigma in 0.002f64..0.03,
            density in 2usize..24,
        ) {
            let c = curve();
            let hw = HullWhiteParams::flat(a, sigma).unwrap();
            let grid = TimeGrid::new(&[2.5, 6.0], density, 5000).unwrap();
            let lattice = TrinomialLattice::build(&hw, &c, grid).unwrap();
            for i in 0..lattice.steps() {
                let dist = lattice.propagate(i, &vec![1.0; lattice.layer_len(i)]);
                let total: f64 = dist.iter().sum();
                prop_assert!((total - lattice.layer_len(i) as f64).abs() < 1e-9);
            }
        }
    }
}
