//! Scalar volatility spread against the reference NPV.

use bermuda_math::solvers::{expand_bracket, try_brent_in, BracketExpansion, SolverConfig};
use tracing::{debug, info};

use crate::config::SolverSettings;
use crate::error::{CalibrationStage, EngineError, EngineResult};

/// Buckets may not be pushed below this fraction of their ATM σ.
const FLOOR_FRACTION: f64 = 1e-6;

/// Solved spread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadSolution {
    /// Spread added to every bucket.
    pub spread: f64,
    /// Brent iterations, 0 when no solve was needed.
    pub iterations: u32,
    /// Price minus target at the solution, if there was a target.
    pub residual: Option<f64>,
}

/// Finds Δσ with `price(Δσ) = target` by Brent's method.
///
/// The initial bracket `[-h, h]` expands symmetrically; its lower end is
/// floored so that `min σ + Δσ` stays strictly positive.
#[derive(Debug, Clone, Copy)]
pub struct SpreadSolver<'a> {
    settings: &'a SolverSettings,
}

impl<'a> SpreadSolver<'a> {
    /// Creates a solver.
    pub fn new(settings: &'a SolverSettings) -> Self {
        Self { settings }
    }

    /// Solves for the spread.
    ///
    /// `price` returns the Bermudan NPV for a trial spread. With no target
    /// the spread is 0 and `price` is never called.
    ///
    /// # Errors
    ///
    /// `EngineError::CalibrationDivergence` if no bracket is found or Brent
    /// exhausts its iterations; errors from `price` pass through.
    pub fn solve<F>(&self, target: Option<f64>, min_sigma: f64, mut price: F) -> EngineResult<SpreadSolution>
    where
        F: FnMut(f64) -> EngineResult<f64>,
    {
        let Some(target) = target else {
            return Ok(SpreadSolution {
                spread: 0.0,
                iterations: 0,
                residual: None,
            });
        };

        let floor = -(1.0 - FLOOR_FRACTION) * min_sigma;
        let half_width = self.settings.spread_initial_half_width;
        let lo = (-half_width).max(floor);

        let mut objective = |spread: f64| -> EngineResult<f64> {
            let npv = price(spread)?;
            debug!(spread, npv, target, "spread trial");
            Ok(npv - target)
        };
        let config = SolverConfig::new(
            self.settings.spread_tolerance * target.abs(),
            self.settings.spread_max_iterations,
        );

        let result = expand_bracket(
            &mut objective,
            lo,
            half_width,
            BracketExpansion::Symmetric { floor: Some(floor) },
            self.settings.spread_max_expansions,
        )
        .and_then(|bracket| try_brent_in(&mut objective, &bracket, &config))
        .map_err(|e: EngineError| e.in_stage(CalibrationStage::Spread))?;

        info!(
            spread = result.root,
            iterations = result.iterations,
            residual = result.residual,
            "spread solved"
        );
        Ok(SpreadSolution {
            spread: result.root,
            iterations: result.iterations,
            residual: Some(result.residual),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_no_target_means_no_spread() {
        let settings = SolverSettings::default();
        let solution = SpreadSolver::new(&settings)
            .solve(None, 0.01, |_| panic!("price must not be called"))
            .unwrap();
        assert_eq!(solution.spread, 0.0);
        assert_eq!(solution.residual, None);
    }

    #[test]
    fn test_solves_monotone_price() {
        let settings = SolverSettings::default();
        // NPV linear-ish in σ around σ_ATM = 0.01.
        let price = |d: f64| Ok(1.0e6 * (0.01 + d) + 2.0e7 * (0.01 + d).powi(2));
        let target = 15_000.0;
        let solution = SpreadSolver::new(&settings).solve(Some(target), 0.01, price).unwrap();
        let achieved = 1.0e6 * (0.01 + solution.spread) + 2.0e7 * (0.01 + solution.spread).powi(2);
        assert_relative_eq!(achieved, target, max_relative = 1e-4);
        assert!(solution.spread > 0.0);
    }

    #[test]
    fn test_unreachable_target_diverges() {
        let mut settings = SolverSettings::default();
        settings.spread_max_expansions = 4;
        let price = |d: f64| Ok(1_000.0 + d);
        let err = SpreadSolver::new(&settings).solve(Some(-50.0), 0.01, price).unwrap_err();
        assert!(matches!(
            err,
            EngineError::CalibrationDivergence {
                stage: CalibrationStage::Spread,
                ..
            }
        ));
    }

    #[test]
    fn test_lower_end_respects_floor() {
        let settings = SolverSettings::default();
        let mut lowest = f64::INFINITY;
        let price = |d: f64| {
            lowest = lowest.min(d);
            Ok(1.0e6 * (0.0005 + d))
        };
        let solution = SpreadSolver::new(&settings).solve(Some(100.0), 0.0005, price).unwrap();
        assert!(lowest > -0.0005);
        assert_relative_eq!(solution.spread, -0.0004, epsilon = 1e-7);
    }
}
