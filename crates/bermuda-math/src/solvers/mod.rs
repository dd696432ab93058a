//! Root-finding algorithms.
//!
//! - [`try_brent`] / [`brent`]: Brent's method (bisection + secant + inverse quadratic)
//! - [`try_bracketed_secant`]: bisection refined by secant steps
//! - [`expand_bracket`]: bounded search for a sign change
//!
//! | Solver | Speed | Reliability | Requires |
//! |--------|-------|-------------|----------|
//! | Brent | Fast (superlinear) | Guaranteed | Bracket |
//! | Bracketed secant | Fast on smooth objectives | Guaranteed | Bracket |
//!
//! All solvers stop after `max_iterations` and report
//! [`MathError::ConvergenceFailed`](crate::MathError::ConvergenceFailed); none
//! of them loop unboundedly.
//!
//! # Example
//!
//! ```rust
//! use bermuda_math::solvers::{brent, SolverConfig};
//!
//! let f = |x: f64| x * x * x - x - 2.0;
//! let result = brent(f, 1.0, 2.0, &SolverConfig::default()).unwrap();
//! assert!(f(result.root).abs() < 1e-10);
//! ```

mod bracket;
mod brent;
mod secant;

pub use bracket::{expand_bracket, Bracket, BracketExpansion};
pub use brent::{brent, try_brent, try_brent_in};
pub use secant::try_bracketed_secant;

/// Default tolerance on the function value.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default tolerance on the bracket width.
pub const DEFAULT_X_TOLERANCE: f64 = 1e-12;

/// Default maximum iterations for root-finding algorithms.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Configuration for root-finding algorithms.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Absolute tolerance on `|f(x)|`.
    pub tolerance: f64,
    /// Absolute tolerance on the bracket half-width.
    pub x_tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            x_tolerance: DEFAULT_X_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration.
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
            ..Self::default()
        }
    }

    /// Sets the function-value tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the bracket-width tolerance.
    #[must_use]
    pub fn with_x_tolerance(mut self, x_tolerance: f64) -> Self {
        self.x_tolerance = x_tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Result of a root-finding iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverResult {
    /// The root found.
    pub root: f64,
    /// Number of objective evaluations after the bracket endpoints.
    pub iterations: u32,
    /// Final residual (function value at root).
    pub residual: f64,
}

pub(crate) fn check_finite(x: f64, value: f64) -> Result<f64, crate::MathError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(crate::MathError::NonFinite { x, value })
    }
}
