//! One-dimensional minimisation.
//!
//! Golden-section search on a closed interval. Used for the mean-reversion
//! fit, where the objective is a smooth least-squares pricing error and the
//! parameter has hard bounds.

mod golden;

pub use golden::{golden_section, try_golden_section};

/// Result of a minimisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimizeResult {
    /// Argument of the minimum.
    pub x: f64,
    /// Objective at `x`.
    pub value: f64,
    /// Iterations used.
    pub iterations: u32,
    /// True if the interval shrank below the tolerance.
    pub converged: bool,
}
