//! Solver and interpolation errors.

use thiserror::Error;

/// Result alias for this crate.
pub type MathResult<T> = Result<T, MathError>;

/// Numerical failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    /// Iteration budget spent without meeting the tolerance.
    #[error("no convergence in {iterations} iterations, |f| = {residual:.2e}")]
    ConvergenceFailed {
        /// Iterations spent.
        iterations: u32,
        /// Last |f|.
        residual: f64,
    },

    /// End points do not straddle a root.
    #[error("f({a}) = {fa:.2e} and f({b}) = {fb:.2e} do not straddle a root")]
    InvalidBracket {
        /// Left end.
        a: f64,
        /// Right end.
        b: f64,
        /// `f(a)`.
        fa: f64,
        /// `f(b)`.
        fb: f64,
    },

    /// Expansion stopped before a sign change appeared.
    #[error("no sign change on [{lo}, {hi}] after {expansions} expansions")]
    BracketNotFound {
        /// Left end when expansion stopped.
        lo: f64,
        /// Right end when expansion stopped.
        hi: f64,
        /// Expansions made.
        expansions: u32,
    },

    /// The objective produced NaN or an infinity.
    #[error("objective is {value} at x = {x}")]
    NonFinite {
        /// Argument.
        x: f64,
        /// Returned value.
        value: f64,
    },

    /// Query outside the interpolation range.
    #[error("{x} lies outside [{min}, {max}]")]
    ExtrapolationNotAllowed {
        /// Query.
        x: f64,
        /// First knot.
        min: f64,
        /// Last knot.
        max: f64,
    },

    /// Too few points on an axis.
    #[error("need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum.
        required: usize,
        /// Supplied.
        actual: usize,
    },

    /// Bad argument.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong.
        reason: String,
    },
}

impl MathError {
    /// `ConvergenceFailed` shorthand.
    #[must_use]
    pub fn convergence_failed(iterations: u32, residual: f64) -> Self {
        Self::ConvergenceFailed { iterations, residual }
    }

    /// `InvalidInput` shorthand.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput { reason: reason.into() }
    }

    /// `InsufficientData` shorthand.
    #[must_use]
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }
}
