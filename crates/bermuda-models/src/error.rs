//! Error types for the short-rate model and lattice.

use bermuda_curves::CurveError;
use bermuda_math::MathError;
use thiserror::Error;

/// A specialized Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by the Hull-White model, analytic pricers and the lattice.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Model parameter out of range.
    #[error("Invalid {name} = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
        /// Why it was rejected.
        reason: String,
    },

    /// Fixed leg is empty or inconsistent with the expiry.
    #[error("Invalid coupon leg: {reason}")]
    InvalidLeg {
        /// Description of the problem.
        reason: String,
    },

    /// Branching probabilities left [0, 1] after renormalisation.
    #[error("Lattice unstable at step {step}, node {node}: {reason}")]
    LatticeInstability {
        /// Time step index.
        step: usize,
        /// Node offset from the centre.
        node: i64,
        /// Description of the problem.
        reason: String,
    },

    /// Time grid would exceed the configured step limit.
    #[error("Lattice needs {steps} steps, limit is {max}")]
    LatticeTooLarge {
        /// Steps required.
        steps: usize,
        /// Configured limit.
        max: usize,
    },

    /// Curve lookup failed.
    #[error(transparent)]
    Curve(#[from] CurveError),

    /// Numerical failure.
    #[error(transparent)]
    Math(#[from] MathError),
}

impl ModelError {
    /// Creates an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(name: &'static str, value: f64, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason: reason.into(),
        }
    }

    /// Creates an invalid leg error.
    #[must_use]
    pub fn invalid_leg(reason: impl Into<String>) -> Self {
        Self::InvalidLeg {
            reason: reason.into(),
        }
    }

    /// Creates a lattice instability error.
    #[must_use]
    pub fn instability(step: usize, node: i64, reason: impl Into<String>) -> Self {
        Self::LatticeInstability {
            step,
            node,
            reason: reason.into(),
        }
    }
}
