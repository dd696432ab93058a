//! Error types for curve and surface operations.

use bermuda_core::types::Date;
use bermuda_core::CoreError;
use bermuda_math::MathError;
use thiserror::Error;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Malformed or insufficient market data, or an invalid curve query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    /// Not enough nodes to build the curve.
    #[error("Insufficient points: need at least {required}, got {got}")]
    InsufficientPoints {
        /// Minimum required points.
        required: usize,
        /// Actual number of points provided.
        got: usize,
    },

    /// Node dates are not strictly increasing.
    #[error("Non-increasing node dates at index {index}: {prev} >= {current}")]
    NonIncreasingDates {
        /// Index where the violation occurred.
        index: usize,
        /// Previous date.
        prev: Date,
        /// Current date.
        current: Date,
    },

    /// Discount factor is not positive and finite.
    #[error("Invalid discount factor {value} at {date}")]
    InvalidDiscountFactor {
        /// Node date.
        date: Date,
        /// Offending value.
        value: f64,
    },

    /// A node lies before the valuation date.
    #[error("Node {date} precedes the as-of date {as_of}")]
    NodeBeforeAsOf {
        /// Node date.
        date: Date,
        /// Valuation date.
        as_of: Date,
    },

    /// The node at the valuation date is not 1.
    #[error("Discount factor at the as-of date must be 1, got {value}")]
    AnchorNotUnity {
        /// Supplied value.
        value: f64,
    },

    /// Query before the valuation date.
    #[error("Query time {t:.6} is before the as-of date")]
    NegativeTime {
        /// Requested time in years.
        t: f64,
    },

    /// Volatility surface is malformed.
    #[error("Invalid volatility surface: {reason}")]
    InvalidSurface {
        /// Description of the problem.
        reason: String,
    },

    /// Bump parameters are invalid.
    #[error("Invalid bump: {reason}")]
    InvalidBump {
        /// Description of the problem.
        reason: String,
    },

    /// Underlying numerical error.
    #[error(transparent)]
    Math(#[from] MathError),

    /// Date or tenor error.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl CurveError {
    /// Creates an invalid surface error.
    #[must_use]
    pub fn invalid_surface(reason: impl Into<String>) -> Self {
        Self::InvalidSurface {
            reason: reason.into(),
        }
    }

    /// Creates an invalid bump error.
    #[must_use]
    pub fn invalid_bump(reason: impl Into<String>) -> Self {
        Self::InvalidBump {
            reason: reason.into(),
        }
    }
}
