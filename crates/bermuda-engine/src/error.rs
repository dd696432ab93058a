//! Engine error types.

use std::fmt;

use bermuda_core::CoreError;
use bermuda_curves::CurveError;
use bermuda_math::MathError;
use bermuda_models::ModelError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Engine result type.
pub type EngineResult<T> = Result<T, EngineError>;

/// Calibration stage that failed to converge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibrationStage {
    /// ATM volatility bucket (0-based exercise index).
    Atm {
        /// Bucket index.
        bucket: usize,
    },
    /// Mean reversion fit.
    MeanReversion,
    /// Scalar volatility spread against the reference NPV.
    Spread,
}

impl fmt::Display for CalibrationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationStage::Atm { bucket } => write!(f, "ATM bucket {bucket}"),
            CalibrationStage::MeanReversion => write!(f, "mean reversion"),
            CalibrationStage::Spread => write!(f, "spread"),
        }
    }
}

/// Engine error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Market data could not be turned into a curve or surface.
    #[error("market data error: {reason}")]
    MarketData {
        /// What was wrong.
        reason: String,
    },

    /// A calibration solver found no bracket or ran out of iterations.
    #[error("calibration diverged at {stage} after {iterations} iterations (residual {residual:.3e}): {reason}")]
    CalibrationDivergence {
        /// Stage that failed.
        stage: CalibrationStage,
        /// Iterations spent.
        iterations: u32,
        /// Last residual, NaN if none was computed.
        residual: f64,
        /// Underlying solver message.
        reason: String,
    },

    /// Lattice probabilities or size out of bounds.
    #[error("lattice instability: {reason}")]
    LatticeInstability {
        /// Details from the lattice builder.
        reason: String,
    },

    /// Deal terms are inconsistent.
    #[error("invalid deal: {reason}")]
    InvalidDeal {
        /// What was wrong.
        reason: String,
    },

    /// Configuration failed validation.
    #[error("invalid configuration: {}", join(.0))]
    Config(Vec<ValidationError>),

    /// Other model error.
    #[error("model error: {0}")]
    Model(ModelError),

    /// Numerical error outside a calibration stage.
    #[error("numerical error: {0}")]
    Numerical(#[from] MathError),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl EngineError {
    /// Creates a market data error.
    pub fn market_data(reason: impl Into<String>) -> Self {
        Self::MarketData { reason: reason.into() }
    }

    /// Creates an invalid deal error.
    pub fn invalid_deal(reason: impl Into<String>) -> Self {
        Self::InvalidDeal { reason: reason.into() }
    }

    /// Re-labels a solver failure as a divergence of `stage`.
    ///
    /// Errors that did not come from a solver pass through unchanged.
    #[must_use]
    pub fn in_stage(self, stage: CalibrationStage) -> Self {
        match self {
            EngineError::Numerical(e) => {
                let (iterations, residual) = match &e {
                    MathError::ConvergenceFailed { iterations, residual } => (*iterations, *residual),
                    MathError::BracketNotFound { expansions, .. } => (*expansions, f64::NAN),
                    _ => (0, f64::NAN),
                };
                EngineError::CalibrationDivergence {
                    stage,
                    iterations,
                    residual,
                    reason: e.to_string(),
                }
            }
            other => other,
        }
    }
}

impl From<CurveError> for EngineError {
    fn from(e: CurveError) -> Self {
        EngineError::market_data(e.to_string())
    }
}

impl From<CoreError> for EngineError {
    fn from(e: CoreError) -> Self {
        EngineError::invalid_deal(e.to_string())
    }
}

impl From<ModelError> for EngineError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::LatticeInstability { .. } | ModelError::LatticeTooLarge { .. } => {
                EngineError::LatticeInstability { reason: e.to_string() }
            }
            ModelError::Curve(c) => c.into(),
            ModelError::Math(m) => EngineError::Numerical(m),
            other => EngineError::Model(other),
        }
    }
}

/// A single validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation.
    pub field: String,
    /// Validation error message.
    pub message: String,
    /// Validation rule that was violated.
    pub rule: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Creates a validation error with a rule name.
    pub fn with_rule(field: impl Into<String>, message: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref rule) = self.rule {
            write!(f, "{}: {} (rule: {})", self.field, self.message, rule)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Trait for validatable configurations.
pub trait Validate {
    /// Returns every violated constraint, or an empty vector if valid.
    fn validate(&self) -> Vec<ValidationError>;

    /// Returns true if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Validates and returns `EngineError::Config` if invalid.
    fn validate_or_error(&self) -> EngineResult<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Config(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_failure_becomes_divergence() {
        let err = EngineError::from(MathError::ConvergenceFailed {
            iterations: 40,
            residual: 1e-3,
        })
        .in_stage(CalibrationStage::Atm { bucket: 2 });
        match err {
            EngineError::CalibrationDivergence { stage, iterations, .. } => {
                assert_eq!(stage, CalibrationStage::Atm { bucket: 2 });
                assert_eq!(iterations, 40);
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn test_lattice_errors_are_surfaced() {
        let err = EngineError::from(ModelError::LatticeTooLarge { steps: 9000, max: 5000 });
        assert!(matches!(err, EngineError::LatticeInstability { .. }));
    }

    #[test]
    fn test_validation_display() {
        let err = ValidationError::with_rule("solver.spread_tolerance", "must be positive", "positive");
        assert_eq!(err.to_string(), "solver.spread_tolerance: must be positive (rule: positive)");
        let all = EngineError::Config(vec![err, ValidationError::new("a", "b")]);
        assert!(all.to_string().contains("; a: b"));
    }
}
