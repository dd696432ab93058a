//! Error types for the core crate.

use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building dates, tenors and schedules.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Error in date calculations or invalid date.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// Tenor label could not be parsed.
    #[error("Invalid tenor label: '{label}'")]
    InvalidTenor {
        /// The offending label.
        label: String,
    },

    /// Schedule could not be generated.
    #[error("Invalid schedule: {reason}")]
    InvalidSchedule {
        /// Description of the failure.
        reason: String,
    },

    /// Unrecognised convention name (day count, frequency).
    #[error("Unknown {kind}: '{value}'")]
    UnknownConvention {
        /// What kind of convention was being parsed.
        kind: &'static str,
        /// The unrecognised input.
        value: String,
    },
}

impl CoreError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates an invalid schedule error.
    #[must_use]
    pub fn invalid_schedule(reason: impl Into<String>) -> Self {
        Self::InvalidSchedule {
            reason: reason.into(),
        }
    }

    /// Creates an unknown convention error.
    #[must_use]
    pub fn unknown_convention(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownConvention {
            kind,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::invalid_date("2024-02-30 is not a valid date");
        assert!(err.to_string().contains("Invalid date"));

        let err = CoreError::unknown_convention("day count", "ACT/999");
        assert_eq!(err.to_string(), "Unknown day count: 'ACT/999'");
    }
}
