//! Day count conventions for swap accruals and model time.
//!
//! - [`Act365Fixed`]: ACT/365 Fixed, also the engine's model-time basis
//! - [`Act360`]: ACT/360
//! - [`Thirty360US`]: 30/360 US bond basis
//!
//! ```rust
//! use bermuda_core::daycounts::{DayCount, DayCountConvention};
//! use bermuda_core::types::Date;
//!
//! let dc: DayCountConvention = "ACT/365".parse().unwrap();
//! let start = Date::from_ymd(2025, 1, 1).unwrap();
//! let end = Date::from_ymd(2026, 1, 1).unwrap();
//! assert!((dc.year_fraction(start, end) - 1.0).abs() < 1e-12);
//! ```

mod act;
mod thirty360;

pub use act::{Act360, Act365Fixed};
pub use thirty360::Thirty360US;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::Date;

/// Trait for day count conventions.
pub trait DayCount: Send + Sync {
    /// Returns the name of the convention (e.g. "ACT/360").
    fn name(&self) -> &'static str;

    /// Year fraction between two dates. Negative if `end < start`.
    fn year_fraction(&self, start: Date, end: Date) -> f64;

    /// Day count between two dates under the convention's day rules.
    fn day_count(&self, start: Date, end: Date) -> i64;
}

/// Runtime-selectable day count convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DayCountConvention {
    /// Actual/365 Fixed.
    #[default]
    Act365Fixed,
    /// Actual/360.
    Act360,
    /// 30/360 US.
    Thirty360US,
}

impl DayCountConvention {
    /// Returns a boxed implementation of the convention.
    #[must_use]
    pub fn to_day_count(&self) -> Box<dyn DayCount> {
        match self {
            DayCountConvention::Act365Fixed => Box::new(Act365Fixed),
            DayCountConvention::Act360 => Box::new(Act360),
            DayCountConvention::Thirty360US => Box::new(Thirty360US),
        }
    }

    /// Convention name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DayCountConvention::Act365Fixed => Act365Fixed.name(),
            DayCountConvention::Act360 => Act360.name(),
            DayCountConvention::Thirty360US => Thirty360US.name(),
        }
    }

    /// Year fraction without boxing.
    #[must_use]
    pub fn year_fraction(&self, start: Date, end: Date) -> f64 {
        match self {
            DayCountConvention::Act365Fixed => Act365Fixed.year_fraction(start, end),
            DayCountConvention::Act360 => Act360.year_fraction(start, end),
            DayCountConvention::Thirty360US => Thirty360US.year_fraction(start, end),
        }
    }
}

impl FromStr for DayCountConvention {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();
        match key.as_str() {
            "ACT/365" | "ACT/365F" | "ACT/365FIXED" | "A365F" => Ok(Self::Act365Fixed),
            "ACT/360" | "A360" => Ok(Self::Act360),
            "30/360" | "30/360US" | "THIRTY360" => Ok(Self::Thirty360US),
            _ => Err(CoreError::unknown_convention("day count", s)),
        }
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
