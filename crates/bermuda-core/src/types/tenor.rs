//! Tenor labels as quoted on swaption volatility grids.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::types::Date;

/// A period length quoted in months or years.
///
/// Accepts the label styles used by vendor volatility grids: `"3Mo"`,
/// `"6M"`, `"1Yr"`, `"10Y"`.
///
/// # Example
///
/// ```rust
/// use bermuda_core::types::Tenor;
///
/// let expiry: Tenor = "3Mo".parse().unwrap();
/// assert!((expiry.years() - 0.25).abs() < 1e-12);
/// let tenor: Tenor = "10Y".parse().unwrap();
/// assert_eq!(tenor.years(), 10.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tenor {
    /// A whole number of months.
    Months(u32),
    /// A whole number of years.
    Years(u32),
}

impl Tenor {
    /// Tenor length in years (months / 12).
    #[must_use]
    pub fn years(&self) -> f64 {
        match self {
            Tenor::Months(m) => f64::from(*m) / 12.0,
            Tenor::Years(y) => f64::from(*y),
        }
    }

    /// Total number of months.
    #[must_use]
    pub fn months(&self) -> u32 {
        match self {
            Tenor::Months(m) => *m,
            Tenor::Years(y) => y * 12,
        }
    }

    /// Rolls a date forward by this tenor.
    pub fn add_to(&self, date: Date) -> CoreResult<Date> {
        date.add_months(self.months() as i32)
    }
}

impl FromStr for Tenor {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let split = label
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| CoreError::InvalidTenor {
                label: label.to_string(),
            })?;
        let (digits, unit) = label.split_at(split);
        let count: u32 = digits.parse().map_err(|_| CoreError::InvalidTenor {
            label: label.to_string(),
        })?;

        match unit.to_ascii_lowercase().as_str() {
            "m" | "mo" | "mos" | "month" | "months" => Ok(Tenor::Months(count)),
            "y" | "yr" | "yrs" | "year" | "years" => Ok(Tenor::Years(count)),
            _ => Err(CoreError::InvalidTenor {
                label: label.to_string(),
            }),
        }
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tenor::Months(m) => write!(f, "{m}M"),
            Tenor::Years(y) => write!(f, "{y}Y"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_vendor_labels() {
        assert_eq!("1Mo".parse::<Tenor>().unwrap(), Tenor::Months(1));
        assert_eq!("9Mo".parse::<Tenor>().unwrap(), Tenor::Months(9));
        assert_eq!("12Yr".parse::<Tenor>().unwrap(), Tenor::Years(12));
        assert_eq!("30Y".parse::<Tenor>().unwrap(), Tenor::Years(30));
        assert_relative_eq!("2Mo".parse::<Tenor>().unwrap().years(), 2.0 / 12.0);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("Y5".parse::<Tenor>().is_err());
        assert!("5".parse::<Tenor>().is_err());
        assert!("5W".parse::<Tenor>().is_err());
    }

    #[test]
    fn test_add_to() {
        let d = Date::from_ymd(2025, 8, 31).unwrap();
        assert_eq!(
            Tenor::Months(6).add_to(d).unwrap(),
            Date::from_ymd(2026, 2, 28).unwrap()
        );
    }
}
