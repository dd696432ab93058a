//! Fixed-leg schedule generation.
//!
//! Dates are generated backward from maturity and left unadjusted; an
//! irregular period, if any, ends up at the front.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{Date, Frequency};

/// One accrual period of a swap leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualPeriod {
    /// Accrual start (also the reset date).
    pub start: Date,
    /// Accrual end (also the payment date).
    pub end: Date,
}

/// An ordered set of schedule dates `d0 < d1 < ... < dn`.
///
/// Period `i` accrues from `d_i` to `d_{i+1}`; `d0..d_{n-1}` are the reset
/// dates and `d1..dn` the payment dates.
///
/// # Example
///
/// ```rust
/// use bermuda_core::prelude::*;
///
/// let start = Date::from_ymd(2025, 3, 1).unwrap();
/// let end = Date::from_ymd(2027, 1, 15).unwrap();
/// let schedule = Schedule::generate(start, end, Frequency::SemiAnnual).unwrap();
///
/// // Short front stub: 2025-03-01 -> 2025-07-15
/// assert_eq!(schedule.dates()[1], Date::from_ymd(2025, 7, 15).unwrap());
/// assert_eq!(schedule.periods().len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    dates: Vec<Date>,
    frequency: Frequency,
}

impl Schedule {
    /// Generates a schedule from `start` to `end` backward from `end`.
    ///
    /// Each regular date is `end` minus a whole number of periods, computed
    /// from `end` directly so month-end clamping does not drift.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidSchedule` if `end <= start`.
    pub fn generate(start: Date, end: Date, frequency: Frequency) -> CoreResult<Self> {
        if end <= start {
            return Err(CoreError::invalid_schedule(format!(
                "end {end} must be after start {start}"
            )));
        }

        let step = frequency.months_per_period() as i32;
        let mut dates = vec![end];
        let mut k = 1;
        loop {
            let date = end.add_months(-step * k)?;
            if date <= start {
                break;
            }
            dates.push(date);
            k += 1;
        }
        dates.push(start);
        dates.reverse();

        Ok(Self { dates, frequency })
    }

    /// Builds a schedule from explicit dates.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidSchedule` for fewer than two dates or dates
    /// that are not strictly increasing.
    pub fn from_dates(dates: Vec<Date>, frequency: Frequency) -> CoreResult<Self> {
        if dates.len() < 2 {
            return Err(CoreError::invalid_schedule("need at least two dates"));
        }
        if let Some(w) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(CoreError::invalid_schedule(format!(
                "dates not strictly increasing at {} -> {}",
                w[0], w[1]
            )));
        }
        Ok(Self { dates, frequency })
    }

    /// All schedule dates, start and maturity included.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Leg frequency.
    #[must_use]
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// First date.
    #[must_use]
    pub fn start(&self) -> Date {
        self.dates[0]
    }

    /// Last date (maturity).
    #[must_use]
    pub fn end(&self) -> Date {
        self.dates[self.dates.len() - 1]
    }

    /// Reset dates: every date but the last.
    #[must_use]
    pub fn reset_dates(&self) -> &[Date] {
        &self.dates[..self.dates.len() - 1]
    }

    /// Accrual periods in order.
    #[must_use]
    pub fn periods(&self) -> Vec<AccrualPeriod> {
        self.dates
            .windows(2)
            .map(|w| AccrualPeriod {
                start: w[0],
                end: w[1],
            })
            .collect()
    }

    /// Returns true if `date` is one of the reset dates.
    #[must_use]
    pub fn is_reset_date(&self, date: Date) -> bool {
        self.reset_dates().binary_search(&date).is_ok()
    }

    /// The co-terminal tail starting at reset date `from`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidSchedule` if `from` is not a reset date.
    pub fn tail_from(&self, from: Date) -> CoreResult<Self> {
        let idx = self
            .reset_dates()
            .binary_search(&from)
            .map_err(|_| CoreError::invalid_schedule(format!("{from} is not a reset date")))?;
        Ok(Self {
            dates: self.dates[idx..].to_vec(),
            frequency: self.frequency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_regular_annual() {
        let s = Schedule::generate(d(2030, 1, 15), d(2035, 1, 15), Frequency::Annual).unwrap();
        assert_eq!(s.dates().len(), 6);
        assert_eq!(s.dates()[3], d(2033, 1, 15));
        assert_eq!(s.reset_dates().len(), 5);
        assert!(s.is_reset_date(d(2034, 1, 15)));
        assert!(!s.is_reset_date(d(2035, 1, 15)));
    }

    #[test]
    fn test_month_end_does_not_drift() {
        let s = Schedule::generate(d(2025, 8, 31), d(2027, 8, 31), Frequency::SemiAnnual).unwrap();
        assert_eq!(
            s.dates(),
            &[
                d(2025, 8, 31),
                d(2026, 2, 28),
                d(2026, 8, 31),
                d(2027, 2, 28),
                d(2027, 8, 31)
            ]
        );
    }

    #[test]
    fn test_tail_from() {
        let s = Schedule::generate(d(2030, 1, 15), d(2035, 1, 15), Frequency::Annual).unwrap();
        let tail = s.tail_from(d(2032, 1, 15)).unwrap();
        assert_eq!(tail.start(), d(2032, 1, 15));
        assert_eq!(tail.end(), d(2035, 1, 15));
        assert_eq!(tail.periods().len(), 3);
        assert!(s.tail_from(d(2032, 2, 15)).is_err());
    }

    #[test]
    fn test_rejects_inverted() {
        assert!(Schedule::generate(d(2030, 1, 1), d(2030, 1, 1), Frequency::Annual).is_err());
        assert!(Schedule::from_dates(vec![d(2030, 1, 1)], Frequency::Annual).is_err());
    }

    proptest! {
        #[test]
        fn prop_schedule_strictly_increasing(
            start_offset in 0i64..4000,
            length_days in 40i64..9000,
        ) {
            let start = d(2025, 1, 1) + start_offset;
            let end = start + length_days;
            let s = Schedule::generate(start, end, Frequency::Quarterly).unwrap();
            prop_assert_eq!(s.start(), start);
            prop_assert_eq!(s.end(), end);
            prop_assert!(s.dates().windows(2).all(|w| w[0] < w[1]));
        }
    }
}
