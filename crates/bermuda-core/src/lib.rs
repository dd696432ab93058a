//! # Bermuda Core
//!
//! Calendar-free building blocks shared by the Bermuda swaption engine:
//!
//! - **Types**: [`Date`], [`Frequency`], [`Tenor`] and tenor-label parsing
//! - **Day Count Conventions**: ACT/365F, ACT/360 and 30/360 year fractions
//! - **Schedules**: unadjusted fixed-leg schedules generated backward from maturity
//!
//! ## Example
//!
//! ```rust
//! use bermuda_core::prelude::*;
//!
//! let start = Date::from_ymd(2030, 1, 15).unwrap();
//! let end = Date::from_ymd(2035, 1, 15).unwrap();
//! let schedule = Schedule::generate(start, end, Frequency::Annual).unwrap();
//! assert_eq!(schedule.periods().len(), 5);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::similar_names)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::uninlined_format_args)]

pub mod daycounts;
pub mod error;
pub mod schedule;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::daycounts::{DayCount, DayCountConvention};
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::schedule::{AccrualPeriod, Schedule};
    pub use crate::types::{Date, Frequency, Tenor};
}

pub use error::{CoreError, CoreResult};
pub use types::{Date, Frequency, Tenor};
