//! # Bermuda Curves
//!
//! Market objects consumed by the swaption engine:
//!
//! - [`DiscountCurve`]: log-linear discount factors with flat zero-rate
//!   extrapolation, re-anchoring roll to a later as-of date
//! - [`VolSurface`]: ATM normal vol grid (bp) with clamped bilinear lookup
//! - [`bumping`]: parallel and twist zero-rate shifts for scenario risk
//!
//! ## Quick Start
//!
//! ```rust
//! use bermuda_core::types::Date;
//! use bermuda_curves::prelude::*;
//!
//! let t0 = Date::from_ymd(2025, 1, 1).unwrap();
//! let curve = DiscountCurve::new(
//!     t0,
//!     vec![(t0.add_years(5).unwrap(), 0.90), (t0.add_years(10).unwrap(), 0.80)],
//! )
//! .unwrap();
//!
//! let up = ParallelBump::new(1.0).apply(&curve).unwrap();
//! assert!(up.discount(7.0).unwrap() < curve.discount(7.0).unwrap());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]

pub mod bumping;
pub mod discount;
pub mod error;
pub mod surface;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bumping::{ParallelBump, TwistBump};
    pub use crate::discount::{year_fraction, DiscountCurve};
    pub use crate::error::{CurveError, CurveResult};
    pub use crate::surface::VolSurface;
}

pub use discount::DiscountCurve;
pub use error::{CurveError, CurveResult};
pub use surface::VolSurface;
