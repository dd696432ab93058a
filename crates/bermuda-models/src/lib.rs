//! # Bermuda Models
//!
//! Hull-White one-factor short rate model for Bermudan swaptions:
//!
//! - [`HullWhiteParams`] / [`VolTermStructure`]: mean reversion and
//!   piecewise-constant σ(t), bond reconstitution, zero-bond options
//! - [`european_swaption`]: analytic European swaption (Jamshidian)
//! - [`TrinomialLattice`]: curve-fitted recombining lattice
//! - [`bermudan_swaption`]: backward induction with early exercise
//!
//! ## Example
//!
//! ```rust
//! use bermuda_core::types::Date;
//! use bermuda_curves::DiscountCurve;
//! use bermuda_models::prelude::*;
//!
//! let curve = DiscountCurve::flat(Date::from_ymd(2025, 1, 1).unwrap(), 0.03, 20).unwrap();
//! let hw = HullWhiteParams::flat(0.03, 0.01).unwrap();
//! let leg = CouponLeg::from_accruals(vec![3.0, 4.0, 5.0], &[1.0; 3], 0.03).unwrap();
//!
//! let grid = TimeGrid::new(&[2.0, 3.0, 4.0, 5.0], 12, 1000).unwrap();
//! let lattice = TrinomialLattice::build(&hw, &curve, grid).unwrap();
//! let bermudan = bermudan_swaption(&lattice, &leg, &[2.0, 3.0, 4.0], SwaptionSide::Receiver).unwrap();
//! let european = european_swaption(&hw, &curve, 2.0, &leg, SwaptionSide::Receiver).unwrap();
//! assert!(bermudan.value >= european * 0.99);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::float_cmp)]
#![allow(clippy::uninlined_format_args)]

pub mod bermudan;
pub mod error;
pub mod hull_white;
pub mod lattice;
pub mod swaption;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bermudan::{bermudan_swaption, BoundaryPoint, LatticeValuation};
    pub use crate::error::{ModelError, ModelResult};
    pub use crate::hull_white::{HullWhiteParams, VolTermStructure};
    pub use crate::lattice::{TimeGrid, TrinomialLattice};
    pub use crate::swaption::{european_swaption, CouponLeg, SwaptionSide};
}

pub use bermudan::{bermudan_swaption, BoundaryPoint, LatticeValuation};
pub use error::{ModelError, ModelResult};
pub use hull_white::{HullWhiteParams, VolTermStructure};
pub use lattice::{TimeGrid, TrinomialLattice};
pub use swaption::{european_swaption, CouponLeg, SwaptionSide};
