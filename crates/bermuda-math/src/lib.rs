//! # Bermuda Math
//!
//! Numerical building blocks for the Bermuda swaption engine.
//!
//! - **Solvers**: Brent, safeguarded secant, bracket expansion
//! - **Optimization**: golden-section minimisation on an interval
//! - **Interpolation**: log-linear (discount factors) and clamped bilinear (vol grids)
//! - **Distributions**: standard normal density and CDF, Bachelier option prices
//!
//! Every solver accepts a fallible objective (`FnMut(f64) -> Result<f64, E>`)
//! so that pricing errors raised inside an iteration propagate unchanged.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::uninlined_format_args)]

pub mod bachelier;
pub mod distributions;
pub mod error;
pub mod interpolation;
pub mod optimization;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bachelier::{bachelier_payer, bachelier_receiver};
    pub use crate::distributions::{norm_cdf, norm_pdf};
    pub use crate::error::{MathError, MathResult};
    pub use crate::interpolation::{BilinearInterpolator, Interpolator, LogLinearInterpolator};
    pub use crate::optimization::{golden_section, try_golden_section, MinimizeResult};
    pub use crate::solvers::{
        brent, expand_bracket, try_bracketed_secant, try_brent, try_brent_in, Bracket,
        BracketExpansion, SolverConfig, SolverResult,
    };
}

pub use error::{MathError, MathResult};
