//! # Bermuda Engine
//!
//! Calibration and pricing of Bermudan swaptions under a one-factor
//! Hull-White model.
//!
//! This crate provides:
//! - [`Deal`]: contract terms with validated exercise schedule
//! - [`MarketSnapshot`] and [`MarketDataProvider`]: curve, surface and reference NPV
//! - [`AtmCalibrator`] and [`SpreadSolver`]: hybrid volatility calibration
//! - [`BermudanPricer`]: trinomial lattice valuation with exercise boundary
//! - [`GreeksEngine`]: finite-difference scenario Greeks
//! - [`PricingPipeline`]: the end-to-end run, and [`ReportTables`] for output
//!
//! ## Architecture
//!
//! ```text
//! MarketDataProvider ─> MarketSnapshot ─┬─> AtmCalibrator ─> σ_ATM
//!                                       │
//!                                       ├─> SpreadSolver ─> Δσ
//!                                       │
//!                                       ├─> BermudanPricer ─> NPV, boundary
//!                                       │
//!                                       └─> GreeksEngine ─> DV01, vega, theta, ...
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bermuda_engine::prelude::*;
//! use bermuda_core::types::{Date, Frequency};
//! use bermuda_curves::{DiscountCurve, VolSurface};
//! use rust_decimal::Decimal;
//!
//! let as_of = Date::from_ymd(2025, 1, 2).unwrap();
//! let deal = Deal::builder()
//!     .notional(Decimal::from(10_000_000))
//!     .fixed_rate(Decimal::new(35, 3))
//!     .side(SwaptionSide::Receiver)
//!     .start(Date::from_ymd(2026, 1, 2).unwrap())
//!     .maturity(Date::from_ymd(2036, 1, 2).unwrap())
//!     .frequency(Frequency::SemiAnnual)
//!     .build()
//!     .unwrap();
//! let market = MarketSnapshot::new(
//!     DiscountCurve::flat(as_of, 0.03, 30).unwrap(),
//!     VolSurface::flat(85.0).unwrap(),
//! )
//! .with_reference_npv(Some(250_000.0));
//!
//! let report = PricingPipeline::new(EngineConfig::default())
//!     .unwrap()
//!     .run(&deal, &market)
//!     .unwrap();
//! let tables = ReportTables::build(&report, &deal, &market);
//! println!("NPV {:.2}, spread {:.6}", report.pricing.npv, report.calibration.spread);
//! # let _ = tables;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::uninlined_format_args)]

pub mod calibration;
pub mod config;
pub mod deal;
pub mod error;
pub mod greeks;
pub mod market;
pub mod pipeline;
pub mod pricer;
pub mod provider;
pub mod report;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::calibration::{
        build_basket, fit_mean_reversion, AtmCalibration, AtmCalibrator, BasketInstrument, CalibrationResult,
        SigmaSchedule, SpreadSolution, SpreadSolver,
    };
    pub use crate::config::{
        EngineConfig, GreeksConfig, MeanReversion, ModelConfig, RecalibrationPolicy, SolverSettings,
    };
    pub use crate::deal::{Deal, DealBuilder, ExerciseSchedule};
    pub use crate::error::{CalibrationStage, EngineError, EngineResult, Validate, ValidationError};
    pub use crate::greeks::{Greek, GreeksEngine};
    pub use crate::market::{MarketSnapshot, ReferenceQuotes};
    pub use crate::pipeline::{PricingPipeline, PricingReport, RunLog, RunLogEntry};
    pub use crate::pricer::{BermudanPricer, ExerciseBoundary, LatticePrice, PricingResult};
    pub use crate::provider::{
        FallbackProvider, ManualMarketData, MarketDataProvider, VendorFeed, VendorMarketData, VolQuoteGrid,
    };
    pub use crate::report::ReportTables;
    pub use bermuda_models::SwaptionSide;
}

pub use calibration::{AtmCalibrator, CalibrationResult, SigmaSchedule, SpreadSolver};
pub use config::EngineConfig;
pub use deal::{Deal, ExerciseSchedule};
pub use error::{EngineError, EngineResult};
pub use greeks::{Greek, GreeksEngine};
pub use market::MarketSnapshot;
pub use pipeline::{PricingPipeline, PricingReport};
pub use pricer::{BermudanPricer, PricingResult};
pub use provider::MarketDataProvider;
pub use report::ReportTables;
