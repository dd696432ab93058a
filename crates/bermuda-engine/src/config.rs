//! Engine configuration.
//!
//! Every field has a serde default, so a partial JSON/TOML document
//! deserializes into a complete configuration. Parsing files is left to the
//! caller; [`Validate::validate`] reports every out-of-range field at once.

use serde::{Deserialize, Serialize};

use crate::error::{Validate, ValidationError};

// =============================================================================
// ENGINE CONFIGURATION
// =============================================================================

/// Top-level configuration for one pricing run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Model and lattice settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Root-finder settings.
    #[serde(default)]
    pub solver: SolverSettings,

    /// Greek bump settings.
    #[serde(default)]
    pub greeks: GreeksConfig,
}

impl Validate for EngineConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = self.model.validate();
        errors.extend(self.solver.validate());
        errors.extend(self.greeks.validate());
        errors
    }
}

// =============================================================================
// MODEL
// =============================================================================

/// Mean reversion: held fixed or fitted to the co-terminal basket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MeanReversion {
    /// Use this value.
    Fixed {
        /// Mean reversion speed.
        value: f64,
    },
    /// Golden-section search on `[lower, upper]`. Vega scenarios refit on
    /// the bumped surface.
    Calibrate {
        /// Lower bound.
        lower: f64,
        /// Upper bound.
        upper: f64,
    },
}

impl Default for MeanReversion {
    fn default() -> Self {
        MeanReversion::Fixed { value: 0.03 }
    }
}

/// Model and lattice settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Mean reversion policy.
    #[serde(default)]
    pub mean_reversion: MeanReversion,

    /// Lattice steps per year between mandatory times.
    #[serde(default = "default_steps_per_year")]
    pub steps_per_year: usize,

    /// Hard cap on lattice steps.
    #[serde(default = "default_max_lattice_steps")]
    pub max_lattice_steps: usize,
}

fn default_steps_per_year() -> usize {
    24
}

fn default_max_lattice_steps() -> usize {
    5000
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            mean_reversion: MeanReversion::default(),
            steps_per_year: default_steps_per_year(),
            max_lattice_steps: default_max_lattice_steps(),
        }
    }
}

impl Validate for ModelConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        match self.mean_reversion {
            MeanReversion::Fixed { value } => {
                if !(value > 0.0 && value.is_finite()) {
                    errors.push(ValidationError::with_rule(
                        "model.mean_reversion.value",
                        format!("must be positive, got {value}"),
                        "positive",
                    ));
                }
            }
            MeanReversion::Calibrate { lower, upper } => {
                if !(lower > 0.0 && lower < upper && upper.is_finite()) {
                    errors.push(ValidationError::with_rule(
                        "model.mean_reversion",
                        format!("bounds [{lower}, {upper}] must satisfy 0 < lower < upper"),
                        "ordered_bounds",
                    ));
                }
            }
        }
        if self.steps_per_year == 0 {
            errors.push(ValidationError::with_rule("model.steps_per_year", "must be at least 1", "positive"));
        }
        if self.max_lattice_steps < self.steps_per_year {
            errors.push(ValidationError::new(
                "model.max_lattice_steps",
                format!("{} is below steps_per_year", self.max_lattice_steps),
            ));
        }
        errors
    }
}

// =============================================================================
// SOLVERS
// =============================================================================

/// Root-finder settings for the ATM bootstrap and the spread solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverSettings {
    /// Absolute price tolerance per unit notional for each ATM bucket.
    #[serde(default = "default_atm_tolerance")]
    pub atm_tolerance: f64,

    /// Maximum secant iterations per ATM bucket.
    #[serde(default = "default_max_iterations")]
    pub atm_max_iterations: u32,

    /// Maximum bracket doublings per ATM bucket.
    #[serde(default = "default_max_expansions")]
    pub atm_max_expansions: u32,

    /// Relative tolerance on the reference NPV.
    #[serde(default = "default_spread_tolerance")]
    pub spread_tolerance: f64,

    /// Maximum Brent iterations for the spread.
    #[serde(default = "default_max_iterations")]
    pub spread_max_iterations: u32,

    /// Maximum symmetric bracket expansions for the spread.
    #[serde(default = "default_max_expansions")]
    pub spread_max_expansions: u32,

    /// Initial spread bracket `[-h, h]` in absolute vol.
    #[serde(default = "default_spread_half_width")]
    pub spread_initial_half_width: f64,
}

fn default_atm_tolerance() -> f64 {
    1e-10
}

fn default_max_iterations() -> u32 {
    100
}

fn default_max_expansions() -> u32 {
    12
}

fn default_spread_tolerance() -> f64 {
    1e-4
}

fn default_spread_half_width() -> f64 {
    0.001
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            atm_tolerance: default_atm_tolerance(),
            atm_max_iterations: default_max_iterations(),
            atm_max_expansions: default_max_expansions(),
            spread_tolerance: default_spread_tolerance(),
            spread_max_iterations: default_max_iterations(),
            spread_max_expansions: default_max_expansions(),
            spread_initial_half_width: default_spread_half_width(),
        }
    }
}

impl Validate for SolverSettings {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (field, value) in [
            ("solver.atm_tolerance", self.atm_tolerance),
            ("solver.spread_tolerance", self.spread_tolerance),
            ("solver.spread_initial_half_width", self.spread_initial_half_width),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                errors.push(ValidationError::with_rule(field, format!("must be positive, got {value}"), "positive"));
            }
        }
        for (field, value) in [
            ("solver.atm_max_iterations", self.atm_max_iterations),
            ("solver.spread_max_iterations", self.spread_max_iterations),
        ] {
            if value == 0 {
                errors.push(ValidationError::with_rule(field, "must be at least 1", "positive"));
            }
        }
        errors
    }
}

// =============================================================================
// GREEKS
// =============================================================================

/// What a curve or vega scenario does with the calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecalibrationPolicy {
    /// Re-run the ATM bootstrap on the bumped market and add the base spread.
    #[default]
    RecalibrateAtm,
    /// Reuse the base σ_total unchanged.
    HoldTotalVol,
}

/// Greek bump settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreeksConfig {
    /// Compute Greeks at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Parallel zero-rate bump for DV01 and gamma, in bp.
    #[serde(default = "default_bump_bp")]
    pub curve_bump_bp: f64,

    /// Surface bump for vega, in bp of normal vol.
    #[serde(default = "default_bump_bp")]
    pub vega_bump_bp: f64,

    /// Twist size at the pivots, in bp.
    #[serde(default = "default_bump_bp")]
    pub slope_bump_bp: f64,

    /// Short twist pivot in years.
    #[serde(default = "default_short_pivot")]
    pub slope_short_pivot: f64,

    /// Long twist pivot in years.
    #[serde(default = "default_long_pivot")]
    pub slope_long_pivot: f64,

    /// Compute theta.
    #[serde(default = "default_true")]
    pub theta: bool,

    /// Calendar days to roll for theta.
    #[serde(default = "default_theta_roll_days")]
    pub theta_roll_days: i64,

    /// Calibration handling in curve and vega scenarios.
    #[serde(default)]
    pub recalibration: RecalibrationPolicy,

    /// Run scenarios on the rayon pool.
    #[serde(default = "default_true")]
    pub parallel: bool,
}

fn default_true() -> bool {
    true
}

fn default_bump_bp() -> f64 {
    1.0
}

fn default_short_pivot() -> f64 {
    2.0
}

fn default_long_pivot() -> f64 {
    10.0
}

fn default_theta_roll_days() -> i64 {
    1
}

impl Default for GreeksConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            curve_bump_bp: default_bump_bp(),
            vega_bump_bp: default_bump_bp(),
            slope_bump_bp: default_bump_bp(),
            slope_short_pivot: default_short_pivot(),
            slope_long_pivot: default_long_pivot(),
            theta: true,
            theta_roll_days: default_theta_roll_days(),
            recalibration: RecalibrationPolicy::default(),
            parallel: true,
        }
    }
}

impl Validate for GreeksConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (field, value) in [
            ("greeks.curve_bump_bp", self.curve_bump_bp),
            ("greeks.vega_bump_bp", self.vega_bump_bp),
            ("greeks.slope_bump_bp", self.slope_bump_bp),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                errors.push(ValidationError::with_rule(field, format!("must be positive, got {value}"), "positive"));
            }
        }
        if !(self.slope_short_pivot >= 0.0 && self.slope_short_pivot < self.slope_long_pivot) {
            errors.push(ValidationError::with_rule(
                "greeks.slope_short_pivot",
                format!(
                    "pivots ({}, {}) must satisfy 0 <= short < long",
                    self.slope_short_pivot, self.slope_long_pivot
                ),
                "ordered_bounds",
            ));
        }
        if self.theta_roll_days < 1 {
            errors.push(ValidationError::with_rule("greeks.theta_roll_days", "must be at least 1", "positive"));
        }
        errors
    }
}
