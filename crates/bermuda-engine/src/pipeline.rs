//! End-to-end run: ATM bootstrap, spread, final price, Greeks.

use std::fmt::Display;
use std::time::Instant;

use bermuda_core::types::Date;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calibration::{fit_mean_reversion, AtmCalibrator, CalibrationResult, SpreadSolution, SpreadSolver};
use crate::config::{EngineConfig, MeanReversion};
use crate::deal::Deal;
use crate::error::{EngineResult, Validate};
use crate::greeks::GreeksEngine;
use crate::market::MarketSnapshot;
use crate::pricer::{BermudanPricer, LatticePrice, PricingResult};
use crate::provider::MarketDataProvider;

/// One parameter/value line of the run log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLogEntry {
    /// Parameter name.
    pub parameter: String,
    /// Rendered value.
    pub value: String,
}

/// Identity, inputs and timings of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLog {
    /// Unique run id.
    pub run_id: Uuid,
    /// Wall-clock start.
    pub started_at: DateTime<Utc>,
    /// Entries in the order recorded.
    pub entries: Vec<RunLogEntry>,
}

impl RunLog {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    /// Appends an entry.
    pub fn record(&mut self, parameter: impl Into<String>, value: impl Display) {
        self.entries.push(RunLogEntry {
            parameter: parameter.into(),
            value: value.to_string(),
        });
    }

    /// Value of the first entry named `parameter`.
    pub fn get(&self, parameter: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.parameter == parameter)
            .map(|e| e.value.as_str())
    }
}

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingReport {
    /// Valuation date.
    pub as_of: Date,
    /// Final price and Greeks.
    pub pricing: PricingResult,
    /// Calibration outcome.
    pub calibration: CalibrationResult,
    /// Run identity and inputs.
    pub run_log: RunLog,
}

/// Runs the calibration and pricing pipeline.
///
/// ```text
/// MarketSnapshot + Deal
///   -> AtmCalibrator      σ_ATM per exercise date
///   -> SpreadSolver       Δσ against the reference NPV
///   -> BermudanPricer     NPV at σ_ATM + Δσ
///   -> GreeksEngine       bumped re-runs
/// ```
#[derive(Debug, Clone)]
pub struct PricingPipeline {
    config: EngineConfig,
}

impl PricingPipeline {
    /// Creates a pipeline.
    ///
    /// # Errors
    ///
    /// `EngineError::Config` listing every invalid setting.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate_or_error()?;
        Ok(Self { config })
    }

    /// The validated configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Prices `deal` against a snapshot fetched from `provider`.
    pub fn run_with_provider(
        &self,
        deal: &Deal,
        provider: &dyn MarketDataProvider,
        as_of: Date,
    ) -> EngineResult<PricingReport> {
        let market = provider.snapshot(as_of)?;
        info!(provider = provider.name(), %as_of, "snapshot loaded");
        let mut report = self.run(deal, &market)?;
        report.run_log.record("market_data", provider.name());
        Ok(report)
    }

    /// Calibrates, prices and computes Greeks.
    ///
    /// # Errors
    ///
    /// Any base-case failure aborts the run; Greek scenario failures are
    /// reported inside the result instead.
    pub fn run(&self, deal: &Deal, market: &MarketSnapshot) -> EngineResult<PricingReport> {
        let mut log = RunLog::new();
        let as_of = market.as_of();
        info!(run_id = %log.run_id, %as_of, side = deal.side().name(), "pricing run started");
        self.record_inputs(&mut log, deal, market);

        let clock = Instant::now();
        let (mean_reversion, mean_reversion_calibrated) = self.mean_reversion(deal, market)?;
        let atm = AtmCalibrator::new(&self.config.solver).calibrate(deal, market, mean_reversion)?;
        log.record("atm_ms", clock.elapsed().as_millis());

        let clock = Instant::now();
        let pricer = BermudanPricer::new(&self.config.model);
        let curve = market.curve();
        let target = market.target_npv();
        let solution = match &atm.sigma {
            Some(sigma) => SpreadSolver::new(&self.config.solver).solve(target, sigma.min_sigma(), |spread| {
                let params = sigma.shifted(spread)?.params(mean_reversion, curve)?;
                Ok(pricer.price(deal, curve, &params)?.npv)
            })?,
            None => {
                if target.is_some() {
                    warn!("no live exercise date, reference NPV ignored");
                }
                SpreadSolution {
                    spread: 0.0,
                    iterations: 0,
                    residual: None,
                }
            }
        };
        log.record("spread_ms", clock.elapsed().as_millis());

        let clock = Instant::now();
        let sigma_total = atm.sigma.as_ref().map(|s| s.shifted(solution.spread)).transpose()?;
        let lattice = match &sigma_total {
            Some(sigma) => pricer.price(deal, curve, &sigma.params(mean_reversion, curve)?)?,
            None => LatticePrice::default(),
        };
        let mut pricing = PricingResult::from_lattice(deal, curve, lattice)?;
        log.record("pricing_ms", clock.elapsed().as_millis());

        let residual = target.map(|t| pricing.npv - t);
        let converged = match (target, residual) {
            (Some(t), Some(r)) if atm.sigma.is_some() => r.abs() <= self.config.solver.spread_tolerance * t.abs(),
            _ => true,
        };
        if !converged {
            warn!(residual = residual.unwrap_or(f64::NAN), "repriced NPV outside spread tolerance");
        }

        let calibration = CalibrationResult {
            mean_reversion,
            mean_reversion_calibrated,
            sigma_atm: atm.sigma,
            spread: solution.spread,
            sigma_total,
            atm_iterations: atm.iterations,
            spread_iterations: solution.iterations,
            residual,
            converged,
            basket: atm.basket,
        };

        let clock = Instant::now();
        pricing.greeks = GreeksEngine::new(&self.config, deal, market, &calibration, pricing.npv).compute();
        log.record("greeks_ms", clock.elapsed().as_millis());

        log.record("mean_reversion", mean_reversion);
        log.record("spread", calibration.spread);
        log.record("lattice_steps", pricing.lattice_steps);
        info!(
            run_id = %log.run_id,
            npv = pricing.npv,
            spread = calibration.spread,
            converged,
            "pricing run complete"
        );

        Ok(PricingReport {
            as_of,
            pricing,
            calibration,
            run_log: log,
        })
    }

    fn mean_reversion(&self, deal: &Deal, market: &MarketSnapshot) -> EngineResult<(f64, bool)> {
        match self.config.model.mean_reversion {
            MeanReversion::Fixed { value } => Ok((value, false)),
            MeanReversion::Calibrate { lower, upper } => {
                if deal.live_exercise_dates(market.as_of()).is_empty() {
                    warn!("no live exercise date, mean reversion held at lower bound");
                    return Ok((lower, false));
                }
                Ok((fit_mean_reversion(deal, market, lower, upper)?, true))
            }
        }
    }

    fn record_inputs(&self, log: &mut RunLog, deal: &Deal, market: &MarketSnapshot) {
        log.record("run_id", log.run_id);
        log.record("started_at", log.started_at.to_rfc3339());
        log.record("as_of", market.as_of());
        log.record("side", deal.side().name());
        log.record("notional", deal.notional());
        log.record("fixed_rate", deal.fixed_rate());
        log.record("start", deal.start());
        log.record("maturity", deal.maturity());
        log.record("frequency", format!("{:?}", deal.schedule().frequency()));
        log.record("day_count", deal.day_count());
        log.record("exercise_dates", deal.exercise_dates().len());
        log.record(
            "reference_npv",
            market
                .reference_npv()
                .map_or_else(|| "none".to_string(), |v| v.to_string()),
        );
        let model = &self.config.model;
        log.record(
            "mean_reversion_mode",
            match model.mean_reversion {
                MeanReversion::Fixed { value } => format!("fixed {value}"),
                MeanReversion::Calibrate { lower, upper } => format!("calibrate [{lower}, {upper}]"),
            },
        );
        log.record("steps_per_year", model.steps_per_year);
        log.record("max_lattice_steps", model.max_lattice_steps);
        log.record("recalibration", format!("{:?}", self.config.greeks.recalibration));
    }
}
