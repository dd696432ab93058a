//! Tabular projections of a [`PricingReport`].
//!
//! Rows are plain serde structs; writing them to a spreadsheet, CSV or a
//! dashboard is up to the caller.

use bermuda_core::types::Date;
use serde::{Deserialize, Serialize};

use crate::deal::Deal;
use crate::greeks::{DELTA, DV01, GAMMA, THETA, UNDERLYING_DV01, VEGA};
use crate::market::{MarketSnapshot, ReferenceQuotes};
use crate::pipeline::PricingReport;

/// Summary line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Item.
    pub item: String,
    /// Rendered value.
    pub value: String,
}

/// Model figure against the benchmark figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    /// Metric name.
    pub metric: String,
    /// Benchmark value, if quoted.
    pub reference: Option<f64>,
    /// Model value.
    pub model: f64,
    /// `model - reference`.
    pub diff: Option<f64>,
    /// `diff / |reference|` in percent.
    pub diff_pct: Option<f64>,
}

impl ComparisonRow {
    fn new(metric: &str, reference: Option<f64>, model: f64) -> Self {
        let diff = reference.map(|r| model - r);
        let diff_pct = reference
            .zip(diff)
            .and_then(|(r, d)| (r != 0.0).then(|| d / r.abs() * 100.0));
        Self {
            metric: metric.to_string(),
            reference,
            model,
            diff,
            diff_pct,
        }
    }
}

/// Greek line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreekRow {
    /// Greek name.
    pub name: String,
    /// Bump size.
    pub bump: f64,
    /// Unit.
    pub unit: String,
    /// Value, NaN on failure.
    pub value: f64,
    /// `"ok"` or the failure reason.
    pub status: String,
}

/// Curve node line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveRow {
    /// Node date.
    pub date: Date,
    /// Years from the as-of date.
    pub time: f64,
    /// Discount factor.
    pub discount_factor: f64,
    /// Continuously compounded zero rate, `None` at the anchor.
    pub zero_rate: Option<f64>,
}

/// Surface point line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolRow {
    /// Expiry label.
    pub expiry: String,
    /// Underlying tenor label.
    pub tenor: String,
    /// ATM normal vol in bp.
    pub vol_bp: f64,
}

/// Run log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLogRow {
    /// Parameter.
    pub parameter: String,
    /// Value.
    pub value: String,
}

/// The six output tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTables {
    /// Deal, price and calibration summary.
    pub summary: Vec<SummaryRow>,
    /// Model against benchmark.
    pub comparison: Vec<ComparisonRow>,
    /// Greeks.
    pub greeks: Vec<GreekRow>,
    /// Curve nodes.
    pub curve: Vec<CurveRow>,
    /// Vol surface grid.
    pub vol: Vec<VolRow>,
    /// Run log.
    pub run_log: Vec<RunLogRow>,
}

impl ReportTables {
    /// Projects a report into tables.
    pub fn build(report: &PricingReport, deal: &Deal, market: &MarketSnapshot) -> Self {
        Self {
            summary: summary(report, deal),
            comparison: comparison(report, market),
            greeks: report
                .pricing
                .greeks
                .iter()
                .map(|g| GreekRow {
                    name: g.name.clone(),
                    bump: g.bump,
                    unit: g.unit.clone(),
                    value: g.value,
                    status: g.reason.clone().unwrap_or_else(|| "ok".to_string()),
                })
                .collect(),
            curve: curve_rows(market),
            vol: vol_rows(market),
            run_log: report
                .run_log
                .entries
                .iter()
                .map(|e| RunLogRow {
                    parameter: e.parameter.clone(),
                    value: e.value.clone(),
                })
                .collect(),
        }
    }
}

fn summary(report: &PricingReport, deal: &Deal) -> Vec<SummaryRow> {
    let pricing = &report.pricing;
    let calibration = &report.calibration;
    let mut rows = vec![
        ("As of", report.as_of.to_string()),
        ("Side", deal.side().name().to_string()),
        ("Notional", deal.notional().to_string()),
        ("Strike", format!("{:.6}", deal.fixed_rate_f64())),
        ("Start", deal.start().to_string()),
        ("Maturity", deal.maturity().to_string()),
        ("NPV", format!("{:.2}", pricing.npv)),
        ("Premium %", format!("{:.6}", pricing.premium_pct)),
        ("Underlying NPV", format!("{:.2}", pricing.underlying_npv)),
        ("ATM strike", format!("{:.6}", pricing.fair_rate)),
        ("Moneyness bp", format!("{:.2}", pricing.moneyness_bp)),
        ("Fixed leg BPS", format!("{:.2}", pricing.fixed_leg_bps)),
        ("Yield value", format!("{:.4}", pricing.yield_value)),
        ("Mean reversion", format!("{:.6}", calibration.mean_reversion)),
        ("Vol spread", format!("{:.6}", calibration.spread)),
        ("Converged", calibration.converged.to_string()),
    ];
    if let Some(sigma) = &calibration.sigma_total {
        for (date, s) in sigma.dates().iter().zip(sigma.sigmas()) {
            rows.push(("Sigma total", format!("{date}: {s:.6}")));
        }
    }
    for b in &pricing.boundary {
        let edge = b.short_rate.map_or_else(|| "none".to_string(), |r| format!("{r:.6}"));
        rows.push(("Exercise boundary", format!("{}: r* {edge}, p {:.4}", b.date, b.probability)));
    }
    rows.into_iter()
        .map(|(item, value)| SummaryRow {
            item: item.to_string(),
            value,
        })
        .collect()
}

fn comparison(report: &PricingReport, market: &MarketSnapshot) -> Vec<ComparisonRow> {
    let quotes = market.quotes().cloned().unwrap_or_default();
    let pricing = &report.pricing;
    let greek = |name: &str| pricing.greek(name).map_or(f64::NAN, |g| g.value);
    let ReferenceQuotes {
        npv,
        dv01,
        gamma,
        vega,
        theta,
        delta,
        underlying_dv01,
        atm_strike,
        yield_value,
        premium,
    } = quotes;

    vec![
        ComparisonRow::new("NPV", npv.or(market.reference_npv()), pricing.npv),
        ComparisonRow::new("DV01", dv01, greek(DV01)),
        ComparisonRow::new("Gamma", gamma, greek(GAMMA)),
        ComparisonRow::new("Vega", vega, greek(VEGA)),
        ComparisonRow::new("Theta", theta, greek(THETA)),
        ComparisonRow::new("Delta", delta, greek(DELTA)),
        ComparisonRow::new("Underlying DV01", underlying_dv01, greek(UNDERLYING_DV01)),
        ComparisonRow::new("ATM strike", atm_strike, pricing.fair_rate),
        ComparisonRow::new("Yield value", yield_value, pricing.yield_value),
        ComparisonRow::new("Premium %", premium, pricing.premium_pct),
    ]
}

fn curve_rows(market: &MarketSnapshot) -> Vec<CurveRow> {
    let curve = market.curve();
    curve
        .nodes()
        .iter()
        .map(|&(date, df)| {
            let time = curve.time(date);
            CurveRow {
                date,
                time,
                discount_factor: df,
                zero_rate: (time > 0.0).then(|| -df.ln() / time),
            }
        })
        .collect()
}

fn vol_rows(market: &MarketSnapshot) -> Vec<VolRow> {
    let surface = market.surface();
    let vols = surface.vols_bp();
    surface
        .expiry_labels()
        .iter()
        .enumerate()
        .flat_map(|(i, expiry)| {
            surface
                .tenor_labels()
                .iter()
                .enumerate()
                .map(move |(j, tenor)| VolRow {
                    expiry: expiry.clone(),
                    tenor: tenor.clone(),
                    vol_bp: vols[[i, j]],
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_row_diffs() {
        let row = ComparisonRow::new("DV01", Some(-200.0), -210.0);
        assert_eq!(row.diff, Some(-10.0));
        assert_eq!(row.diff_pct, Some(-5.0));

        let blank = ComparisonRow::new("Vega", None, 12.0);
        assert_eq!(blank.diff, None);
        assert_eq!(ComparisonRow::new("Theta", Some(0.0), 1.0).diff_pct, None);
    }
}
