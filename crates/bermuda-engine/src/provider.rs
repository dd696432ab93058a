//! Market data sources.
//!
//! The pipeline only consumes [`MarketSnapshot`]s. Providers turn either
//! manually entered figures or an injected vendor session into one; the
//! engine itself performs no I/O.

use bermuda_core::types::Date;
use bermuda_curves::{DiscountCurve, VolSurface};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::market::{MarketSnapshot, ReferenceQuotes};

/// Source of market snapshots.
pub trait MarketDataProvider: Send + Sync {
    /// Provider name for logs and the run log.
    fn name(&self) -> &str;

    /// Snapshot as of `as_of`.
    fn snapshot(&self, as_of: Date) -> EngineResult<MarketSnapshot>;
}

/// ATM normal vol quotes with vendor axis labels, vols in bp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolQuoteGrid {
    /// Expiry labels, e.g. `"3Mo"`, `"1Yr"`.
    pub expiry_labels: Vec<String>,
    /// Underlying tenor labels, e.g. `"2Y"`, `"10Y"`.
    pub tenor_labels: Vec<String>,
    /// One row per expiry, one column per tenor.
    pub vols_bp: Vec<Vec<f64>>,
}

impl VolQuoteGrid {
    /// Builds the surface.
    pub fn to_surface(&self) -> EngineResult<VolSurface> {
        let rows = self.expiry_labels.len();
        let cols = self.tenor_labels.len();
        if self.vols_bp.len() != rows || self.vols_bp.iter().any(|r| r.len() != cols) {
            return Err(EngineError::market_data(format!(
                "vol grid is not {rows} x {cols} as the labels imply"
            )));
        }
        let flat: Vec<f64> = self.vols_bp.iter().flatten().copied().collect();
        let grid = Array2::from_shape_vec((rows, cols), flat).map_err(|e| EngineError::market_data(e.to_string()))?;
        let expiries: Vec<&str> = self.expiry_labels.iter().map(String::as_str).collect();
        let tenors: Vec<&str> = self.tenor_labels.iter().map(String::as_str).collect();
        Ok(VolSurface::from_labels(&expiries, &tenors, grid)?)
    }
}

/// Manually entered market data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualMarketData {
    /// Valuation date the figures belong to.
    pub as_of: Date,
    /// Discount factor nodes.
    pub nodes: Vec<(Date, f64)>,
    /// ATM vol grid.
    pub vols: VolQuoteGrid,
    /// Reference NPV.
    #[serde(default)]
    pub reference_npv: Option<f64>,
    /// Benchmark quotes.
    #[serde(default)]
    pub quotes: Option<ReferenceQuotes>,
}

impl MarketDataProvider for ManualMarketData {
    fn name(&self) -> &str {
        "manual"
    }

    fn snapshot(&self, as_of: Date) -> EngineResult<MarketSnapshot> {
        if as_of != self.as_of {
            return Err(EngineError::market_data(format!(
                "manual data is for {}, requested {as_of}",
                self.as_of
            )));
        }
        let curve = DiscountCurve::new(as_of, self.nodes.clone())?;
        let mut snapshot =
            MarketSnapshot::new(curve, self.vols.to_surface()?).with_reference_npv(self.reference_npv);
        if let Some(quotes) = &self.quotes {
            snapshot = snapshot.with_quotes(quotes.clone());
        }
        Ok(snapshot)
    }
}

/// A live vendor session, injected by the caller.
///
/// Errors are plain messages; the adapter wraps them as market data errors.
pub trait VendorFeed: Send + Sync {
    /// Discount factor nodes as of `as_of`.
    fn discount_factors(&self, as_of: Date) -> Result<Vec<(Date, f64)>, String>;

    /// ATM normal vol grid.
    fn vol_grid(&self, as_of: Date) -> Result<VolQuoteGrid, String>;

    /// Vendor NPV of the deal, if the session has one.
    fn reference_npv(&self, as_of: Date) -> Result<Option<f64>, String>;

    /// Vendor Greeks and metrics.
    fn quotes(&self, _as_of: Date) -> Result<Option<ReferenceQuotes>, String> {
        Ok(None)
    }
}

/// Adapts a [`VendorFeed`] to [`MarketDataProvider`].
#[derive(Debug, Clone)]
pub struct VendorMarketData<F> {
    feed: F,
}

impl<F: VendorFeed> VendorMarketData<F> {
    /// Wraps a feed.
    pub fn new(feed: F) -> Self {
        Self { feed }
    }
}

impl<F: VendorFeed> MarketDataProvider for VendorMarketData<F> {
    fn name(&self) -> &str {
        "vendor"
    }

    fn snapshot(&self, as_of: Date) -> EngineResult<MarketSnapshot> {
        let nodes = self.feed.discount_factors(as_of).map_err(EngineError::market_data)?;
        let curve = DiscountCurve::new(as_of, nodes)?;
        let surface = self
            .feed
            .vol_grid(as_of)
            .map_err(EngineError::market_data)?
            .to_surface()?;
        let npv = self.feed.reference_npv(as_of).map_err(EngineError::market_data)?;
        let mut snapshot = MarketSnapshot::new(curve, surface).with_reference_npv(npv);
        if let Some(quotes) = self.feed.quotes(as_of).map_err(EngineError::market_data)? {
            snapshot = snapshot.with_quotes(quotes);
        }
        Ok(snapshot)
    }
}

/// Tries `primary`, falling back to `secondary` on any error.
#[derive(Debug, Clone)]
pub struct FallbackProvider<P, S> {
    primary: P,
    secondary: S,
}

impl<P: MarketDataProvider, S: MarketDataProvider> FallbackProvider<P, S> {
    /// Creates the chain.
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P: MarketDataProvider, S: MarketDataProvider> MarketDataProvider for FallbackProvider<P, S> {
    fn name(&self) -> &str {
        self.primary.name()
    }

    fn snapshot(&self, as_of: Date) -> EngineResult<MarketSnapshot> {
        match self.primary.snapshot(as_of) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                warn!(
                    primary = self.primary.name(),
                    fallback = self.secondary.name(),
                    error = %e,
                    "primary market data failed, falling back"
                );
                let snapshot = self.secondary.snapshot(as_of)?;
                info!(provider = self.secondary.name(), %as_of, "snapshot loaded");
                Ok(snapshot)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_of() -> Date {
        Date::from_ymd(2025, 6, 2).unwrap()
    }

    fn manual() -> ManualMarketData {
        ManualMarketData {
            as_of: as_of(),
            nodes: vec![
                (Date::from_ymd(2030, 6, 3).unwrap(), 0.86),
                (Date::from_ymd(2035, 6, 4).unwrap(), 0.73),
            ],
            vols: VolQuoteGrid {
                expiry_labels: vec!["1Yr".into(), "5Yr".into()],
                tenor_labels: vec!["5Y".into(), "10Y".into()],
                vols_bp: vec![vec![95.0, 90.0], vec![85.0, 80.0]],
            },
            reference_npv: Some(125_000.0),
            quotes: None,
        }
    }

    struct DownFeed;

    impl VendorFeed for DownFeed {
        fn discount_factors(&self, _: Date) -> Result<Vec<(Date, f64)>, String> {
            Err("session not connected".into())
        }
        fn vol_grid(&self, _: Date) -> Result<VolQuoteGrid, String> {
            Err("session not connected".into())
        }
        fn reference_npv(&self, _: Date) -> Result<Option<f64>, String> {
            Ok(None)
        }
    }

    #[test]
    fn test_manual_snapshot() {
        let snap = manual().snapshot(as_of()).unwrap();
        assert_eq!(snap.curve().nodes().len(), 3);
        assert_eq!(snap.surface().expiry_labels()[1], "5Yr");
        assert_eq!(snap.target_npv(), Some(125_000.0));
        assert!(manual().snapshot(Date::from_ymd(2025, 6, 3).unwrap()).is_err());
    }

    #[test]
    fn test_manual_round_trips_through_json() {
        let json = serde_json::to_string(&manual()).unwrap();
        let back: ManualMarketData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, manual());
    }

    #[test]
    fn test_ragged_grid_is_rejected() {
        let mut data = manual();
        data.vols.vols_bp[1].pop();
        assert!(matches!(data.snapshot(as_of()), Err(EngineError::MarketData { .. })));
    }

    #[test]
    fn test_fallback_uses_manual_when_vendor_is_down() {
        let provider = FallbackProvider::new(VendorMarketData::new(DownFeed), manual());
        let snap = provider.snapshot(as_of()).unwrap();
        assert_eq!(snap.reference_npv(), Some(125_000.0));
        assert!(VendorMarketData::new(DownFeed).snapshot(as_of()).is_err());
    }
}
