//! Property tests for discount curve interpolation.

use bermuda_core::types::Date;
use bermuda_curves::bumping::ParallelBump;
use bermuda_curves::DiscountCurve;
use proptest::prelude::*;

fn as_of() -> Date {
    Date::from_ymd(2025, 3, 14).unwrap()
}

/// Curve with node DFs derived from positive zero rates.
fn curve_from_rates(rates: &[f64]) -> DiscountCurve {
    let t0 = as_of();
    let nodes = rates
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let d = t0.add_years(i as i32 + 1).unwrap();
            let t = (d - t0) as f64 / 365.0;
            (d, (-r * t).exp())
        })
        .collect();
    DiscountCurve::new(t0, nodes).unwrap()
}

proptest! {
    #[test]
    fn interpolated_values_lie_between_neighbours(
        rates in prop::collection::vec(0.0f64..0.08, 2..12),
        frac in 0.0f64..1.0,
    ) {
        let curve = curve_from_rates(&rates);
        let nodes = curve.nodes();
        for w in nodes.windows(2) {
            let (t_lo, t_hi) = (curve.time(w[0].0), curve.time(w[1].0));
            let df = curve.discount(t_lo + frac * (t_hi - t_lo)).unwrap();
            let (lo, hi) = (w[0].1.min(w[1].1), w[0].1.max(w[1].1));
            prop_assert!(df >= lo - 1e-14 && df <= hi + 1e-14);
        }
    }

    #[test]
    fn nodes_reproduced_exactly(rates in prop::collection::vec(-0.01f64..0.08, 2..12)) {
        let curve = curve_from_rates(&rates);
        for &(d, df) in curve.nodes() {
            prop_assert!((curve.discount_factor(d).unwrap() - df).abs() < 1e-14);
        }
    }

    #[test]
    fn parallel_bump_lowers_discount_factors(
        rates in prop::collection::vec(0.0f64..0.08, 2..8),
        t in 0.01f64..30.0,
    ) {
        let curve = curve_from_rates(&rates);
        let bumped = ParallelBump::new(1.0).apply(&curve).unwrap();
        prop_assert!(bumped.discount(t).unwrap() < curve.discount(t).unwrap());
    }
}

#[test]
fn roll_drops_expired_nodes() {
    let curve = curve_from_rates(&[0.03, 0.032, 0.035]);
    let after_first = curve.nodes()[1].0.add_days(10);
    let rolled = curve.roll_to(after_first).unwrap();
    assert_eq!(rolled.nodes().len(), 3);
    assert_eq!(rolled.nodes()[0], (after_first, 1.0));
    assert!(curve.roll_to(curve.nodes()[3].0.add_days(1)).is_err());
}
