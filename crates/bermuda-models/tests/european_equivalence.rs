//! A Bermudan with one exercise date is a European swaption; the lattice
//! must agree with the analytic Jamshidian price.

use approx::assert_relative_eq;
use bermuda_core::types::Date;
use bermuda_curves::DiscountCurve;
use bermuda_models::prelude::*;

fn upward_curve() -> DiscountCurve {
    let t0 = Date::from_ymd(2025, 6, 30).unwrap();
    let node = |years: i32, rate: f64| {
        let d = t0.add_years(years).unwrap();
        let t = (d - t0) as f64 / 365.0;
        (d, (-rate * t).exp())
    };
    DiscountCurve::new(
        t0,
        vec![node(1, 0.025), node(3, 0.029), node(7, 0.033), node(15, 0.036), node(30, 0.037)],
    )
    .unwrap()
}

/// Semi-annual leg from `start` to `end` (years) struck at `rate`.
fn semi_annual_leg(start: f64, end: f64, rate: f64) -> CouponLeg {
    let n = ((end - start) * 2.0).round() as usize;
    let times: Vec<f64> = (1..=n).map(|k| start + 0.5 * k as f64).collect();
    CouponLeg::from_accruals(times, &vec![0.5; n], rate).unwrap()
}

/// Steps per year fine enough for the lattice to sit within 1e-3 of the
/// analytic price.
const FINE_STEPS: usize = 384;

/// Lattice value of `leg` exercisable on `exercises`.
fn lattice_value(
    params: &HullWhiteParams,
    leg: &CouponLeg,
    exercises: &[f64],
    side: SwaptionSide,
    steps_per_year: usize,
) -> f64 {
    let mut mandatory = leg.times().to_vec();
    mandatory.extend_from_slice(exercises);
    let grid = TimeGrid::new(&mandatory, steps_per_year, 100_000).unwrap();
    let lattice = TrinomialLattice::build(params, &upward_curve(), grid).unwrap();
    bermudan_swaption(&lattice, leg, exercises, side).unwrap().value
}

fn lattice_and_european(
    params: &HullWhiteParams,
    start: f64,
    end: f64,
    rate: f64,
    side: SwaptionSide,
    steps_per_year: usize,
) -> (f64, f64) {
    let leg = semi_annual_leg(start, end, rate);
    let bermudan = lattice_value(params, &leg, &[start], side, steps_per_year);
    let european = european_swaption(params, &upward_curve(), start, &leg, side).unwrap();
    (bermudan, european)
}

#[test]
fn single_exercise_matches_jamshidian_across_structures() {
    let params = HullWhiteParams::flat(0.03, 0.009).unwrap();
    for (start, end) in [(1.0, 6.0), (2.0, 12.0), (5.0, 10.0), (10.0, 20.0)] {
        for side in [SwaptionSide::Payer, SwaptionSide::Receiver] {
            let (lattice, analytic) = lattice_and_european(&params, start, end, 0.034, side, FINE_STEPS);
            assert_relative_eq!(lattice, analytic, max_relative = 1e-3);
        }
    }
}

#[test]
fn single_exercise_matches_jamshidian_deep_out_of_the_money() {
    let params = HullWhiteParams::flat(0.03, 0.009).unwrap();
    let (lattice, analytic) = lattice_and_european(&params, 2.0, 12.0, 0.01, SwaptionSide::Receiver, FINE_STEPS);
    assert!(analytic > 0.0);
    assert_relative_eq!(lattice, analytic, max_relative = 1e-3);
}

#[test]
fn single_exercise_matches_with_piecewise_vol() {
    let vol = VolTermStructure::new(vec![1.0, 3.0], vec![0.007, 0.011, 0.009]).unwrap();
    let params = HullWhiteParams::new(0.05, vol).unwrap();
    for (start, end) in [(1.0, 4.0), (3.0, 10.0), (4.0, 9.0)] {
        let (lattice, analytic) =
            lattice_and_european(&params, start, end, 0.033, SwaptionSide::Receiver, 2 * FINE_STEPS);
        assert_relative_eq!(lattice, analytic, max_relative = 1e-3);
    }
}

#[test]
fn bermudan_dominates_each_european() {
    let params = HullWhiteParams::flat(0.03, 0.009).unwrap();
    let curve = upward_curve();
    let leg = semi_annual_leg(2.0, 10.0, 0.034);
    let exercises: Vec<f64> = leg.times()[..leg.times().len() - 1]
        .iter()
        .copied()
        .chain(std::iter::once(2.0))
        .collect();
    let grid = TimeGrid::new(&exercises.iter().chain(leg.times()).copied().collect::<Vec<_>>(), 24, 10_000)
        .unwrap();
    let lattice = TrinomialLattice::build(&params, &curve, grid).unwrap();
    let bermudan = bermudan_swaption(&lattice, &leg, &exercises, SwaptionSide::Payer).unwrap();

    for expiry in [2.0, 4.0, 6.0] {
        let european = european_swaption(&params, &curve, expiry, &leg.after(expiry).unwrap(), SwaptionSide::Payer)
            .unwrap();
        assert!(bermudan.value > european * 0.99);
    }
}

#[test]
fn price_converges_as_steps_per_year_grow() {
    let params = HullWhiteParams::flat(0.03, 0.009).unwrap();
    let leg = semi_annual_leg(2.0, 7.0, 0.034);
    let mut exercises = vec![2.0];
    exercises.extend_from_slice(&leg.times()[..leg.times().len() - 1]);

    let prices: Vec<f64> = [48, 192, 768]
        .iter()
        .map(|&steps| lattice_value(&params, &leg, &exercises, SwaptionSide::Receiver, steps))
        .collect();
    let coarse_gap = (prices[1] - prices[0]).abs() / prices[2];
    let fine_gap = (prices[2] - prices[1]).abs() / prices[2];
    assert!(coarse_gap < 1e-2, "48 -> 192 moved {coarse_gap:.2e}");
    assert!(fine_gap < 2e-3, "192 -> 768 moved {fine_gap:.2e}");

    let single = lattice_value(&params, &leg, &[2.0], SwaptionSide::Receiver, 768);
    let european = european_swaption(&params, &upward_curve(), 2.0, &leg, SwaptionSide::Receiver).unwrap();
    assert_relative_eq!(single, european, max_relative = 1e-3);
    assert!(prices[2] > single);
}
