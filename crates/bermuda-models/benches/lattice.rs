use bermuda_core::types::Date;
use bermuda_curves::DiscountCurve;
use bermuda_models::prelude::*;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn bench_bermudan(c: &mut Criterion) {
    let curve = DiscountCurve::flat(Date::from_ymd(2025, 1, 1).unwrap(), 0.035, 40).unwrap();
    let params = HullWhiteParams::flat(0.03, 0.01).unwrap();
    let times: Vec<f64> = (1..=20).map(|k| 5.0 + 0.5 * f64::from(k)).collect();
    let leg = CouponLeg::from_accruals(times.clone(), &[0.5; 20], 0.035).unwrap();
    let mut exercises = vec![5.0];
    exercises.extend_from_slice(&times[..19]);
    let mut mandatory = times.clone();
    mandatory.push(5.0);

    c.bench_function("bermudan_5y10y_semi_annual_50spy", |b| {
        b.iter(|| {
            let grid = TimeGrid::new(&mandatory, 50, 10_000).unwrap();
            let lattice = TrinomialLattice::build(&params, &curve, grid).unwrap();
            black_box(bermudan_swaption(&lattice, &leg, &exercises, SwaptionSide::Receiver).unwrap())
        });
    });

    c.bench_function("european_jamshidian_5y10y", |b| {
        b.iter(|| black_box(european_swaption(&params, &curve, 5.0, &leg, SwaptionSide::Receiver).unwrap()));
    });
}

criterion_group!(benches, bench_bermudan);
criterion_main!(benches);
