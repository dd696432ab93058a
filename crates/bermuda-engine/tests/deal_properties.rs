//! Property tests for deal analytics.

use bermuda_core::types::{Date, Frequency};
use bermuda_curves::DiscountCurve;
use bermuda_engine::prelude::*;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn as_of() -> Date {
    Date::from_ymd(2025, 6, 2).unwrap()
}

fn deal(side: SwaptionSide, rate: f64, lockout: i32, tenor: i32, frequency: Frequency) -> Deal {
    let start = as_of().add_years(lockout).unwrap();
    Deal::builder()
        .notional(Decimal::from(1_000_000))
        .fixed_rate(Decimal::from_f64_retain(rate).unwrap())
        .side(side)
        .start(start)
        .maturity(start.add_years(tenor).unwrap())
        .frequency(frequency)
        .build()
        .unwrap()
}

fn frequency() -> impl Strategy<Value = Frequency> {
    prop_oneof![
        Just(Frequency::Annual),
        Just(Frequency::SemiAnnual),
        Just(Frequency::Quarterly),
    ]
}

proptest! {
    #[test]
    fn payer_and_receiver_swaps_offset(
        zero in 0.001f64..0.07,
        rate in 0.005f64..0.08,
        lockout in 1i32..5,
        tenor in 2i32..15,
        frequency in frequency(),
    ) {
        let curve = DiscountCurve::flat(as_of(), zero, 30).unwrap();
        let payer = deal(SwaptionSide::Payer, rate, lockout, tenor, frequency);
        let receiver = deal(SwaptionSide::Receiver, rate, lockout, tenor, frequency);
        let sum = payer.swap_npv(&curve).unwrap() + receiver.swap_npv(&curve).unwrap();
        prop_assert!(sum.abs() < 1e-6);
        prop_assert!(receiver.fixed_leg_bps(&curve).unwrap() > 0.0);
        prop_assert!(payer.fixed_leg_bps(&curve).unwrap() < 0.0);
    }

    #[test]
    fn swap_at_fair_rate_is_worth_nothing(
        zero in 0.001f64..0.07,
        lockout in 1i32..5,
        tenor in 2i32..15,
        frequency in frequency(),
    ) {
        let curve = DiscountCurve::flat(as_of(), zero, 30).unwrap();
        let template = deal(SwaptionSide::Payer, 0.03, lockout, tenor, frequency);
        let par = template.fair_rate(&curve).unwrap();
        let at_par = deal(SwaptionSide::Payer, par, lockout, tenor, frequency);
        prop_assert!(at_par.swap_npv(&curve).unwrap().abs() < 1e-6);
    }

    #[test]
    fn live_exercise_dates_are_ordered_and_bounded(
        lockout in 1i32..5,
        tenor in 2i32..15,
        frequency in frequency(),
        offset in 0i64..6_000,
    ) {
        let deal = deal(SwaptionSide::Receiver, 0.03, lockout, tenor, frequency);
        let today = as_of().add_days(offset);
        let live = deal.live_exercise_dates(today);
        for w in live.windows(2) {
            prop_assert!(w[0] < w[1]);
        }
        for d in &live {
            prop_assert!(*d > today && *d < deal.maturity());
        }
    }
}
