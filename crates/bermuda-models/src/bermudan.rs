//! Bermudan swaption valuation by backward induction on the lattice.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::lattice::TrinomialLattice;
use crate::swaption::{CouponLeg, SwaptionSide};

/// Exercise region edge at one exercise date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPoint {
    /// Exercise time in years.
    pub time: f64,
    /// Short rate at the critical node, if any node exercises.
    pub short_rate: Option<f64>,
    /// State `x` at the critical node, if any node exercises.
    pub state: Option<f64>,
    /// Risk-neutral probability of exercising on this date (and not earlier).
    pub probability: f64,
}

/// Lattice value per unit notional with its exercise boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeValuation {
    /// Option value per unit notional.
    pub value: f64,
    /// One point per live exercise date, in time order.
    pub boundary: Vec<BoundaryPoint>,
}

/// Values a Bermudan swaption per unit notional.
///
/// Both the coupon bond `CB` (fixed leg plus principal) and the option are
/// rolled back together. At an exercise layer the option becomes
/// `max(continuation, intrinsic)` with intrinsic `CB - 1` (receiver) or
/// `1 - CB` (payer); a payment falling on an exercise date belongs to the
/// previous period and is added to `CB` after the exercise decision.
///
/// Exercise times that are not positive, or leave no payment after them,
/// are ignored. With no live exercise the value is 0.
///
/// # Errors
///
/// `ModelError::InvalidLeg` if a payment or exercise time is not on the
/// lattice grid.
pub fn bermudan_swaption(
    lattice: &TrinomialLattice,
    leg: &CouponLeg,
    exercise_times: &[f64],
    side: SwaptionSide,
) -> ModelResult<LatticeValuation> {
    let grid = lattice.grid();
    let n = lattice.steps();
    let last_payment = leg.times()[leg.times().len() - 1];

    let mut payments = vec![0.0; n + 1];
    for (&t, &c) in leg.times().iter().zip(leg.amounts()) {
        if t <= 0.0 {
            continue;
        }
        let i = grid
            .index_of(t)
            .ok_or_else(|| ModelError::invalid_leg(format!("payment time {t:.6} is not on the grid")))?;
        payments[i] += c;
    }

    let mut exercise_layers = Vec::new();
    for &t in exercise_times.iter().filter(|t| **t > 0.0 && **t < last_payment) {
        let i = grid
            .index_of(t)
            .ok_or_else(|| ModelError::invalid_leg(format!("exercise time {t:.6} is not on the grid")))?;
        exercise_layers.push((i, t));
    }
    exercise_layers.sort_by_key(|(i, _)| *i);
    exercise_layers.dedup_by_key(|(i, _)| *i);
    if exercise_layers.is_empty() {
        return Ok(LatticeValuation {
            value: 0.0,
            boundary: Vec::new(),
        });
    }

    let mut masks: Vec<Vec<bool>> = vec![Vec::new(); exercise_layers.len()];
    let mut bond = vec![0.0; lattice.layer_len(n)];
    let mut option = vec![0.0; lattice.layer_len(n)];
    let mut slot = exercise_layers.len();

    for i in (0..=n).rev() {
        if i < n {
            bond = lattice.rollback(i, &bond);
            option = lattice.rollback(i, &option);
        }
        if slot > 0 && exercise_layers[slot - 1].0 == i {
            slot -= 1;
            masks[slot] = option
                .iter_mut()
                .zip(&bond)
                .map(|(value, cb)| {
                    let intrinsic = side.intrinsic(*cb);
                    let exercise = intrinsic > 0.0 && intrinsic > *value;
                    if exercise {
                        *value = intrinsic;
                    }
                    exercise
                })
                .collect();
        }
        if payments[i] != 0.0 {
            for cb in &mut bond {
                *cb += payments[i];
            }
        }
    }

    let boundary = exercise_boundary(lattice, &exercise_layers, &masks, side);
    Ok(LatticeValuation {
        value: option[0],
        boundary,
    })
}

/// Critical node and forward exercise probability for each exercise layer.
fn exercise_boundary(
    lattice: &TrinomialLattice,
    layers: &[(usize, f64)],
    masks: &[Vec<bool>],
    side: SwaptionSide,
) -> Vec<BoundaryPoint> {
    let mut boundary = Vec::with_capacity(layers.len());
    let mut dist = vec![1.0];
    let mut step = 0;

    for ((i, t), mask) in layers.iter().zip(masks) {
        while step < *i {
            dist = lattice.propagate(step, &dist);
            step += 1;
        }

        let exercised = mask.iter().enumerate().filter(|(_, e)| **e).map(|(idx, _)| idx);
        // Receivers exercise when rates are low, payers when they are high.
        let critical = match side {
            SwaptionSide::Receiver => exercised.max(),
            SwaptionSide::Payer => exercised.min(),
        };

        let mut probability = 0.0;
        for (p, e) in dist.iter_mut().zip(mask) {
            if *e {
                probability += *p;
                *p = 0.0;
            }
        }

        boundary.push(BoundaryPoint {
            time: *t,
            short_rate: critical.map(|idx| lattice.short_rate(*i, idx)),
            state: critical.map(|idx| lattice.state(*i, idx)),
            probability,
        });
    }
    boundary
}
