use crate::stats::RotationRates;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Best starting rotation and its projected total
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StartRecommendation {
    pub rotation: Rotation,
    pub total: f64,
}

/// How often each rotation occurs in a projected set: `laps` full cycles,
/// then `extras` more positions continuing from 1.
pub fn projected_visits(laps: u32, extras: u32) -> [u64; 6] {
    let tail_laps = (extras / 6) as u64;
    let tail_rest = (extras % 6) as usize;
    let mut visits = [laps as u64 + tail_laps; 6];
    for v in visits.iter_mut().take(tail_rest) {
        *v += 1;
    }
    visits
}

/// Projected score when starting the set in `start`.
///
/// The projected sequence is rotated to begin at the first occurrence of
/// `start`, or left beginning at rotation 1 if `start` never occurs. The
/// opening rotation only plays the phase the start mode dictates; every
/// later rotation contributes PS + SO. Rotating the sequence keeps its
/// visit counts, so the total is computed from counts alone.
pub fn score_for(
    rates: &RotationRates,
    start: Rotation,
    mode: StartMode,
    laps: u32,
    extras: u32,
) -> f64 {
    let visits = projected_visits(laps, extras);
    let opening = if visits[start.index()] > 0 {
        start
    } else if visits[0] > 0 {
        Rotation::default()
    } else {
        return 0.0;
    };

    let full: f64 = Rotation::ALL
        .iter()
        .map(|&r| visits[r.index()] as f64 * (rates.ps_at(r) + rates.so_at(r)))
        .sum();
    // The opening entry skips the phase it does not play
    let skipped = match mode {
        StartMode::Receive => rates.ps_at(opening),
        StartMode::Serve => rates.so_at(opening),
    };
    full - skipped
}

/// Projected totals for starting in rotations 1 through 6
pub fn rank_starts(rates: &RotationRates, mode: StartMode, laps: u32, extras: u32) -> [f64; 6] {
    Rotation::ALL.map(|r| score_for(rates, r, mode, laps, extras))
}

/// Strictly greatest projected total; ties keep the lower rotation
pub fn best_start(
    rates: &RotationRates,
    mode: StartMode,
    laps: u32,
    extras: u32,
) -> StartRecommendation {
    let totals = rank_starts(rates, mode, laps, extras);
    let mut best = StartRecommendation {
        rotation: Rotation::default(),
        total: f64::NEG_INFINITY,
    };
    for (rotation, total) in Rotation::ALL.into_iter().zip(totals) {
        if total > best.total {
            best = StartRecommendation { rotation, total };
        }
    }
    best
}
