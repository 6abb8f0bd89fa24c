//! Per-rotation serve/receive statistics derived from a rally ledger.

use crate::error::{validate_rate, ScoreError};
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Counts and rates for one rotation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotationLine {
    pub rotation: Rotation,
    pub serves: u32,
    /// Points won while serving from this rotation
    pub real_points: u32,
    pub receives: u32,
    pub sideouts: u32,
    /// real_points / serves
    pub ps_rate: f64,
    /// sideouts / receives
    pub so_rate: f64,
    pub ps_plus_so: f64,
    /// PS% + SO% of at least 1.0 means the rotation wins more than it gives away
    pub winning: bool,
}

impl RotationLine {
    fn empty(rotation: Rotation) -> Self {
        Self {
            rotation,
            serves: 0,
            real_points: 0,
            receives: 0,
            sideouts: 0,
            ps_rate: 0.0,
            so_rate: 0.0,
            ps_plus_so: 0.0,
            winning: false,
        }
    }

    fn finish(&mut self) {
        self.ps_rate = ratio(self.real_points, self.serves);
        self.so_rate = ratio(self.sideouts, self.receives);
        self.ps_plus_so = self.ps_rate + self.so_rate;
        self.winning = self.ps_plus_so >= 1.0;
    }
}

fn ratio(num: u32, den: u32) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// PS and SO rate per rotation, indexed by `Rotation::index`
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RotationRates {
    pub ps: [f64; 6],
    pub so: [f64; 6],
}

impl RotationRates {
    pub fn uniform(ps: f64, so: f64) -> Self {
        Self {
            ps: [ps; 6],
            so: [so; 6],
        }
    }

    pub fn ps_at(&self, rotation: Rotation) -> f64 {
        self.ps[rotation.index()]
    }

    pub fn so_at(&self, rotation: Rotation) -> f64 {
        self.so[rotation.index()]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotationStatistics {
    pub lines: [RotationLine; 6],
    /// Rallies that contributed (not excluded)
    pub counted_rallies: u32,
    pub laps: u32,
    pub extras: u32,
}

impl RotationStatistics {
    pub fn line(&self, rotation: Rotation) -> &RotationLine {
        &self.lines[rotation.index()]
    }

    pub fn rates(&self) -> RotationRates {
        let mut rates = RotationRates::default();
        for line in &self.lines {
            let i = line.rotation.index();
            rates.ps[i] = line.ps_rate;
            rates.so[i] = line.so_rate;
        }
        rates
    }
}

/// Bucket every counted rally by the domestic rotation it started in.
///
/// Excluded rallies are skipped entirely. Empty buckets report rate 0.
pub fn compute_statistics(rallies: &[Rally]) -> RotationStatistics {
    let mut lines = Rotation::ALL.map(RotationLine::empty);
    let mut counted = 0;

    for rally in rallies.iter().filter(|r| !r.excluded_from_stats) {
        counted += 1;
        let line = &mut lines[rally.my_rotation_at_start.index()];
        let won = rally.winner == Side::Domestic;
        if rally.domestic_served() {
            line.serves += 1;
            if won {
                line.real_points += 1;
            }
        } else {
            line.receives += 1;
            if won {
                line.sideouts += 1;
            }
        }
    }

    for line in lines.iter_mut() {
        line.finish();
    }

    let (laps, extras) = laps_and_extras(rallies);
    RotationStatistics {
        lines,
        counted_rallies: counted,
        laps,
        extras,
    }
}

/// Rotation stints: maximal runs of counted rallies sharing the same domestic
/// rotation. Display-only approximation of how far the lineup travelled.
pub fn rotation_stints(rallies: &[Rally]) -> u32 {
    let mut stints = 0;
    let mut current: Option<Rotation> = None;
    for rally in rallies.iter().filter(|r| !r.excluded_from_stats) {
        if current != Some(rally.my_rotation_at_start) {
            stints += 1;
            current = Some(rally.my_rotation_at_start);
        }
    }
    stints
}

/// (full 6-rotation cycles, remaining positions)
pub fn laps_and_extras(rallies: &[Rally]) -> (u32, u32) {
    let stints = rotation_stints(rallies);
    (stints / 6, stints % 6)
}

/// Snapshot of one finished set, the unit the season aggregates
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetSummary {
    pub target: SetTarget,
    pub laps: u32,
    pub extras: u32,
    pub ps: [f64; 6],
    pub so: [f64; 6],
}

impl SetSummary {
    /// Rates must be probabilities and extras a remainder of whole laps
    pub fn validate(&self) -> Result<(), ScoreError> {
        if self.extras >= 6 {
            return Err(ScoreError::InvalidSummary(format!(
                "extras must be below 6, got {}",
                self.extras
            )));
        }
        for rotation in Rotation::ALL {
            validate_rate("ps", rotation.number(), self.ps[rotation.index()])?;
            validate_rate("so", rotation.number(), self.so[rotation.index()])?;
        }
        Ok(())
    }

    pub fn rates(&self) -> RotationRates {
        RotationRates {
            ps: self.ps,
            so: self.so,
        }
    }
}

pub fn summarize_set(target: SetTarget, rallies: &[Rally]) -> SetSummary {
    let stats = compute_statistics(rallies);
    let rates = stats.rates();
    SetSummary {
        target,
        laps: stats.laps,
        extras: stats.extras,
        ps: rates.ps,
        so: rates.so,
    }
}
