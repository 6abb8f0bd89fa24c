use crate::error::ScoreError;
use crate::recommender::{self, StartRecommendation};
use crate::stats::{RotationRates, SetSummary};
use crate::storage::SeasonStore;
use crate::types::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Projection used before any set of a regime has been banked
pub const DEFAULT_LAPS: u32 = 2;
pub const DEFAULT_EXTRAS: u32 = 0;

/// Running per-rotation sums for one set-length regime.
///
/// Averages are means of per-set rates: every set weighs the same no matter
/// how many rallies it had.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonBank {
    /// Overwritten on load by the bank it is stored under
    #[serde(default = "default_target")]
    pub target: SetTarget,
    #[serde(default)]
    pub ps_sum: [f64; 6],
    #[serde(default)]
    pub so_sum: [f64; 6],
    #[serde(default)]
    pub ps_n: [u32; 6],
    #[serde(default)]
    pub so_n: [u32; 6],
    #[serde(default)]
    pub sets: u32,
    #[serde(default)]
    pub laps_list: Vec<u32>,
    #[serde(default)]
    pub extras_list: Vec<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapsExtras {
    pub laps: u32,
    pub extras: u32,
}

impl SeasonBank {
    pub fn empty(target: SetTarget) -> Self {
        Self {
            target,
            ps_sum: [0.0; 6],
            so_sum: [0.0; 6],
            ps_n: [0; 6],
            so_n: [0; 6],
            sets: 0,
            laps_list: Vec::new(),
            extras_list: Vec::new(),
        }
    }

    fn add(&mut self, summary: &SetSummary) {
        for i in 0..6 {
            self.ps_sum[i] += summary.ps[i];
            self.ps_n[i] += 1;
            self.so_sum[i] += summary.so[i];
            self.so_n[i] += 1;
        }
        self.sets += 1;
        self.laps_list.push(summary.laps);
        self.extras_list.push(summary.extras);
    }

    pub fn averages(&self) -> RotationRates {
        let mut rates = RotationRates::default();
        for i in 0..6 {
            rates.ps[i] = mean(self.ps_sum[i], self.ps_n[i]);
            rates.so[i] = mean(self.so_sum[i], self.so_n[i]);
        }
        rates
    }

    /// Rounded mean laps (at least 1) and extras across banked sets
    pub fn avg_laps_extras(&self) -> LapsExtras {
        let laps = if self.laps_list.is_empty() {
            DEFAULT_LAPS as f64
        } else {
            list_mean(&self.laps_list)
        };
        let extras = if self.extras_list.is_empty() {
            DEFAULT_EXTRAS
        } else {
            list_mean(&self.extras_list).round() as u32
        };
        LapsExtras {
            laps: (laps.round() as u32).max(1),
            extras,
        }
    }
}

fn default_target() -> SetTarget {
    SetTarget::TwentyFive
}

fn mean(sum: f64, n: u32) -> f64 {
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn list_mean(values: &[u32]) -> f64 {
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

/// Both regimes, as persisted
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonSnapshot {
    #[serde(default = "empty_bank25")]
    pub bank25: SeasonBank,
    #[serde(default = "empty_bank15")]
    pub bank15: SeasonBank,
}

fn empty_bank25() -> SeasonBank {
    SeasonBank::empty(SetTarget::TwentyFive)
}

fn empty_bank15() -> SeasonBank {
    SeasonBank::empty(SetTarget::Fifteen)
}

impl Default for SeasonSnapshot {
    fn default() -> Self {
        Self {
            bank25: empty_bank25(),
            bank15: empty_bank15(),
        }
    }
}

impl SeasonSnapshot {
    pub fn bank(&self, target: SetTarget) -> &SeasonBank {
        match target {
            SetTarget::TwentyFive => &self.bank25,
            SetTarget::Fifteen => &self.bank15,
        }
    }

    fn bank_mut(&mut self, target: SetTarget) -> &mut SeasonBank {
        match target {
            SetTarget::TwentyFive => &mut self.bank25,
            SetTarget::Fifteen => &mut self.bank15,
        }
    }
}

/// Season aggregator, persisted through `store` after every change
pub struct Season<S: SeasonStore> {
    snapshot: SeasonSnapshot,
    store: S,
}

impl<S: SeasonStore> Season<S> {
    /// Restore from the store. Anything unreadable starts an empty season.
    pub fn load(store: S) -> Self {
        let snapshot = match store.load() {
            Ok(Some(raw)) => match serde_json::from_str::<SeasonSnapshot>(&raw) {
                Ok(mut snapshot) => {
                    // Bank keys are authoritative over the embedded target
                    snapshot.bank25.target = SetTarget::TwentyFive;
                    snapshot.bank15.target = SetTarget::Fifteen;
                    snapshot
                }
                Err(e) => {
                    warn!("discarding unreadable season snapshot: {}", e);
                    SeasonSnapshot::default()
                }
            },
            Ok(None) => SeasonSnapshot::default(),
            Err(e) => {
                warn!("season store unavailable, starting empty: {}", e);
                SeasonSnapshot::default()
            }
        };
        Self { snapshot, store }
    }

    pub fn snapshot(&self) -> &SeasonSnapshot {
        &self.snapshot
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn bank(&self, target: SetTarget) -> &SeasonBank {
        self.snapshot.bank(target)
    }

    /// Bank a finished set into its regime, then persist.
    ///
    /// Invalid summaries are rejected untouched. Once accepted, the in-memory
    /// season is updated even when saving fails.
    pub fn add_set(&mut self, summary: &SetSummary) -> Result<(), ScoreError> {
        summary.validate()?;
        let bank = self.snapshot.bank_mut(summary.target);
        bank.add(summary);
        info!(
            "banked {}-point set #{} (laps {}, extras {})",
            summary.target.points(),
            bank.sets,
            summary.laps,
            summary.extras
        );
        self.persist()
    }

    /// Empty both regimes, then persist
    pub fn clear_season(&mut self) -> Result<(), ScoreError> {
        self.snapshot = SeasonSnapshot::default();
        info!("season cleared");
        self.persist()
    }

    pub fn averages(&self, target: SetTarget) -> RotationRates {
        self.bank(target).averages()
    }

    pub fn avg_laps_extras(&self, target: SetTarget) -> LapsExtras {
        self.bank(target).avg_laps_extras()
    }

    pub fn score_for(
        &self,
        target: SetTarget,
        start: Rotation,
        mode: StartMode,
        laps: u32,
        extras: u32,
    ) -> f64 {
        recommender::score_for(&self.averages(target), start, mode, laps, extras)
    }

    pub fn rank_starts(&self, target: SetTarget, mode: StartMode, laps: u32, extras: u32) -> [f64; 6] {
        recommender::rank_starts(&self.averages(target), mode, laps, extras)
    }

    pub fn best_start(
        &self,
        target: SetTarget,
        mode: StartMode,
        laps: u32,
        extras: u32,
    ) -> StartRecommendation {
        recommender::best_start(&self.averages(target), mode, laps, extras)
    }

    fn persist(&mut self) -> Result<(), ScoreError> {
        let json = serde_json::to_string(&self.snapshot)?;
        self.store.save(&json).map_err(|e| {
            warn!("failed to persist season: {}", e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn summary(target: SetTarget, ps: [f64; 6], so: [f64; 6], laps: u32, extras: u32) -> SetSummary {
        SetSummary {
            target,
            laps,
            extras,
            ps,
            so,
        }
    }

    struct FailingStore;

    impl SeasonStore for FailingStore {
        fn load(&self) -> Result<Option<String>, ScoreError> {
            Err(ScoreError::Storage("offline".to_string()))
        }

        fn save(&mut self, _json: &str) -> Result<(), ScoreError> {
            Err(ScoreError::Storage("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_mean_of_rates_not_pooled() {
        let mut season = Season::load(MemoryStore::new());
        season
            .add_set(&summary(SetTarget::TwentyFive, [0.5, 0.0, 0.0, 0.0, 0.0, 0.0], [0.0; 6], 2, 0))
            .unwrap();
        season
            .add_set(&summary(SetTarget::TwentyFive, [1.0, 0.0, 0.0, 0.0, 0.0, 0.0], [0.0; 6], 2, 0))
            .unwrap();
        assert_eq!(season.averages(SetTarget::TwentyFive).ps[0], 0.75);
    }

    #[test]
    fn test_two_sets_average_per_rotation() {
        let mut season = Season::load(MemoryStore::new());
        season
            .add_set(&summary(SetTarget::TwentyFive, [1.0, 0.0, 0.0, 0.0, 0.0, 0.0], [0.0; 6], 2, 1))
            .unwrap();
        season
            .add_set(&summary(SetTarget::TwentyFive, [0.0, 1.0, 0.0, 0.0, 0.0, 0.0], [0.0; 6], 2, 1))
            .unwrap();

        let avg = season.averages(SetTarget::TwentyFive);
        assert_eq!(avg.ps, [0.5, 0.5, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(season.bank(SetTarget::TwentyFive).sets, 2);
        // The other regime is untouched
        assert_eq!(season.bank(SetTarget::Fifteen).sets, 0);
        assert_eq!(season.averages(SetTarget::Fifteen), RotationRates::default());
    }

    #[test]
    fn test_avg_laps_extras_defaults_and_rounding() {
        let mut season = Season::load(MemoryStore::new());
        assert_eq!(
            season.avg_laps_extras(SetTarget::Fifteen),
            LapsExtras { laps: 2, extras: 0 }
        );

        season.add_set(&summary(SetTarget::Fifteen, [0.0; 6], [0.0; 6], 0, 3)).unwrap();
        season.add_set(&summary(SetTarget::Fifteen, [0.0; 6], [0.0; 6], 0, 4)).unwrap();
        // Mean laps 0 floors to 1; mean extras 3.5 rounds up
        assert_eq!(
            season.avg_laps_extras(SetTarget::Fifteen),
            LapsExtras { laps: 1, extras: 4 }
        );

        season.add_set(&summary(SetTarget::TwentyFive, [0.0; 6], [0.0; 6], 3, 1)).unwrap();
        season.add_set(&summary(SetTarget::TwentyFive, [0.0; 6], [0.0; 6], 2, 2)).unwrap();
        assert_eq!(
            season.avg_laps_extras(SetTarget::TwentyFive),
            LapsExtras { laps: 3, extras: 2 }
        );
    }

    #[test]
    fn test_every_change_is_persisted_and_reloads() {
        let mut season = Season::load(MemoryStore::new());
        season
            .add_set(&summary(SetTarget::Fifteen, [0.25; 6], [0.75; 6], 1, 5))
            .unwrap();
        assert_eq!(season.store().saves(), 1);

        let raw = season.store().data().unwrap().to_string();
        let restored = Season::load(MemoryStore::with_data(&raw));
        assert_eq!(restored.snapshot(), season.snapshot());
        assert_eq!(restored.averages(SetTarget::Fifteen).so, [0.75; 6]);

        season.clear_season().unwrap();
        assert_eq!(season.store().saves(), 2);
        assert_eq!(season.snapshot(), &SeasonSnapshot::default());
    }

    #[test]
    fn test_load_fills_missing_fields() {
        let raw = r#"{"bank25": {"sets": 3, "laps_list": [2, 2, 2]}, "bank15": {"target": 25}}"#;
        let season = Season::load(MemoryStore::with_data(raw));
        assert_eq!(season.bank(SetTarget::TwentyFive).sets, 3);
        assert_eq!(season.bank(SetTarget::TwentyFive).ps_n, [0; 6]);
        assert_eq!(season.bank(SetTarget::TwentyFive).target, SetTarget::TwentyFive);
        assert_eq!(season.bank(SetTarget::Fifteen), &SeasonBank::empty(SetTarget::Fifteen));
    }

    #[test]
    fn test_load_discards_garbage() {
        let season = Season::load(MemoryStore::with_data("{not json"));
        assert_eq!(season.snapshot(), &SeasonSnapshot::default());

        let season = Season::load(FailingStore);
        assert_eq!(season.snapshot(), &SeasonSnapshot::default());
    }

    #[test]
    fn test_add_set_rejects_out_of_range_rates() {
        let mut season = Season::load(MemoryStore::new());
        let mut ps = [0.5; 6];
        ps[2] = 1.5;
        let result = season.add_set(&summary(SetTarget::TwentyFive, ps, [0.5; 6], 2, 0));
        assert!(matches!(result, Err(ScoreError::InvalidRate { rotation: 3, .. })));
        assert_eq!(season.bank(SetTarget::TwentyFive).sets, 0);
        assert_eq!(season.store().saves(), 0);

        let result = season.add_set(&summary(SetTarget::Fifteen, [0.5; 6], [0.5; 6], 1, 9));
        assert!(matches!(result, Err(ScoreError::InvalidSummary(_))));
        assert_eq!(season.bank(SetTarget::Fifteen).sets, 0);
    }

    #[test]
    fn test_failed_save_keeps_in_memory_update() {
        let mut season = Season::load(FailingStore);
        let result = season.add_set(&summary(SetTarget::TwentyFive, [1.0; 6], [1.0; 6], 2, 0));
        assert!(matches!(result, Err(ScoreError::Storage(_))));
        assert_eq!(season.bank(SetTarget::TwentyFive).sets, 1);
    }

    #[test]
    fn test_recommendation_from_season_averages() {
        let mut season = Season::load(MemoryStore::new());
        season
            .add_set(&summary(SetTarget::TwentyFive, [0.5; 6], [0.5; 6], 1, 0))
            .unwrap();
        let total = season.score_for(SetTarget::TwentyFive, Rotation::ALL[2], StartMode::Serve, 1, 0);
        assert!((total - 5.5).abs() < 1e-12);

        let best = season.best_start(SetTarget::TwentyFive, StartMode::Serve, 1, 0);
        assert_eq!(best.rotation, Rotation::ALL[0]);
        for total in season.rank_starts(SetTarget::TwentyFive, StartMode::Serve, 1, 0) {
            assert!(best.total >= total);
        }
    }
}
