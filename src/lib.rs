//! Volleyball rally scorekeeping and rotation analytics.
//!
//! The live set is a rally ledger folded through the sideout/rotation rule
//! (`match_state`). Per-rotation PS%/SO% come from the ledger on demand
//! (`stats`), finished sets are banked into season averages (`season`), and
//! the averages rank starting rotations for the next set (`recommender`).
//!
//! `ScorekeeperEngine` is the browser-facing wrapper; it speaks JSON strings.

pub mod error;
pub mod logging;
pub mod match_state;
pub mod recommender;
pub mod season;
pub mod stats;
pub mod storage;
pub mod types;

pub use error::ScoreError;
pub use match_state::{LiveMatch, LiveState};
pub use recommender::StartRecommendation;
pub use season::{LapsExtras, Season, SeasonBank, SeasonSnapshot};
pub use stats::{compute_statistics, summarize_set, RotationRates, RotationStatistics, SetSummary};
pub use storage::{BrowserStore, MemoryStore, SeasonStore};
pub use types::*;

use serde::Serialize;
use storage::DEFAULT_STORAGE_KEY;
use wasm_bindgen::prelude::*;

/// Initialize panic hook and the tracing subscriber
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(logging::default_level());
}

fn js_err(e: ScoreError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_target(points: u16) -> Result<SetTarget, JsValue> {
    SetTarget::try_from(points).map_err(js_err)
}

fn parse_mode(mode: &str) -> Result<StartMode, JsValue> {
    mode.parse::<StartMode>().map_err(js_err)
}

fn parse_rotation(n: u8) -> Result<Rotation, JsValue> {
    Rotation::new(n).map_err(js_err)
}

/// Live view handed to the scoreboard
#[derive(Serialize)]
struct MatchView {
    #[serde(flatten)]
    state: LiveState,
    rally_count: usize,
    next_rally_number: u32,
}

/// WASM-exposed scorekeeper: the live set plus the persisted season
#[wasm_bindgen]
pub struct ScorekeeperEngine {
    live: LiveMatch,
    season: Season<BrowserStore>,
}

#[wasm_bindgen]
impl ScorekeeperEngine {
    /// Create with default config and the default season storage key
    #[wasm_bindgen(constructor)]
    pub fn new() -> ScorekeeperEngine {
        ScorekeeperEngine {
            live: LiveMatch::default(),
            season: Season::load(BrowserStore::new(DEFAULT_STORAGE_KEY)),
        }
    }

    /// Create with custom config
    pub fn new_with_config(config_json: &str) -> Result<ScorekeeperEngine, JsValue> {
        let config: MatchConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Config parse error: {}", e)))?;
        Ok(ScorekeeperEngine {
            live: LiveMatch::new(config),
            season: Season::load(BrowserStore::new(DEFAULT_STORAGE_KEY)),
        })
    }

    /// Create with default config, keeping the season under `key`
    pub fn with_storage_key(key: &str) -> ScorekeeperEngine {
        ScorekeeperEngine {
            live: LiveMatch::default(),
            season: Season::load(BrowserStore::new(key)),
        }
    }

    /// Get default config as JSON
    pub fn get_default_config() -> String {
        serde_json::to_string(&MatchConfig::default()).unwrap_or_default()
    }

    pub fn get_config(&self) -> String {
        serde_json::to_string(&self.live.config).unwrap_or_default()
    }

    /// Replace the match config (applies to live state only before the first rally)
    pub fn update_config(&mut self, config_json: &str) -> Result<(), JsValue> {
        let config: MatchConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Config parse error: {}", e)))?;
        self.live.update_config(config);
        Ok(())
    }

    pub fn set_start_rotation(&mut self, rotation: u8) -> Result<(), JsValue> {
        self.live.set_start_rotation(parse_rotation(rotation)?);
        Ok(())
    }

    /// `mode` is "serve" or "receive"
    pub fn set_start_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        self.live.set_start_mode(parse_mode(mode)?);
        Ok(())
    }

    // ---- live set ----

    /// Record a rally; `winner` is "my" or "opp"
    pub fn commit_rally(&mut self, winner: &str) -> Result<(), JsValue> {
        let winner = winner.parse::<Side>().map_err(js_err)?;
        self.live.commit_rally(winner);
        Ok(())
    }

    /// Returns false when there was nothing to undo
    pub fn undo_last(&mut self) -> bool {
        self.live.undo_last().is_some()
    }

    pub fn reset_set(&mut self) {
        self.live.reset_set();
    }

    pub fn exclude_last_for_stats(&mut self) -> bool {
        self.live.exclude_last_for_stats()
    }

    /// New exclusion flag, or undefined for an unknown id
    pub fn toggle_exclude_by_id(&mut self, id: u32) -> Option<bool> {
        self.live.toggle_exclude_by_id(id)
    }

    /// Score, real score, rotations and server as JSON
    pub fn get_state(&self) -> String {
        let view = MatchView {
            state: self.live.state(),
            rally_count: self.live.rally_count(),
            next_rally_number: self.live.next_rally_number(),
        };
        serde_json::to_string(&view).unwrap_or_default()
    }

    pub fn get_rallies(&self) -> String {
        serde_json::to_string(self.live.rallies()).unwrap_or_default()
    }

    /// Newest first
    pub fn get_recent_rallies(&self) -> String {
        serde_json::to_string(&self.live.recent_rallies()).unwrap_or_default()
    }

    /// Per-rotation statistics for the current ledger
    pub fn get_statistics(&self) -> String {
        serde_json::to_string(&compute_statistics(self.live.rallies())).unwrap_or_default()
    }

    pub fn summarize_set(&self, target: u16) -> Result<String, JsValue> {
        let summary = summarize_set(parse_target(target)?, self.live.rallies());
        serde_json::to_string(&summary).map_err(|e| js_err(e.into()))
    }

    // ---- season ----

    /// Summarize the live ledger and bank it
    pub fn add_current_set(&mut self, target: u16) -> Result<(), JsValue> {
        let summary = summarize_set(parse_target(target)?, self.live.rallies());
        self.season.add_set(&summary).map_err(js_err)
    }

    /// Bank a hand-entered summary; rates must be within [0, 1] and extras below 6
    pub fn add_set(&mut self, summary_json: &str) -> Result<(), JsValue> {
        let summary: SetSummary = serde_json::from_str(summary_json)
            .map_err(|e| JsValue::from_str(&format!("Summary parse error: {}", e)))?;
        self.season.add_set(&summary).map_err(js_err)
    }

    pub fn clear_season(&mut self) -> Result<(), JsValue> {
        self.season.clear_season().map_err(js_err)
    }

    /// Both regime banks as JSON
    pub fn get_season(&self) -> String {
        serde_json::to_string(self.season.snapshot()).unwrap_or_default()
    }

    pub fn get_averages(&self, target: u16) -> Result<String, JsValue> {
        let averages = self.season.averages(parse_target(target)?);
        serde_json::to_string(&averages).map_err(|e| js_err(e.into()))
    }

    pub fn get_avg_laps_extras(&self, target: u16) -> Result<String, JsValue> {
        let le = self.season.avg_laps_extras(parse_target(target)?);
        serde_json::to_string(&le).map_err(|e| js_err(e.into()))
    }

    // ---- recommendation ----

    pub fn score_for(
        &self,
        target: u16,
        start: u8,
        mode: &str,
        laps: u32,
        extras: u32,
    ) -> Result<f64, JsValue> {
        Ok(self.season.score_for(
            parse_target(target)?,
            parse_rotation(start)?,
            parse_mode(mode)?,
            laps,
            extras,
        ))
    }

    /// Projected totals for starts 1..=6 as a JSON array
    pub fn rank_starts(&self, target: u16, mode: &str, laps: u32, extras: u32) -> Result<String, JsValue> {
        let totals = self
            .season
            .rank_starts(parse_target(target)?, parse_mode(mode)?, laps, extras);
        serde_json::to_string(&totals).map_err(|e| js_err(e.into()))
    }

    /// `{ "rotation": n, "total": x }`
    pub fn best_start(&self, target: u16, mode: &str, laps: u32, extras: u32) -> Result<String, JsValue> {
        let best = self
            .season
            .best_start(parse_target(target)?, parse_mode(mode)?, laps, extras);
        serde_json::to_string(&best).map_err(|e| js_err(e.into()))
    }
}

impl Default for ScorekeeperEngine {
    fn default() -> Self {
        ScorekeeperEngine::new()
    }
}

/// Statistics for an arbitrary rally ledger (JSON array of rallies)
#[wasm_bindgen]
pub fn compute_statistics_json(rallies_json: &str) -> Result<String, JsValue> {
    let rallies: Vec<Rally> = serde_json::from_str(rallies_json)
        .map_err(|e| JsValue::from_str(&format!("Rallies parse error: {}", e)))?;
    serde_json::to_string(&compute_statistics(&rallies)).map_err(|e| js_err(e.into()))
}
