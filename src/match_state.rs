use crate::types::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Score, rotation and serve state derived from the ledger
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveState {
    pub score_my: u32,
    pub score_opp: u32,
    /// Points won while serving
    pub real_score_my: u32,
    pub real_score_opp: u32,
    pub rotation: Rotation,
    pub opponent_rotation: Rotation,
    pub server: Side,
}

impl LiveState {
    /// State before the first rally of a set
    pub fn initial(config: &MatchConfig) -> Self {
        Self {
            score_my: 0,
            score_opp: 0,
            real_score_my: 0,
            real_score_opp: 0,
            rotation: config.start_rotation,
            opponent_rotation: config.opponent_start_rotation,
            server: config.start_mode.first_server(),
        }
    }

    /// Transition for one rally.
    ///
    /// The serving side keeps serve on a win. Otherwise serve passes and the
    /// side gaining it rotates one position; the side losing serve stays put.
    pub fn after(self, winner: Side) -> Self {
        let mut next = self;
        let real_point = winner == self.server;
        match winner {
            Side::Domestic => {
                next.score_my += 1;
                if real_point {
                    next.real_score_my += 1;
                }
            }
            Side::Opponent => {
                next.score_opp += 1;
                if real_point {
                    next.real_score_opp += 1;
                }
            }
        }

        if !real_point {
            next.server = winner;
            match winner {
                Side::Domestic => next.rotation = self.rotation.next(),
                Side::Opponent => next.opponent_rotation = self.opponent_rotation.next(),
            }
        }
        next
    }

    /// Fold a ledger from the configured start
    pub fn replay(config: &MatchConfig, rallies: &[Rally]) -> Self {
        rallies
            .iter()
            .fold(LiveState::initial(config), |state, rally| state.after(rally.winner))
    }
}

/// Rally ledger plus the live state of the current set
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LiveMatch {
    pub config: MatchConfig,
    rallies: Vec<Rally>,
    state: LiveState,
    next_rally_id: u32,
}

impl LiveMatch {
    pub fn new(config: MatchConfig) -> Self {
        let state = LiveState::initial(&config);
        Self {
            config,
            rallies: Vec::new(),
            state,
            next_rally_id: 1,
        }
    }

    pub fn state(&self) -> LiveState {
        self.state
    }

    pub fn rallies(&self) -> &[Rally] {
        &self.rallies
    }

    pub fn rally_count(&self) -> usize {
        self.rallies.len()
    }

    pub fn next_rally_number(&self) -> u32 {
        self.rallies.len() as u32 + 1
    }

    /// Last `config.recent_rallies` rallies, newest first
    pub fn recent_rallies(&self) -> Vec<&Rally> {
        self.rallies
            .iter()
            .rev()
            .take(self.config.recent_rallies)
            .collect()
    }

    /// Record a rally won by `winner` and advance the live state.
    ///
    /// The rally is tagged with the serve/rotation context from before the
    /// transition, which is what statistics attribute it to.
    pub fn commit_rally(&mut self, winner: Side) -> &Rally {
        let before = self.state;
        let rally = Rally {
            id: self.next_rally_id,
            sequence_number: self.next_rally_number(),
            winner,
            server_at_start: before.server,
            my_rotation_at_start: before.rotation,
            opponent_rotation_at_start: before.opponent_rotation,
            excluded_from_stats: false,
        };
        self.next_rally_id += 1;
        self.state = before.after(winner);

        debug!(
            "rally #{} won by {} (server {}, rotation {} -> {})",
            rally.sequence_number,
            winner.as_str(),
            before.server.as_str(),
            before.rotation,
            self.state.rotation
        );

        self.rallies.push(rally);
        &self.rallies[self.rallies.len() - 1]
    }

    /// Drop the last rally and rebuild the live state from what remains.
    /// Returns the removed rally; no-op on an empty ledger.
    pub fn undo_last(&mut self) -> Option<Rally> {
        let removed = self.rallies.pop()?;
        self.state = LiveState::replay(&self.config, &self.rallies);
        debug!(
            "undid rally #{}; score {}-{}",
            removed.sequence_number, self.state.score_my, self.state.score_opp
        );
        Some(removed)
    }

    /// Clear the ledger and return to the configured start
    pub fn reset_set(&mut self) {
        info!(
            "set reset after {} rallies (start rotation {}, {:?} first)",
            self.rallies.len(),
            self.config.start_rotation,
            self.config.start_mode
        );
        self.rallies.clear();
        self.state = LiveState::initial(&self.config);
    }

    /// Flip the stats exclusion of a rally. Returns the new flag, or `None`
    /// when no rally has that id.
    pub fn toggle_exclude_by_id(&mut self, id: u32) -> Option<bool> {
        let rally = self.rallies.iter_mut().find(|r| r.id == id)?;
        rally.excluded_from_stats = !rally.excluded_from_stats;
        debug!(
            "rally #{} excluded_from_stats = {}",
            rally.sequence_number, rally.excluded_from_stats
        );
        Some(rally.excluded_from_stats)
    }

    /// Mark the most recent rally as excluded from stats. Returns false on an
    /// empty ledger.
    pub fn exclude_last_for_stats(&mut self) -> bool {
        match self.rallies.last_mut() {
            Some(rally) => {
                rally.excluded_from_stats = true;
                true
            }
            None => false,
        }
    }

    /// Changes take effect immediately only before the first rally; mid-set
    /// they apply from the next reset.
    pub fn set_start_rotation(&mut self, rotation: Rotation) {
        self.config.start_rotation = rotation;
        self.sync_idle_state();
    }

    pub fn set_start_mode(&mut self, mode: StartMode) {
        self.config.start_mode = mode;
        self.sync_idle_state();
    }

    pub fn update_config(&mut self, config: MatchConfig) {
        self.config = config;
        self.sync_idle_state();
    }

    fn sync_idle_state(&mut self) {
        if self.rallies.is_empty() {
            self.state = LiveState::initial(&self.config);
        }
    }
}

impl Default for LiveMatch {
    fn default() -> Self {
        LiveMatch::new(MatchConfig::default())
    }
}
