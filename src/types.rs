use crate::error::ScoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which team an outcome belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The team being scouted (ours)
    #[serde(rename = "my")]
    Domestic,
    #[serde(rename = "opp")]
    Opponent,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Domestic => Side::Opponent,
            Side::Opponent => Side::Domestic,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Domestic => "my",
            Side::Opponent => "opp",
        }
    }
}

impl FromStr for Side {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "my" => Ok(Side::Domestic),
            "opp" => Ok(Side::Opponent),
            other => Err(ScoreError::InvalidSide(other.to_string())),
        }
    }
}

/// One of the six lineup positions a team cycles through (1..=6)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rotation(u8);

impl Rotation {
    pub const ALL: [Rotation; 6] = [
        Rotation(1),
        Rotation(2),
        Rotation(3),
        Rotation(4),
        Rotation(5),
        Rotation(6),
    ];

    pub fn new(n: u8) -> Result<Self, ScoreError> {
        if !(1..=6).contains(&n) {
            return Err(ScoreError::InvalidRotation(n));
        }
        Ok(Rotation(n))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Zero-based slot for per-rotation arrays
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// Position after one rotation step (6 wraps to 1)
    pub fn next(self) -> Rotation {
        Rotation(self.0 % 6 + 1)
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Rotation(1)
    }
}

impl TryFrom<u8> for Rotation {
    type Error = ScoreError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Rotation::new(n)
    }
}

impl From<Rotation> for u8 {
    fn from(r: Rotation) -> u8 {
        r.0
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the domestic team enters a set
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartMode {
    Serve,
    Receive,
}

impl StartMode {
    /// Side holding serve for the first rally
    pub fn first_server(self) -> Side {
        match self {
            StartMode::Serve => Side::Domestic,
            StartMode::Receive => Side::Opponent,
        }
    }
}

impl Default for StartMode {
    fn default() -> Self {
        StartMode::Receive
    }
}

impl FromStr for StartMode {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "serve" => Ok(StartMode::Serve),
            "receive" => Ok(StartMode::Receive),
            other => Err(ScoreError::InvalidMode(other.to_string())),
        }
    }
}

/// Set-length regime. Seasons keep separate averages per regime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum SetTarget {
    TwentyFive,
    Fifteen,
}

impl SetTarget {
    pub fn points(self) -> u16 {
        match self {
            SetTarget::TwentyFive => 25,
            SetTarget::Fifteen => 15,
        }
    }
}

impl TryFrom<u16> for SetTarget {
    type Error = ScoreError;

    fn try_from(points: u16) -> Result<Self, Self::Error> {
        match points {
            25 => Ok(SetTarget::TwentyFive),
            15 => Ok(SetTarget::Fifteen),
            other => Err(ScoreError::InvalidTarget(other)),
        }
    }
}

impl From<SetTarget> for u16 {
    fn from(t: SetTarget) -> u16 {
        t.points()
    }
}

/// One completed rally, tagged with the context in force when it started.
///
/// Only `excluded_from_stats` may change after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rally {
    /// Stable handle for exclusion toggling; never reused within a match
    pub id: u32,
    /// 1-based position in the ledger
    pub sequence_number: u32,
    pub winner: Side,
    pub server_at_start: Side,
    pub my_rotation_at_start: Rotation,
    pub opponent_rotation_at_start: Rotation,
    #[serde(default)]
    pub excluded_from_stats: bool,
}

impl Rally {
    /// Point won by the side that was serving
    pub fn is_real_point(&self) -> bool {
        self.winner == self.server_at_start
    }

    pub fn domestic_served(&self) -> bool {
        self.server_at_start == Side::Domestic
    }
}

/// Starting configuration for a set
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Domestic team's rotation for the first rally
    pub start_rotation: Rotation,
    pub start_mode: StartMode,
    pub opponent_start_rotation: Rotation,
    /// Length of the recent-rally feed
    pub recent_rallies: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            start_rotation: Rotation::default(),
            start_mode: StartMode::Receive,
            opponent_start_rotation: Rotation::default(),
            recent_rallies: 6,
        }
    }
}
