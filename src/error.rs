use thiserror::Error;

/// Errors raised at the engine boundary.
///
/// The scoring and statistics operations themselves never fail; these cover
/// malformed caller input, JSON payloads and season persistence.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    #[error("invalid side: {0:?} (expected \"my\" or \"opp\")")]
    InvalidSide(String),

    #[error("invalid rotation: {0} (expected 1-6)")]
    InvalidRotation(u8),

    #[error("invalid set target: {0} (expected 25 or 15)")]
    InvalidTarget(u16),

    #[error("invalid start mode: {0:?} (expected \"serve\" or \"receive\")")]
    InvalidMode(String),

    #[error("invalid {kind} rate for rotation {rotation}: {value}")]
    InvalidRate {
        kind: &'static str,
        rotation: u8,
        value: f64,
    },

    #[error("invalid set summary: {0}")]
    InvalidSummary(String),

    #[error("json error: {0}")]
    Json(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for ScoreError {
    fn from(e: serde_json::Error) -> Self {
        ScoreError::Json(e.to_string())
    }
}

/// Rates fed into the season must be probabilities.
pub fn validate_rate(kind: &'static str, rotation: u8, value: f64) -> Result<(), ScoreError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ScoreError::InvalidRate {
            kind,
            rotation,
            value,
        });
    }
    Ok(())
}
