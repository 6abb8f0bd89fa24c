//! Where the season snapshot lives between sessions.

use crate::error::ScoreError;

pub const DEFAULT_STORAGE_KEY: &str = "rotation-scorekeeper-season-v1";

/// Persistence seam for the season aggregate. Payloads are JSON documents.
pub trait SeasonStore {
    fn load(&self) -> Result<Option<String>, ScoreError>;
    fn save(&mut self, json: &str) -> Result<(), ScoreError>;
}

/// Keeps the last saved snapshot in memory
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    data: Option<String>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(json: &str) -> Self {
        Self {
            data: Some(json.to_string()),
            saves: 0,
        }
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Number of successful saves
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl SeasonStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, ScoreError> {
        Ok(self.data.clone())
    }

    fn save(&mut self, json: &str) -> Result<(), ScoreError> {
        self.data = Some(json.to_string());
        self.saves += 1;
        Ok(())
    }
}

/// Browser `localStorage` under a fixed key
#[derive(Clone, Debug)]
pub struct BrowserStore {
    key: String,
}

impl BrowserStore {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }

    fn storage(&self) -> Result<web_sys::Storage, ScoreError> {
        let window =
            web_sys::window().ok_or_else(|| ScoreError::Storage("no window".to_string()))?;
        window
            .local_storage()
            .map_err(|e| ScoreError::Storage(format!("{:?}", e)))?
            .ok_or_else(|| ScoreError::Storage("localStorage unavailable".to_string()))
    }
}

impl Default for BrowserStore {
    fn default() -> Self {
        BrowserStore::new(DEFAULT_STORAGE_KEY)
    }
}

impl SeasonStore for BrowserStore {
    fn load(&self) -> Result<Option<String>, ScoreError> {
        self.storage()?
            .get_item(&self.key)
            .map_err(|e| ScoreError::Storage(format!("{:?}", e)))
    }

    fn save(&mut self, json: &str) -> Result<(), ScoreError> {
        self.storage()?
            .set_item(&self.key, json)
            .map_err(|e| ScoreError::Storage(format!("{:?}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.save("{\"a\":1}").unwrap();
        store.save("{\"a\":2}").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("{\"a\":2}"));
        assert_eq!(store.saves(), 2);
    }
}
