//! High score record
//!
//! A single best score, stored as a JSON number under a fixed key so older
//! saves (plain integer strings) keep loading.

use crate::error::StoreError;
use crate::persistence::KeyValueStore;

/// Storage key for the best score
pub const HIGH_SCORE_KEY: &str = "heartverse-game-highscore";

/// Read the saved best score. Missing means zero.
pub fn load_high_score(store: &dyn KeyValueStore) -> Result<u64, StoreError> {
    match store.get(HIGH_SCORE_KEY)? {
        None => Ok(0),
        Some(raw) => serde_json::from_str::<u64>(raw.trim()).map_err(|_| StoreError::Corrupt {
            key: HIGH_SCORE_KEY.to_string(),
            value: raw,
        }),
    }
}

/// Save `score` if it beats the stored one. Returns whether it was written.
///
/// A corrupt stored value is overwritten.
pub fn save_if_higher(store: &mut dyn KeyValueStore, score: u64) -> Result<bool, StoreError> {
    let best = match load_high_score(store) {
        Ok(best) => best,
        Err(StoreError::Corrupt { value, .. }) => {
            log::warn!("Replacing corrupt high score {:?}", value);
            0
        }
        Err(e) => return Err(e),
    };
    if score <= best {
        return Ok(false);
    }
    let json = serde_json::to_string(&score).map_err(|e| StoreError::Write {
        key: HIGH_SCORE_KEY.to_string(),
        reason: e.to_string(),
    })?;
    store.set(HIGH_SCORE_KEY, &json)?;
    log::info!("New high score {}", score);
    Ok(true)
}
