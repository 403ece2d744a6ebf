//! Deterministic state hashing for replay divergence checks
//!
//! Serializes the game state to JSON, strips presentation-only fields, then
//! hashes the canonical string. Two states with the same gameplay-relevant
//! content produce the same hash.

use crate::game::GameState;
use crate::{PocketError, Result};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Fields that never affect gameplay
const EXCLUDED_FIELDS: &[&str] = &["logger"];

/// Compute a deterministic hash of the game state
pub fn compute_state_hash(game: &GameState) -> Result<u64> {
    let value = serde_json::to_value(game).map_err(|e| PocketError::SerializationError(e.to_string()))?;
    let canonical = serde_json::to_string(&strip_metadata(value))
        .map_err(|e| PocketError::SerializationError(e.to_string()))?;

    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    Ok(hasher.finish())
}

/// Recursively strip excluded fields from a JSON value
fn strip_metadata(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .filter(|(k, _)| !EXCLUDED_FIELDS.contains(&k.as_str()))
                .map(|(k, v)| (k, strip_metadata(v)))
                .collect(),
        ),
        serde_json::Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(strip_metadata).collect()),
        other => other,
    }
}

/// Format a hash for display (first 8 hex digits)
pub fn format_hash(hash: u64) -> String {
    format!("{:08x}", (hash >> 32) as u32)
}
