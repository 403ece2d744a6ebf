//! Replay records
//!
//! A game is fully determined by its decks, its seed and the inputs applied.
//! `ReplayRecord` stores exactly that as JSON; feeding the inputs to a fresh
//! engine built from the same decks and seed reproduces the event log.

use crate::game::{compute_state_hash, Engine, EngineStep, GameResult, PlayerInput};
use crate::{PocketError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayRecord {
    pub seed: u64,
    /// Deck files, player 0 first
    pub decks: [String; 2],
    pub inputs: Vec<PlayerInput>,
    /// Hash of the final state, for divergence checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_hash: Option<u64>,
}

impl ReplayRecord {
    pub fn new(seed: u64, decks: [String; 2], inputs: Vec<PlayerInput>) -> Self {
        ReplayRecord {
            seed,
            decks,
            inputs,
            final_hash: None,
        }
    }

    /// Record a finished run together with its final state hash
    pub fn from_run(seed: u64, decks: [String; 2], result: &GameResult, engine: &Engine) -> Result<Self> {
        let mut record = ReplayRecord::new(seed, decks, result.inputs.clone());
        record.final_hash = Some(compute_state_hash(engine.state())?);
        Ok(record)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PocketError::SerializationError(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PocketError::SerializationError(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Feed the recorded inputs to a fresh engine
    ///
    /// The engine must be built from the recorded decks and seed. Fails if an
    /// input is rejected or the final state hash differs.
    pub fn replay(&self, engine: &mut Engine) -> Result<EngineStep> {
        let mut step = engine.start()?;
        for input in &self.inputs {
            step = engine.run_until_next(*input)?;
        }

        if let Some(expected) = self.final_hash {
            let actual = compute_state_hash(engine.state())?;
            if actual != expected {
                return Err(PocketError::InvalidAction(format!(
                    "replay diverged: final state hash {actual:016x}, recorded {expected:016x}"
                )));
            }
        }
        Ok(step)
    }
}
