//! Engine configuration

use serde::{Deserialize, Serialize};

/// Rule constants for one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Points needed to win
    pub win_points: u32,
    pub bench_size: usize,
    pub opening_hand_size: usize,
    /// Extra damage when the defender is weak to the attack's type
    pub weakness_bonus: u32,
    /// Damage reduction when the defender resists the attack's type
    pub resistance_reduction: u32,
    /// Points for knocking out a Pokémon
    pub points_per_knockout: u32,
    /// Safety limit; the game ends without a winner past this turn
    pub max_turns: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            win_points: 3,
            bench_size: 3,
            opening_hand_size: 5,
            weakness_bonus: 20,
            resistance_reduction: 20,
            points_per_knockout: 1,
            max_turns: 200,
        }
    }
}

impl EngineConfig {
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }
}
