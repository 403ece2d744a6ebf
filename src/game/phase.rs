//! Game phases

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phases of a game, in the order the engine driver visits them
///
/// `Main` and `BetweenTurns` alternate until the game ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    DealCards,
    TurnOrder,
    SetupPlaceActive,
    SetupPlaceBench,
    Main,
    BetweenTurns,
    GameEnd,
}

impl Phase {
    /// Both players act during these phases, in any order
    pub fn is_simultaneous(&self) -> bool {
        matches!(self, Phase::SetupPlaceActive | Phase::SetupPlaceBench)
    }

    /// Setup phases happen once, before turn 1
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            Phase::DealCards | Phase::TurnOrder | Phase::SetupPlaceActive | Phase::SetupPlaceBench
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::GameEnd)
    }

    /// Is `next` a legal transition from this phase?
    pub fn can_advance_to(&self, next: Phase) -> bool {
        match (self, next) {
            (_, Phase::GameEnd) => !self.is_terminal(),
            (Phase::BetweenTurns, Phase::Main) => true,
            (from, to) => to > *from,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::DealCards => "DEAL_CARDS",
            Phase::TurnOrder => "TURN_ORDER",
            Phase::SetupPlaceActive => "SETUP_PLACE_ACTIVE",
            Phase::SetupPlaceBench => "SETUP_PLACE_BENCH",
            Phase::Main => "MAIN",
            Phase::BetweenTurns => "BETWEEN_TURNS",
            Phase::GameEnd => "GAME_END",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
