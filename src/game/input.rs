//! Player inputs
//!
//! A `PlayerInput` is a fully-specified command. The engine only applies an
//! input that is equal to one of the entries returned by the legal-move
//! generator.

use crate::zones::ZoneName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One command submitted by a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerInput {
    pub player: usize,
    pub action: InputAction,
}

impl PlayerInput {
    pub fn new(player: usize, action: InputAction) -> Self {
        PlayerInput { player, action }
    }

    pub fn concede(player: usize) -> Self {
        PlayerInput::new(player, InputAction::Concede)
    }

    pub fn is_concede(&self) -> bool {
        matches!(self.action, InputAction::Concede)
    }
}

impl fmt::Display for PlayerInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}: {}", self.player, self.action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputAction {
    /// Setup: hand card becomes the active Pokémon
    PlaceActive { hand_index: usize },
    /// Setup: hand card goes to an empty bench slot
    PlaceBench { hand_index: usize, bench_index: usize },
    /// Setup: done placing bench Pokémon
    StartBattle,
    /// Inspect a hand card
    SelectHandCard { hand_index: usize },
    /// Play a basic to the bench, a trainer, or a tool onto `target`
    PlayCard { hand_index: usize, target: Option<ZoneName> },
    Evolve { hand_index: usize, target: ZoneName },
    AttachEnergy { target: ZoneName },
    Retreat { bench_index: usize },
    Attack { attack_index: usize },
    UseAbility { zone: ZoneName },
    /// Promote a bench Pokémon after the active was knocked out
    SelectNewActive { bench_index: usize },
    PassTurn,
    Concede,
}

impl fmt::Display for InputAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputAction::PlaceActive { hand_index } => write!(f, "place active from hand[{hand_index}]"),
            InputAction::PlaceBench { hand_index, bench_index } => {
                write!(f, "place bench{bench_index} from hand[{hand_index}]")
            }
            InputAction::StartBattle => write!(f, "start battle"),
            InputAction::SelectHandCard { hand_index } => write!(f, "select hand[{hand_index}]"),
            InputAction::PlayCard { hand_index, target: Some(t) } => write!(f, "play hand[{hand_index}] to {t}"),
            InputAction::PlayCard { hand_index, target: None } => write!(f, "play hand[{hand_index}]"),
            InputAction::Evolve { hand_index, target } => write!(f, "evolve {target} with hand[{hand_index}]"),
            InputAction::AttachEnergy { target } => write!(f, "attach energy to {target}"),
            InputAction::Retreat { bench_index } => write!(f, "retreat to bench{bench_index}"),
            InputAction::Attack { attack_index } => write!(f, "attack #{attack_index}"),
            InputAction::UseAbility { zone } => write!(f, "use ability of {zone}"),
            InputAction::SelectNewActive { bench_index } => write!(f, "promote bench{bench_index}"),
            InputAction::PassTurn => write!(f, "pass turn"),
            InputAction::Concede => write!(f, "concede"),
        }
    }
}
