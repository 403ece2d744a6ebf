//! Fixed script controller for deterministic testing
//!
//! Follows a predetermined sequence of choice indices, making it ideal for
//! testing specific game scenarios. Once the script is exhausted it behaves
//! like the zero controller.

use crate::game::controller::{GameStateView, PlayerController};
use crate::game::random_controller::changes_game;
use crate::game::PlayerInput;
use serde::{Deserialize, Serialize};

/// A controller that follows a fixed script of choices
///
/// The script indexes into the options offered to this player at each
/// decision. The controller state (including its position) serializes, so a
/// scripted game can be saved and resumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedScriptController {
    player: usize,
    /// The predetermined sequence of choice indices
    script: Vec<usize>,
    /// Current position in the script
    pub current_index: usize,
}

impl FixedScriptController {
    /// Create a scripted controller, e.g. `vec![0, 2, 1]`
    pub fn new(player: usize, script: Vec<usize>) -> Self {
        FixedScriptController {
            player,
            script,
            current_index: 0,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_index >= self.script.len()
    }

    fn next_choice(&mut self) -> Option<usize> {
        let choice = self.script.get(self.current_index).copied();
        if choice.is_some() {
            self.current_index += 1;
        }
        choice
    }
}

impl PlayerController for FixedScriptController {
    fn player(&self) -> usize {
        self.player
    }

    fn name(&self) -> &str {
        "script"
    }

    fn choose(&mut self, view: &GameStateView, options: &[PlayerInput]) -> usize {
        let last = options.len().saturating_sub(1);
        let index = match self.next_choice() {
            Some(choice) if choice > last => {
                view.logger().controller_choice(
                    self.player,
                    &format!("{choice} (clamped to {last}) out of choices 0-{last}"),
                );
                last
            }
            Some(choice) => {
                view.logger()
                    .controller_choice(self.player, &format!("{choice} out of choices 0-{last}"));
                choice
            }
            None => options.iter().position(changes_game).unwrap_or(0),
        };
        index
    }
}
