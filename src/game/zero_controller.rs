//! Zero controller for testing and automation
//!
//! Always takes the first input that changes the game. Useful for automated
//! tests and benchmarks where a game must run to completion without
//! interaction.

use crate::game::controller::{GameStateView, PlayerController};
use crate::game::random_controller::changes_game;
use crate::game::PlayerInput;

/// A controller that always chooses the first meaningful input
pub struct ZeroController {
    player: usize,
}

impl ZeroController {
    pub fn new(player: usize) -> Self {
        ZeroController { player }
    }
}

impl PlayerController for ZeroController {
    fn player(&self) -> usize {
        self.player
    }

    fn name(&self) -> &str {
        "zero"
    }

    fn choose(&mut self, view: &GameStateView, options: &[PlayerInput]) -> usize {
        let index = options.iter().position(changes_game).unwrap_or(0);
        view.logger().controller_choice(self.player, &options[index].action.to_string());
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameState, InputAction};

    #[test]
    fn test_skips_inspection_and_concede() {
        let game = GameState::empty_for_tests();
        let view = GameStateView::new(&game, 1);
        let mut controller = ZeroController::new(1);

        let options = [
            PlayerInput::new(1, InputAction::SelectHandCard { hand_index: 0 }),
            PlayerInput::new(1, InputAction::SelectHandCard { hand_index: 1 }),
            PlayerInput::new(1, InputAction::PassTurn),
            PlayerInput::concede(1),
        ];
        assert_eq!(controller.choose(&view, &options), 2);
        assert_eq!(controller.choose(&view, &options[3..]), 0);
    }
}
