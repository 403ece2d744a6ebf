//! Random controller for testing and baseline gameplay
//!
//! Picks uniformly among the offered inputs. Concede and hand inspection are
//! skipped whenever anything else is available, so random games actually get
//! played out.

use crate::game::controller::{GameStateView, PlayerController};
use crate::game::{InputAction, PlayerInput};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

/// A controller that makes random choices
pub struct RandomController {
    player: usize,
    rng: ChaCha12Rng,
}

impl RandomController {
    /// Create a random controller with a seeded RNG (for deterministic testing)
    pub fn with_seed(player: usize, seed: u64) -> Self {
        RandomController {
            player,
            rng: ChaCha12Rng::seed_from_u64(seed),
        }
    }
}

impl PlayerController for RandomController {
    fn player(&self) -> usize {
        self.player
    }

    fn name(&self) -> &str {
        "random"
    }

    fn choose(&mut self, view: &GameStateView, options: &[PlayerInput]) -> usize {
        let playable: Vec<usize> = (0..options.len()).filter(|&i| changes_game(&options[i])).collect();
        let index = if playable.is_empty() {
            0
        } else {
            playable[self.rng.gen_range(0..playable.len())]
        };
        view.logger().controller_choice(self.player, &options[index].action.to_string());
        index
    }
}

/// Concede ends the game and hand selection changes nothing
pub(crate) fn changes_game(input: &PlayerInput) -> bool {
    !matches!(input.action, InputAction::Concede | InputAction::SelectHandCard { .. })
}
