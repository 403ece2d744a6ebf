//! Game runner
//!
//! Drives an `Engine` to completion with two controllers. The runner owns no
//! rules: it asks the engine for the legal inputs, hands the deciding player
//! their options and feeds the choice back.

use crate::game::controller::{GameStateView, PlayerController};
use crate::game::{Engine, EngineStep, GameEndReason, GameOutcome, GameState, PlayerInput};
use crate::{PocketError, Result};

/// Upper bound on decisions in one game, in case controllers stall
pub const DEFAULT_MAX_STEPS: usize = 10_000;

/// Result of running a game
#[derive(Debug, Clone)]
pub struct GameResult {
    /// `None` when the step limit stopped the game first
    pub outcome: Option<GameOutcome>,
    /// Decisions taken
    pub steps: usize,
    /// Every applied input, in order
    pub inputs: Vec<PlayerInput>,
}

impl GameResult {
    pub fn winner(&self) -> Option<usize> {
        self.outcome.and_then(|o| o.winner)
    }

    pub fn end_reason(&self) -> Option<GameEndReason> {
        self.outcome.map(|o| o.reason)
    }

    pub fn turns_played(&self) -> u32 {
        self.outcome.map_or(0, |o| o.turns)
    }
}

/// Runs one game between two controllers
pub struct GameRunner<'a> {
    engine: Engine,
    controllers: [&'a mut dyn PlayerController; 2],
    max_steps: usize,
}

impl<'a> GameRunner<'a> {
    /// Controllers must be given in player order
    pub fn new(engine: Engine, p0: &'a mut dyn PlayerController, p1: &'a mut dyn PlayerController) -> Result<Self> {
        if p0.player() != 0 || p1.player() != 1 {
            return Err(PocketError::InvalidAction(
                "controllers must be passed as player 0, player 1".to_string(),
            ));
        }
        Ok(GameRunner {
            engine,
            controllers: [p0, p1],
            max_steps: DEFAULT_MAX_STEPS,
        })
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn into_engine(self) -> Engine {
        self.engine
    }

    /// Play until the game ends or the step limit is hit
    pub fn run(&mut self) -> Result<GameResult> {
        let mut step = self.engine.start()?;
        let mut steps = 0;

        while let EngineStep::AwaitingInput { legal_inputs } = step {
            if steps >= self.max_steps {
                self.engine
                    .state()
                    .logger
                    .minimal(&format!("step limit {} reached", self.max_steps));
                return Ok(self.result(None, steps));
            }

            let state = self.engine.state();
            let player = deciding_player(state, &legal_inputs)?;
            let options: Vec<PlayerInput> = legal_inputs.into_iter().filter(|i| i.player == player).collect();

            let view = GameStateView::new(state, player);
            let choice = self.controllers[player].choose(&view, &options);
            let input = *options.get(choice).ok_or_else(|| {
                PocketError::InvalidAction(format!(
                    "controller {} chose {choice} of {} options",
                    self.controllers[player].name(),
                    options.len()
                ))
            })?;

            step = self.engine.run_until_next(input)?;
            steps += 1;
        }

        let outcome = self.engine.state().outcome;
        for (player, controller) in self.controllers.iter_mut().enumerate() {
            let view = GameStateView::new(self.engine.state(), player);
            let won = outcome.and_then(|o| o.winner) == Some(player);
            controller.on_game_end(&view, won);
        }
        Ok(self.result(outcome, steps))
    }

    fn result(&self, outcome: Option<GameOutcome>, steps: usize) -> GameResult {
        GameResult {
            outcome,
            steps,
            inputs: self.engine.input_log().to_vec(),
        }
    }
}

/// Which player decides next
///
/// The current player goes first; in simultaneous phases the other player
/// acts once the current one has nothing left but concede.
fn deciding_player(state: &GameState, legal: &[PlayerInput]) -> Result<usize> {
    let current = state.current_player;
    [current, GameState::opponent_of(current)]
        .into_iter()
        .find(|&p| legal.iter().any(|i| i.player == p && !i.is_concede()))
        .ok_or_else(|| PocketError::InvalidAction("no player has a move".to_string()))
}
