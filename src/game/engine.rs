//! Engine driver: the turn/phase state machine
//!
//! The engine is a resumable state machine. `start` runs until the first
//! point where a player decision is needed; `run_until_next` applies one
//! validated input and runs until the next such point. Nothing else mutates
//! the game.

use crate::game::actions;
use crate::game::combat::resolve_attack;
use crate::game::{
    check_state_based_actions, legal_inputs, GameEventData, GameOutcome, GameState, InputAction,
    InputRequestKind, Phase, PlayerInput,
};
use crate::zones::ZoneName;
use crate::{PocketError, Result};
use rand::Rng;
use smallvec::smallvec;

/// Where the engine stopped
#[derive(Debug, Clone, PartialEq)]
pub enum EngineStep {
    /// Waiting for one of these inputs
    AwaitingInput { legal_inputs: Vec<PlayerInput> },
    /// The game is over
    Finished(GameOutcome),
}

impl EngineStep {
    pub fn is_finished(&self) -> bool {
        matches!(self, EngineStep::Finished(_))
    }
}

/// Owns one game and drives it from deal to game end
#[derive(Debug, Clone)]
pub struct Engine {
    state: GameState,
    /// Every input applied so far, in order
    input_log: Vec<PlayerInput>,
    /// Set when an action failed half-way; the game cannot continue
    halted: bool,
    started: bool,
}

impl Engine {
    /// Wrap a freshly built game state
    ///
    /// Fails with a configuration error when a deck has no basic Pokémon or
    /// a card carries an effect the registry does not know.
    pub fn new(state: GameState) -> Result<Self> {
        for (index, player) in state.players.iter().enumerate() {
            if player.deck.basic_indices().is_empty() {
                return Err(PocketError::NoBasicPokemon(index));
            }
            for card in &player.deck.cards {
                state.registry.validate_card(card)?;
            }
        }

        Ok(Engine {
            state,
            input_log: Vec::new(),
            halted: false,
            started: false,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable access for subscribing observers and adjusting the logger
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn input_log(&self) -> &[PlayerInput] {
        &self.input_log
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn legal_inputs(&self) -> Vec<PlayerInput> {
        legal_inputs(&self.state)
    }

    /// Deal, decide turn order and stop at the first setup decision
    pub fn start(&mut self) -> Result<EngineStep> {
        if self.started {
            return Err(PocketError::InvalidAction("engine already started".to_string()));
        }
        self.started = true;
        self.state.logger.normal("starting game");
        self.guarded(Self::advance)
    }

    /// Apply one input and run until the next decision point
    ///
    /// An input that is not currently legal is rejected with `IllegalInput`
    /// and leaves the game untouched.
    pub fn run_until_next(&mut self, input: PlayerInput) -> Result<EngineStep> {
        if self.halted {
            return Err(PocketError::InvalidAction(
                "game halted after an earlier failure".to_string(),
            ));
        }
        if !self.started {
            return Err(PocketError::InvalidAction("engine not started".to_string()));
        }
        if let Some(outcome) = self.state.outcome {
            return Ok(EngineStep::Finished(outcome));
        }
        if !legal_inputs(&self.state).contains(&input) {
            return Err(PocketError::IllegalInput(input.to_string()));
        }

        self.input_log.push(input);
        self.state.last_input = Some(input);
        self.guarded(|engine| {
            engine.apply(input)?;
            engine.advance()
        })
    }

    /// Run `f`, halting the game for good if it fails
    fn guarded(&mut self, f: impl FnOnce(&mut Self) -> Result<EngineStep>) -> Result<EngineStep> {
        let result = f(self);
        if let Err(e) = &result {
            self.halted = true;
            self.state.logger.minimal(&format!("game halted: {e}"));
        }
        result
    }

    fn apply(&mut self, input: PlayerInput) -> Result<()> {
        let state = &mut self.state;
        let player = input.player;
        match input.action {
            InputAction::Concede => actions::concede(state, player),
            InputAction::PlaceActive { hand_index } => {
                actions::play_pokemon_card(state, player, hand_index, ZoneName::Active)?
            }
            InputAction::PlaceBench { hand_index, bench_index } => {
                actions::play_pokemon_card(state, player, hand_index, ZoneName::Bench(bench_index as u8))?
            }
            InputAction::StartBattle => state.player_mut(player)?.setup_complete = true,
            InputAction::SelectNewActive { bench_index } => actions::select_new_active(state, player, bench_index)?,
            InputAction::SelectHandCard { hand_index } => actions::select_hand_card(state, player, hand_index)?,
            InputAction::PlayCard { hand_index, target } => {
                actions::play_card(state, player, hand_index, target)?;
                check_state_based_actions(state)?;
            }
            InputAction::Evolve { hand_index, target } => actions::evolve(state, player, hand_index, target)?,
            InputAction::AttachEnergy { target } => {
                actions::attach_energy(state, player, target)?;
            }
            InputAction::Retreat { bench_index } => actions::retreat(state, player, bench_index)?,
            InputAction::UseAbility { zone } => {
                actions::use_ability(state, player, zone)?;
                check_state_based_actions(state)?;
            }
            InputAction::Attack { attack_index } => {
                resolve_attack(state, player, attack_index)?;
                if !state.is_over() {
                    state.set_phase(Phase::BetweenTurns);
                }
            }
            InputAction::PassTurn => state.set_phase(Phase::BetweenTurns),
        }
        Ok(())
    }

    /// Run automatic phases until a decision is needed or the game ends
    fn advance(&mut self) -> Result<EngineStep> {
        loop {
            let state = &mut self.state;
            if let Some(outcome) = state.outcome {
                return Ok(EngineStep::Finished(outcome));
            }
            if !state.pending_promotions.is_empty() {
                return Ok(self.awaiting());
            }

            match state.phase {
                Phase::DealCards => {
                    for player in 0..state.players.len() {
                        actions::shuffle_deck(state, player)?;
                    }
                    for player in 0..state.players.len() {
                        actions::draw_initial_hand(state, player)?;
                    }
                    state.set_phase(Phase::TurnOrder);
                }
                Phase::TurnOrder => {
                    let heads = state.rng.gen_bool(0.5);
                    let first_player = if heads { 0 } else { 1 };
                    state.emit(GameEventData::CoinFlip { heads });
                    state.emit(GameEventData::TurnOrderDecided { first_player });
                    state.current_player = first_player;
                    state.set_phase(Phase::SetupPlaceActive);
                    request_both(state, InputRequestKind::PlaceActive);
                }
                Phase::SetupPlaceActive => {
                    if state.players.iter().any(|p| p.zones.active.is_empty()) {
                        return Ok(self.awaiting());
                    }
                    state.set_phase(Phase::SetupPlaceBench);
                    request_both(state, InputRequestKind::PlaceBench);
                }
                Phase::SetupPlaceBench => {
                    if !state.players.iter().all(|p| p.setup_complete) {
                        return Ok(self.awaiting());
                    }
                    let first = state.current_player;
                    actions::start_first_turn(state, first)?;
                    check_state_based_actions(state)?;
                    enter_main(state);
                }
                Phase::Main => return Ok(self.awaiting()),
                Phase::BetweenTurns => {
                    actions::end_turn(state)?;
                    enter_main(state);
                }
                Phase::GameEnd => {
                    return Err(PocketError::InvalidAction(
                        "game ended without an outcome".to_string(),
                    ))
                }
            }
        }
    }

    fn awaiting(&self) -> EngineStep {
        EngineStep::AwaitingInput {
            legal_inputs: legal_inputs(&self.state),
        }
    }
}

fn request_both(state: &mut GameState, request: InputRequestKind) {
    state.emit(GameEventData::InputRequested {
        players: smallvec![0, 1],
        request,
    });
}

fn enter_main(state: &mut GameState) {
    if state.is_over() {
        return;
    }
    state.set_phase(Phase::Main);
    state.emit(GameEventData::InputRequested {
        players: smallvec![state.current_player],
        request: InputRequestKind::MainAction,
    });
}
