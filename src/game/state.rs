//! Main game state structure

use crate::core::{CardId, EffectId, IdGenerator, PlayerState};
use crate::effects::{EffectManager, EffectRegistry};
use crate::game::{EngineConfig, EventBus, GameEndReason, GameEventData, GameLogger, Phase, PlayerInput};
use crate::zones::ZoneName;
use crate::{PocketError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;

/// How a finished game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    /// Winning player, `None` when the turn limit was hit
    pub winner: Option<usize>,
    pub reason: GameEndReason,
    /// Turn counter when the game ended
    pub turns: u32,
}

/// Complete game state
///
/// Holds everything needed to continue a game. Cloning is cheap enough for
/// search and the whole state (minus the effect registry and event
/// subscribers) round-trips through serde.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Both players, indexed 0 and 1
    pub players: Vec<PlayerState>,

    pub phase: Phase,

    /// 0 during setup, 1 on the first turn
    pub turn: u32,

    /// Index of the player to move (first player during setup)
    pub current_player: usize,

    /// Live effects
    pub effects: EffectManager,

    /// Last input the engine applied
    pub last_input: Option<PlayerInput>,

    /// Players who must choose a new active Pokémon before play continues
    pub pending_promotions: SmallVec<[usize; 2]>,

    /// Set once the game is over
    pub outcome: Option<GameOutcome>,

    pub config: EngineConfig,

    /// Random number generator for shuffles, coin flips and energy rolls
    pub rng: ChaCha12Rng,

    /// Unified ID generator (cards were numbered from the same counter)
    pub ids: IdGenerator,

    /// Read-only effect type table, shared between games; empty after
    /// deserializing until `rehydrate`
    #[serde(skip)]
    pub registry: Arc<EffectRegistry>,

    /// Event history
    pub events: EventBus,

    /// Centralized logger for game events
    pub logger: GameLogger,
}

impl GameState {
    /// Create a game between two players
    ///
    /// `ids` must be the generator that numbered the players' cards so effect
    /// IDs never collide with card IDs.
    pub fn new(
        players: [PlayerState; 2],
        config: EngineConfig,
        registry: Arc<EffectRegistry>,
        ids: IdGenerator,
        seed: u64,
    ) -> Self {
        let mut players = Vec::from(players);
        for (index, player) in players.iter_mut().enumerate() {
            for card in player.deck.cards.iter_mut() {
                card.owner = index;
            }
        }

        GameState {
            players,
            phase: Phase::DealCards,
            turn: 0,
            current_player: 0,
            effects: EffectManager::new(),
            last_input: None,
            pending_promotions: SmallVec::new(),
            outcome: None,
            config,
            rng: ChaCha12Rng::seed_from_u64(seed),
            ids,
            registry,
            events: EventBus::new(),
            logger: GameLogger::new(),
        }
    }

    /// Set the RNG seed for deterministic gameplay
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = ChaCha12Rng::seed_from_u64(seed);
    }

    /// The other player's index
    pub fn opponent_of(player: usize) -> usize {
        1 - player
    }

    pub fn player(&self, index: usize) -> Result<&PlayerState> {
        self.players
            .get(index)
            .ok_or_else(|| PocketError::InvalidAction(format!("no player {index}")))
    }

    pub fn player_mut(&mut self, index: usize) -> Result<&mut PlayerState> {
        self.players
            .get_mut(index)
            .ok_or_else(|| PocketError::InvalidAction(format!("no player {index}")))
    }

    pub fn current(&self) -> Result<&PlayerState> {
        self.player(self.current_player)
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// In-play zone currently holding `card` as its top card
    pub fn find_pokemon(&self, player: usize, card: CardId) -> Option<ZoneName> {
        let zones = &self.players.get(player)?.zones;
        zones
            .in_play()
            .find(|z| z.cards.last().is_some_and(|c| c.id == card))
            .map(|z| z.name)
    }

    pub fn next_effect_id(&mut self) -> EffectId {
        self.ids.next_effect_id()
    }

    /// Record an event and describe it through the logger
    pub fn emit(&mut self, data: GameEventData) {
        let level = data.verbosity();
        let event = self.events.push(self.turn, data);
        log_if_verbose!(self.logger, level, "{}", event);
    }

    /// Move to another phase, recording the change
    pub fn set_phase(&mut self, to: Phase) {
        if self.phase == to {
            return;
        }
        let from = self.phase;
        self.phase = to;
        self.emit(GameEventData::PhaseChanged { from, to });
    }

    /// Restore runtime-only parts after deserialization
    pub fn rehydrate(&mut self, registry: Arc<EffectRegistry>) -> Result<()> {
        self.registry = registry;
        let registry = Arc::clone(&self.registry);
        self.effects.rehydrate(&registry)
    }

    /// Two empty players with the built-in registry
    #[cfg(test)]
    pub(crate) fn empty_for_tests() -> Self {
        use crate::core::Deck;
        let config = EngineConfig::default();
        let players = [
            PlayerState::new("P0", Deck::new(Vec::new(), Vec::new()), config.bench_size),
            PlayerState::new("P1", Deck::new(Vec::new(), Vec::new()), config.bench_size),
        ];
        GameState::new(players, config, EffectRegistry::shared_builtin().unwrap(), IdGenerator::new(), 0)
    }
}
