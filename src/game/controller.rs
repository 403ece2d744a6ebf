//! Player controller trait and game state view
//!
//! This module defines the interface between the engine and whoever makes
//! decisions for a player (test scripts, random players, a UI). The runner
//! calls the controller with a read-only view of the game and the inputs that
//! player may submit right now.

use crate::core::{Card, EnergyType};
use crate::game::{GameLogger, GameState, Phase, PlayerInput};
use crate::zones::Zone;

/// Read-only view of game state for controllers
///
/// Controllers should only inspect this view to make decisions.
pub struct GameStateView<'a> {
    game: &'a GameState,
    player: usize,
}

impl<'a> GameStateView<'a> {
    /// Create a view of the game from `player`'s perspective
    pub fn new(game: &'a GameState, player: usize) -> Self {
        GameStateView { game, player }
    }

    pub fn player(&self) -> usize {
        self.player
    }

    pub fn opponent(&self) -> usize {
        GameState::opponent_of(self.player)
    }

    pub fn turn(&self) -> u32 {
        self.game.turn
    }

    pub fn phase(&self) -> Phase {
        self.game.phase
    }

    pub fn is_my_turn(&self) -> bool {
        self.game.current_player == self.player
    }

    /// Cards in this player's hand
    pub fn hand(&self) -> &[Card] {
        self.game
            .players
            .get(self.player)
            .map(|p| p.zones.hand.cards.as_slice())
            .unwrap_or(&[])
    }

    /// Active zone of `player` (either side of the table is public)
    pub fn active(&self, player: usize) -> Option<&Zone> {
        self.game.players.get(player).map(|p| &p.zones.active)
    }

    pub fn bench(&self, player: usize) -> &[Zone] {
        self.game
            .players
            .get(player)
            .map(|p| p.zones.bench.as_slice())
            .unwrap_or(&[])
    }

    pub fn points(&self, player: usize) -> u32 {
        self.game.players.get(player).map(|p| p.points).unwrap_or(0)
    }

    pub fn deck_size(&self, player: usize) -> usize {
        self.game.players.get(player).map(|p| p.deck.len()).unwrap_or(0)
    }

    /// Energy this player may attach this turn
    pub fn current_energy(&self) -> Option<EnergyType> {
        self.game.players.get(self.player).and_then(|p| p.current_energy)
    }

    /// Remaining HP of the Pokémon in a zone
    pub fn remaining_hp(&self, zone: &Zone) -> u32 {
        zone.cards
            .last()
            .map(|c| c.hp.saturating_sub(zone.damage))
            .unwrap_or(0)
    }

    /// Logger for reporting choices
    pub fn logger(&self) -> &GameLogger {
        &self.game.logger
    }
}

/// Player controller trait
///
/// Implement this trait to create players or connect a UI. `choose` receives
/// only the inputs this player may submit and returns an index into them.
pub trait PlayerController {
    /// Player index this controller is responsible for
    fn player(&self) -> usize;

    /// Short name for logs and tournament tables
    fn name(&self) -> &str;

    /// Pick one of `options` (never empty)
    fn choose(&mut self, view: &GameStateView, options: &[PlayerInput]) -> usize;

    /// Called when the game ends
    fn on_game_end(&mut self, _view: &GameStateView, _won: bool) {}
}
