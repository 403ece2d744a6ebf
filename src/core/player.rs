//! Player representation

use crate::core::{CardId, Deck, EnergyType, PlayerName};
use crate::zones::PlayerZones;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Represents a player in the game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    /// Player name
    pub name: PlayerName,

    /// Is this seat driven by a computer controller?
    pub is_ai: bool,

    /// Draw pile
    pub deck: Deck,

    /// Active, bench, discard and hand
    pub zones: PlayerZones,

    /// Energy available to attach this turn
    pub current_energy: Option<EnergyType>,

    /// Energy that becomes current next turn
    pub next_energy: Option<EnergyType>,

    /// Has energy been attached this turn?
    pub can_attach_energy: bool,

    /// One Supporter card per turn
    pub can_supporter: bool,

    /// One retreat per turn
    pub has_retreated: bool,

    /// Finished setup placement (pressed start battle)
    pub setup_complete: bool,

    /// Prize points toward victory
    pub points: u32,

    /// Tried to draw from an empty deck
    pub decked_out: bool,

    /// Cards whose ability was used this turn
    pub used_abilities: SmallVec<[CardId; 4]>,
}

impl PlayerState {
    pub fn new(name: impl Into<PlayerName>, deck: Deck, bench_size: usize) -> Self {
        PlayerState {
            name: name.into(),
            is_ai: false,
            deck,
            zones: PlayerZones::new(bench_size),
            current_energy: None,
            next_energy: None,
            can_attach_energy: true,
            can_supporter: true,
            has_retreated: false,
            setup_complete: false,
            points: 0,
            decked_out: false,
            used_abilities: SmallVec::new(),
        }
    }

    /// Reset per-turn permissions at the start of this player's turn
    pub fn reset_turn_flags(&mut self) {
        self.can_attach_energy = true;
        self.can_supporter = true;
        self.has_retreated = false;
        self.used_abilities.clear();
    }

    /// Rotate the energy zone: next becomes current, a fresh roll becomes next
    pub fn rotate_energy(&mut self, rolled: Option<EnergyType>) {
        self.current_energy = self.next_energy.take();
        self.next_energy = rolled;
    }

    pub fn has_used_ability(&self, card: CardId) -> bool {
        self.used_abilities.contains(&card)
    }

    /// Does this player have any Pokémon in play?
    pub fn has_pokemon_in_play(&self) -> bool {
        self.zones.in_play().any(|z| !z.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_creation() {
        let player = PlayerState::new("Ash", Deck::new(Vec::new(), vec![EnergyType::Fire]), 3);
        assert_eq!(player.name.as_str(), "Ash");
        assert_eq!(player.zones.bench.len(), 3);
        assert_eq!(player.points, 0);
        assert!(player.can_attach_energy);
        assert!(!player.has_pokemon_in_play());
    }

    #[test]
    fn test_energy_rotation() {
        let mut player = PlayerState::new("Misty", Deck::new(Vec::new(), vec![EnergyType::Water]), 3);
        player.next_energy = Some(EnergyType::Water);

        player.rotate_energy(Some(EnergyType::Fire));
        assert_eq!(player.current_energy, Some(EnergyType::Water));
        assert_eq!(player.next_energy, Some(EnergyType::Fire));
    }

    #[test]
    fn test_reset_turn_flags() {
        let mut player = PlayerState::new("Brock", Deck::new(Vec::new(), Vec::new()), 3);
        player.can_attach_energy = false;
        player.can_supporter = false;
        player.has_retreated = true;
        player.used_abilities.push(CardId::new(4));

        player.reset_turn_flags();
        assert!(player.can_attach_energy);
        assert!(player.can_supporter);
        assert!(!player.has_retreated);
        assert!(!player.has_used_ability(CardId::new(4)));
    }
}
