//! Decks: ordered card lists plus the energy types they generate

use crate::core::{Card, EnergyType};
use crate::{PocketError, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// An ordered sequence of cards, top of the deck last
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub cards: Vec<Card>,

    /// Energy types this deck's energy zone can generate
    pub energy_types: Vec<EnergyType>,
}

impl Deck {
    pub fn new(cards: Vec<Card>, energy_types: Vec<EnergyType>) -> Self {
        Deck { cards, energy_types }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Unbiased in-place shuffle (Fisher-Yates via `SliceRandom`)
    pub fn shuffle(&mut self, rng: &mut impl Rng) {
        self.cards.shuffle(rng);
    }

    /// Draw from the top
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Remove the card at a specific index
    pub fn take(&mut self, index: usize) -> Result<Card> {
        if index >= self.cards.len() {
            return Err(PocketError::InvalidAction(format!(
                "deck index {index} out of range ({} cards)",
                self.cards.len()
            )));
        }
        Ok(self.cards.remove(index))
    }

    /// Indices of basic Pokémon, ascending
    pub fn basic_indices(&self) -> Vec<usize> {
        self.cards
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_basic())
            .map(|(i, _)| i)
            .collect()
    }

    /// Roll the next energy for the energy zone
    ///
    /// Returns `None` when the deck generates no energy at all.
    pub fn roll_energy(&self, rng: &mut impl Rng) -> Option<EnergyType> {
        self.energy_types.choose(rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardCategory, CardId, Stage};
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn sample_deck() -> Deck {
        let mut cards = Vec::new();
        for i in 0..10 {
            if i % 3 == 0 {
                cards.push(Card::pokemon(CardId::new(i), "Bulbasaur", 70, EnergyType::Grass, Stage::Basic));
            } else {
                cards.push(Card::trainer(CardId::new(i), "Potion", CardCategory::Item));
            }
        }
        Deck::new(cards, vec![EnergyType::Grass])
    }

    #[test]
    fn test_shuffle_preserves_cards() {
        let mut deck = sample_deck();
        let mut before: Vec<u32> = deck.cards.iter().map(|c| c.id.as_u32()).collect();

        let mut rng = ChaCha12Rng::seed_from_u64(7);
        deck.shuffle(&mut rng);

        let mut after: Vec<u32> = deck.cards.iter().map(|c| c.id.as_u32()).collect();
        before.sort_unstable();
        after.sort_unstable();
        assert_eq!(before, after);
    }

    #[test]
    fn test_draw_until_empty() {
        let mut deck = sample_deck();
        for _ in 0..10 {
            assert!(deck.draw().is_some());
        }
        assert!(deck.is_empty());
        assert!(deck.draw().is_none());
    }

    #[test]
    fn test_basic_indices_and_take() {
        let mut deck = sample_deck();
        assert_eq!(deck.basic_indices(), vec![0, 3, 6, 9]);

        let card = deck.take(3).unwrap();
        assert!(card.is_basic());
        assert_eq!(deck.len(), 9);
        assert!(deck.take(42).is_err());
    }

    #[test]
    fn test_roll_energy() {
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        assert_eq!(sample_deck().roll_energy(&mut rng), Some(EnergyType::Grass));

        let empty = Deck::new(Vec::new(), Vec::new());
        assert_eq!(empty.roll_energy(&mut rng), None);
    }
}
