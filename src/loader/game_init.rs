//! Game initialization from decks
//!
//! Turns two deck lists into a ready-to-start `GameState`. Card ids come from
//! one counter that later numbers effects, and every effect printed on a card
//! is checked against the registry here, so a bad card stops the game before
//! it starts.

use crate::core::{Deck, IdGenerator, PlayerState};
use crate::effects::EffectRegistry;
use crate::game::{EngineConfig, GameState};
use crate::loader::{CardDatabase, DeckList};
use crate::{PocketError, Result};
use std::sync::Arc;

/// Game builder for initializing games from decks
pub struct GameInitializer<'a> {
    card_db: &'a CardDatabase,
    registry: Arc<EffectRegistry>,
    config: EngineConfig,
}

impl<'a> GameInitializer<'a> {
    pub fn new(card_db: &'a CardDatabase) -> Result<Self> {
        Ok(GameInitializer {
            card_db,
            registry: EffectRegistry::shared_builtin()?,
            config: EngineConfig::default(),
        })
    }

    pub fn with_registry(mut self, registry: Arc<EffectRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Initialize a two-player game from two decks
    pub async fn init_game(
        &self,
        player0_name: &str,
        player0_deck: &DeckList,
        player1_name: &str,
        player1_deck: &DeckList,
        seed: u64,
    ) -> Result<GameState> {
        let mut ids = IdGenerator::new();
        let deck0 = self.build_deck(&mut ids, player0_deck).await?;
        let deck1 = self.build_deck(&mut ids, player1_deck).await?;

        let players = [
            PlayerState::new(player0_name, deck0, self.config.bench_size),
            PlayerState::new(player1_name, deck1, self.config.bench_size),
        ];
        Ok(GameState::new(
            players,
            self.config.clone(),
            Arc::clone(&self.registry),
            ids,
            seed,
        ))
    }

    /// Instantiate every card of a deck list
    async fn build_deck(&self, ids: &mut IdGenerator, list: &DeckList) -> Result<Deck> {
        let mut cards = Vec::with_capacity(list.total_cards());
        for entry in &list.main_deck {
            let def = self
                .card_db
                .get_card(&entry.card_name)
                .await?
                .ok_or_else(|| {
                    PocketError::InvalidCardFormat(format!("Card not found in database: {}", entry.card_name))
                })?;

            let first = cards.len();
            for _ in 0..entry.count {
                cards.push(def.instantiate(ids.next_card_id()));
            }
            if let Some(card) = cards.get(first) {
                self.registry.validate_card(card)?;
            }
        }

        if !cards.iter().any(|c| c.is_basic()) {
            return Err(PocketError::InvalidDeckFormat(format!(
                "deck '{}' contains no basic Pokémon",
                list.name
            )));
        }
        Ok(Deck::new(cards, list.energy_types.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{CardLoader, DeckLoader};
    use std::path::PathBuf;

    async fn small_db() -> CardDatabase {
        let db = CardDatabase::new(PathBuf::from("nowhere"));
        db.add_card(CardLoader::parse("Name:Bulbasaur\nHP:70\nType:Grass\nA:Vine Whip|G C|40||\n").unwrap())
            .await;
        db.add_card(CardLoader::parse("Name:Potion\nCategory:Item\nE:HEAL@own_active{amount=20}\n").unwrap())
            .await;
        db.add_card(CardLoader::parse("Name:Cursed Doll\nCategory:Item\nE:CURSE@opponent_active\n").unwrap())
            .await;
        db.add_card(CardLoader::parse("Name:Odd Salve\nCategory:Item\nE:HEAL@self{amount=20}\n").unwrap())
            .await;
        db
    }

    #[tokio::test]
    async fn test_init_simple_game() {
        let db = small_db().await;
        let deck = DeckLoader::parse("[metadata]\nEnergy=Grass\n[Main]\n12 Bulbasaur\n8 Potion\n").unwrap();

        let game = GameInitializer::new(&db)
            .unwrap()
            .init_game("Alice", &deck, "Bob", &deck, 7)
            .await
            .unwrap();

        assert_eq!(game.players.len(), 2);
        assert_eq!(game.players[0].deck.len(), 20);
        assert_eq!(game.players[1].deck.len(), 20);
        assert_eq!(game.players[1].deck.cards[0].owner, 1);
        assert_eq!(game.ids.issued(), 40);
        assert_eq!(game.players[0].deck.energy_types, vec![crate::core::EnergyType::Grass]);
    }

    #[tokio::test]
    async fn test_unknown_effect_is_configuration_error() {
        let db = small_db().await;
        let deck = DeckLoader::parse("[metadata]\nEnergy=Grass\n[Main]\n1 Bulbasaur\n1 Cursed Doll\n").unwrap();

        let err = GameInitializer::new(&db)
            .unwrap()
            .init_game("Alice", &deck, "Bob", &deck, 0)
            .await
            .unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("Cursed Doll"));
    }

    #[tokio::test]
    async fn test_unresolvable_target_rejected_at_startup() {
        let db = small_db().await;
        let deck = DeckLoader::parse("[metadata]\nEnergy=Grass\n[Main]\n1 Bulbasaur\n1 Odd Salve\n").unwrap();

        let err = GameInitializer::new(&db)
            .unwrap()
            .init_game("Alice", &deck, "Bob", &deck, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, PocketError::InvalidEffectParams { .. }));
        assert!(err.to_string().contains("Odd Salve"));
    }

    #[tokio::test]
    async fn test_missing_card_error() {
        let db = small_db().await;
        let deck = DeckLoader::parse("[metadata]\nEnergy=Grass\n[Main]\n1 Nonexistent Card\n").unwrap();
        let result = GameInitializer::new(&db).unwrap().init_game("Alice", &deck, "Bob", &deck, 0).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_deck_without_basics_rejected() {
        let db = small_db().await;
        let deck = DeckLoader::parse("[metadata]\nEnergy=Grass\n[Main]\n4 Potion\n").unwrap();
        let err = GameInitializer::new(&db)
            .unwrap()
            .init_game("Alice", &deck, "Bob", &deck, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, PocketError::InvalidDeckFormat(_)));
    }
}
