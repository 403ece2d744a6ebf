//! Core game types and entities

pub mod card;
pub mod deck;
pub mod entity;
pub mod player;
pub mod types;

pub use card::{Ability, Attack, Card};
pub use deck::Deck;
pub use entity::{CardId, EffectId, IdGenerator};
pub use player::PlayerState;
pub use types::{CardCategory, CardName, EnergyType, PlayerName, Rarity, Stage};
