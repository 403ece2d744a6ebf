//! Card and deck loaders
//!
//! Parsers for the card format (.txt) and deck format (.dck), the async card
//! database, and game initialization from deck lists.

pub mod card;
pub mod database;
pub mod deck;
pub mod game_init;

pub use card::{CardDefinition, CardLoader};
pub use database::CardDatabase;
pub use deck::{DeckEntry, DeckList, DeckLoader};
pub use game_init::GameInitializer;
