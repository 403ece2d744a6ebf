//! Error types for Pocket Forge

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PocketError {
    #[error("Invalid card format: {0}")]
    InvalidCardFormat(String),

    #[error("Invalid deck format: {0}")]
    InvalidDeckFormat(String),

    #[error("Effect type already registered: {0}")]
    DuplicateEffectType(String),

    #[error("Unknown effect type: {0}")]
    UnknownEffectType(String),

    #[error("Invalid parameters for effect {effect_type}: {reason}")]
    InvalidEffectParams { effect_type: String, reason: String },

    #[error("Effect id {0} is already live")]
    EffectIdCollision(u32),

    #[error("Deck of player {0} contains no basic Pokémon")]
    NoBasicPokemon(usize),

    #[error("Deck of player {0} is empty")]
    EmptyDeck(usize),

    #[error("Illegal input: {0}")]
    IllegalInput(String),

    #[error("Zone {0} is empty")]
    EmptyZone(String),

    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    #[error("Invalid game action: {0}")]
    InvalidAction(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

impl PocketError {
    /// Configuration errors come from malformed static data and abort game startup
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            PocketError::InvalidCardFormat(_)
                | PocketError::InvalidDeckFormat(_)
                | PocketError::DuplicateEffectType(_)
                | PocketError::UnknownEffectType(_)
                | PocketError::InvalidEffectParams { .. }
                | PocketError::NoBasicPokemon(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PocketError>;
