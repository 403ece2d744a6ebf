//! Pocket Forge - rules engine for a two-player Pokémon-style trading card game
//!
//! The engine enforces the legal-move space, resolves actions deterministically
//! and records every state change in an ordered event log, so a game can be
//! replayed from its seed and input sequence.

pub mod core;
pub mod effects;
pub mod error;
pub mod game;
pub mod loader;
pub mod tournament;
pub mod zones;

pub use error::{PocketError, Result};
