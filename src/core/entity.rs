//! Entity identifiers with simple integer IDs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Simple integer ID for a card instance
///
/// IDs are stable throughout a game: a card keeps its ID while it moves
/// between zones, so events and effects can refer to it without back-pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(u32);

impl CardId {
    pub fn new(id: u32) -> Self {
        CardId(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ID of a live effect instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectId(u32);

impl EffectId {
    pub fn new(id: u32) -> Self {
        EffectId(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// Unified ID generator shared by all entity types
///
/// Card IDs are handed out while decks are built, and the same generator then
/// moves into the game state to number effects, so no two entities of a game
/// ever share a number. Generation is a plain counter to keep replays
/// deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdGenerator {
    next: u32,
}

impl IdGenerator {
    pub fn new() -> Self {
        IdGenerator { next: 0 }
    }

    fn bump(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    pub fn next_card_id(&mut self) -> CardId {
        CardId::new(self.bump())
    }

    pub fn next_effect_id(&mut self) -> EffectId {
        EffectId::new(self.bump())
    }

    /// Number of IDs handed out so far
    pub fn issued(&self) -> u32 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic_across_kinds() {
        let mut ids = IdGenerator::new();
        let c1 = ids.next_card_id();
        let c2 = ids.next_card_id();
        let e1 = ids.next_effect_id();

        assert_eq!(c1.as_u32(), 0);
        assert_eq!(c2.as_u32(), 1);
        assert_eq!(e1.as_u32(), 2);
        assert_eq!(ids.issued(), 3);
        assert_eq!(e1.to_string(), "E2");
    }
}
