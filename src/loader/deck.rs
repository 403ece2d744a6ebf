//! Deck file loader (.dck format)
//!
//! ```text
//! [metadata]
//! Name=Blaze
//! Energy=Fire
//!
//! [Main]
//! 2 Charmander
//! 2 Potion|A1
//! ```

use crate::core::EnergyType;
use crate::{PocketError, Result};
use std::fs;
use std::path::Path;

/// Deck loader for .dck files
pub struct DeckLoader;

impl DeckLoader {
    /// Load a deck from a .dck file
    pub fn load_from_file(path: &Path) -> Result<DeckList> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a deck from its text content
    pub fn parse(content: &str) -> Result<DeckList> {
        let mut name = String::new();
        let mut energy_types = Vec::new();
        let mut main_deck = Vec::new();
        let mut in_metadata = false;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') {
                in_metadata = line.eq_ignore_ascii_case("[metadata]");
                continue;
            }

            if in_metadata {
                let Some((key, value)) = line.split_once('=') else {
                    continue;
                };
                match key.trim() {
                    "Name" => name = value.trim().to_string(),
                    "Energy" => {
                        for part in value.split([',', ' ']).map(str::trim).filter(|p| !p.is_empty()) {
                            let energy: EnergyType = part
                                .parse()
                                .map_err(|_| PocketError::InvalidDeckFormat(format!("unknown energy '{part}'")))?;
                            if energy == EnergyType::Colorless {
                                return Err(PocketError::InvalidDeckFormat(
                                    "decks cannot generate Colorless energy".to_string(),
                                ));
                            }
                            if !energy_types.contains(&energy) {
                                energy_types.push(energy);
                            }
                        }
                    }
                    _ => {}
                }
                continue;
            }

            // Format: "2 Card Name" or "2 Card Name|SET"
            let (count_str, rest) = line
                .split_once(' ')
                .ok_or_else(|| PocketError::InvalidDeckFormat(format!("expected '<count> <name>', got '{line}'")))?;
            let count = count_str
                .parse::<u8>()
                .map_err(|_| PocketError::InvalidDeckFormat(format!("bad card count in '{line}'")))?;
            let card_name = match rest.split_once('|') {
                Some((name, _set)) => name.trim().to_string(),
                None => rest.trim().to_string(),
            };
            main_deck.push(DeckEntry { card_name, count });
        }

        if main_deck.is_empty() {
            return Err(PocketError::InvalidDeckFormat("Empty deck".to_string()));
        }
        if energy_types.is_empty() {
            return Err(PocketError::InvalidDeckFormat("deck declares no Energy types".to_string()));
        }

        Ok(DeckList {
            name,
            energy_types,
            main_deck,
        })
    }
}

/// Represents a deck entry (card name and count)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckEntry {
    pub card_name: String,
    pub count: u8,
}

/// Represents a complete deck list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckList {
    pub name: String,
    /// Energy types the deck's energy zone generates
    pub energy_types: Vec<EnergyType>,
    pub main_deck: Vec<DeckEntry>,
}

impl DeckList {
    /// Total cards in main deck
    pub fn total_cards(&self) -> usize {
        self.main_deck.iter().map(|e| e.count as usize).sum()
    }

    /// Distinct card names, in first-seen order
    pub fn unique_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for entry in &self.main_deck {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(&entry.card_name)) {
                names.push(entry.card_name.clone());
            }
        }
        names
    }
}
