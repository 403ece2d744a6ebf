//! Strongly-typed wrappers and enumerations for game concepts
//!
//! Newtypes keep card names and player names from being mixed up with other
//! strings, and the enums here are the taxonomy shared by cards, zones and
//! effects.

use crate::{PocketError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Card name (distinct from other string types)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardName(String);

impl CardName {
    pub fn new(s: impl Into<String>) -> Self {
        CardName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_lowercase(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for CardName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CardName {
    fn from(s: String) -> Self {
        CardName(s)
    }
}

impl From<&str> for CardName {
    fn from(s: &str) -> Self {
        CardName(s.to_string())
    }
}

/// Player name (distinct from other string types)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(s: impl Into<String>) -> Self {
        PlayerName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PlayerName {
    fn from(s: String) -> Self {
        PlayerName(s)
    }
}

impl From<&str> for PlayerName {
    fn from(s: &str) -> Self {
        PlayerName(s.to_string())
    }
}

/// Elemental energy types
///
/// The derived ordering is used wherever energy has to be iterated in a
/// deterministic order (energy maps, discarding energy to pay retreat costs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyType {
    Grass,
    Fire,
    Water,
    Lightning,
    Psychic,
    Fighting,
    Darkness,
    Metal,
    Dragon,
    Colorless,
}

impl EnergyType {
    /// Energy types that a deck can generate (everything except Colorless)
    pub fn concrete_types() -> &'static [EnergyType] {
        &[
            EnergyType::Grass,
            EnergyType::Fire,
            EnergyType::Water,
            EnergyType::Lightning,
            EnergyType::Psychic,
            EnergyType::Fighting,
            EnergyType::Darkness,
            EnergyType::Metal,
            EnergyType::Dragon,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyType::Grass => "grass",
            EnergyType::Fire => "fire",
            EnergyType::Water => "water",
            EnergyType::Lightning => "lightning",
            EnergyType::Psychic => "psychic",
            EnergyType::Fighting => "fighting",
            EnergyType::Darkness => "darkness",
            EnergyType::Metal => "metal",
            EnergyType::Dragon => "dragon",
            EnergyType::Colorless => "colorless",
        }
    }
}

impl fmt::Display for EnergyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnergyType {
    type Err = PocketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "grass" | "g" => Ok(EnergyType::Grass),
            "fire" | "r" => Ok(EnergyType::Fire),
            "water" | "w" => Ok(EnergyType::Water),
            "lightning" | "l" => Ok(EnergyType::Lightning),
            "psychic" | "p" => Ok(EnergyType::Psychic),
            "fighting" | "f" => Ok(EnergyType::Fighting),
            "darkness" | "d" => Ok(EnergyType::Darkness),
            "metal" | "m" => Ok(EnergyType::Metal),
            "dragon" => Ok(EnergyType::Dragon),
            "colorless" | "c" => Ok(EnergyType::Colorless),
            other => Err(PocketError::InvalidCardFormat(format!(
                "unknown energy type '{other}'"
            ))),
        }
    }
}

/// Card rarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rarity {
    #[default]
    OneDiamond,
    TwoDiamond,
    ThreeDiamond,
    FourDiamond,
    OneStar,
    TwoStar,
    ThreeStar,
    Crown,
    Promo,
}

impl FromStr for Rarity {
    type Err = PocketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace([' ', '_', '-'], "").as_str() {
            "onediamond" | "1d" | "common" => Ok(Rarity::OneDiamond),
            "twodiamond" | "2d" | "uncommon" => Ok(Rarity::TwoDiamond),
            "threediamond" | "3d" | "rare" => Ok(Rarity::ThreeDiamond),
            "fourdiamond" | "4d" | "doublerare" => Ok(Rarity::FourDiamond),
            "onestar" | "1s" => Ok(Rarity::OneStar),
            "twostar" | "2s" => Ok(Rarity::TwoStar),
            "threestar" | "3s" => Ok(Rarity::ThreeStar),
            "crown" => Ok(Rarity::Crown),
            "promo" => Ok(Rarity::Promo),
            other => Err(PocketError::InvalidCardFormat(format!("unknown rarity '{other}'"))),
        }
    }
}

/// Card categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardCategory {
    Pokemon,
    Item,
    Supporter,
    Tool,
}

impl CardCategory {
    pub fn is_trainer(&self) -> bool {
        !matches!(self, CardCategory::Pokemon)
    }
}

impl FromStr for CardCategory {
    type Err = PocketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pokemon" | "pokémon" => Ok(CardCategory::Pokemon),
            "item" => Ok(CardCategory::Item),
            "supporter" => Ok(CardCategory::Supporter),
            "tool" => Ok(CardCategory::Tool),
            other => Err(PocketError::InvalidCardFormat(format!(
                "unknown card category '{other}'"
            ))),
        }
    }
}

/// Evolution stage of a Pokémon (trainers use `None`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Basic,
    Stage1,
    Stage2,
    None,
}

impl Stage {
    /// The stage a card evolving from this one must have
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Basic => Some(Stage::Stage1),
            Stage::Stage1 => Some(Stage::Stage2),
            Stage::Stage2 | Stage::None => None,
        }
    }
}

impl FromStr for Stage {
    type Err = PocketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace([' ', '_', '-'], "").as_str() {
            "basic" => Ok(Stage::Basic),
            "stage1" => Ok(Stage::Stage1),
            "stage2" => Ok(Stage::Stage2),
            "none" | "" => Ok(Stage::None),
            other => Err(PocketError::InvalidCardFormat(format!("unknown stage '{other}'"))),
        }
    }
}
