//! Card file loader (.txt format)
//!
//! One card per file, one `Key:Value` pair per line:
//!
//! ```text
//! Name:Charmander
//! Category:Pokemon
//! Stage:Basic
//! HP:60
//! Type:Fire
//! Weakness:Water
//! Retreat:1
//! A:Ember|Fire Colorless|30|Discard a Fire Energy.|
//! ```
//!
//! Attack lines are `A:Name|Cost|Damage|Text|Effects`; ability lines are
//! `Ability:Name|Text|Effects` (activated) or `Passive:Name|Text|Effects`.
//! Effects are `;`-separated descriptors such as `HEAL@self{amount=20}`.
//! Trainer effects use one `E:` line per descriptor.

use crate::core::{Ability, Attack, Card, CardCategory, CardId, CardName, EnergyType, Rarity, Stage};
use crate::effects::EffectDescriptor;
use crate::{PocketError, Result};
use smallvec::SmallVec;
use std::fs;
use std::path::Path;

/// Card loader for .txt files
pub struct CardLoader;

impl CardLoader {
    /// Load a card from a .txt file
    pub fn load_from_file(path: &Path) -> Result<CardDefinition> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a card from its text content
    pub fn parse(content: &str) -> Result<CardDefinition> {
        let mut name = None;
        let mut category = CardCategory::Pokemon;
        let mut stage = None;
        let mut hp = 0;
        let mut energy_type = EnergyType::Colorless;
        let mut evolves_from = None;
        let mut attacks = Vec::new();
        let mut ability = None;
        let mut effects = Vec::new();
        let mut retreat_cost = 0;
        let mut weakness = None;
        let mut resistance = None;
        let mut rarity = Rarity::default();
        let mut set = String::new();
        let mut text = String::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                return Err(PocketError::InvalidCardFormat(format!("expected Key:Value, got '{line}'")));
            };
            let value = value.trim();

            match key.trim() {
                "Name" => name = Some(CardName::new(value)),
                "Category" => category = value.parse()?,
                "Stage" => stage = Some(value.parse()?),
                "HP" => hp = parse_number(key, value)?,
                "Type" => energy_type = value.parse()?,
                "EvolvesFrom" => evolves_from = Some(CardName::new(value)),
                "Weakness" => weakness = parse_optional_energy(value)?,
                "Resistance" => resistance = parse_optional_energy(value)?,
                "Retreat" => retreat_cost = parse_number(key, value)?,
                "Rarity" => rarity = value.parse()?,
                "Set" => set = value.to_string(),
                "Text" => text = value.to_string(),
                "A" => attacks.push(parse_attack(value)?),
                "Ability" => ability = Some(parse_ability(value, false)?),
                "Passive" => ability = Some(parse_ability(value, true)?),
                "E" => effects.push(value.parse()?),
                _ => {} // Unknown keys are ignored so card files can carry extra metadata
            }
        }

        let name = name.ok_or_else(|| PocketError::InvalidCardFormat("Missing card name".to_string()))?;
        let stage = match (category, stage) {
            (CardCategory::Pokemon, Some(stage)) => stage,
            (CardCategory::Pokemon, None) => Stage::Basic,
            (_, _) => Stage::None,
        };
        if category == CardCategory::Pokemon && hp == 0 {
            return Err(PocketError::InvalidCardFormat(format!("{name}: Pokémon without HP")));
        }
        if stage != Stage::Basic && category == CardCategory::Pokemon && evolves_from.is_none() {
            return Err(PocketError::InvalidCardFormat(format!("{name}: evolution without EvolvesFrom")));
        }

        Ok(CardDefinition {
            name,
            category,
            stage,
            hp,
            energy_type,
            evolves_from,
            attacks,
            ability,
            effects,
            retreat_cost,
            weakness,
            resistance,
            rarity,
            set,
            text,
        })
    }
}

fn parse_number(key: &str, value: &str) -> Result<u32> {
    value
        .parse()
        .map_err(|_| PocketError::InvalidCardFormat(format!("{key}: expected a number, got '{value}'")))
}

fn parse_optional_energy(value: &str) -> Result<Option<EnergyType>> {
    match value {
        "" | "-" | "none" | "None" => Ok(None),
        other => other.parse().map(Some),
    }
}

/// `Fire Colorless`, `R,C` and `-` (free) are all accepted
fn parse_cost(value: &str) -> Result<SmallVec<[EnergyType; 4]>> {
    value
        .split([' ', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "-")
        .map(str::parse)
        .collect()
}

fn parse_effects(value: &str) -> Result<Vec<EffectDescriptor>> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

fn parse_attack(value: &str) -> Result<Attack> {
    let mut parts = value.split('|').map(str::trim);
    let name = parts
        .next()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| PocketError::InvalidCardFormat(format!("attack without a name: '{value}'")))?;
    let cost = parse_cost(parts.next().unwrap_or(""))?;
    let damage = match parts.next().unwrap_or("") {
        "" => 0,
        raw => parse_number("A", raw)?,
    };
    let text = parts.next().unwrap_or("").to_string();
    let effects = parse_effects(parts.next().unwrap_or(""))?;

    Ok(Attack {
        name: name.to_string(),
        cost,
        damage,
        text,
        effects,
    })
}

fn parse_ability(value: &str, passive: bool) -> Result<Ability> {
    let mut parts = value.split('|').map(str::trim);
    let name = parts
        .next()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| PocketError::InvalidCardFormat(format!("ability without a name: '{value}'")))?;
    let text = parts.next().unwrap_or("").to_string();
    let effects = parse_effects(parts.next().unwrap_or(""))?;

    Ok(Ability {
        name: name.to_string(),
        text,
        effects,
        passive,
    })
}

/// Card definition (not yet instantiated in a game)
#[derive(Debug, Clone, PartialEq)]
pub struct CardDefinition {
    pub name: CardName,
    pub category: CardCategory,
    pub stage: Stage,
    pub hp: u32,
    pub energy_type: EnergyType,
    pub evolves_from: Option<CardName>,
    pub attacks: Vec<Attack>,
    pub ability: Option<Ability>,
    /// Trainer effects
    pub effects: Vec<EffectDescriptor>,
    pub retreat_cost: u32,
    pub weakness: Option<EnergyType>,
    pub resistance: Option<EnergyType>,
    pub rarity: Rarity,
    pub set: String,
    /// Printed rules text
    pub text: String,
}

impl CardDefinition {
    /// Create a Card instance from this definition
    pub fn instantiate(&self, id: CardId) -> Card {
        let mut card = Card::pokemon(id, self.name.clone(), self.hp, self.energy_type, self.stage);
        card.category = self.category;
        card.evolves_from = self.evolves_from.clone();
        card.attacks = self.attacks.clone();
        card.ability = self.ability.clone();
        card.effects = self.effects.clone();
        card.retreat_cost = self.retreat_cost;
        card.weakness = self.weakness;
        card.resistance = self.resistance;
        card.rarity = self.rarity;
        card.set = self.set.clone();
        card
    }
}
