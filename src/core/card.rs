//! Card types and definitions

use crate::core::{CardCategory, CardId, CardName, EnergyType, Rarity, Stage};
use crate::effects::{EffectDescriptor, SourceCategory};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// An attack printed on a Pokémon card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attack {
    pub name: String,

    /// Energy cost, one entry per required unit (Colorless = any type)
    pub cost: SmallVec<[EnergyType; 4]>,

    /// Base damage to the defending active Pokémon
    pub damage: u32,

    /// Card text, kept for display
    pub text: String,

    /// Structured effects resolved through the effect registry
    pub effects: Vec<EffectDescriptor>,
}

impl Attack {
    pub fn new(name: impl Into<String>, cost: &[EnergyType], damage: u32) -> Self {
        Attack {
            name: name.into(),
            cost: SmallVec::from_slice(cost),
            damage,
            text: String::new(),
            effects: Vec::new(),
        }
    }

    pub fn with_effect(mut self, effect: EffectDescriptor) -> Self {
        self.effects.push(effect);
        self
    }

    /// Check whether the attached energy pays for this attack
    ///
    /// Typed requirements are matched first, then Colorless requirements are
    /// paid from whatever is left plus `bonus` generic energy granted by
    /// effects.
    pub fn is_affordable(&self, attached: &[(EnergyType, u32)], bonus: i32) -> bool {
        let mut remaining: SmallVec<[(EnergyType, u32); 4]> = SmallVec::from_slice(attached);
        let mut colorless_needed = 0u32;

        for &required in &self.cost {
            if required == EnergyType::Colorless {
                colorless_needed += 1;
                continue;
            }
            match remaining.iter_mut().find(|(t, n)| *t == required && *n > 0) {
                Some((_, n)) => *n -= 1,
                None => return false,
            }
        }

        let leftover: i64 = remaining.iter().map(|(_, n)| *n as i64).sum::<i64>() + bonus as i64;
        leftover >= colorless_needed as i64
    }
}

/// A Pokémon ability, either activated once per turn or passive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    pub text: String,
    pub effects: Vec<EffectDescriptor>,
    /// Passive abilities register their effects when the Pokémon enters play
    #[serde(default)]
    pub passive: bool,
}

/// Represents a card instance in the game
///
/// Identity and printed data never change after construction; `can_evolve` is
/// the only battle flag and the engine resets it every turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Unique ID for this card instance
    pub id: CardId,

    pub name: CardName,

    pub hp: u32,

    /// Elemental type (Colorless for trainers)
    pub energy_type: EnergyType,

    pub category: CardCategory,

    pub stage: Stage,

    /// Name of the Pokémon this one evolves from
    pub evolves_from: Option<CardName>,

    pub attacks: Vec<Attack>,

    pub ability: Option<Ability>,

    /// Trainer effects (Item, Supporter and Tool cards)
    pub effects: Vec<EffectDescriptor>,

    pub retreat_cost: u32,

    pub weakness: Option<EnergyType>,

    pub resistance: Option<EnergyType>,

    pub rarity: Rarity,

    /// Originating set code (e.g., "A1")
    pub set: String,

    /// Index of the owning player, assigned at game start
    pub owner: usize,

    /// Can this Pokémon evolve this turn?
    pub can_evolve: bool,
}

impl Card {
    /// Create a Pokémon card with no attacks
    pub fn pokemon(id: CardId, name: impl Into<CardName>, hp: u32, energy_type: EnergyType, stage: Stage) -> Self {
        Card {
            id,
            name: name.into(),
            hp,
            energy_type,
            category: CardCategory::Pokemon,
            stage,
            evolves_from: None,
            attacks: Vec::new(),
            ability: None,
            effects: Vec::new(),
            retreat_cost: 0,
            weakness: None,
            resistance: None,
            rarity: Rarity::default(),
            set: String::new(),
            owner: 0,
            can_evolve: false,
        }
    }

    /// Create a trainer card (Item, Supporter or Tool)
    pub fn trainer(id: CardId, name: impl Into<CardName>, category: CardCategory) -> Self {
        Card {
            category,
            stage: Stage::None,
            ..Card::pokemon(id, name, 0, EnergyType::Colorless, Stage::None)
        }
    }

    pub fn with_attack(mut self, attack: Attack) -> Self {
        self.attacks.push(attack);
        self
    }

    pub fn with_weakness(mut self, weakness: EnergyType) -> Self {
        self.weakness = Some(weakness);
        self
    }

    pub fn with_retreat_cost(mut self, cost: u32) -> Self {
        self.retreat_cost = cost;
        self
    }

    pub fn with_evolves_from(mut self, name: impl Into<CardName>) -> Self {
        self.evolves_from = Some(name.into());
        self
    }

    pub fn with_effect(mut self, effect: EffectDescriptor) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn is_pokemon(&self) -> bool {
        self.category == CardCategory::Pokemon
    }

    pub fn is_basic(&self) -> bool {
        self.is_pokemon() && self.stage == Stage::Basic
    }

    pub fn is_trainer(&self) -> bool {
        self.category.is_trainer()
    }

    /// Every printed effect with the kind of object that carries it
    pub fn carried_effects(&self) -> impl Iterator<Item = (SourceCategory, &EffectDescriptor)> + '_ {
        let trainer = if self.category == CardCategory::Tool {
            SourceCategory::Tool
        } else {
            SourceCategory::Trainer
        };
        self.attacks
            .iter()
            .flat_map(|a| a.effects.iter().map(|d| (SourceCategory::Attack, d)))
            .chain(
                self.ability
                    .iter()
                    .flat_map(|a| a.effects.iter().map(|d| (SourceCategory::Ability, d))),
            )
            .chain(self.effects.iter().map(move |d| (trainer, d)))
    }

    /// Can this card be placed on top of `base` as its evolution?
    pub fn evolves_onto(&self, base: &Card) -> bool {
        self.is_pokemon()
            && self.evolves_from.as_ref() == Some(&base.name)
            && base.stage.next() == Some(self.stage)
    }
}
