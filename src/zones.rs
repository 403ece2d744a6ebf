//! Game zones (Active, Bench, Deck, Discard, Hand)
//!
//! Battle state (energy, tools, damage) lives on the zone rather than the card,
//! so a card that leaves play never carries stale damage into its next zone.

use crate::core::{Card, EnergyType};
use crate::{PocketError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Named slots a card can occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneName {
    Active,
    Bench(u8),
    Deck,
    Discard,
    Hand,
}

impl ZoneName {
    /// Zones that hold a Pokémon in play
    pub fn is_in_play(&self) -> bool {
        matches!(self, ZoneName::Active | ZoneName::Bench(_))
    }
}

impl fmt::Display for ZoneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneName::Active => write!(f, "active"),
            ZoneName::Bench(i) => write!(f, "bench{i}"),
            ZoneName::Deck => write!(f, "deck"),
            ZoneName::Discard => write!(f, "discard"),
            ZoneName::Hand => write!(f, "hand"),
        }
    }
}

impl FromStr for ZoneName {
    type Err = PocketError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "active" => Ok(ZoneName::Active),
            "deck" => Ok(ZoneName::Deck),
            "discard" => Ok(ZoneName::Discard),
            "hand" => Ok(ZoneName::Hand),
            other => other
                .strip_prefix("bench")
                .and_then(|n| n.trim_start_matches(['_', ' ']).parse::<u8>().ok())
                .map(ZoneName::Bench)
                .ok_or_else(|| PocketError::ZoneNotFound(s.to_string())),
        }
    }
}

/// A stack of cards plus the battle state of whatever sits on top
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: ZoneName,

    /// Cards in this zone, top of the stack last
    pub cards: Vec<Card>,

    /// Attached energy by type
    pub energy: BTreeMap<EnergyType, u32>,

    /// Attached tool cards
    pub tools: Vec<Card>,

    /// Accumulated damage on the occupant
    pub damage: u32,
}

impl Zone {
    pub fn new(name: ZoneName) -> Self {
        Zone {
            name,
            cards: Vec::new(),
            energy: BTreeMap::new(),
            tools: Vec::new(),
            damage: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Top card (the battling Pokémon for Active/Bench)
    pub fn top(&self) -> Result<&Card> {
        self.cards
            .last()
            .ok_or_else(|| PocketError::EmptyZone(self.name.to_string()))
    }

    pub fn top_mut(&mut self) -> Result<&mut Card> {
        let name = self.name;
        self.cards
            .last_mut()
            .ok_or_else(|| PocketError::EmptyZone(name.to_string()))
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Remove the card at `index`
    pub fn take(&mut self, index: usize) -> Result<Card> {
        if index >= self.cards.len() {
            return Err(PocketError::InvalidAction(format!(
                "index {index} out of range for {} ({} cards)",
                self.name,
                self.cards.len()
            )));
        }
        Ok(self.cards.remove(index))
    }

    /// Empty the zone and reset its battle state, returning every card it held
    ///
    /// Stacked cards come first (bottom to top), followed by attached tools.
    pub fn clear(&mut self) -> Vec<Card> {
        let mut removed = std::mem::take(&mut self.cards);
        removed.append(&mut self.tools);
        self.energy.clear();
        self.damage = 0;
        removed
    }

    pub fn add_energy(&mut self, energy_type: EnergyType, amount: u32) {
        *self.energy.entry(energy_type).or_insert(0) += amount;
    }

    /// Remove energy of a specific type
    pub fn remove_energy(&mut self, energy_type: EnergyType, amount: u32) -> Result<()> {
        let have = self.energy.get(&energy_type).copied().unwrap_or(0);
        if have < amount {
            return Err(PocketError::InvalidAction(format!(
                "{} has {have} {energy_type} energy, cannot remove {amount}",
                self.name
            )));
        }
        if have == amount {
            self.energy.remove(&energy_type);
        } else {
            self.energy.insert(energy_type, have - amount);
        }
        Ok(())
    }

    /// Raw attached-energy count (before effects)
    pub fn energy_count(&self) -> u32 {
        self.energy.values().sum()
    }

    /// Attached energy as (type, count) pairs in type order
    pub fn energy_list(&self) -> Vec<(EnergyType, u32)> {
        self.energy.iter().map(|(t, n)| (*t, *n)).collect()
    }

    pub fn has_tool(&self) -> bool {
        !self.tools.is_empty()
    }
}

/// Collection of all card zones for a player
///
/// The deck is not a `Zone`: it is owned by the player as a `Deck` so it can
/// carry its energy types. `ZoneName::Deck` only appears in event records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerZones {
    pub active: Zone,
    pub bench: Vec<Zone>,
    pub discard: Zone,
    pub hand: Zone,
}

impl PlayerZones {
    pub fn new(bench_size: usize) -> Self {
        PlayerZones {
            active: Zone::new(ZoneName::Active),
            bench: (0..bench_size).map(|i| Zone::new(ZoneName::Bench(i as u8))).collect(),
            discard: Zone::new(ZoneName::Discard),
            hand: Zone::new(ZoneName::Hand),
        }
    }

    pub fn get_zone(&self, name: ZoneName) -> Result<&Zone> {
        match name {
            ZoneName::Active => Ok(&self.active),
            ZoneName::Bench(i) => self
                .bench
                .get(i as usize)
                .ok_or_else(|| PocketError::ZoneNotFound(name.to_string())),
            ZoneName::Discard => Ok(&self.discard),
            ZoneName::Hand => Ok(&self.hand),
            ZoneName::Deck => Err(PocketError::ZoneNotFound(name.to_string())),
        }
    }

    pub fn get_zone_mut(&mut self, name: ZoneName) -> Result<&mut Zone> {
        match name {
            ZoneName::Active => Ok(&mut self.active),
            ZoneName::Bench(i) => self
                .bench
                .get_mut(i as usize)
                .ok_or_else(|| PocketError::ZoneNotFound(name.to_string())),
            ZoneName::Discard => Ok(&mut self.discard),
            ZoneName::Hand => Ok(&mut self.hand),
            ZoneName::Deck => Err(PocketError::ZoneNotFound(name.to_string())),
        }
    }

    /// Active then bench slots in index order
    pub fn in_play(&self) -> impl Iterator<Item = &Zone> + '_ {
        std::iter::once(&self.active).chain(self.bench.iter())
    }

    pub fn in_play_mut(&mut self) -> impl Iterator<Item = &mut Zone> + '_ {
        std::iter::once(&mut self.active).chain(self.bench.iter_mut())
    }

    /// Names of in-play zones, active first
    pub fn in_play_names(&self) -> Vec<ZoneName> {
        self.in_play().map(|z| z.name).collect()
    }

    pub fn bench_occupied(&self) -> usize {
        self.bench.iter().filter(|z| !z.is_empty()).count()
    }

    pub fn first_empty_bench(&self) -> Option<ZoneName> {
        self.bench.iter().find(|z| z.is_empty()).map(|z| z.name)
    }

    /// Swap the full contents of two in-play zones, keeping their names
    pub fn swap(&mut self, a: ZoneName, b: ZoneName) -> Result<()> {
        if a == b {
            return Ok(());
        }
        let first = std::mem::replace(self.get_zone_mut(a)?, Zone::new(a));
        let second = std::mem::replace(self.get_zone_mut(b)?, Zone::new(b));
        *self.get_zone_mut(a)? = Zone { name: a, ..second };
        *self.get_zone_mut(b)? = Zone { name: b, ..first };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardId, Stage};

    fn basic(id: u32, hp: u32) -> Card {
        Card::pokemon(CardId::new(id), "Pikachu", hp, EnergyType::Lightning, Stage::Basic)
    }

    #[test]
    fn test_zone_name_parsing() {
        assert_eq!("active".parse::<ZoneName>().unwrap(), ZoneName::Active);
        assert_eq!("bench2".parse::<ZoneName>().unwrap(), ZoneName::Bench(2));
        assert_eq!("Bench_1".parse::<ZoneName>().unwrap(), ZoneName::Bench(1));
        assert!(matches!("graveyard".parse::<ZoneName>(), Err(PocketError::ZoneNotFound(_))));
        assert_eq!(ZoneName::Bench(0).to_string(), "bench0");
    }

    #[test]
    fn test_top_of_empty_zone_fails() {
        let zone = Zone::new(ZoneName::Active);
        assert!(matches!(zone.top(), Err(PocketError::EmptyZone(_))));
    }

    #[test]
    fn test_clear_resets_battle_state() {
        let mut zone = Zone::new(ZoneName::Active);
        zone.push(basic(1, 60));
        zone.add_energy(EnergyType::Lightning, 2);
        zone.damage = 40;

        let removed = zone.clear();
        assert_eq!(removed.len(), 1);
        assert!(zone.is_empty());
        assert_eq!(zone.energy_count(), 0);
        assert_eq!(zone.damage, 0);
        assert!(!zone.has_tool());
    }

    #[test]
    fn test_energy_bookkeeping() {
        let mut zone = Zone::new(ZoneName::Bench(0));
        zone.add_energy(EnergyType::Fire, 1);
        zone.add_energy(EnergyType::Grass, 2);
        assert_eq!(zone.energy_count(), 3);
        assert_eq!(zone.energy_list(), vec![(EnergyType::Grass, 2), (EnergyType::Fire, 1)]);

        zone.remove_energy(EnergyType::Grass, 2).unwrap();
        assert!(!zone.energy.contains_key(&EnergyType::Grass));
        assert!(zone.remove_energy(EnergyType::Fire, 2).is_err());
    }

    #[test]
    fn test_player_zones_lookup_and_swap() {
        let mut zones = PlayerZones::new(3);
        assert!(zones.get_zone(ZoneName::Bench(3)).is_err());
        assert!(zones.get_zone(ZoneName::Deck).is_err());

        zones.active.push(basic(1, 60));
        zones.active.damage = 10;
        zones.bench[1].push(basic(2, 70));
        zones.bench[1].add_energy(EnergyType::Lightning, 1);

        zones.swap(ZoneName::Active, ZoneName::Bench(1)).unwrap();
        assert_eq!(zones.active.top().unwrap().id, CardId::new(2));
        assert_eq!(zones.active.energy_count(), 1);
        assert_eq!(zones.active.damage, 0);
        assert_eq!(zones.bench[1].top().unwrap().id, CardId::new(1));
        assert_eq!(zones.bench[1].damage, 10);
        assert_eq!(zones.bench[1].name, ZoneName::Bench(1));
        assert_eq!(zones.first_empty_bench(), Some(ZoneName::Bench(0)));
    }
}
