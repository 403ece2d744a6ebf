//! Live effect storage and rule queries
//!
//! Effects are resolved lazily: nothing is written into cards or zones, every
//! rule-sensitive value is recomputed from the live effects when asked for.

use crate::core::{CardId, EffectId};
use crate::effects::{kinds, Effect, EffectRegistry, EffectTarget, SourceCategory, Timing, PERMANENT};
use crate::game::GameState;
use crate::zones::ZoneName;
use crate::{PocketError, Result};
use serde::{Deserialize, Serialize};

/// Selects effects for bulk removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFilter {
    Card(CardId),
    Category(SourceCategory),
}

/// Stores live effects in insertion order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectManager {
    effects: Vec<Effect>,
}

impl EffectManager {
    pub fn new() -> Self {
        EffectManager { effects: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> + '_ {
        self.effects.iter()
    }

    pub fn get(&self, id: EffectId) -> Option<&Effect> {
        self.effects.iter().find(|e| e.id == id)
    }

    /// Is an effect of this type already live on exactly this target?
    pub fn has_effect(&self, effect_type: &str, target: Option<EffectTarget>) -> bool {
        self.effects
            .iter()
            .any(|e| e.effect_type == effect_type && e.target == target)
    }

    pub fn add_effect(&mut self, effect: Effect) -> Result<()> {
        if self.get(effect.id).is_some() {
            return Err(PocketError::EffectIdCollision(effect.id.as_u32()));
        }
        self.effects.push(effect);
        Ok(())
    }

    pub fn remove_effect(&mut self, id: EffectId) -> Option<Effect> {
        let pos = self.effects.iter().position(|e| e.id == id)?;
        Some(self.effects.remove(pos))
    }

    /// Remove source-bound effects whose source matches `filter`
    ///
    /// Effects that do not require a live source stay in place.
    pub fn remove_effects_by_source(&mut self, filter: SourceFilter) -> Vec<Effect> {
        self.drain_where(|e| {
            e.requires_source
                && match filter {
                    SourceFilter::Card(card) => e.source.card == Some(card),
                    SourceFilter::Category(category) => e.source.category == category,
                }
        })
    }

    /// Remove effects aimed at a specific card
    pub fn remove_effects_targeting(&mut self, card: CardId) -> Vec<Effect> {
        self.drain_where(|e| e.target.is_some_and(|t| t.card == Some(card)))
    }

    /// Point effects at an evolved card
    pub fn retarget(&mut self, from: CardId, to: CardId) {
        for effect in &mut self.effects {
            if let Some(target) = effect.target.as_mut() {
                if target.card == Some(from) {
                    target.card = Some(to);
                }
            }
        }
    }

    fn drain_where(&mut self, pred: impl Fn(&Effect) -> bool) -> Vec<Effect> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.effects.len());
        for effect in self.effects.drain(..) {
            if pred(&effect) {
                removed.push(effect);
            } else {
                kept.push(effect);
            }
        }
        self.effects = kept;
        removed
    }

    /// Active effects, optionally of one type, ascending by priority
    ///
    /// The sort is stable, so equal priorities keep insertion order.
    pub fn active_effects(&self, state: &GameState, type_filter: Option<&str>) -> Vec<&Effect> {
        let mut active: Vec<&Effect> = self
            .effects
            .iter()
            .filter(|e| type_filter.map_or(true, |t| e.effect_type == t))
            .filter(|e| e.is_active(state))
            .collect();
        active.sort_by_key(|e| e.priority);
        active
    }

    /// IDs of effects with the given timing, in priority order
    pub fn ids_with_timing(&self, state: &GameState, timing: Timing) -> Vec<EffectId> {
        self.active_effects(state, None)
            .into_iter()
            .filter(|e| e.timing == timing)
            .map(|e| e.id)
            .collect()
    }

    /// Fold every active effect of `effect_type` reaching `player`'s `card`
    fn fold(&self, state: &GameState, effect_type: &str, player: usize, card: CardId, base: i32) -> i32 {
        self.active_effects(state, Some(effect_type))
            .into_iter()
            .filter(|e| e.applies_to(player, card))
            .fold(base, |value, e| e.modify(value))
    }

    /// Retreat cost of the Pokémon in `zone`, clamped at zero
    pub fn calculate_retreat_cost(&self, state: &GameState, player: usize, zone: ZoneName) -> Result<u32> {
        let card = state.player(player)?.zones.get_zone(zone)?.top()?;
        let cost = self.fold(state, kinds::MODIFY_RETREAT_COST, player, card.id, card.retreat_cost as i32);
        Ok(cost.max(0) as u32)
    }

    /// Attached energy count of `zone` after energy modifiers, clamped at zero
    pub fn calculate_attached_energy(&self, state: &GameState, player: usize, zone: ZoneName) -> Result<u32> {
        let z = state.player(player)?.zones.get_zone(zone)?;
        let card = z.top()?;
        let count = self.fold(state, kinds::MODIFY_ENERGY_COUNT, player, card.id, z.energy_count() as i32);
        Ok(count.max(0) as u32)
    }

    /// Generic energy granted (or removed) by energy modifiers
    pub fn energy_bonus(&self, state: &GameState, player: usize, zone: ZoneName) -> Result<i32> {
        let raw = state.player(player)?.zones.get_zone(zone)?.energy_count() as i32;
        Ok(self.calculate_attached_energy(state, player, zone)? as i32 - raw)
    }

    pub fn is_retreat_disabled(&self, state: &GameState, player: usize, card: CardId) -> bool {
        self.active_effects(state, Some(kinds::DISABLE_RETREAT))
            .into_iter()
            .any(|e| e.applies_to(player, card))
    }

    pub fn can_retreat(&self, state: &GameState, player: usize, zone: ZoneName) -> Result<bool> {
        let card = state.player(player)?.zones.get_zone(zone)?.top()?;
        if self.is_retreat_disabled(state, player, card.id) {
            return Ok(false);
        }
        Ok(self.calculate_attached_energy(state, player, zone)?
            >= self.calculate_retreat_cost(state, player, zone)?)
    }

    /// Apply damage modifiers for an attack on `defender`
    ///
    /// Incoming modifiers target the defender; modifiers with `outgoing=true`
    /// target the attacker.
    pub fn modify_damage(
        &self,
        state: &GameState,
        defender: (usize, CardId),
        attacker: Option<(usize, CardId)>,
        damage: i32,
    ) -> i32 {
        self.active_effects(state, Some(kinds::MODIFY_DAMAGE))
            .into_iter()
            .filter(|e| {
                if e.params.get_bool("outgoing").unwrap_or(false) {
                    attacker.is_some_and(|(p, c)| e.applies_to(p, c))
                } else {
                    e.applies_to(defender.0, defender.1)
                }
            })
            .fold(damage, |value, e| e.modify(value))
    }

    /// Is `candidate` blocked by an active prevention effect?
    pub fn can_apply_effect(&self, state: &GameState, candidate: &Effect) -> bool {
        !self
            .active_effects(state, Some(kinds::PREVENT_EFFECT))
            .into_iter()
            .any(|guard| guard.prevents(&candidate.effect_type) && targets_overlap(guard, candidate))
    }

    /// Count every non-permanent effect down by one and drop the expired ones
    ///
    /// Returns the removed effects in insertion order.
    pub fn tickdown(&mut self) -> Vec<Effect> {
        for effect in &mut self.effects {
            if effect.duration != PERMANENT {
                effect.duration -= 1;
            }
        }
        self.drain_where(|e| e.duration != PERMANENT && e.duration <= 0)
    }

    /// Rebuild behavior objects (after deserialization)
    pub fn rehydrate(&mut self, registry: &EffectRegistry) -> Result<()> {
        for effect in &mut self.effects {
            effect.rehydrate(registry)?;
        }
        Ok(())
    }
}

/// A guard with no target covers everything; otherwise it covers candidates
/// aimed at the same player (and the same card when the guard names one).
fn targets_overlap(guard: &Effect, candidate: &Effect) -> bool {
    match (guard.target, candidate.target) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(g), Some(c)) => g.player == c.player && (g.card.is_none() || g.card == c.card),
    }
}
