//! Damage and attack resolution

use crate::core::{CardId, EnergyType};
use crate::effects::{EffectSource, SourceCategory, Timing};
use crate::game::{actions, check_state_based_actions, GameEventData, GameState};
use crate::zones::ZoneName;
use crate::{PocketError, Result};

/// Switches for `apply_damage_calculation`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DamageOptions {
    /// Add the weakness bonus (and subtract resistance)
    pub apply_weakness: bool,
    /// Skip damage-modifying effects
    pub ignore_target_effects: bool,
    /// Attacking Pokémon, for modifiers on the dealing side
    pub attacker: Option<(usize, CardId)>,
}

/// Compute and commit damage to the Pokémon in `zone`
///
/// Returns the damage actually applied.
pub fn apply_damage_calculation(
    state: &mut GameState,
    player: usize,
    zone: ZoneName,
    base_damage: u32,
    damage_type: EnergyType,
    options: DamageOptions,
) -> Result<i32> {
    let target = state.player(player)?.zones.get_zone(zone)?.top()?;
    let target_id = target.id;
    let mut damage = base_damage as i32;

    if options.apply_weakness {
        if target.weakness == Some(damage_type) {
            damage += state.config.weakness_bonus as i32;
        }
        if target.resistance == Some(damage_type) {
            damage -= state.config.resistance_reduction as i32;
        }
    }

    if !options.ignore_target_effects {
        damage = state
            .effects
            .modify_damage(state, (player, target_id), options.attacker, damage);
    }

    apply_damage_counters(state, player, zone, damage.max(0))
}

/// Add (or with a negative amount, heal) damage and fire damage reactions
///
/// Damage is clamped to `[0, hp]`; the returned delta is what actually
/// changed. Reactions only fire when damage went up.
pub fn apply_damage_counters(state: &mut GameState, player: usize, zone: ZoneName, amount: i32) -> Result<i32> {
    let delta = place_damage_counters(state, player, zone, amount)?;
    if delta > 0 {
        let card = state.player(player)?.zones.get_zone(zone)?.top()?.id;
        trigger_damage_reactions(state, player, card, delta)?;
    }
    Ok(delta)
}

/// Change damage without triggering reactions
///
/// Used for damage that is itself a reaction or a between-turns effect.
pub fn place_damage_counters(state: &mut GameState, player: usize, zone: ZoneName, amount: i32) -> Result<i32> {
    let z = state.player_mut(player)?.zones.get_zone_mut(zone)?;
    let card = z.top()?;
    let card_id = card.id;
    let hp = card.hp as i64;

    let old = z.damage as i64;
    let new = (old + amount as i64).clamp(0, hp);
    z.damage = new as u32;
    let delta = (new - old) as i32;

    if delta != 0 {
        state.emit(GameEventData::DamageApplied {
            player,
            zone,
            card: card_id,
            amount: delta,
            total: new as u32,
        });
    }
    Ok(delta)
}

fn trigger_damage_reactions(state: &mut GameState, player: usize, card: CardId, delta: i32) -> Result<()> {
    for id in state.effects.ids_with_timing(state, Timing::OnDamageTaken) {
        let Some(effect) = state.effects.get(id) else {
            continue;
        };
        if !effect.applies_to(player, card) {
            continue;
        }
        let ctx = effect.context(delta);
        if let Some(behavior) = effect.behavior() {
            behavior.run(state, &ctx)?;
        }
    }
    Ok(())
}

/// Resolve the attack at `attack_index` of `player`'s active Pokémon
///
/// Base damage goes to the defending active Pokémon, then each structured
/// effect resolves in printed order, then state-based actions run.
pub fn resolve_attack(state: &mut GameState, player: usize, attack_index: usize) -> Result<()> {
    let attacker = state.player(player)?.zones.active.top()?;
    let attack = attacker
        .attacks
        .get(attack_index)
        .cloned()
        .ok_or_else(|| {
            PocketError::InvalidAction(format!("{} has no attack #{attack_index}", attacker.name))
        })?;
    let attacker_id = attacker.id;
    let attacker_type = attacker.energy_type;

    state.emit(GameEventData::AttackDeclared {
        player,
        attacker: attacker_id,
        attack_name: attack.name.clone(),
    });

    let defender = GameState::opponent_of(player);
    if attack.damage > 0 && !state.player(defender)?.zones.active.is_empty() {
        apply_damage_calculation(
            state,
            defender,
            ZoneName::Active,
            attack.damage,
            attacker_type,
            DamageOptions {
                apply_weakness: true,
                ignore_target_effects: false,
                attacker: Some((player, attacker_id)),
            },
        )?;
    }

    let source = EffectSource {
        player,
        card: Some(attacker_id),
        category: SourceCategory::Attack,
    };
    for descriptor in &attack.effects {
        actions::apply_effect_descriptor(state, descriptor, source, Some(attacker_id))?;
    }

    check_state_based_actions(state)
}
