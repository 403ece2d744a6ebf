//! Built-in effect types

use crate::effects::{
    kinds, Effect, EffectBehavior, EffectContext, EffectParams, EffectRegistry, EffectTarget,
    EffectTypeDescriptor, Timing, PERMANENT,
};
use crate::game::{actions, combat};
use crate::game::GameState;
use crate::zones::ZoneName;
use crate::{PocketError, Result};
use std::sync::Arc;

/// Register every built-in effect type
pub fn register_all(registry: &mut EffectRegistry) -> Result<()> {
    // (name, timing, default duration, requires source, needs target, unique, factory)
    let entries: [(&str, Timing, i32, bool, bool, bool, crate::effects::EffectFactory); 10] = [
        (kinds::DAMAGE, Timing::Immediate, 0, false, true, false, create_damage),
        (kinds::HEAL, Timing::Immediate, 0, false, true, false, create_heal),
        (kinds::DRAW_CARDS, Timing::Immediate, 0, false, false, false, create_draw),
        (kinds::MODIFY_DAMAGE, Timing::Continuous, 2, false, false, false, create_modifier::<DAMAGE_TAG>),
        (kinds::MODIFY_RETREAT_COST, Timing::Continuous, PERMANENT, true, false, false, create_modifier::<RETREAT_TAG>),
        (kinds::DISABLE_RETREAT, Timing::Continuous, 2, false, false, false, create_disable_retreat),
        (kinds::MODIFY_ENERGY_COUNT, Timing::Continuous, PERMANENT, true, false, false, create_modifier::<ENERGY_TAG>),
        (kinds::PREVENT_EFFECT, Timing::Continuous, 2, true, false, false, create_prevent),
        (kinds::DAMAGE_REACTION, Timing::OnDamageTaken, PERMANENT, true, true, false, create_reaction),
        // Poisoned is a status: a second dose changes nothing
        (kinds::POISON, Timing::BetweenTurns, PERMANENT, false, true, true, create_poison),
    ];

    for (name, timing, default_duration, requires_source, needs_target, unique, create) in entries {
        registry.register(
            name,
            EffectTypeDescriptor {
                timing,
                default_duration,
                default_priority: 0,
                requires_source,
                needs_target,
                unique,
                create,
            },
        )?;
    }
    Ok(())
}

const DAMAGE_TAG: u8 = 0;
const RETREAT_TAG: u8 = 1;
const ENERGY_TAG: u8 = 2;

fn modifier_kind(tag: u8) -> &'static str {
    match tag {
        DAMAGE_TAG => kinds::MODIFY_DAMAGE,
        RETREAT_TAG => kinds::MODIFY_RETREAT_COST,
        _ => kinds::MODIFY_ENERGY_COUNT,
    }
}

fn positive(params: &EffectParams, effect_type: &str, key: &str) -> Result<i32> {
    let value = params.require_i64(effect_type, key)?;
    if value < 0 {
        return Err(PocketError::InvalidEffectParams {
            effect_type: effect_type.to_string(),
            reason: format!("'{key}' must not be negative, got {value}"),
        });
    }
    Ok(value as i32)
}

/// Zones a target resolves to: the named card wherever it is in play, or
/// every occupied in-play zone of the player
fn target_zones(state: &GameState, target: EffectTarget) -> Vec<ZoneName> {
    match target.card {
        Some(card) => state.find_pokemon(target.player, card).into_iter().collect(),
        None => state
            .player(target.player)
            .map(|p| p.zones.in_play().filter(|z| !z.is_empty()).map(|z| z.name).collect())
            .unwrap_or_default(),
    }
}

fn require_target(ctx: &EffectContext, effect_type: &str) -> Result<EffectTarget> {
    ctx.target.ok_or_else(|| PocketError::InvalidEffectParams {
        effect_type: effect_type.to_string(),
        reason: "effect needs a target".to_string(),
    })
}

#[derive(Debug)]
struct Damage {
    amount: i32,
}

fn create_damage(params: &EffectParams) -> Result<Arc<dyn EffectBehavior>> {
    Ok(Arc::new(Damage {
        amount: positive(params, kinds::DAMAGE, "amount")?,
    }))
}

impl EffectBehavior for Damage {
    fn run(&self, state: &mut GameState, ctx: &EffectContext) -> Result<()> {
        let target = require_target(ctx, kinds::DAMAGE)?;
        for zone in target_zones(state, target) {
            combat::apply_damage_counters(state, target.player, zone, self.amount)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Heal {
    amount: i32,
}

fn create_heal(params: &EffectParams) -> Result<Arc<dyn EffectBehavior>> {
    Ok(Arc::new(Heal {
        amount: positive(params, kinds::HEAL, "amount")?,
    }))
}

impl EffectBehavior for Heal {
    fn run(&self, state: &mut GameState, ctx: &EffectContext) -> Result<()> {
        let target = require_target(ctx, kinds::HEAL)?;
        for zone in target_zones(state, target) {
            combat::apply_damage_counters(state, target.player, zone, -self.amount)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
struct DrawCards {
    count: i32,
}

fn create_draw(params: &EffectParams) -> Result<Arc<dyn EffectBehavior>> {
    let count = match params.get_i64("count") {
        Some(_) => positive(params, kinds::DRAW_CARDS, "count")?,
        None => 1,
    };
    Ok(Arc::new(DrawCards { count }))
}

impl EffectBehavior for DrawCards {
    fn run(&self, state: &mut GameState, ctx: &EffectContext) -> Result<()> {
        let player = ctx.target.map_or(ctx.source.player, |t| t.player);
        for _ in 0..self.count {
            // Card effects draw what they can; running dry is not a deck-out
            match actions::draw_card(state, player) {
                Ok(()) => {}
                Err(PocketError::EmptyDeck(_)) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// Adds `amount` to a rule value
///
/// With `while_active=true` the modifier only counts while its target sits in
/// the active slot.
#[derive(Debug)]
struct Modifier {
    amount: i32,
    while_active: bool,
}

fn create_modifier<const TAG: u8>(params: &EffectParams) -> Result<Arc<dyn EffectBehavior>> {
    Ok(Arc::new(Modifier {
        amount: params.require_i64(modifier_kind(TAG), "amount")? as i32,
        while_active: params.get_bool("while_active").unwrap_or(false),
    }))
}

impl EffectBehavior for Modifier {
    fn modify(&self, value: i32) -> i32 {
        value + self.amount
    }

    fn is_active(&self, state: &GameState, effect: &Effect) -> bool {
        if !self.while_active {
            return true;
        }
        match effect.target {
            Some(EffectTarget { player, card: Some(card) }) => {
                state.find_pokemon(player, card) == Some(ZoneName::Active)
            }
            _ => true,
        }
    }
}

/// Presence alone blocks retreat
#[derive(Debug)]
struct DisableRetreat;

fn create_disable_retreat(_params: &EffectParams) -> Result<Arc<dyn EffectBehavior>> {
    Ok(Arc::new(DisableRetreat))
}

impl EffectBehavior for DisableRetreat {}

#[derive(Debug)]
struct Prevent {
    effect_type: String,
}

fn create_prevent(params: &EffectParams) -> Result<Arc<dyn EffectBehavior>> {
    let effect_type = params
        .get_str("effect")
        .ok_or_else(|| PocketError::InvalidEffectParams {
            effect_type: kinds::PREVENT_EFFECT.to_string(),
            reason: "missing string parameter 'effect'".to_string(),
        })?;
    Ok(Arc::new(Prevent {
        effect_type: effect_type.to_uppercase(),
    }))
}

impl EffectBehavior for Prevent {
    fn prevents(&self, effect_type: &str) -> bool {
        self.effect_type == effect_type
    }
}

/// Strikes back at the opposing active Pokémon after taking damage
#[derive(Debug)]
struct DamageReaction {
    amount: i32,
}

fn create_reaction(params: &EffectParams) -> Result<Arc<dyn EffectBehavior>> {
    Ok(Arc::new(DamageReaction {
        amount: positive(params, kinds::DAMAGE_REACTION, "amount")?,
    }))
}

impl EffectBehavior for DamageReaction {
    fn run(&self, state: &mut GameState, ctx: &EffectContext) -> Result<()> {
        if ctx.amount <= 0 {
            return Ok(());
        }
        let target = require_target(ctx, kinds::DAMAGE_REACTION)?;
        let opponent = GameState::opponent_of(target.player);
        if state.player(opponent)?.zones.active.is_empty() {
            return Ok(());
        }
        combat::place_damage_counters(state, opponent, ZoneName::Active, self.amount)?;
        Ok(())
    }
}

#[derive(Debug)]
struct Poison {
    amount: i32,
}

fn create_poison(params: &EffectParams) -> Result<Arc<dyn EffectBehavior>> {
    let amount = match params.get_i64("amount") {
        Some(_) => positive(params, kinds::POISON, "amount")?,
        None => 10,
    };
    Ok(Arc::new(Poison { amount }))
}

impl EffectBehavior for Poison {
    fn run(&self, state: &mut GameState, ctx: &EffectContext) -> Result<()> {
        let target = require_target(ctx, kinds::POISON)?;
        for zone in target_zones(state, target) {
            combat::place_damage_counters(state, target.player, zone, self.amount)?;
        }
        Ok(())
    }
}
