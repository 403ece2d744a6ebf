//! Game actions
//!
//! Atomic state mutators. Each one performs a single semantic change and
//! records the events describing it. Damage lives in `combat`.

use crate::core::{CardCategory, CardId};
use crate::effects::{
    Effect, EffectDescriptor, EffectSource, EffectTarget, SourceCategory, SourceFilter, TargetSpec, Timing,
};
use crate::game::{
    check_state_based_actions, GameEndReason, GameEventData, GameOutcome, GameState, InputRequestKind, Phase,
    RemovalReason,
};
use crate::zones::ZoneName;
use crate::{PocketError, Result};
use rand::Rng;
use smallvec::smallvec;
use std::sync::Arc;

/// Shuffle a player's deck in place
pub fn shuffle_deck(state: &mut GameState, player: usize) -> Result<()> {
    let GameState { players, rng, .. } = state;
    players
        .get_mut(player)
        .ok_or_else(|| PocketError::InvalidAction(format!("no player {player}")))?
        .deck
        .shuffle(rng);
    state.emit(GameEventData::DeckShuffled { player });
    Ok(())
}

/// Move the top card of the deck to the hand
///
/// Fails with `EmptyDeck` when there is nothing to draw; the caller decides
/// whether that is a loss.
pub fn draw_card(state: &mut GameState, player: usize) -> Result<()> {
    let p = state.player_mut(player)?;
    let card = p.deck.draw().ok_or(PocketError::EmptyDeck(player))?;
    let (card_id, card_name) = (card.id, card.name.clone());
    p.zones.hand.push(card);
    state.emit(GameEventData::CardMoved {
        player,
        card: card_id,
        card_name,
        from: ZoneName::Deck,
        to: ZoneName::Hand,
    });
    Ok(())
}

/// Start-of-turn draw; an empty deck marks the player as decked out
pub fn draw_for_turn(state: &mut GameState, player: usize) -> Result<()> {
    match draw_card(state, player) {
        Err(PocketError::EmptyDeck(_)) => {
            state.player_mut(player)?.decked_out = true;
            state.logger.normal("deck is empty, cannot draw");
            Ok(())
        }
        other => other,
    }
}

/// Opening hand: one random basic Pokémon first, then the rest from the top
pub fn draw_initial_hand(state: &mut GameState, player: usize) -> Result<()> {
    let basics = state.player(player)?.deck.basic_indices();
    if basics.is_empty() {
        return Err(PocketError::NoBasicPokemon(player));
    }
    let pick = basics[state.rng.gen_range(0..basics.len())];

    let p = state.player_mut(player)?;
    let card = p.deck.take(pick)?;
    let (card_id, card_name) = (card.id, card.name.clone());
    p.zones.hand.push(card);
    state.emit(GameEventData::CardMoved {
        player,
        card: card_id,
        card_name,
        from: ZoneName::Deck,
        to: ZoneName::Hand,
    });

    for _ in 1..state.config.opening_hand_size {
        match draw_card(state, player) {
            Err(PocketError::EmptyDeck(_)) => break,
            other => other?,
        }
    }
    Ok(())
}

/// Put a basic Pokémon from hand into an empty in-play zone
pub fn play_pokemon_card(state: &mut GameState, player: usize, hand_index: usize, target: ZoneName) -> Result<()> {
    if !target.is_in_play() {
        return Err(PocketError::InvalidAction(format!("cannot put a Pokémon into {target}")));
    }
    let p = state.player_mut(player)?;
    if !p.zones.get_zone(target)?.is_empty() {
        return Err(PocketError::InvalidAction(format!("{target} is occupied")));
    }
    let is_basic = p.zones.hand.cards.get(hand_index).is_some_and(|c| c.is_basic());
    if !is_basic {
        return Err(PocketError::InvalidAction(format!(
            "hand[{hand_index}] is not a basic Pokémon"
        )));
    }

    let mut card = p.zones.hand.take(hand_index)?;
    card.can_evolve = false;
    let (card_id, card_name) = (card.id, card.name.clone());
    p.zones.get_zone_mut(target)?.push(card);

    state.emit(GameEventData::CardMoved {
        player,
        card: card_id,
        card_name,
        from: ZoneName::Hand,
        to: target,
    });
    register_passive_ability(state, player, target)
}

/// Attach the current energy to a Pokémon
///
/// Returns false without changing anything when the player already attached
/// this turn or has no energy available.
pub fn attach_energy(state: &mut GameState, player: usize, target: ZoneName) -> Result<bool> {
    let p = state.player_mut(player)?;
    let energy = match p.current_energy {
        Some(e) if p.can_attach_energy => e,
        _ => return Ok(false),
    };
    let zone = p.zones.get_zone_mut(target)?;
    zone.top()?;
    zone.add_energy(energy, 1);
    p.current_energy = None;
    p.can_attach_energy = false;

    state.emit(GameEventData::EnergyAttached {
        player,
        zone: target,
        energy,
    });
    Ok(true)
}

/// Evolve the Pokémon in `target` with a card from hand
pub fn evolve(state: &mut GameState, player: usize, hand_index: usize, target: ZoneName) -> Result<()> {
    let p = state.player_mut(player)?;
    let base = p.zones.get_zone(target)?.top()?;
    let evolution = p
        .zones
        .hand
        .cards
        .get(hand_index)
        .ok_or_else(|| PocketError::InvalidAction(format!("no hand card {hand_index}")))?;
    if !base.can_evolve || !evolution.evolves_onto(base) {
        return Err(PocketError::InvalidAction(format!(
            "{} cannot evolve into {}",
            base.name, evolution.name
        )));
    }
    let (old_id, old_name) = (base.id, base.name.clone());

    let mut card = p.zones.hand.take(hand_index)?;
    card.can_evolve = false;
    let (new_id, new_name) = (card.id, card.name.clone());
    p.zones.get_zone_mut(target)?.push(card);

    state.emit(GameEventData::CardMoved {
        player,
        card: new_id,
        card_name: new_name.clone(),
        from: ZoneName::Hand,
        to: target,
    });

    let removed = state.effects.remove_effects_by_source(SourceFilter::Card(old_id));
    record_removals(state, removed, RemovalReason::SourceLeft);
    state.effects.retarget(old_id, new_id);

    state.emit(GameEventData::Evolved {
        player,
        zone: target,
        from: old_name,
        to: new_name,
    });
    register_passive_ability(state, player, target)
}

/// Swap the active Pokémon with a bench Pokémon, paying the retreat cost
pub fn retreat(state: &mut GameState, player: usize, bench_index: usize) -> Result<()> {
    let bench = ZoneName::Bench(bench_index as u8);
    let p = state.player(player)?;
    if p.has_retreated {
        return Err(PocketError::InvalidAction("already retreated this turn".to_string()));
    }
    let promoted = p.zones.get_zone(bench)?.top()?.id;
    let retreated = p.zones.active.top()?.id;
    if !state.effects.can_retreat(state, player, ZoneName::Active)? {
        return Err(PocketError::InvalidAction("active Pokémon cannot retreat".to_string()));
    }
    let cost = state.effects.calculate_retreat_cost(state, player, ZoneName::Active)?;

    // Energy granted by effects covers whatever attached energy cannot
    let mut remaining = cost;
    let mut discarded = Vec::new();
    let active = &mut state.player_mut(player)?.zones.active;
    for (energy, count) in active.energy_list() {
        if remaining == 0 {
            break;
        }
        let take = count.min(remaining);
        active.remove_energy(energy, take)?;
        remaining -= take;
        discarded.push((energy, take));
    }
    for (energy, amount) in discarded {
        state.emit(GameEventData::EnergyDiscarded {
            player,
            zone: ZoneName::Active,
            energy,
            amount,
        });
    }

    let p = state.player_mut(player)?;
    p.zones.swap(ZoneName::Active, bench)?;
    p.has_retreated = true;
    state.emit(GameEventData::Retreated {
        player,
        from_bench: bench_index,
        retreated,
        promoted,
    });
    Ok(())
}

/// Play a card from hand during the main phase
///
/// Basic Pokémon go to the named bench slot; trainers resolve their effects.
pub fn play_card(state: &mut GameState, player: usize, hand_index: usize, target: Option<ZoneName>) -> Result<()> {
    let category = state
        .player(player)?
        .zones
        .hand
        .cards
        .get(hand_index)
        .map(|c| c.category)
        .ok_or_else(|| PocketError::InvalidAction(format!("no hand card {hand_index}")))?;

    match (category, target) {
        (CardCategory::Pokemon, Some(zone)) => play_pokemon_card(state, player, hand_index, zone),
        (CardCategory::Pokemon, None) => Err(PocketError::InvalidAction(
            "a Pokémon needs a target zone".to_string(),
        )),
        _ => play_trainer(state, player, hand_index, target),
    }
}

/// Play an Item, Supporter or Tool card
pub fn play_trainer(state: &mut GameState, player: usize, hand_index: usize, target: Option<ZoneName>) -> Result<()> {
    let p = state.player(player)?;
    let (category, effects) = p
        .zones
        .hand
        .cards
        .get(hand_index)
        .map(|c| (c.category, c.effects.clone()))
        .ok_or_else(|| PocketError::InvalidAction(format!("no hand card {hand_index}")))?;

    match category {
        CardCategory::Item => {}
        CardCategory::Supporter => {
            if !p.can_supporter {
                return Err(PocketError::InvalidAction("already played a Supporter this turn".to_string()));
            }
        }
        CardCategory::Tool => {
            let zone = target.ok_or_else(|| PocketError::InvalidAction("a Tool needs a target".to_string()))?;
            return attach_tool(state, player, hand_index, zone);
        }
        CardCategory::Pokemon => {
            return Err(PocketError::InvalidAction(format!("hand[{hand_index}] is not a trainer")));
        }
    }
    // Nothing moves unless every effect can find its target
    for descriptor in &effects {
        resolve_target(state, descriptor.target, player, None)?;
    }

    let p = state.player_mut(player)?;
    if category == CardCategory::Supporter {
        p.can_supporter = false;
    }
    let card = p.zones.hand.take(hand_index)?;
    let (card_id, card_name) = (card.id, card.name.clone());
    state.emit(GameEventData::TrainerPlayed {
        player,
        card: card_id,
        card_name: card_name.clone(),
    });

    let source = EffectSource {
        player,
        card: Some(card_id),
        category: SourceCategory::Trainer,
    };
    for descriptor in &effects {
        apply_effect_descriptor(state, descriptor, source, None)?;
    }

    state.player_mut(player)?.zones.discard.push(card);
    state.emit(GameEventData::CardMoved {
        player,
        card: card_id,
        card_name,
        from: ZoneName::Hand,
        to: ZoneName::Discard,
    });
    Ok(())
}

fn attach_tool(state: &mut GameState, player: usize, hand_index: usize, zone: ZoneName) -> Result<()> {
    let p = state.player(player)?;
    let holder = p.zones.get_zone(zone)?;
    if !zone.is_in_play() || holder.has_tool() {
        return Err(PocketError::InvalidAction(format!("cannot attach a tool to {zone}")));
    }
    let holder_id = holder.top()?.id;
    let effects = p
        .zones
        .hand
        .cards
        .get(hand_index)
        .map(|c| c.effects.clone())
        .ok_or_else(|| PocketError::InvalidAction(format!("no hand card {hand_index}")))?;
    for descriptor in &effects {
        resolve_target(state, descriptor.target, player, Some(holder_id))?;
    }

    let p = state.player_mut(player)?;
    let tool = p.zones.hand.take(hand_index)?;
    let (tool_id, tool_name) = (tool.id, tool.name.clone());
    p.zones.get_zone_mut(zone)?.tools.push(tool);

    state.emit(GameEventData::TrainerPlayed {
        player,
        card: tool_id,
        card_name: tool_name,
    });
    state.emit(GameEventData::ToolAttached {
        player,
        zone,
        card: tool_id,
    });

    let source = EffectSource {
        player,
        card: Some(tool_id),
        category: SourceCategory::Tool,
    };
    for descriptor in &effects {
        apply_effect_descriptor(state, descriptor, source, Some(holder_id))?;
    }
    Ok(())
}

/// Activate the ability of the Pokémon in `zone` (once per turn)
pub fn use_ability(state: &mut GameState, player: usize, zone: ZoneName) -> Result<()> {
    let p = state.player(player)?;
    let card = p.zones.get_zone(zone)?.top()?;
    let ability = card
        .ability
        .clone()
        .filter(|a| !a.passive)
        .ok_or_else(|| PocketError::InvalidAction(format!("{} has no usable ability", card.name)))?;
    let card_id = card.id;
    if p.has_used_ability(card_id) {
        return Err(PocketError::InvalidAction(format!("{} already used this turn", ability.name)));
    }
    for descriptor in &ability.effects {
        resolve_target(state, descriptor.target, player, Some(card_id))?;
    }

    state.player_mut(player)?.used_abilities.push(card_id);
    state.emit(GameEventData::AbilityUsed {
        player,
        card: card_id,
        ability_name: ability.name.clone(),
    });

    let source = EffectSource {
        player,
        card: Some(card_id),
        category: SourceCategory::Ability,
    };
    for descriptor in &ability.effects {
        apply_effect_descriptor(state, descriptor, source, Some(card_id))?;
    }
    Ok(())
}

/// Register the passive ability of the Pokémon now on top of `zone`
fn register_passive_ability(state: &mut GameState, player: usize, zone: ZoneName) -> Result<()> {
    let card = state.player(player)?.zones.get_zone(zone)?.top()?;
    let Some(ability) = card.ability.as_ref().filter(|a| a.passive) else {
        return Ok(());
    };
    let card_id = card.id;
    let effects = ability.effects.clone();

    let source = EffectSource {
        player,
        card: Some(card_id),
        category: SourceCategory::Ability,
    };
    for descriptor in &effects {
        apply_effect_descriptor(state, descriptor, source, Some(card_id))?;
    }
    Ok(())
}

/// Inspect a hand card; nothing else changes
pub fn select_hand_card(state: &mut GameState, player: usize, hand_index: usize) -> Result<()> {
    let card = state
        .player(player)?
        .zones
        .hand
        .cards
        .get(hand_index)
        .map(|c| c.id)
        .ok_or_else(|| PocketError::InvalidAction(format!("no hand card {hand_index}")))?;
    state.emit(GameEventData::CardSelected {
        player,
        hand_index,
        card,
    });
    Ok(())
}

/// Promote a bench Pokémon into the empty active slot
pub fn select_new_active(state: &mut GameState, player: usize, bench_index: usize) -> Result<()> {
    let bench = ZoneName::Bench(bench_index as u8);
    let p = state.player_mut(player)?;
    if !p.zones.active.is_empty() {
        return Err(PocketError::InvalidAction("active slot is occupied".to_string()));
    }
    let card = p.zones.get_zone(bench)?.top()?;
    let (card_id, card_name) = (card.id, card.name.clone());
    p.zones.swap(ZoneName::Active, bench)?;
    state.pending_promotions.retain(|p| *p != player);

    state.emit(GameEventData::CardMoved {
        player,
        card: card_id,
        card_name,
        from: bench,
        to: ZoneName::Active,
    });
    Ok(())
}

/// Resolve a descriptor's target relative to its source
///
/// `holder` is the Pokémon carrying the effect (the attacker, the ability
/// owner, or the Pokémon a tool is attached to).
pub fn resolve_target(
    state: &GameState,
    spec: TargetSpec,
    source_player: usize,
    holder: Option<CardId>,
) -> Result<Option<EffectTarget>> {
    let opponent = GameState::opponent_of(source_player);
    let target = match spec {
        TargetSpec::SelfPokemon => {
            let card = holder
                .ok_or_else(|| PocketError::InvalidAction("effect targets 'self' but has no holder".to_string()))?;
            Some(EffectTarget::pokemon(source_player, card))
        }
        TargetSpec::OwnActive => Some(EffectTarget::pokemon(
            source_player,
            state.player(source_player)?.zones.active.top()?.id,
        )),
        TargetSpec::OpponentActive => Some(EffectTarget::pokemon(
            opponent,
            state.player(opponent)?.zones.active.top()?.id,
        )),
        TargetSpec::OwnPlayer => Some(EffectTarget::player(source_player)),
        TargetSpec::OpponentPlayer => Some(EffectTarget::player(opponent)),
        TargetSpec::Global => None,
    };
    Ok(target)
}

/// Instantiate a descriptor through the registry and apply it
///
/// Immediate effects run once; everything else is stored in the effect
/// manager. Prevented effects only leave an `EffectPrevented` event.
pub fn apply_effect_descriptor(
    state: &mut GameState,
    descriptor: &EffectDescriptor,
    source: EffectSource,
    holder: Option<CardId>,
) -> Result<()> {
    let target = resolve_target(state, descriptor.target, source.player, holder)?;
    let id = state.next_effect_id();
    let registry = Arc::clone(&state.registry);
    let effect = registry.create_effect(id, &descriptor.effect_type, source, target, descriptor.params.clone())?;
    add_effect(state, effect)
}

/// Run or store a freshly created effect, honoring prevention
///
/// A unique effect type already live on the same target is left as it is.
pub fn add_effect(state: &mut GameState, effect: Effect) -> Result<()> {
    if !state.effects.can_apply_effect(state, &effect) {
        state.emit(GameEventData::EffectPrevented {
            effect_type: effect.effect_type.clone(),
            target: effect.target,
        });
        return Ok(());
    }

    let unique = state.registry.get(&effect.effect_type)?.unique;
    if unique && state.effects.has_effect(&effect.effect_type, effect.target) {
        state
            .logger
            .verbose(&format!("{} already applies, ignoring the new one", effect.effect_type));
        return Ok(());
    }

    if effect.timing == Timing::Immediate {
        if let Some(behavior) = effect.behavior() {
            behavior.run(state, &effect.context(0))?;
        }
        return Ok(());
    }

    let data = GameEventData::EffectAdded {
        effect_id: effect.id,
        effect_type: effect.effect_type.clone(),
        target: effect.target,
    };
    state.effects.add_effect(effect)?;
    state.emit(data);
    Ok(())
}

pub(crate) fn record_removals(state: &mut GameState, removed: Vec<Effect>, reason: RemovalReason) {
    for effect in removed {
        state.emit(GameEventData::EffectRemoved {
            effect_id: effect.id,
            effect_type: effect.effect_type,
            reason,
        });
    }
}

/// Knock out the Pokémon in `zone`: discard the zone, award points
pub fn knock_out(state: &mut GameState, player: usize, zone: ZoneName) -> Result<()> {
    let z = state.player_mut(player)?.zones.get_zone_mut(zone)?;
    let top = z.top()?;
    let (card_id, card_name) = (top.id, top.name.clone());
    let removed = z.clear();

    state.emit(GameEventData::KnockedOut {
        player,
        zone,
        card: card_id,
        card_name,
    });

    for card in removed {
        let (id, name) = (card.id, card.name.clone());
        state.player_mut(player)?.zones.discard.push(card);
        state.emit(GameEventData::CardMoved {
            player,
            card: id,
            card_name: name,
            from: zone,
            to: ZoneName::Discard,
        });

        let by_source = state.effects.remove_effects_by_source(SourceFilter::Card(id));
        record_removals(state, by_source, RemovalReason::SourceLeft);
        let by_target = state.effects.remove_effects_targeting(id);
        record_removals(state, by_target, RemovalReason::TargetLeft);
    }

    let opponent = GameState::opponent_of(player);
    let points = state.config.points_per_knockout;
    let opp = state.player_mut(opponent)?;
    opp.points += points;
    let total = opp.points;
    state.emit(GameEventData::PointsAwarded {
        player: opponent,
        points,
        total,
    });
    Ok(())
}

/// End the game; later calls are ignored
pub fn declare_winner(state: &mut GameState, winner: Option<usize>, reason: GameEndReason) {
    if state.is_over() {
        return;
    }
    state.outcome = Some(GameOutcome {
        winner,
        reason,
        turns: state.turn,
    });
    state.pending_promotions.clear();
    state.set_phase(Phase::GameEnd);
    state.emit(GameEventData::GameEnded { winner, reason });
}

/// Ask `player` to promote a bench Pokémon, once per empty active slot
pub fn request_new_active(state: &mut GameState, player: usize) {
    if state.pending_promotions.contains(&player) {
        return;
    }
    state.pending_promotions.push(player);
    state.emit(GameEventData::InputRequested {
        players: smallvec![player],
        request: InputRequestKind::SelectNewActive,
    });
}

fn roll_energy(state: &mut GameState, player: usize) -> Result<Option<crate::core::EnergyType>> {
    let GameState { players, rng, .. } = state;
    let p = players
        .get(player)
        .ok_or_else(|| PocketError::InvalidAction(format!("no player {player}")))?;
    Ok(p.deck.roll_energy(rng))
}

/// Begin turn 1
///
/// Energy zones are not rotated on turn 1: both players only get a fresh
/// "next" energy, so nobody has energy to attach yet.
pub fn start_first_turn(state: &mut GameState, player: usize) -> Result<()> {
    state.current_player = player;
    state.turn = 1;
    state.emit(GameEventData::TurnStarted { player, turn: 1 });

    for index in [player, GameState::opponent_of(player)] {
        let rolled = roll_energy(state, index)?;
        let p = state.player_mut(index)?;
        p.current_energy = None;
        p.next_energy = rolled;
        state.emit(GameEventData::EnergyZoneChanged {
            player: index,
            current: None,
            next: rolled,
        });
    }

    state.player_mut(player)?.reset_turn_flags();
    draw_for_turn(state, player)
}

/// Run every between-turns effect once, in priority order
pub fn run_between_turns_effects(state: &mut GameState) -> Result<()> {
    for id in state.effects.ids_with_timing(state, Timing::BetweenTurns) {
        let Some(effect) = state.effects.get(id) else {
            continue;
        };
        let ctx = effect.context(0);
        if let Some(behavior) = effect.behavior() {
            behavior.run(state, &ctx)?;
        }
    }
    Ok(())
}

/// Count effect durations down and record expirations
pub fn tick_effects(state: &mut GameState) {
    let expired = state.effects.tickdown();
    record_removals(state, expired, RemovalReason::Expired);
}

/// Hand the turn to the other player
pub fn end_turn(state: &mut GameState) -> Result<()> {
    let outgoing = state.current_player;
    state.emit(GameEventData::TurnEnded {
        player: outgoing,
        turn: state.turn,
    });
    run_between_turns_effects(state)?;

    let incoming = GameState::opponent_of(outgoing);
    state.current_player = incoming;
    state.turn += 1;
    state.emit(GameEventData::TurnStarted {
        player: incoming,
        turn: state.turn,
    });

    let rolled = roll_energy(state, incoming)?;
    let p = state.player_mut(incoming)?;
    p.rotate_energy(rolled);
    let (current, next) = (p.current_energy, p.next_energy);
    p.reset_turn_flags();
    for zone in p.zones.in_play_mut() {
        if let Some(card) = zone.cards.last_mut() {
            card.can_evolve = true;
        }
    }
    state.emit(GameEventData::EnergyZoneChanged {
        player: incoming,
        current,
        next,
    });

    draw_for_turn(state, incoming)?;
    tick_effects(state);
    check_state_based_actions(state)?;

    if !state.is_over() && state.turn > state.config.max_turns {
        declare_winner(state, None, GameEndReason::TurnLimit);
    }
    Ok(())
}

/// The player gives up; the opponent wins
pub fn concede(state: &mut GameState, player: usize) {
    declare_winner(state, Some(GameState::opponent_of(player)), GameEndReason::Concede);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Ability, Card, Deck, EnergyType, Stage};
    use crate::effects::{kinds, EffectParams};

    fn pokemon(id: u32, name: &str, hp: u32) -> Card {
        Card::pokemon(CardId::new(id), name, hp, EnergyType::Grass, Stage::Basic)
    }

    fn with_deck(cards: Vec<Card>) -> GameState {
        let mut state = GameState::empty_for_tests();
        state.players[0].deck = Deck::new(cards, vec![EnergyType::Grass]);
        state
    }

    #[test]
    fn test_draw_one_card_then_empty() {
        let mut state = with_deck(vec![pokemon(1, "Bulbasaur", 70)]);
        draw_card(&mut state, 0).unwrap();
        assert_eq!(state.players[0].zones.hand.len(), 1);
        assert!(matches!(draw_card(&mut state, 0), Err(PocketError::EmptyDeck(0))));

        draw_for_turn(&mut state, 0).unwrap();
        assert!(state.players[0].decked_out);
    }

    #[test]
    fn test_initial_hand_leads_with_basic() {
        let mut cards: Vec<Card> = (0..19)
            .map(|i| Card::trainer(CardId::new(i), "Potion", CardCategory::Item))
            .collect();
        cards.insert(7, pokemon(99, "Bulbasaur", 70));
        let mut state = with_deck(cards);

        draw_initial_hand(&mut state, 0).unwrap();
        let p = &state.players[0];
        assert_eq!(p.zones.hand.len(), 5);
        assert_eq!(p.deck.len(), 15);
        assert_eq!(p.zones.hand.cards[0].id, CardId::new(99));
    }

    #[test]
    fn test_initial_hand_without_basics_fails() {
        let cards = (0..20)
            .map(|i| Card::trainer(CardId::new(i), "Potion", CardCategory::Item))
            .collect();
        let mut state = with_deck(cards);
        let err = draw_initial_hand(&mut state, 0).unwrap_err();
        assert!(matches!(err, PocketError::NoBasicPokemon(0)));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_attach_energy_once_per_turn() {
        let mut state = GameState::empty_for_tests();
        state.players[0].zones.active.push(pokemon(1, "Bulbasaur", 70));
        state.players[0].current_energy = Some(EnergyType::Grass);

        assert!(attach_energy(&mut state, 0, ZoneName::Active).unwrap());
        assert!(!attach_energy(&mut state, 0, ZoneName::Active).unwrap());
        assert_eq!(state.players[0].zones.active.energy_count(), 1);
        assert_eq!(state.players[0].current_energy, None);

        state.players[0].reset_turn_flags();
        assert!(!attach_energy(&mut state, 0, ZoneName::Active).unwrap());
    }

    #[test]
    fn test_passive_ability_registers_and_leaves_with_card() {
        let mut state = GameState::empty_for_tests();
        let mut druddigon = pokemon(5, "Druddigon", 100);
        druddigon.ability = Some(Ability {
            name: "Rough Skin".to_string(),
            text: String::new(),
            effects: vec![EffectDescriptor::new(kinds::DAMAGE_REACTION, TargetSpec::SelfPokemon)
                .with_param("amount", 20)],
            passive: true,
        });
        state.players[1].zones.hand.push(druddigon);
        state.players[0].zones.active.push(pokemon(6, "Bulbasaur", 70));

        play_pokemon_card(&mut state, 1, 0, ZoneName::Active).unwrap();
        assert_eq!(state.effects.len(), 1);

        state.players[1].zones.active.damage = 100;
        knock_out(&mut state, 1, ZoneName::Active).unwrap();
        assert!(state.effects.is_empty());
        assert_eq!(state.players[0].points, 1);
        assert_eq!(state.players[1].zones.discard.len(), 1);
        assert_eq!(state.players[1].zones.active.damage, 0);
    }

    #[test]
    fn test_declare_winner_is_final() {
        let mut state = GameState::empty_for_tests();
        state.turn = 4;
        declare_winner(&mut state, Some(1), GameEndReason::Points);
        concede(&mut state, 1);

        let outcome = state.outcome.unwrap();
        assert_eq!(outcome.winner, Some(1));
        assert_eq!(outcome.reason, GameEndReason::Points);
        assert_eq!(outcome.turns, 4);
        assert_eq!(state.phase, Phase::GameEnd);
    }

    fn descriptor(text: &str) -> EffectDescriptor {
        text.parse().unwrap()
    }

    fn trainer(id: u32, name: &str, category: CardCategory, effect: &str) -> Card {
        Card::trainer(CardId::new(id), name, category).with_effect(descriptor(effect))
    }

    fn attack_source(player: usize) -> EffectSource {
        EffectSource {
            player,
            card: None,
            category: SourceCategory::Attack,
        }
    }

    #[test]
    fn test_evolve_checks_line_and_moves_effects() {
        let mut state = GameState::empty_for_tests();
        let mut bulbasaur = pokemon(1, "Bulbasaur", 70);
        bulbasaur.can_evolve = true;
        state.players[0].zones.active.push(bulbasaur);
        let ivysaur = Card::pokemon(CardId::new(2), "Ivysaur", 90, EnergyType::Grass, Stage::Stage1)
            .with_evolves_from("Bulbasaur");
        let venusaur = Card::pokemon(CardId::new(3), "Venusaur", 160, EnergyType::Grass, Stage::Stage2)
            .with_evolves_from("Ivysaur");
        state.players[0].zones.hand.push(venusaur);
        state.players[0].zones.hand.push(ivysaur);

        let id = state.next_effect_id();
        let registry = Arc::clone(&state.registry);
        let slow = registry
            .create_effect(
                id,
                kinds::MODIFY_RETREAT_COST,
                EffectSource {
                    player: 1,
                    card: Some(CardId::new(50)),
                    category: SourceCategory::Attack,
                },
                Some(EffectTarget::pokemon(0, CardId::new(1))),
                EffectParams::new().with("amount", 1),
            )
            .unwrap();
        state.effects.add_effect(slow).unwrap();

        // Stage 2 cannot skip the Stage 1
        assert!(evolve(&mut state, 0, 0, ZoneName::Active).is_err());
        assert_eq!(state.players[0].zones.hand.len(), 2);

        evolve(&mut state, 0, 1, ZoneName::Active).unwrap();
        let active = &state.players[0].zones.active;
        assert_eq!(active.top().unwrap().name.as_str(), "Ivysaur");
        assert_eq!(active.cards.len(), 2);
        assert!(!active.top().unwrap().can_evolve);
        assert_eq!(
            state.effects.get(id).unwrap().target,
            Some(EffectTarget::pokemon(0, CardId::new(2)))
        );

        // The evolved card has not had a turn in play yet
        assert!(evolve(&mut state, 0, 0, ZoneName::Active).is_err());
        assert_eq!(state.players[0].zones.hand.len(), 1);
    }

    #[test]
    fn test_retreat_pays_cost_and_swaps_zones_once() {
        let mut state = GameState::empty_for_tests();
        let bulbasaur = pokemon(1, "Bulbasaur", 70).with_retreat_cost(2);
        let zones = &mut state.players[0].zones;
        zones.active.push(bulbasaur);
        zones.active.add_energy(EnergyType::Grass, 2);
        zones.active.add_energy(EnergyType::Fire, 1);
        zones.active.damage = 30;
        zones.active.tools.push(Card::trainer(CardId::new(9), "Rocky Helmet", CardCategory::Tool));
        zones.bench[0].push(pokemon(2, "Oddish", 50));

        retreat(&mut state, 0, 0).unwrap();

        let p = &state.players[0];
        assert!(p.has_retreated);
        assert_eq!(p.zones.active.top().unwrap().name.as_str(), "Oddish");
        assert_eq!(p.zones.active.damage, 0);
        let benched = &p.zones.bench[0];
        assert_eq!(benched.top().unwrap().name.as_str(), "Bulbasaur");
        assert_eq!(benched.damage, 30);
        assert!(benched.has_tool());
        assert_eq!(benched.energy_count(), 1);

        let discarded: u32 = state
            .events
            .history()
            .iter()
            .filter_map(|e| match e.data {
                GameEventData::EnergyDiscarded { amount, .. } => Some(amount),
                _ => None,
            })
            .sum();
        assert_eq!(discarded, 2);

        // Oddish retreats for free, but only one retreat per turn
        assert!(retreat(&mut state, 0, 0).is_err());
        assert_eq!(state.players[0].zones.active.top().unwrap().name.as_str(), "Oddish");
    }

    #[test]
    fn test_retreat_without_enough_energy_changes_nothing() {
        let mut state = GameState::empty_for_tests();
        let zones = &mut state.players[0].zones;
        zones.active.push(pokemon(1, "Bulbasaur", 70).with_retreat_cost(2));
        zones.active.add_energy(EnergyType::Grass, 1);
        zones.bench[0].push(pokemon(2, "Oddish", 50));

        assert!(retreat(&mut state, 0, 0).is_err());
        let p = &state.players[0];
        assert!(!p.has_retreated);
        assert_eq!(p.zones.active.energy_count(), 1);
        assert_eq!(p.zones.active.top().unwrap().id, CardId::new(1));
    }

    #[test]
    fn test_one_supporter_per_turn() {
        let research = |id| trainer(id, "Professor's Research", CardCategory::Supporter, "DRAW_CARDS@own_player{count=2}");
        let mut state = with_deck((10..16).map(|i| pokemon(i, "Oddish", 50)).collect());
        state.players[0].zones.hand.push(research(1));
        state.players[0].zones.hand.push(research(2));

        play_trainer(&mut state, 0, 0, None).unwrap();
        let p = &state.players[0];
        assert!(!p.can_supporter);
        assert_eq!(p.zones.hand.len(), 3);
        assert_eq!(p.zones.discard.len(), 1);
        assert_eq!(p.deck.len(), 4);

        assert!(play_trainer(&mut state, 0, 0, None).is_err());
        assert_eq!(state.players[0].zones.hand.len(), 3);
        assert_eq!(state.players[0].zones.hand.cards[0].id, CardId::new(2));

        state.players[0].reset_turn_flags();
        play_trainer(&mut state, 0, 0, None).unwrap();
        assert_eq!(state.players[0].zones.discard.len(), 2);
    }

    #[test]
    fn test_tool_needs_occupied_zone_without_tool() {
        let helmet = |id| trainer(id, "Rocky Helmet", CardCategory::Tool, "DAMAGE_REACTION@self{amount=20}");
        let mut state = GameState::empty_for_tests();
        state.players[0].zones.active.push(pokemon(1, "Bulbasaur", 70));
        state.players[0].zones.hand.push(helmet(2));
        state.players[0].zones.hand.push(helmet(3));

        play_trainer(&mut state, 0, 0, Some(ZoneName::Active)).unwrap();
        assert!(state.players[0].zones.active.has_tool());
        assert_eq!(state.effects.len(), 1);
        let effect = state.effects.iter().next().unwrap();
        assert_eq!(effect.target, Some(EffectTarget::pokemon(0, CardId::new(1))));

        assert!(play_trainer(&mut state, 0, 0, Some(ZoneName::Active)).is_err());
        assert!(play_trainer(&mut state, 0, 0, Some(ZoneName::Bench(0))).is_err());
        assert_eq!(state.players[0].zones.hand.len(), 1);
        assert_eq!(state.effects.len(), 1);

        state.players[0].zones.bench[0].push(pokemon(4, "Oddish", 50));
        play_trainer(&mut state, 0, 0, Some(ZoneName::Bench(0))).unwrap();
        assert!(state.players[0].zones.bench[0].has_tool());
        assert!(state.players[0].zones.hand.is_empty());
    }

    #[test]
    fn test_ability_once_per_turn() {
        let mut state = with_deck((10..16).map(|i| pokemon(i, "Oddish", 50)).collect());
        let mut meowth = Card::pokemon(CardId::new(1), "Meowth", 60, EnergyType::Colorless, Stage::Basic);
        meowth.ability = Some(Ability {
            name: "Pay Day".to_string(),
            text: String::new(),
            effects: vec![descriptor("DRAW_CARDS@own_player{count=1}")],
            passive: false,
        });
        state.players[0].zones.active.push(meowth);

        use_ability(&mut state, 0, ZoneName::Active).unwrap();
        assert_eq!(state.players[0].zones.hand.len(), 1);
        assert!(use_ability(&mut state, 0, ZoneName::Active).is_err());
        assert_eq!(state.players[0].zones.hand.len(), 1);

        state.players[0].reset_turn_flags();
        use_ability(&mut state, 0, ZoneName::Active).unwrap();
        assert_eq!(state.players[0].zones.hand.len(), 2);
    }

    #[test]
    fn test_poison_does_not_stack() {
        let mut state = GameState::empty_for_tests();
        state.players[0].zones.active.push(pokemon(1, "Koffing", 70));
        state.players[1].zones.active.push(pokemon(2, "Bulbasaur", 70));
        let poison = descriptor("POISON@opponent_active");

        apply_effect_descriptor(&mut state, &poison, attack_source(0), None).unwrap();
        apply_effect_descriptor(&mut state, &poison, attack_source(0), None).unwrap();
        let live = state.effects.iter().filter(|e| e.effect_type == kinds::POISON).count();
        assert_eq!(live, 1);

        run_between_turns_effects(&mut state).unwrap();
        assert_eq!(state.players[1].zones.active.damage, 10);
    }

    #[test]
    fn test_unresolvable_trainer_stays_in_hand() {
        let mut state = GameState::empty_for_tests();
        state.players[0].zones.active.push(pokemon(1, "Bulbasaur", 70));
        state.players[0]
            .zones
            .hand
            .push(trainer(2, "Odd Salve", CardCategory::Item, "HEAL@self{amount=20}"));
        let events = state.events.len();

        assert!(play_trainer(&mut state, 0, 0, None).is_err());
        let p = &state.players[0];
        assert_eq!(p.zones.hand.len(), 1);
        assert!(p.zones.discard.is_empty());
        assert_eq!(state.events.len(), events);
    }
}
