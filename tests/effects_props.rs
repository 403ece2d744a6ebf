//! Randomized invariant checks for damage, effects and state-based actions
//!
//! Each test sweeps a range of seeded inputs instead of a fixed example.

use pocket_forge_rs::core::{Attack, Card, CardCategory, Deck, EnergyType, IdGenerator, PlayerState, Stage};
use pocket_forge_rs::effects::{
    kinds, EffectParams, EffectRegistry, EffectSource, EffectTarget, SourceCategory, PERMANENT,
};
use pocket_forge_rs::game::actions::{draw_for_turn, shuffle_deck};
use pocket_forge_rs::game::combat::apply_damage_counters;
use pocket_forge_rs::game::{
    check_state_based_actions, legal_inputs, Engine, EngineConfig, GameEndReason, GameState, Phase,
};
use pocket_forge_rs::zones::ZoneName;
use pocket_forge_rs::Result;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

fn pokemon(ids: &mut IdGenerator, hp: u32) -> Card {
    Card::pokemon(ids.next_card_id(), "Eevee", hp, EnergyType::Colorless, Stage::Basic)
        .with_retreat_cost(1)
        .with_attack(Attack::new("Tackle", &[EnergyType::Colorless], 20))
}

fn game(seed: u64, deck_size: usize) -> Result<GameState> {
    let mut ids = IdGenerator::new();
    let config = EngineConfig::default();
    let mut decks = Vec::new();
    for _ in 0..2 {
        let mut cards = vec![pokemon(&mut ids, 60)];
        while cards.len() < deck_size {
            cards.push(Card::trainer(ids.next_card_id(), "Potion", CardCategory::Item));
        }
        decks.push(Deck::new(cards, vec![EnergyType::Fighting]));
    }
    let deck1 = decks.pop().expect("two decks");
    let deck0 = decks.pop().expect("two decks");
    let players = [
        PlayerState::new("A", deck0, config.bench_size),
        PlayerState::new("B", deck1, config.bench_size),
    ];
    Ok(GameState::new(players, config, EffectRegistry::shared_builtin()?, ids, seed))
}

fn source() -> EffectSource {
    EffectSource {
        player: 0,
        card: None,
        category: SourceCategory::Ability,
    }
}

#[test]
fn test_damage_stays_within_hp() -> Result<()> {
    let mut rng = ChaCha12Rng::seed_from_u64(1);
    for seed in 0..50 {
        let mut state = game(seed, 20)?;
        let hp = rng.gen_range(1..=20) * 10;
        let card = pokemon(&mut state.ids, hp);
        state.players[0].zones.active.push(card);

        for _ in 0..20 {
            let amount = rng.gen_range(-300..=300);
            let prior = state.players[0].zones.active.damage as i32;
            let delta = apply_damage_counters(&mut state, 0, ZoneName::Active, amount)?;
            let damage = state.players[0].zones.active.damage;
            assert!(damage <= hp, "damage {damage} above hp {hp}");
            assert_eq!(damage as i32, prior + delta);
        }
    }
    Ok(())
}

#[test]
fn test_active_effects_sorted_stably_by_priority() -> Result<()> {
    let mut rng = ChaCha12Rng::seed_from_u64(2);
    let registry = EffectRegistry::shared_builtin()?;
    for seed in 0..30 {
        let mut state = game(seed, 20)?;
        let mut expected = Vec::new();
        for _ in 0..12 {
            let priority = rng.gen_range(-3..=3);
            let id = state.next_effect_id();
            let params = EffectParams::new().with("amount", 1).with("priority", priority);
            let effect =
                registry.create_effect(id, kinds::MODIFY_DAMAGE, source(), Some(EffectTarget::player(1)), params)?;
            state.effects.add_effect(effect)?;
            expected.push((priority, id));
        }
        expected.sort_by_key(|(p, _)| *p);

        let actual: Vec<_> = state
            .effects
            .active_effects(&state, Some(kinds::MODIFY_DAMAGE))
            .into_iter()
            .map(|e| (e.priority, e.id))
            .collect();
        assert_eq!(actual, expected);
    }
    Ok(())
}

#[test]
fn test_permanent_effects_survive_tickdown() -> Result<()> {
    let registry = EffectRegistry::shared_builtin()?;
    let mut state = game(0, 20)?;
    let id = state.next_effect_id();
    let permanent = registry.create_effect(
        id,
        kinds::MODIFY_ENERGY_COUNT,
        source(),
        None,
        EffectParams::new().with("amount", 1),
    )?;
    assert_eq!(permanent.duration, PERMANENT);
    state.effects.add_effect(permanent)?;

    let id = state.next_effect_id();
    let short = registry.create_effect(
        id,
        kinds::MODIFY_DAMAGE,
        source(),
        None,
        EffectParams::new().with("amount", 1).with("duration", 3),
    )?;
    state.effects.add_effect(short)?;

    let mut removed = 0;
    for _ in 0..100 {
        removed += state.effects.tickdown().len();
    }
    assert_eq!(removed, 1);
    assert_eq!(state.effects.len(), 1);
    let survivor = state.effects.iter().next().expect("permanent effect kept");
    assert_eq!(survivor.effect_type, kinds::MODIFY_ENERGY_COUNT);
    Ok(())
}

#[test]
fn test_retreat_cost_never_negative() -> Result<()> {
    let registry = EffectRegistry::shared_builtin()?;
    for reduction in 1..6 {
        let mut state = game(0, 20)?;
        let card = pokemon(&mut state.ids, 60);
        let card_id = card.id;
        state.players[0].zones.active.push(card);

        let id = state.next_effect_id();
        let effect = registry.create_effect(
            id,
            kinds::MODIFY_RETREAT_COST,
            source(),
            Some(EffectTarget::pokemon(0, card_id)),
            EffectParams::new().with("amount", -reduction),
        )?;
        state.effects.add_effect(effect)?;

        let cost = state.effects.calculate_retreat_cost(&state, 0, ZoneName::Active)?;
        assert_eq!(cost, (1 - reduction).max(0) as u32);
    }
    Ok(())
}

#[test]
fn test_shuffle_preserves_cards() -> Result<()> {
    for seed in 0..40 {
        let mut state = game(seed, 20)?;
        let mut before: Vec<u32> = state.players[0].deck.cards.iter().map(|c| c.id.as_u32()).collect();
        shuffle_deck(&mut state, 0)?;
        let mut after: Vec<u32> = state.players[0].deck.cards.iter().map(|c| c.id.as_u32()).collect();
        before.sort_unstable();
        after.sort_unstable();
        assert_eq!(before, after);
    }
    Ok(())
}

#[test]
fn test_last_card_draw_then_deck_out() -> Result<()> {
    let mut state = game(0, 1)?;
    let card = pokemon(&mut state.ids, 60);
    state.players[1].zones.active.push(card);
    let card = pokemon(&mut state.ids, 60);
    state.players[0].zones.active.push(card);

    draw_for_turn(&mut state, 0)?;
    check_state_based_actions(&mut state)?;
    assert!(!state.is_over());
    assert_eq!(state.players[0].zones.hand.len(), 1);

    draw_for_turn(&mut state, 0)?;
    check_state_based_actions(&mut state)?;
    let outcome = state.outcome.expect("game over");
    assert_eq!(outcome.reason, GameEndReason::DeckOut);
    assert_eq!(outcome.winner, Some(1));
    Ok(())
}

#[test]
fn test_state_based_check_is_idempotent() -> Result<()> {
    let mut rng = ChaCha12Rng::seed_from_u64(3);
    for seed in 0..30 {
        let mut state = game(seed, 20)?;
        for player in 0..2 {
            let card = pokemon(&mut state.ids, 60);
            state.players[player].zones.active.push(card);
            let card = pokemon(&mut state.ids, 60);
            state.players[player].zones.bench[0].push(card);
        }
        state.players[1].zones.active.damage = rng.gen_range(0..=60);

        check_state_based_actions(&mut state)?;
        let events = state.events.len();
        check_state_based_actions(&mut state)?;
        assert_eq!(state.events.len(), events);
    }
    Ok(())
}

#[test]
fn test_legal_inputs_are_pure_and_turns_increase() -> Result<()> {
    let mut rng = ChaCha12Rng::seed_from_u64(4);
    for seed in 0..10 {
        let mut engine = Engine::new(game(seed, 20)?)?;
        engine.start()?;
        let mut last_turn = engine.state().turn;

        for _ in 0..200 {
            let first = legal_inputs(engine.state());
            let second = legal_inputs(engine.state());
            assert_eq!(first, second);

            let candidates: Vec<_> = first.iter().filter(|i| !i.is_concede()).copied().collect();
            if candidates.is_empty() {
                break;
            }
            let input = candidates[rng.gen_range(0..candidates.len())];
            let phase_before = engine.state().phase;
            let step = engine.run_until_next(input)?;
            if step.is_finished() {
                break;
            }

            let turn = engine.state().turn;
            assert!(turn >= last_turn);
            assert!(turn <= last_turn + 1);
            if turn == last_turn + 1 && last_turn > 0 {
                // Turns only end from the main phase, or after a pending promotion
                assert!(matches!(phase_before, Phase::Main | Phase::BetweenTurns));
            }
            last_turn = turn;
        }
    }
    Ok(())
}
