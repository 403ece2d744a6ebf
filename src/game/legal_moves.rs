//! Legal-move generator
//!
//! A pure function of the game state. The order is fixed (player, then zone,
//! then index ascending) so two engines holding equal states produce identical
//! lists.

use crate::core::{CardCategory, PlayerState};
use crate::game::{GameState, InputAction, Phase, PlayerInput};
use crate::zones::ZoneName;

/// Every input that may be submitted right now
///
/// Empty once the game is over. Otherwise both players may always concede;
/// those two entries come last.
pub fn legal_inputs(state: &GameState) -> Vec<PlayerInput> {
    if state.is_over() || state.phase.is_terminal() {
        return Vec::new();
    }

    let mut inputs = Vec::new();
    if !state.pending_promotions.is_empty() {
        promotion_inputs(state, &mut inputs);
    } else {
        match state.phase {
            Phase::SetupPlaceActive => {
                for (index, player) in state.players.iter().enumerate() {
                    place_active_inputs(index, player, &mut inputs);
                }
            }
            Phase::SetupPlaceBench => {
                for (index, player) in state.players.iter().enumerate() {
                    place_bench_inputs(index, player, &mut inputs);
                }
            }
            Phase::Main => main_inputs(state, &mut inputs),
            _ => {}
        }
    }

    for player in 0..state.players.len() {
        inputs.push(PlayerInput::concede(player));
    }
    inputs
}

/// Is `input` one of the currently legal inputs?
pub fn is_legal(state: &GameState, input: &PlayerInput) -> bool {
    legal_inputs(state).contains(input)
}

fn promotion_inputs(state: &GameState, inputs: &mut Vec<PlayerInput>) {
    for &index in &state.pending_promotions {
        let Some(player) = state.players.get(index) else {
            continue;
        };
        for (bench_index, zone) in player.zones.bench.iter().enumerate() {
            if !zone.is_empty() {
                inputs.push(PlayerInput::new(index, InputAction::SelectNewActive { bench_index }));
            }
        }
    }
}

fn place_active_inputs(index: usize, player: &PlayerState, inputs: &mut Vec<PlayerInput>) {
    if !player.zones.active.is_empty() {
        return;
    }
    for (hand_index, card) in player.zones.hand.cards.iter().enumerate() {
        if card.is_basic() {
            inputs.push(PlayerInput::new(index, InputAction::PlaceActive { hand_index }));
        }
    }
}

fn place_bench_inputs(index: usize, player: &PlayerState, inputs: &mut Vec<PlayerInput>) {
    if player.setup_complete {
        return;
    }
    for (hand_index, card) in player.zones.hand.cards.iter().enumerate() {
        if !card.is_basic() {
            continue;
        }
        for (bench_index, zone) in player.zones.bench.iter().enumerate() {
            if zone.is_empty() {
                inputs.push(PlayerInput::new(index, InputAction::PlaceBench { hand_index, bench_index }));
            }
        }
    }
    inputs.push(PlayerInput::new(index, InputAction::StartBattle));
}

fn main_inputs(state: &GameState, inputs: &mut Vec<PlayerInput>) {
    let index = state.current_player;
    let Some(player) = state.players.get(index) else {
        return;
    };
    let zones = &player.zones;
    let push = |inputs: &mut Vec<PlayerInput>, action| inputs.push(PlayerInput::new(index, action));

    for hand_index in 0..zones.hand.len() {
        push(inputs, InputAction::SelectHandCard { hand_index });
    }

    for (hand_index, card) in zones.hand.cards.iter().enumerate() {
        match card.category {
            CardCategory::Pokemon if card.is_basic() => {
                for (bench_index, zone) in zones.bench.iter().enumerate() {
                    if zone.is_empty() {
                        let target = Some(ZoneName::Bench(bench_index as u8));
                        push(inputs, InputAction::PlayCard { hand_index, target });
                    }
                }
            }
            CardCategory::Pokemon => {}
            CardCategory::Item => push(inputs, InputAction::PlayCard { hand_index, target: None }),
            CardCategory::Supporter if player.can_supporter => {
                push(inputs, InputAction::PlayCard { hand_index, target: None })
            }
            CardCategory::Supporter => {}
            CardCategory::Tool => {
                for zone in zones.in_play() {
                    if !zone.is_empty() && !zone.has_tool() {
                        push(inputs, InputAction::PlayCard { hand_index, target: Some(zone.name) });
                    }
                }
            }
        }
    }

    let can_attach = state.turn > 1 && player.current_energy.is_some() && player.can_attach_energy;
    for zone in zones.in_play() {
        let Some(occupant) = zone.cards.last() else {
            continue;
        };
        let target = zone.name;

        if occupant.can_evolve {
            for (hand_index, card) in zones.hand.cards.iter().enumerate() {
                if card.evolves_onto(occupant) {
                    push(inputs, InputAction::Evolve { hand_index, target });
                }
            }
        }

        if can_attach {
            push(inputs, InputAction::AttachEnergy { target });
        }

        if target == ZoneName::Active && !player.has_retreated {
            let can_retreat = state.effects.can_retreat(state, index, target).unwrap_or(false);
            if can_retreat {
                for (bench_index, bench) in zones.bench.iter().enumerate() {
                    if !bench.is_empty() {
                        push(inputs, InputAction::Retreat { bench_index });
                    }
                }
            }
        }

        let usable = occupant.ability.as_ref().is_some_and(|a| !a.passive);
        if usable && !player.has_used_ability(occupant.id) {
            push(inputs, InputAction::UseAbility { zone: target });
        }

        if target == ZoneName::Active {
            let attached = zone.energy_list();
            let bonus = state.effects.energy_bonus(state, index, target).unwrap_or(0);
            for (attack_index, attack) in occupant.attacks.iter().enumerate() {
                if attack.is_affordable(&attached, bonus) {
                    push(inputs, InputAction::Attack { attack_index });
                }
            }
        }
    }

    push(inputs, InputAction::PassTurn);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Attack, Card, CardId, EnergyType, Stage};

    fn basic(id: u32, name: &str) -> Card {
        Card::pokemon(CardId::new(id), name, 60, EnergyType::Fire, Stage::Basic)
            .with_attack(Attack::new("Ember", &[EnergyType::Fire], 30))
    }

    fn actions_of(inputs: &[PlayerInput], player: usize) -> Vec<InputAction> {
        inputs.iter().filter(|i| i.player == player).map(|i| i.action).collect()
    }

    #[test]
    fn test_setup_active_is_simultaneous() {
        let mut state = GameState::empty_for_tests();
        state.phase = Phase::SetupPlaceActive;
        state.players[0].zones.hand.push(basic(1, "Charmander"));
        state.players[0].zones.hand.push(Card::trainer(CardId::new(2), "Potion", CardCategory::Item));
        state.players[1].zones.hand.push(basic(3, "Charmander"));

        let inputs = legal_inputs(&state);
        assert_eq!(
            inputs,
            vec![
                PlayerInput::new(0, InputAction::PlaceActive { hand_index: 0 }),
                PlayerInput::new(1, InputAction::PlaceActive { hand_index: 0 }),
                PlayerInput::concede(0),
                PlayerInput::concede(1),
            ]
        );
    }

    #[test]
    fn test_setup_bench_offers_each_slot_and_start() {
        let mut state = GameState::empty_for_tests();
        state.phase = Phase::SetupPlaceBench;
        state.players[0].zones.hand.push(basic(1, "Charmander"));
        state.players[0].zones.bench[1].push(basic(2, "Vulpix"));
        state.players[1].setup_complete = true;

        let inputs = legal_inputs(&state);
        assert_eq!(
            actions_of(&inputs, 0),
            vec![
                InputAction::PlaceBench { hand_index: 0, bench_index: 0 },
                InputAction::PlaceBench { hand_index: 0, bench_index: 2 },
                InputAction::StartBattle,
                InputAction::Concede,
            ]
        );
        assert_eq!(actions_of(&inputs, 1), vec![InputAction::Concede]);
    }

    #[test]
    fn test_main_energy_gated_on_turn_and_attacks_on_cost() {
        let mut state = GameState::empty_for_tests();
        state.phase = Phase::Main;
        state.turn = 1;
        state.current_player = 0;
        state.players[0].zones.active.push(basic(1, "Charmander"));
        state.players[0].current_energy = Some(EnergyType::Fire);

        let first = actions_of(&legal_inputs(&state), 0);
        assert_eq!(first, vec![InputAction::PassTurn, InputAction::Concede]);

        state.turn = 3;
        let third = actions_of(&legal_inputs(&state), 0);
        assert_eq!(
            third,
            vec![
                InputAction::AttachEnergy { target: ZoneName::Active },
                InputAction::PassTurn,
                InputAction::Concede
            ]
        );

        state.players[0].zones.active.add_energy(EnergyType::Fire, 1);
        let armed = actions_of(&legal_inputs(&state), 0);
        assert!(armed.contains(&InputAction::Attack { attack_index: 0 }));
        assert!(actions_of(&legal_inputs(&state), 1).iter().all(|a| *a == InputAction::Concede));
    }

    #[test]
    fn test_pending_promotion_is_exclusive() {
        let mut state = GameState::empty_for_tests();
        state.phase = Phase::Main;
        state.players[1].zones.bench[2].push(basic(7, "Vulpix"));
        state.pending_promotions.push(1);

        assert_eq!(
            legal_inputs(&state),
            vec![
                PlayerInput::new(1, InputAction::SelectNewActive { bench_index: 2 }),
                PlayerInput::concede(0),
                PlayerInput::concede(1),
            ]
        );
    }

    #[test]
    fn test_no_inputs_after_game_end() {
        let mut state = GameState::empty_for_tests();
        state.phase = Phase::GameEnd;
        assert!(legal_inputs(&state).is_empty());
    }

    #[test]
    fn test_generation_is_pure() {
        let mut state = GameState::empty_for_tests();
        state.phase = Phase::Main;
        state.turn = 2;
        state.players[0].zones.active.push(basic(1, "Charmander"));
        state.players[0].zones.hand.push(basic(2, "Vulpix"));
        let events = state.events.len();

        assert_eq!(legal_inputs(&state), legal_inputs(&state));
        assert_eq!(state.events.len(), events);
    }
}
