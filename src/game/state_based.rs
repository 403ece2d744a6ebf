//! State-based actions
//!
//! Checked after every action that can damage, discard or score. They never
//! consume input: knockouts happen automatically, an empty active slot either
//! queues a promotion request or ends the game.

use crate::game::actions::{declare_winner, knock_out, request_new_active};
use crate::game::{GameEndReason, GameState};
use crate::Result;

/// Apply every pending state-based action
pub fn check_state_based_actions(state: &mut GameState) -> Result<()> {
    if state.is_over() {
        return Ok(());
    }

    for player in 0..state.players.len() {
        let knocked_out: Vec<_> = state.players[player]
            .zones
            .in_play()
            .filter(|zone| zone.cards.last().is_some_and(|card| zone.damage >= card.hp))
            .map(|zone| zone.name)
            .collect();
        for zone in knocked_out {
            knock_out(state, player, zone)?;
        }
    }

    for player in 0..state.players.len() {
        let zones = &state.players[player].zones;
        if !zones.active.is_empty() {
            continue;
        }
        if zones.bench_occupied() > 0 {
            request_new_active(state, player);
        } else {
            declare_winner(state, Some(GameState::opponent_of(player)), GameEndReason::NoPokemon);
            return Ok(());
        }
    }

    let win_points = state.config.win_points;
    if let Some(winner) = state.players.iter().position(|p| p.points >= win_points) {
        declare_winner(state, Some(winner), GameEndReason::Points);
        return Ok(());
    }

    if let Some(loser) = state.players.iter().position(|p| p.decked_out) {
        declare_winner(state, Some(GameState::opponent_of(loser)), GameEndReason::DeckOut);
    }
    Ok(())
}
