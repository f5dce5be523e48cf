//! Victory conditions.

use chrono::{DateTime, Utc};

use crate::models::{GameConfig, GameEvent, GameState, Phase, PlayerId, RoleReveal, Team, Winner};

/// Checks the win conditions in priority order without touching the state.
pub fn check_win(state: &GameState, config: &GameConfig) -> Option<(Winner, Vec<PlayerId>)> {
    if let Some(winner) = state.winner {
        return Some((winner, state.winner_ids.clone()));
    }

    let wolves = state.alive_on_team(Team::Werewolf).count();
    let killers: Vec<PlayerId> = state.alive_on_team(Team::SerialKiller).map(|p| p.id).collect();
    let alive = state.alive_players().count();

    if wolves == 0 && killers.is_empty() {
        return Some((Winner::Village, team_ids(state, Team::Village)));
    }
    if killers.is_empty() && config.wolf_majority.is_met(wolves, alive - wolves) {
        return Some((Winner::Werewolves, team_ids(state, Team::Werewolf)));
    }
    if !killers.is_empty() && alive - killers.len() <= 1 {
        return Some((Winner::SerialKiller, killers));
    }
    None
}

fn team_ids(state: &GameState, team: Team) -> Vec<PlayerId> {
    state
        .players
        .iter()
        .filter(|p| p.team == team)
        .map(|p| p.id)
        .collect()
}

/// Ends the game if a side has won. Returns whether it did.
pub fn evaluate(state: &mut GameState, config: &GameConfig, now: DateTime<Utc>) -> bool {
    if state.is_over() {
        return true;
    }
    match check_win(state, config) {
        Some((winner, winner_ids)) => {
            declare(state, winner, winner_ids, now);
            true
        }
        None => false,
    }
}

pub(crate) fn declare(state: &mut GameState, winner: Winner, winner_ids: Vec<PlayerId>, now: DateTime<Utc>) {
    state.winner = Some(winner);
    state.winner_ids = winner_ids.clone();
    state.phase = Phase::GameOver;
    state.phase_deadline = None;
    state.pending_hunters.clear();
    state.hunter_resume = None;

    log::info!(
        "room {}: game over after round {}, {:?} win ({:?})",
        state.room_id,
        state.round,
        winner,
        winner_ids
    );
    state.log_public(format!("The game is over: {:?} win.", winner), now);

    let full_reveal = state
        .players
        .iter()
        .map(|p| RoleReveal {
            player_id: p.id,
            role: p.role,
        })
        .collect();
    state.emit(GameEvent::GameOver {
        winner,
        winner_ids,
        full_reveal,
    });
    state.emit(GameEvent::PhaseChanged {
        phase: Phase::GameOver,
        round: state.round,
        deadline: None,
    });
}
