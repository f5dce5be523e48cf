//! Phase scheduling: which night sub-phases run, deadlines, and the single
//! `advance` path shared by early advance, explicit skips and timeouts.

use chrono::{DateTime, Utc};

use crate::error::GameError;
use crate::models::{
    GameConfig, GameEvent, GameState, HunterResume, NightActions, NightPhase, Phase, Role,
};
use crate::{night, vote, win};

const PACK_ROLES: [Role; 4] = [Role::Werewolf, Role::AlphaWolf, Role::WhiteWolf, Role::WolfCub];

/// Roles whose presence in the config enables a night sub-phase.
pub fn phase_roles(phase: NightPhase) -> &'static [Role] {
    match phase {
        NightPhase::Cupid => &[Role::Cupid],
        NightPhase::WildChild => &[Role::WildChild],
        NightPhase::Seer => &[Role::Seer],
        NightPhase::Fox => &[Role::Fox],
        NightPhase::Bodyguard => &[Role::Bodyguard],
        NightPhase::Doctor => &[Role::Doctor],
        NightPhase::Werewolves => &PACK_ROLES,
        NightPhase::AlphaWolf => &[Role::AlphaWolf],
        NightPhase::WhiteWolf => &[Role::WhiteWolf],
        NightPhase::Witch => &[Role::Witch],
        NightPhase::SerialKiller => &[Role::SerialKiller],
        NightPhase::Medium => &[Role::Medium],
    }
}

fn is_scheduled(state: &GameState, config: &GameConfig, phase: NightPhase) -> bool {
    let round_allows = match phase {
        NightPhase::Cupid | NightPhase::WildChild => state.round == 1,
        NightPhase::WhiteWolf => state.round % 2 == 0,
        NightPhase::Medium => state.any_dead(),
        _ => true,
    };
    round_allows
        && phase_roles(phase).iter().any(|role| config.is_enabled(*role))
        && !night::required_actors(state, phase).is_empty()
}

/// The ordered night sub-phases that apply to the current round.
pub fn night_phase_order(state: &GameState, config: &GameConfig) -> Vec<NightPhase> {
    NightPhase::ORDER
        .iter()
        .copied()
        .filter(|phase| is_scheduled(state, config, *phase))
        .collect()
}

pub(crate) fn enter_phase(state: &mut GameState, config: &GameConfig, phase: Phase, now: DateTime<Utc>) {
    state.phase = phase;
    state.phase_deadline = Some(now + config.phase_duration(phase));
    log::info!(
        "room {}: round {} entering {} until {:?}",
        state.room_id,
        state.round,
        phase,
        state.phase_deadline
    );
    state.emit(GameEvent::PhaseChanged {
        phase,
        round: state.round,
        deadline: state.phase_deadline,
    });
}

pub fn start_night(state: &mut GameState, config: &GameConfig, now: DateTime<Utc>) {
    state.round += 1;
    for player in state.players.iter_mut() {
        player.is_protected = false;
    }
    state.night_actions = NightActions::default();
    state.votes.clear();
    state.night_deaths.clear();
    state.day_eliminated = None;
    state.cub_rage = std::mem::take(&mut state.cub_rage_pending);
    state.night_order = night_phase_order(state, config);

    let round = state.round;
    state.log_public(format!("Night {} falls.", round), now);
    if state.cub_rage {
        state.log_team(
            crate::models::Team::Werewolf,
            "The cub is avenged tonight: choose two victims.".to_string(),
            now,
        );
    }

    match state.night_order.first().copied() {
        Some(first) => enter_phase(state, config, Phase::Night(first), now),
        None => enter_phase(state, config, Phase::NightStart, now),
    }
}

/// Moves the session out of its current phase. Every transition goes through
/// here, whether triggered by a timeout, a completed sub-phase or a skip.
pub fn advance(state: &mut GameState, config: &GameConfig, now: DateTime<Utc>) -> Result<(), GameError> {
    match state.phase {
        Phase::GameOver => Ok(()),
        Phase::NightStart => next_night_phase(state, config, None, now),
        Phase::Night(current) => next_night_phase(state, config, Some(current), now),
        Phase::DayReveal => {
            let next = if state.pending_hunters.is_empty() {
                Phase::DayDiscussion
            } else {
                Phase::HunterShot
            };
            enter_phase(state, config, next, now);
            Ok(())
        }
        Phase::DayDiscussion => {
            state.votes.clear();
            enter_phase(state, config, Phase::DayVote, now);
            Ok(())
        }
        Phase::DayVote => vote::resolve(state, config, now).map(|_| ()),
        Phase::DayVoteResult => {
            start_night(state, config, now);
            Ok(())
        }
        Phase::HunterShot => {
            if let Some(hunter_id) = state.pending_hunters.pop_front() {
                if let Some(hunter) = state.player_mut(hunter_id) {
                    hunter.has_shot = true;
                }
                let name = state.name_of(hunter_id);
                state.log_public(format!("{} took their last breath without firing.", name), now);
            }
            after_hunter_shot(state, config, now)
        }
    }
}

/// Advances iff the deadline has passed. Safe to call any number of times.
pub fn check_timeout(state: &mut GameState, config: &GameConfig, now: DateTime<Utc>) -> Result<bool, GameError> {
    match state.phase_deadline {
        Some(deadline) if !state.is_over() && now >= deadline => {
            log::debug!("room {}: deadline for {} elapsed", state.room_id, state.phase);
            advance(state, config, now)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

fn next_night_phase(
    state: &mut GameState,
    config: &GameConfig,
    current: Option<NightPhase>,
    now: DateTime<Utc>,
) -> Result<(), GameError> {
    let next = match current {
        None => state.night_order.first().copied(),
        Some(current) => state
            .night_order
            .iter()
            .skip_while(|phase| **phase != current)
            .nth(1)
            .copied(),
    };
    match next {
        Some(phase) => {
            enter_phase(state, config, Phase::Night(phase), now);
            Ok(())
        }
        None => finish_night(state, config, now),
    }
}

fn finish_night(state: &mut GameState, config: &GameConfig, now: DateTime<Utc>) -> Result<(), GameError> {
    night::resolve_night(state, config, now)?;
    if !state.pending_hunters.is_empty() {
        state.hunter_resume = Some(HunterResume::Discussion);
        enter_phase(state, config, Phase::DayReveal, now);
        return Ok(());
    }
    if win::evaluate(state, config, now) {
        return Ok(());
    }
    enter_phase(state, config, Phase::DayReveal, now);
    Ok(())
}

pub(crate) fn after_hunter_shot(
    state: &mut GameState,
    config: &GameConfig,
    now: DateTime<Utc>,
) -> Result<(), GameError> {
    if !state.pending_hunters.is_empty() {
        enter_phase(state, config, Phase::HunterShot, now);
        return Ok(());
    }
    if win::evaluate(state, config, now) {
        return Ok(());
    }
    match state.hunter_resume.take() {
        Some(HunterResume::Discussion) => enter_phase(state, config, Phase::DayDiscussion, now),
        Some(HunterResume::NextNight) | None => start_night(state, config, now),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Player, PlayerStatus};

    fn state_with(roles: &[Role], round: u32) -> GameState {
        let players = roles
            .iter()
            .enumerate()
            .map(|(i, role)| {
                let mut player = Player::new(i as u32 + 1, format!("P{}", i + 1));
                player.assign_role(*role);
                player
            })
            .collect();
        let mut state = GameState::new("room".to_string(), players);
        state.round = round;
        state
    }

    fn config_for(roles: &[Role]) -> GameConfig {
        let counts: Vec<(Role, usize)> = roles.iter().map(|r| (*r, 1)).collect();
        GameConfig::with_roles(&counts)
    }

    const FULL: [Role; 8] = [
        Role::Cupid,
        Role::WildChild,
        Role::Seer,
        Role::WhiteWolf,
        Role::Werewolf,
        Role::Medium,
        Role::Doctor,
        Role::Villager,
    ];

    #[test]
    fn first_night_includes_cupid_and_wild_child() {
        let state = state_with(&FULL, 1);
        let order = night_phase_order(&state, &config_for(&FULL));
        assert_eq!(
            order,
            vec![
                NightPhase::Cupid,
                NightPhase::WildChild,
                NightPhase::Seer,
                NightPhase::Doctor,
                NightPhase::Werewolves,
            ]
        );
    }

    #[test]
    fn white_wolf_only_on_even_rounds_and_medium_only_with_the_dead() {
        let mut state = state_with(&FULL, 2);
        let config = config_for(&FULL);
        let order = night_phase_order(&state, &config);
        assert!(order.contains(&NightPhase::WhiteWolf));
        assert!(!order.contains(&NightPhase::Cupid));
        assert!(!order.contains(&NightPhase::Medium));

        state.round = 3;
        state.players[7].status = PlayerStatus::Dead;
        let order = night_phase_order(&state, &config);
        assert!(!order.contains(&NightPhase::WhiteWolf));
        assert!(order.contains(&NightPhase::Medium));
    }

    #[test]
    fn dead_holders_drop_their_phase() {
        let mut state = state_with(&FULL, 1);
        let config = config_for(&FULL);
        state.players[2].status = PlayerStatus::Dead;
        let order = night_phase_order(&state, &config);
        assert!(!order.contains(&NightPhase::Seer));
        for phase in order {
            assert!(!night::required_actors(&state, phase).is_empty());
        }
    }

    #[test]
    fn disabled_roles_have_no_phase() {
        let state = state_with(&FULL, 1);
        let mut config = config_for(&FULL);
        config.enabled_roles.remove(&Role::Seer);
        assert!(!night_phase_order(&state, &config).contains(&NightPhase::Seer));
    }

    #[test]
    fn empty_night_waits_for_the_transition_delay() {
        let mut state = state_with(&[Role::Villager, Role::Villager], 0);
        let config = config_for(&[Role::Villager]);
        let now = Utc::now();
        start_night(&mut state, &config, now);
        assert_eq!(state.phase, Phase::NightStart);
        assert!(state.phase_deadline.unwrap() > now);
        assert!(!check_timeout(&mut state, &config, now).unwrap());
    }

    #[test]
    fn start_night_resets_the_buffer_and_protection() {
        let mut state = state_with(&[Role::Seer, Role::Werewolf, Role::Villager], 0);
        let config = config_for(&[Role::Seer, Role::Werewolf, Role::Villager]);
        state.players[2].is_protected = true;
        state.night_actions.record(
            1,
            NightPhase::Seer,
            crate::models::NightAction::Divine { target_id: 2 },
        );
        state.cub_rage_pending = true;
        start_night(&mut state, &config, Utc::now());
        assert_eq!(state.round, 1);
        assert!(state.night_actions.actions.is_empty());
        assert!(!state.players[2].is_protected);
        assert!(state.cub_rage);
        assert!(!state.cub_rage_pending);
        assert_eq!(state.phase, Phase::Night(NightPhase::Seer));
    }
}
