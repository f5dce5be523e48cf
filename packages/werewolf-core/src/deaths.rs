//! Applying deaths and their chained consequences.
//!
//! Every death-causing path (night resolution, the day vote, a hunter shot)
//! funnels through [`apply_deaths`], so a player can only die once and the
//! lover, idol, wolf-cub and hunter consequences fire exactly once per death.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use crate::models::{
    Death, DeathCause, DeathOccasion, GameConfig, GameEvent, GameState, PlayerStatus, Role, Team,
};

/// Appends `death` unless that player is already in the list.
pub(crate) fn record(deaths: &mut Vec<Death>, death: Death) {
    if !deaths.iter().any(|d| d.player_id == death.player_id) {
        deaths.push(death);
    }
}

/// Kills every listed player still alive, then follows lovers links and idol
/// bindings. Returns the deaths actually applied, in order, without repeats.
pub(crate) fn apply_deaths(
    state: &mut GameState,
    config: &GameConfig,
    initial: Vec<Death>,
    now: DateTime<Utc>,
) -> Vec<Death> {
    let occasion = DeathOccasion::during(state.phase);
    let mut applied: Vec<Death> = Vec::new();
    let mut queue: VecDeque<Death> = initial.into();

    while let Some(death) = queue.pop_front() {
        if applied.iter().any(|d| d.player_id == death.player_id) {
            continue;
        }
        let Some(player) = state.player_mut(death.player_id) else {
            log::warn!("ignoring death of unknown player {}", death.player_id);
            continue;
        };
        if !player.is_alive() {
            continue;
        }

        player.status = PlayerStatus::Dead;
        player.death_cause = Some(death.cause);
        player.is_protected = false;
        let role = player.role;
        let name = player.name.clone();
        let lover = player.lovers_link_id;
        let owes_shot = role == Some(Role::Hunter) && !player.has_shot;
        applied.push(death);

        log::info!(
            "room {}: player {} died ({:?})",
            state.room_id,
            death.player_id,
            death.cause
        );

        if let Some(partner_id) = lover {
            let reciprocal = state
                .player(partner_id)
                .map_or(false, |p| p.is_alive() && p.lovers_link_id == Some(death.player_id));
            if reciprocal {
                queue.push_back(Death {
                    player_id: partner_id,
                    cause: DeathCause::Heartbreak,
                });
            }
        }

        let mut turned = Vec::new();
        for child in state.players.iter_mut().filter(|p| {
            p.is_alive() && p.has_role(Role::WildChild) && p.idol_id == Some(death.player_id)
        }) {
            if child.team != Team::Werewolf {
                child.team = Team::Werewolf;
                turned.push(child.id);
            }
        }
        for child_id in turned {
            state.log_private(
                child_id,
                format!("Your idol {} is dead. You now hunt with the wolves.", name),
                now,
            );
            let child_name = state.name_of(child_id);
            state.log_team(
                Team::Werewolf,
                format!("{} has joined the pack.", child_name),
                now,
            );
        }

        if role == Some(Role::WolfCub) {
            state.cub_rage_pending = true;
        }
        if owes_shot {
            state.pending_hunters.push_back(death.player_id);
        }

        let shown_role = if config.reveal_role_on_death { role } else { None };
        let announcement = match shown_role {
            Some(role) => format!("{} died. They were the {}.", name, role),
            None => format!("{} died.", name),
        };
        state.log_public(announcement, now);
        state.emit(GameEvent::PlayerDied {
            player_id: death.player_id,
            role: shown_role,
            occasion,
        });
    }

    applied
}
