//! The Hunter's dying shot.

use chrono::{DateTime, Utc};

use crate::deaths::apply_deaths;
use crate::error::{GameError, ValidationError};
use crate::models::{Death, DeathCause, GameConfig, GameState, Phase, PlayerId};
use crate::scheduler;

/// Fires the shot owed by the hunter at the front of the queue and moves the
/// game on. Returns the deaths the shot caused, chained ones included.
pub fn shoot(
    state: &mut GameState,
    config: &GameConfig,
    hunter_id: PlayerId,
    target_id: PlayerId,
    now: DateTime<Utc>,
) -> Result<Vec<Death>, GameError> {
    if state.is_over() {
        return Err(ValidationError::GameOver.into());
    }
    if state.phase != Phase::HunterShot {
        return Err(ValidationError::WrongPhase {
            actual: state.phase,
        }
        .into());
    }
    if state.pending_hunters.front() != Some(&hunter_id) {
        return Err(ValidationError::NoShotOwed(hunter_id).into());
    }
    if target_id == hunter_id {
        return Err(ValidationError::SelfTarget.into());
    }
    let target = state
        .player(target_id)
        .ok_or(ValidationError::UnknownPlayer(target_id))?;
    if !target.is_alive() {
        return Err(ValidationError::TargetNotAlive(target_id).into());
    }

    state.pending_hunters.pop_front();
    if let Some(hunter) = state.player_mut(hunter_id) {
        hunter.has_shot = true;
    }
    let (hunter_name, target_name) = (state.name_of(hunter_id), state.name_of(target_id));
    state.log_public(format!("{} fires a last shot at {}.", hunter_name, target_name), now);

    let deaths = apply_deaths(
        state,
        config,
        vec![Death {
            player_id: target_id,
            cause: DeathCause::HunterShot,
        }],
        now,
    );
    scheduler::after_hunter_shot(state, config, now)?;
    Ok(deaths)
}
