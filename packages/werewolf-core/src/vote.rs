//! Day-elimination voting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::deaths::apply_deaths;
use crate::error::{GameError, ValidationError};
use crate::models::{
    Death, DeathCause, GameConfig, GameEvent, GameState, HunterResume, Phase, PlayerId, Role,
    VoteCount, VoteEntry, Winner,
};
use crate::scheduler::enter_phase;
use crate::win;

pub const MAYOR_VOTE_WEIGHT: u32 = 2;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoteOutcome {
    pub tally: Vec<VoteCount>,
    pub eliminated: Option<PlayerId>,
    pub hunter_triggered: bool,
    pub jester_win: bool,
    pub elder_survived: Option<PlayerId>,
    /// (servant, role taken over)
    pub servant_replaced: Option<(PlayerId, Role)>,
}

pub fn cast_vote(
    state: &mut GameState,
    voter_id: PlayerId,
    target_id: Option<PlayerId>,
) -> Result<(), ValidationError> {
    if state.is_over() {
        return Err(ValidationError::GameOver);
    }
    if state.phase != Phase::DayVote {
        return Err(ValidationError::WrongPhase {
            actual: state.phase,
        });
    }
    let voter = state
        .player(voter_id)
        .ok_or(ValidationError::UnknownPlayer(voter_id))?;
    if !voter.is_alive() {
        return Err(ValidationError::ActorDead(voter_id));
    }

    match target_id {
        None => {
            state.votes.remove(&voter_id);
        }
        Some(target_id) => {
            if target_id == voter_id {
                return Err(ValidationError::SelfTarget);
            }
            let target = state
                .player(target_id)
                .ok_or(ValidationError::UnknownPlayer(target_id))?;
            if !target.is_alive() {
                return Err(ValidationError::TargetNotAlive(target_id));
            }
            state.votes.insert(voter_id, target_id);
        }
    }

    let votes = state
        .votes
        .iter()
        .map(|(voter_id, target_id)| VoteEntry {
            voter_id: *voter_id,
            target_id: *target_id,
        })
        .collect();
    let tally = tally(state);
    state.emit(GameEvent::VoteTally { votes, tally });
    Ok(())
}

/// Weighted totals per target, ordered by target id. Weights come from the
/// voter's current role, so a changed vote carries nothing over.
pub fn tally(state: &GameState) -> Vec<VoteCount> {
    let mut totals: BTreeMap<PlayerId, u32> = BTreeMap::new();
    for (voter_id, target_id) in &state.votes {
        let Some(voter) = state.player(*voter_id).filter(|p| p.is_alive()) else {
            continue;
        };
        let weight = if voter.has_role(Role::Mayor) {
            MAYOR_VOTE_WEIGHT
        } else {
            1
        };
        *totals.entry(*target_id).or_insert(0) += weight;
    }
    totals
        .into_iter()
        .map(|(target_id, weight)| VoteCount { target_id, weight })
        .collect()
}

/// The single most-voted player, if there is exactly one.
fn leader(tally: &[VoteCount]) -> Option<PlayerId> {
    let max = tally.iter().map(|c| c.weight).max()?;
    let mut leaders = tally.iter().filter(|c| c.weight == max);
    match (leaders.next(), leaders.next()) {
        (Some(only), None) => Some(only.target_id),
        _ => None,
    }
}

pub fn resolve(state: &mut GameState, config: &GameConfig, now: DateTime<Utc>) -> Result<VoteOutcome, GameError> {
    if state.phase != Phase::DayVote {
        return Err(GameError::invariant(format!(
            "room {}: vote resolution requested during {}",
            state.room_id, state.phase
        )));
    }

    let mut outcome = VoteOutcome {
        tally: tally(state),
        ..VoteOutcome::default()
    };

    let Some(target_id) = leader(&outcome.tally) else {
        state.log_public("The village could not agree. Nobody is eliminated.".to_string(), now);
        state.day_eliminated = None;
        enter_phase(state, config, Phase::DayVoteResult, now);
        return Ok(outcome);
    };
    let target = state
        .player(target_id)
        .cloned()
        .ok_or_else(|| GameError::invariant(format!("vote target {} vanished", target_id)))?;

    if target.has_role(Role::Jester) {
        apply_deaths(state, config, vec![vote_death(target_id)], now);
        state.day_eliminated = Some(target_id);
        outcome.eliminated = Some(target_id);
        outcome.jester_win = true;
        state.log_public(format!("{} was the Jester and fooled everyone.", target.name), now);
        win::declare(state, Winner::Jester, vec![target_id], now);
        return Ok(outcome);
    }

    if target.has_role(Role::Elder) && target.elder_lives > 0 {
        if let Some(elder) = state.player_mut(target_id) {
            elder.elder_lives -= 1;
        }
        outcome.elder_survived = Some(target_id);
        state.day_eliminated = None;
        state.log_public(
            format!("{} is the Elder and survives the village's judgement.", target.name),
            now,
        );
        enter_phase(state, config, Phase::DayVoteResult, now);
        return Ok(outcome);
    }

    let servant_id = if target.has_role(Role::Mayor) || target.has_role(Role::Elder) {
        state.alive_with_role(Role::Servant).map(|p| p.id).next()
    } else {
        None
    };
    if let (Some(servant_id), Some(role)) = (servant_id, target.role) {
        if let Some(servant) = state.player_mut(servant_id) {
            servant.role = Some(role);
        }
        outcome.servant_replaced = Some((servant_id, role));
        let servant_name = state.name_of(servant_id);
        state.log_public(format!("{} steps up as the new {}.", servant_name, role), now);
    }

    apply_deaths(state, config, vec![vote_death(target_id)], now);
    state.day_eliminated = Some(target_id);
    outcome.eliminated = Some(target_id);

    if !state.pending_hunters.is_empty() {
        outcome.hunter_triggered = true;
        state.hunter_resume = Some(HunterResume::NextNight);
        enter_phase(state, config, Phase::HunterShot, now);
        return Ok(outcome);
    }

    if !win::evaluate(state, config, now) {
        enter_phase(state, config, Phase::DayVoteResult, now);
    }
    Ok(outcome)
}

fn vote_death(player_id: PlayerId) -> Death {
    Death {
        player_id,
        cause: DeathCause::Vote,
    }
}
