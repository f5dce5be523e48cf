//! Night submissions and their resolution into a single death list.

use chrono::{DateTime, Utc};

use crate::deaths::{apply_deaths, record};
use crate::error::{GameError, ValidationError};
use crate::models::{
    ActionReceipt, Death, DeathCause, GameConfig, GameState, NightAction, NightActionPayload,
    NightActions, NightPhase, Phase, Player, PlayerId, Role, Team,
};

/// Pure validator turning a raw payload into a night action for one phase.
pub type Validator =
    fn(&GameState, &GameConfig, PlayerId, &NightActionPayload) -> Result<NightAction, ValidationError>;

pub fn validator(phase: NightPhase) -> Validator {
    match phase {
        NightPhase::Cupid => validate_cupid,
        NightPhase::WildChild => validate_wild_child,
        NightPhase::Seer => validate_seer,
        NightPhase::Fox => validate_fox,
        NightPhase::Bodyguard => validate_bodyguard,
        NightPhase::Doctor => validate_doctor,
        NightPhase::Werewolves => validate_werewolves,
        NightPhase::AlphaWolf => validate_alpha_wolf,
        NightPhase::WhiteWolf => validate_white_wolf,
        NightPhase::Witch => validate_witch,
        NightPhase::SerialKiller => validate_serial_killer,
        NightPhase::Medium => validate_medium,
    }
}

/// Whether `player` may act in `phase` right now.
pub fn is_actor(phase: NightPhase, player: &Player) -> bool {
    if !player.is_alive() {
        return false;
    }
    match phase {
        NightPhase::Cupid => player.has_role(Role::Cupid),
        NightPhase::WildChild => player.has_role(Role::WildChild),
        NightPhase::Seer => player.has_role(Role::Seer),
        NightPhase::Fox => player.has_role(Role::Fox) && player.fox_active,
        NightPhase::Bodyguard => player.has_role(Role::Bodyguard),
        NightPhase::Doctor => player.has_role(Role::Doctor),
        NightPhase::Werewolves => player.is_wolf_team(),
        NightPhase::AlphaWolf => player.has_role(Role::AlphaWolf) && !player.alpha_ability_used,
        NightPhase::WhiteWolf => player.has_role(Role::WhiteWolf),
        NightPhase::Witch => {
            player.has_role(Role::Witch) && !(player.save_potion_used && player.kill_potion_used)
        }
        NightPhase::SerialKiller => player.has_role(Role::SerialKiller),
        NightPhase::Medium => player.has_role(Role::Medium),
    }
}

pub fn required_actors(state: &GameState, phase: NightPhase) -> Vec<PlayerId> {
    state
        .players
        .iter()
        .filter(|p| is_actor(phase, p))
        .map(|p| p.id)
        .collect()
}

/// True once every required actor of `phase` has submitted. A phase nobody
/// can act in is never complete; its deadline moves it on.
pub fn phase_complete(state: &GameState, phase: NightPhase) -> bool {
    let required = required_actors(state, phase);
    !required.is_empty()
        && required
            .iter()
            .all(|id| state.night_actions.has_submitted(phase, *id))
}

pub fn submit(
    state: &mut GameState,
    config: &GameConfig,
    actor_id: PlayerId,
    phase: NightPhase,
    payload: &NightActionPayload,
    now: DateTime<Utc>,
) -> Result<ActionReceipt, ValidationError> {
    if state.is_over() {
        return Err(ValidationError::GameOver);
    }
    if state.phase != Phase::Night(phase) {
        return Err(ValidationError::WrongPhase {
            actual: state.phase,
        });
    }
    let actor = state
        .player(actor_id)
        .ok_or(ValidationError::UnknownPlayer(actor_id))?;
    if !actor.is_alive() {
        return Err(ValidationError::ActorDead(actor_id));
    }
    if !is_actor(phase, actor) {
        return Err(ValidationError::WrongRole {
            player_id: actor_id,
            phase,
        });
    }
    if state.night_actions.has_submitted(phase, actor_id) {
        return Err(ValidationError::AlreadySubmitted(actor_id));
    }

    let action = validator(phase)(state, config, actor_id, payload)?;
    let receipt = immediate_result(state, actor_id, &action, now);
    log::debug!(
        "room {}: player {} submitted {:?}",
        state.room_id,
        actor_id,
        action
    );
    state.night_actions.record(actor_id, phase, action);
    Ok(receipt)
}

fn immediate_result(
    state: &mut GameState,
    actor_id: PlayerId,
    action: &NightAction,
    now: DateTime<Utc>,
) -> ActionReceipt {
    match action {
        NightAction::Divine { target_id } => {
            let Some(role) = state.player(*target_id).and_then(|p| p.role) else {
                return ActionReceipt::Recorded;
            };
            let name = state.name_of(*target_id);
            state.log_private(actor_id, format!("{} is the {}.", name, role), now);
            ActionReceipt::Inspection {
                target_id: *target_id,
                role,
            }
        }
        NightAction::Commune {
            target_id,
            question,
        } => {
            let Some(role) = state.player(*target_id).and_then(|p| p.role) else {
                return ActionReceipt::Recorded;
            };
            let name = state.name_of(*target_id);
            state.log_private(actor_id, format!("The spirit of {} was the {}.", name, role), now);
            if let Some(question) = question {
                state.log_private(*target_id, format!("The Medium asks: {}", question), now);
            }
            ActionReceipt::Seance {
                target_id: *target_id,
                role,
            }
        }
        _ => ActionReceipt::Recorded,
    }
}

fn exactly(payload: &NightActionPayload, expected: usize) -> Result<Vec<PlayerId>, ValidationError> {
    let targets = payload.all_targets();
    if targets.len() != expected {
        return Err(ValidationError::TargetCount {
            expected,
            actual: targets.len(),
        });
    }
    for (i, id) in targets.iter().enumerate() {
        if targets[..i].contains(id) {
            return Err(ValidationError::DuplicateTarget(*id));
        }
    }
    Ok(targets)
}

fn at_most_one(payload: &NightActionPayload) -> Result<Option<PlayerId>, ValidationError> {
    let targets = payload.all_targets();
    match targets.as_slice() {
        [] => Ok(None),
        [id] => Ok(Some(*id)),
        _ => Err(ValidationError::TargetCount {
            expected: 1,
            actual: targets.len(),
        }),
    }
}

fn alive_target(state: &GameState, target_id: PlayerId) -> Result<&Player, ValidationError> {
    let target = state
        .player(target_id)
        .ok_or(ValidationError::UnknownPlayer(target_id))?;
    if !target.is_alive() {
        return Err(ValidationError::TargetNotAlive(target_id));
    }
    Ok(target)
}

fn not_self(actor_id: PlayerId, target_id: PlayerId) -> Result<(), ValidationError> {
    if actor_id == target_id {
        return Err(ValidationError::SelfTarget);
    }
    Ok(())
}

fn single_other(
    state: &GameState,
    actor_id: PlayerId,
    payload: &NightActionPayload,
) -> Result<PlayerId, ValidationError> {
    let target_id = exactly(payload, 1)?[0];
    not_self(actor_id, target_id)?;
    alive_target(state, target_id)?;
    Ok(target_id)
}

fn not_repeated(state: &GameState, actor_id: PlayerId, target_id: PlayerId) -> Result<(), ValidationError> {
    let last = state.player(actor_id).and_then(|p| p.last_protected_target_id);
    if last == Some(target_id) {
        return Err(ValidationError::RepeatTarget(target_id));
    }
    Ok(())
}

fn validate_cupid(
    state: &GameState,
    _config: &GameConfig,
    _actor_id: PlayerId,
    payload: &NightActionPayload,
) -> Result<NightAction, ValidationError> {
    let targets = exactly(payload, 2)?;
    for id in &targets {
        alive_target(state, *id)?;
    }
    Ok(NightAction::Link {
        first: targets[0],
        second: targets[1],
    })
}

fn validate_wild_child(
    state: &GameState,
    _config: &GameConfig,
    actor_id: PlayerId,
    payload: &NightActionPayload,
) -> Result<NightAction, ValidationError> {
    let target_id = single_other(state, actor_id, payload)?;
    Ok(NightAction::ChooseIdol { target_id })
}

fn validate_seer(
    state: &GameState,
    _config: &GameConfig,
    actor_id: PlayerId,
    payload: &NightActionPayload,
) -> Result<NightAction, ValidationError> {
    let target_id = single_other(state, actor_id, payload)?;
    Ok(NightAction::Divine { target_id })
}

fn validate_fox(
    state: &GameState,
    _config: &GameConfig,
    actor_id: PlayerId,
    payload: &NightActionPayload,
) -> Result<NightAction, ValidationError> {
    let target_ids = exactly(payload, 3)?;
    for id in &target_ids {
        not_self(actor_id, *id)?;
        alive_target(state, *id)?;
    }
    Ok(NightAction::Sniff { target_ids })
}

fn validate_bodyguard(
    state: &GameState,
    _config: &GameConfig,
    actor_id: PlayerId,
    payload: &NightActionPayload,
) -> Result<NightAction, ValidationError> {
    let target_id = single_other(state, actor_id, payload)?;
    not_repeated(state, actor_id, target_id)?;
    Ok(NightAction::Guard { target_id })
}

fn validate_doctor(
    state: &GameState,
    config: &GameConfig,
    actor_id: PlayerId,
    payload: &NightActionPayload,
) -> Result<NightAction, ValidationError> {
    let target_id = exactly(payload, 1)?[0];
    if !config.doctor_self_save {
        not_self(actor_id, target_id)?;
    }
    alive_target(state, target_id)?;
    not_repeated(state, actor_id, target_id)?;
    Ok(NightAction::Heal { target_id })
}

fn validate_werewolves(
    state: &GameState,
    _config: &GameConfig,
    _actor_id: PlayerId,
    payload: &NightActionPayload,
) -> Result<NightAction, ValidationError> {
    let prey = state.alive_players().filter(|p| !p.is_wolf_team()).count();
    let expected = if state.cub_rage { prey.clamp(1, 2) } else { 1 };
    let target_ids = exactly(payload, expected)?;
    for id in &target_ids {
        if alive_target(state, *id)?.is_wolf_team() {
            return Err(ValidationError::TargetIsWolf(*id));
        }
    }
    Ok(NightAction::Attack { target_ids })
}

fn validate_alpha_wolf(
    state: &GameState,
    _config: &GameConfig,
    _actor_id: PlayerId,
    payload: &NightActionPayload,
) -> Result<NightAction, ValidationError> {
    let target_id = at_most_one(payload)?;
    if let Some(id) = target_id {
        if alive_target(state, id)?.is_wolf_team() {
            return Err(ValidationError::TargetIsWolf(id));
        }
    }
    Ok(NightAction::Convert { target_id })
}

fn validate_white_wolf(
    state: &GameState,
    _config: &GameConfig,
    actor_id: PlayerId,
    payload: &NightActionPayload,
) -> Result<NightAction, ValidationError> {
    let target_id = at_most_one(payload)?;
    if let Some(id) = target_id {
        not_self(actor_id, id)?;
        if !alive_target(state, id)?.is_wolf_team() {
            return Err(ValidationError::TargetNotWolf(id));
        }
    }
    Ok(NightAction::Devour { target_id })
}

fn validate_witch(
    state: &GameState,
    _config: &GameConfig,
    actor_id: PlayerId,
    payload: &NightActionPayload,
) -> Result<NightAction, ValidationError> {
    let witch = state
        .player(actor_id)
        .ok_or(ValidationError::UnknownPlayer(actor_id))?;
    if payload.use_potion == Some(true) && witch.save_potion_used {
        return Err(ValidationError::PotionUsed);
    }
    let poison_target = at_most_one(payload)?;
    if let Some(id) = poison_target {
        if witch.kill_potion_used {
            return Err(ValidationError::PotionUsed);
        }
        not_self(actor_id, id)?;
        alive_target(state, id)?;
    }
    Ok(NightAction::Brew {
        poison_target,
        save: payload.use_potion != Some(false),
    })
}

fn validate_serial_killer(
    state: &GameState,
    _config: &GameConfig,
    actor_id: PlayerId,
    payload: &NightActionPayload,
) -> Result<NightAction, ValidationError> {
    let target_id = single_other(state, actor_id, payload)?;
    Ok(NightAction::Stab { target_id })
}

fn validate_medium(
    state: &GameState,
    _config: &GameConfig,
    _actor_id: PlayerId,
    payload: &NightActionPayload,
) -> Result<NightAction, ValidationError> {
    let target_id = exactly(payload, 1)?[0];
    let target = state
        .player(target_id)
        .ok_or(ValidationError::UnknownPlayer(target_id))?;
    if target.is_alive() {
        return Err(ValidationError::TargetNotDead(target_id));
    }
    Ok(NightAction::Commune {
        target_id,
        question: payload.question.clone(),
    })
}

/// Resolves the night's buffer into an ordered, de-duplicated death list.
///
/// Precedence is fixed: bindings, protections, the wolf channel, poison, the
/// Serial Killer, the White Wolf, old Knight wounds, the Fox, then chained
/// deaths. Protections only ever stop the wolf channel.
pub fn resolve_night(
    state: &mut GameState,
    config: &GameConfig,
    now: DateTime<Utc>,
) -> Result<Vec<Death>, GameError> {
    if !state.phase.is_night() {
        return Err(GameError::invariant(format!(
            "room {}: night resolution requested during {}",
            state.room_id, state.phase
        )));
    }

    let actions = state.night_actions.clone();
    let wounded: Vec<PlayerId> = state
        .alive_players()
        .filter(|p| p.is_injured)
        .map(|p| p.id)
        .collect();
    let mut pending: Vec<Death> = Vec::new();

    apply_bindings(state, &actions, now);
    let guarded = apply_protections(state, &actions);
    resolve_wolf_channel(state, &actions, &guarded, &mut pending, now);

    for recorded in actions.in_phase(NightPhase::Witch) {
        if let NightAction::Brew {
            poison_target: Some(target_id),
            ..
        } = recorded.action
        {
            if let Some(witch) = state.player_mut(recorded.actor_id) {
                witch.kill_potion_used = true;
            }
            record(
                &mut pending,
                Death {
                    player_id: target_id,
                    cause: DeathCause::Poison,
                },
            );
        }
    }

    for recorded in actions.in_phase(NightPhase::SerialKiller) {
        if let NightAction::Stab { target_id } = recorded.action {
            record(
                &mut pending,
                Death {
                    player_id: target_id,
                    cause: DeathCause::SerialKiller,
                },
            );
        }
    }

    if state.round % 2 == 0 {
        for recorded in actions.in_phase(NightPhase::WhiteWolf) {
            if let NightAction::Devour {
                target_id: Some(target_id),
            } = recorded.action
            {
                let still_wolf = state.player(target_id).map_or(false, |p| p.is_wolf_team());
                if still_wolf {
                    record(
                        &mut pending,
                        Death {
                            player_id: target_id,
                            cause: DeathCause::WhiteWolf,
                        },
                    );
                }
            }
        }
    }

    for wolf_id in &wounded {
        record(
            &mut pending,
            Death {
                player_id: *wolf_id,
                cause: DeathCause::Wound,
            },
        );
    }

    resolve_fox(state, &actions, now);

    let deaths = apply_deaths(state, config, pending, now);

    for wolf_id in &wounded {
        if let Some(wolf) = state.player_mut(*wolf_id) {
            wolf.is_injured = false;
        }
    }

    if deaths.is_empty() {
        state.log_public("Nobody died tonight.".to_string(), now);
    }
    log::info!(
        "room {}: night {} resolved with {} death(s)",
        state.room_id,
        state.round,
        deaths.len()
    );
    state.night_deaths = deaths.clone();
    Ok(deaths)
}

fn apply_bindings(state: &mut GameState, actions: &NightActions, now: DateTime<Utc>) {
    for recorded in actions.in_phase(NightPhase::Cupid) {
        if let NightAction::Link { first, second } = recorded.action {
            if let Some(p) = state.player_mut(first) {
                p.lovers_link_id = Some(second);
            }
            if let Some(p) = state.player_mut(second) {
                p.lovers_link_id = Some(first);
            }
            let (first_name, second_name) = (state.name_of(first), state.name_of(second));
            state.log_private(first, format!("You fell in love with {}.", second_name), now);
            state.log_private(second, format!("You fell in love with {}.", first_name), now);
            state.log_private(
                recorded.actor_id,
                format!("{} and {} are now lovers.", first_name, second_name),
                now,
            );
        }
    }

    for recorded in actions.in_phase(NightPhase::WildChild) {
        if let NightAction::ChooseIdol { target_id } = recorded.action {
            if let Some(child) = state.player_mut(recorded.actor_id) {
                child.idol_id = Some(target_id);
            }
        }
    }
}

/// Marks protected players and returns (bodyguard, guarded target) pairs.
fn apply_protections(state: &mut GameState, actions: &NightActions) -> Vec<(PlayerId, PlayerId)> {
    let mut guarded = Vec::new();
    let protectors: Vec<(PlayerId, Option<PlayerId>)> = state
        .alive_players()
        .filter(|p| p.has_role(Role::Doctor) || p.has_role(Role::Bodyguard))
        .map(|p| {
            let target = actions.actions.iter().find_map(|recorded| {
                if recorded.actor_id != p.id {
                    return None;
                }
                match recorded.action {
                    NightAction::Heal { target_id } | NightAction::Guard { target_id } => {
                        Some(target_id)
                    }
                    _ => None,
                }
            });
            (p.id, target)
        })
        .collect();

    for (protector_id, target) in protectors {
        if let Some(protector) = state.player_mut(protector_id) {
            protector.last_protected_target_id = target;
        }
        let Some(target_id) = target else { continue };
        if let Some(target) = state.player_mut(target_id) {
            target.is_protected = true;
        }
        let is_bodyguard = state
            .player(protector_id)
            .map_or(false, |p| p.has_role(Role::Bodyguard));
        if is_bodyguard {
            guarded.push((protector_id, target_id));
        }
    }
    guarded
}

fn resolve_wolf_channel(
    state: &mut GameState,
    actions: &NightActions,
    guarded: &[(PlayerId, PlayerId)],
    pending: &mut Vec<Death>,
    now: DateTime<Utc>,
) {
    let count = if state.cub_rage { 2 } else { 1 };
    let targets = actions.wolf_targets(count);
    let doctor_acted = actions.in_phase(NightPhase::Doctor).next().is_some();
    let alpha_choice = actions.in_phase(NightPhase::AlphaWolf).find_map(|recorded| {
        match recorded.action {
            NightAction::Convert {
                target_id: Some(target_id),
            } => Some((recorded.actor_id, target_id)),
            _ => None,
        }
    });

    for target_id in targets {
        let Some(target) = state.player(target_id).cloned() else {
            continue;
        };
        if !target.is_alive() {
            continue;
        }
        let name = target.name.clone();

        if let Some(&(bodyguard_id, _)) = guarded.iter().find(|(_, t)| *t == target_id) {
            record(
                pending,
                Death {
                    player_id: bodyguard_id,
                    cause: DeathCause::Sacrifice,
                },
            );
            state.log_private(
                bodyguard_id,
                format!("You threw yourself in front of the wolves to save {}.", name),
                now,
            );
            continue;
        }

        if target.is_protected {
            state.log_team(
                Team::Werewolf,
                format!("{} was protected tonight.", name),
                now,
            );
            continue;
        }

        if !doctor_acted {
            if let Some(witch_id) = auto_saving_witch(state, actions) {
                if let Some(witch) = state.player_mut(witch_id) {
                    witch.save_potion_used = true;
                }
                state.log_private(
                    witch_id,
                    format!("You used your healing potion on {}.", name),
                    now,
                );
                continue;
            }
        }

        if target.has_role(Role::CursedVillager) && target.team == Team::Village {
            convert(state, target_id, now);
            continue;
        }

        if let Some((alpha_id, _)) = alpha_choice.filter(|(_, t)| *t == target_id) {
            let usable = state
                .player(alpha_id)
                .map_or(false, |p| !p.alpha_ability_used);
            if usable {
                if let Some(alpha) = state.player_mut(alpha_id) {
                    alpha.alpha_ability_used = true;
                }
                convert(state, target_id, now);
                continue;
            }
        }

        if target.has_role(Role::SerialKiller) {
            state.log_team(
                Team::Werewolf,
                format!("{} shrugged off the attack.", name),
                now,
            );
            continue;
        }

        record(
            pending,
            Death {
                player_id: target_id,
                cause: DeathCause::WolfAttack,
            },
        );

        if target.has_role(Role::Knight) {
            injure_attacker(state, actions, target_id, now);
        }
    }
}

fn auto_saving_witch(state: &GameState, actions: &NightActions) -> Option<PlayerId> {
    state
        .alive_with_role(Role::Witch)
        .filter(|witch| !witch.save_potion_used)
        .find(|witch| {
            let declined = actions.in_phase(NightPhase::Witch).any(|recorded| {
                recorded.actor_id == witch.id
                    && matches!(recorded.action, NightAction::Brew { save: false, .. })
            });
            !declined
        })
        .map(|witch| witch.id)
}

fn convert(state: &mut GameState, target_id: PlayerId, now: DateTime<Utc>) {
    if let Some(target) = state.player_mut(target_id) {
        target.team = Team::Werewolf;
    }
    let name = state.name_of(target_id);
    state.log_private(
        target_id,
        "You were bitten and now hunt with the wolves.".to_string(),
        now,
    );
    state.log_team(Team::Werewolf, format!("{} has joined the pack.", name), now);
    log::info!("room {}: player {} converted", state.room_id, target_id);
}

fn injure_attacker(state: &mut GameState, actions: &NightActions, knight_id: PlayerId, now: DateTime<Utc>) {
    let eligible = |p: &Player| p.is_alive() && p.is_wolf_team() && !p.is_injured;
    let wolf_id = actions
        .attackers_of(knight_id)
        .into_iter()
        .find(|id| state.player(*id).map_or(false, eligible))
        .or_else(|| state.players.iter().find(|&p| eligible(p)).map(|p| p.id));

    if let Some(wolf_id) = wolf_id {
        if let Some(wolf) = state.player_mut(wolf_id) {
            wolf.is_injured = true;
        }
        state.log_private(
            wolf_id,
            "The Knight's rusty sword wounded you. You will not survive the next night."
                .to_string(),
            now,
        );
    }
}

fn resolve_fox(state: &mut GameState, actions: &NightActions, now: DateTime<Utc>) {
    for recorded in actions.in_phase(NightPhase::Fox) {
        let NightAction::Sniff { target_ids } = &recorded.action else {
            continue;
        };
        let found = target_ids
            .iter()
            .any(|id| state.player(*id).map_or(false, |p| p.is_wolf_team()));
        if found {
            state.log_private(
                recorded.actor_id,
                "You smell a wolf among the three.".to_string(),
                now,
            );
        } else {
            if let Some(fox) = state.player_mut(recorded.actor_id) {
                fox.fox_active = false;
            }
            state.log_private(
                recorded.actor_id,
                "No wolf among the three. Your nose has lost its gift.".to_string(),
                now,
            );
        }
    }
}
