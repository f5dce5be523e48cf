//! Per-player projection of the session state.
//!
//! A [`ClientView`] holds only what one player is allowed to know. The night
//! action buffer never appears in it, and other players' roles, lovers links
//! and idol bindings are exposed only under the rules in [`project`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::{
    DeathCause, GameConfig, GameState, LogEntry, LogVisibility, Phase, Player, PlayerId, PlayerStatus, Role,
    Team, VoteCount, VoteEntry, Winner,
};
use crate::{night, vote};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientView {
    pub room_id: String,
    pub viewer_id: PlayerId,
    pub phase: Phase,
    pub round: u32,
    pub deadline: Option<DateTime<Utc>>,
    pub players: Vec<PlayerView>,
    pub abilities: AbilityView,
    pub votes: Vec<VoteEntry>,
    pub tally: Vec<VoteCount>,
    pub log: Vec<LogEntry>,
    pub winner: Option<Winner>,
    pub winner_ids: Vec<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub status: PlayerStatus,
    pub death_cause: Option<DeathCause>,
    pub role: Option<Role>,
    pub team: Option<Team>,
    pub lovers_link_id: Option<PlayerId>,
    pub idol_id: Option<PlayerId>,
}

/// The viewer's own counters and what they may do right now.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbilityView {
    pub can_act: bool,
    pub has_submitted: bool,
    pub owes_shot: bool,
    pub wolf_targets: usize,
    pub elder_lives: u8,
    pub save_potion_used: bool,
    pub kill_potion_used: bool,
    pub last_protected_target_id: Option<PlayerId>,
    pub fox_active: bool,
    pub alpha_ability_used: bool,
}

struct Viewer<'a> {
    player: &'a Player,
    ghost: bool,
    game_over: bool,
    living_wolf: bool,
}

impl Viewer<'_> {
    fn omniscient(&self) -> bool {
        self.ghost || self.game_over
    }

    fn sees_role_of(&self, other: &Player, config: &GameConfig) -> bool {
        other.id == self.player.id
            || self.omniscient()
            || (!other.is_alive() && config.reveal_role_on_death)
            || (self.living_wolf && other.is_wolf_team())
    }

    fn sees_link_of(&self, other: &Player) -> bool {
        self.omniscient()
            || other.id == self.player.id
            || other.lovers_link_id == Some(self.player.id)
    }

    fn sees_idol_of(&self, other: &Player) -> bool {
        self.omniscient() || other.id == self.player.id
    }

    fn sees_entry(&self, entry: &LogEntry) -> bool {
        if self.omniscient() {
            return true;
        }
        match entry.visibility {
            LogVisibility::Public => true,
            LogVisibility::Private(player_id) => player_id == self.player.id,
            LogVisibility::Team(team) => self.player.team == team,
        }
    }
}

pub fn project(
    state: &GameState,
    config: &GameConfig,
    viewer_id: PlayerId,
) -> Result<ClientView, ValidationError> {
    let player = state
        .player(viewer_id)
        .ok_or(ValidationError::UnknownPlayer(viewer_id))?;
    let viewer = Viewer {
        player,
        ghost: !player.is_alive(),
        game_over: state.is_over(),
        living_wolf: player.is_alive() && player.is_wolf_team(),
    };

    let players = state
        .players
        .iter()
        .map(|other| {
            let role_visible = viewer.sees_role_of(other, config);
            PlayerView {
                id: other.id,
                name: other.name.clone(),
                status: other.status,
                death_cause: other.death_cause.filter(|_| viewer.omniscient()),
                role: other.role.filter(|_| role_visible),
                team: role_visible.then_some(other.team),
                lovers_link_id: other.lovers_link_id.filter(|_| viewer.sees_link_of(other)),
                idol_id: other.idol_id.filter(|_| viewer.sees_idol_of(other)),
            }
        })
        .collect();

    let (votes, tally) = if matches!(state.phase, Phase::DayVote | Phase::DayVoteResult) {
        let votes = state
            .votes
            .iter()
            .map(|(voter_id, target_id)| VoteEntry {
                voter_id: *voter_id,
                target_id: *target_id,
            })
            .collect();
        (votes, vote::tally(state))
    } else {
        (Vec::new(), Vec::new())
    };

    let log = state
        .log
        .entries
        .iter()
        .filter(|entry| viewer.sees_entry(entry))
        .cloned()
        .collect();

    Ok(ClientView {
        room_id: state.room_id.clone(),
        viewer_id,
        phase: state.phase,
        round: state.round,
        deadline: state.phase_deadline,
        players,
        abilities: abilities(state, player),
        votes,
        tally,
        log,
        winner: state.winner,
        winner_ids: state.winner_ids.clone(),
    })
}

fn abilities(state: &GameState, player: &Player) -> AbilityView {
    let (can_act, has_submitted) = match state.phase {
        Phase::Night(phase) => (
            night::is_actor(phase, player),
            state.night_actions.has_submitted(phase, player.id),
        ),
        Phase::DayVote => (player.is_alive(), state.votes.contains_key(&player.id)),
        _ => (false, false),
    };
    let owes_shot =
        state.phase == Phase::HunterShot && state.pending_hunters.front() == Some(&player.id);
    let wolf_targets = match state.phase {
        Phase::Night(phase) if can_act && phase == crate::models::NightPhase::Werewolves => {
            if state.cub_rage { 2 } else { 1 }
        }
        _ => 0,
    };

    AbilityView {
        can_act: can_act || owes_shot,
        has_submitted,
        owes_shot,
        wolf_targets,
        elder_lives: player.elder_lives,
        save_potion_used: player.save_potion_used,
        kill_potion_used: player.kill_potion_used,
        last_protected_target_id: player.last_protected_target_id,
        fox_active: player.fox_active,
        alpha_ability_used: player.alpha_ability_used,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NightPhase;

    fn state_with(roles: &[Role]) -> GameState {
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
        state.round = 1;
        state
    }

    fn role_of(view: &ClientView, player_id: PlayerId) -> Option<Role> {
        view.players.iter().find(|p| p.id == player_id).and_then(|p| p.role)
    }

    #[test]
    fn villagers_see_only_themselves() {
        let state = state_with(&[Role::Villager, Role::Seer, Role::Werewolf]);
        let view = project(&state, &GameConfig::default(), 1).unwrap();
        assert_eq!(role_of(&view, 1), Some(Role::Villager));
        assert_eq!(role_of(&view, 2), None);
        assert_eq!(role_of(&view, 3), None);
    }

    #[test]
    fn wolves_recognise_each_other() {
        let state = state_with(&[Role::Werewolf, Role::AlphaWolf, Role::Villager]);
        let view = project(&state, &GameConfig::default(), 1).unwrap();
        assert_eq!(role_of(&view, 2), Some(Role::AlphaWolf));
        assert_eq!(role_of(&view, 3), None);
    }

    #[test]
    fn reveal_policy_governs_the_dead() {
        let mut state = state_with(&[Role::Villager, Role::Seer, Role::Werewolf]);
        state.players[1].status = PlayerStatus::Dead;
        let shown = project(&state, &GameConfig::default(), 1).unwrap();
        assert_eq!(role_of(&shown, 2), Some(Role::Seer));

        let hidden = GameConfig {
            reveal_role_on_death: false,
            ..GameConfig::default()
        };
        let view = project(&state, &hidden, 1).unwrap();
        assert_eq!(role_of(&view, 2), None);

        let ghost = project(&state, &hidden, 2).unwrap();
        assert_eq!(role_of(&ghost, 3), Some(Role::Werewolf));
    }

    #[test]
    fn links_and_idols_stay_with_their_owners() {
        let mut state = state_with(&[Role::Villager, Role::Villager, Role::WildChild, Role::Werewolf]);
        state.players[0].lovers_link_id = Some(2);
        state.players[1].lovers_link_id = Some(1);
        state.players[2].idol_id = Some(1);

        let lover = project(&state, &GameConfig::default(), 2).unwrap();
        assert_eq!(lover.players[0].lovers_link_id, Some(2));
        assert_eq!(lover.players[2].idol_id, None);

        let outsider = project(&state, &GameConfig::default(), 4).unwrap();
        assert_eq!(outsider.players[0].lovers_link_id, None);
        assert_eq!(outsider.players[1].lovers_link_id, None);

        let child = project(&state, &GameConfig::default(), 3).unwrap();
        assert_eq!(child.players[2].idol_id, Some(1));
    }

    #[test]
    fn private_and_team_entries_are_filtered() {
        let mut state = state_with(&[Role::Seer, Role::Werewolf, Role::Villager]);
        let now = Utc::now();
        state.log_public("public".to_string(), now);
        state.log_private(1, "seer only".to_string(), now);
        state.log_team(Team::Werewolf, "wolves only".to_string(), now);

        let contents = |view: ClientView| -> Vec<String> {
            view.log.into_iter().map(|e| e.content).collect()
        };
        assert_eq!(
            contents(project(&state, &GameConfig::default(), 1).unwrap()),
            vec!["public", "seer only"]
        );
        assert_eq!(
            contents(project(&state, &GameConfig::default(), 2).unwrap()),
            vec!["public", "wolves only"]
        );
        assert_eq!(
            contents(project(&state, &GameConfig::default(), 3).unwrap()),
            vec!["public"]
        );
    }

    #[test]
    fn night_buffer_is_not_projected() {
        let mut state = state_with(&[Role::Seer, Role::Werewolf, Role::Villager]);
        state.phase = Phase::Night(NightPhase::Werewolves);
        state.night_actions.record(
            2,
            NightPhase::Werewolves,
            crate::models::NightAction::Attack { target_ids: vec![1] },
        );
        let view = project(&state, &GameConfig::default(), 3).unwrap();
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("Attack"));
        assert!(!view.abilities.can_act);

        let wolf = project(&state, &GameConfig::default(), 2).unwrap();
        assert!(wolf.abilities.can_act);
        assert!(wolf.abilities.has_submitted);
        assert_eq!(wolf.abilities.wolf_targets, 1);
    }

    #[test]
    fn death_causes_are_for_ghosts_only() {
        let mut state = state_with(&[Role::Bodyguard, Role::Werewolf, Role::Villager, Role::Villager]);
        state.players[0].status = PlayerStatus::Dead;
        state.players[0].death_cause = Some(DeathCause::Sacrifice);

        let living = project(&state, &GameConfig::default(), 3).unwrap();
        assert!(living.players.iter().all(|p| p.death_cause.is_none()));

        let ghost = project(&state, &GameConfig::default(), 1).unwrap();
        assert_eq!(ghost.players[0].death_cause, Some(DeathCause::Sacrifice));
    }
}
