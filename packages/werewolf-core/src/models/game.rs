use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use super::action::NightActions;
use super::event::{Death, GameEvent, Winner};
use super::game_log::{GameLog, LogVisibility};
use super::phase::{HunterResume, NightPhase, Phase};
use super::player::{Player, PlayerId};
use super::role::{Role, Team};

/// The mutable per-room session record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GameState {
    pub room_id: String,
    pub players: Vec<Player>,
    pub phase: Phase,
    pub round: u32,
    pub night_order: Vec<NightPhase>,
    pub night_actions: NightActions,
    /// voter -> target
    pub votes: BTreeMap<PlayerId, PlayerId>,
    pub night_deaths: Vec<Death>,
    pub day_eliminated: Option<PlayerId>,
    pub log: GameLog,
    pub winner: Option<Winner>,
    pub winner_ids: Vec<PlayerId>,
    pub phase_deadline: Option<DateTime<Utc>>,
    pub cub_rage: bool,
    pub cub_rage_pending: bool,
    pub pending_hunters: VecDeque<PlayerId>,
    pub hunter_resume: Option<HunterResume>,
    #[serde(skip)]
    pub outbox: Vec<GameEvent>,
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GameState {{ room_id: {}, round: {}, phase: {}, alive: {}/{}, winner: {:?} }}",
            self.room_id,
            self.round,
            self.phase,
            self.alive_players().count(),
            self.players.len(),
            self.winner
        )
    }
}

impl GameState {
    pub fn new(room_id: String, players: Vec<Player>) -> Self {
        GameState {
            room_id,
            players,
            phase: Phase::NightStart,
            round: 0,
            night_order: Vec::new(),
            night_actions: NightActions::default(),
            votes: BTreeMap::new(),
            night_deaths: Vec::new(),
            day_eliminated: None,
            log: GameLog::new(),
            winner: None,
            winner_ids: Vec::new(),
            phase_deadline: None,
            cub_rage: false,
            cub_rage_pending: false,
            pending_hunters: VecDeque::new(),
            hunter_resume: None,
            outbox: Vec::new(),
        }
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn player_mut(&mut self, player_id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive())
    }

    pub fn alive_with_role(&self, role: Role) -> impl Iterator<Item = &Player> {
        self.alive_players().filter(move |p| p.has_role(role))
    }

    pub fn alive_on_team(&self, team: Team) -> impl Iterator<Item = &Player> {
        self.alive_players().filter(move |p| p.team == team)
    }

    pub fn any_dead(&self) -> bool {
        self.players.iter().any(|p| !p.is_alive())
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn name_of(&self, player_id: PlayerId) -> String {
        self.player(player_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("player {}", player_id))
    }

    pub fn log_public(&mut self, content: String, now: DateTime<Utc>) {
        self.log.public(self.round, content, now);
    }

    pub fn log_private(&mut self, player_id: PlayerId, content: String, now: DateTime<Utc>) {
        self.log.private(self.round, player_id, content, now);
    }

    pub fn log_team(&mut self, team: Team, content: String, now: DateTime<Utc>) {
        self.log.push(self.round, LogVisibility::Team(team), content, now);
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.outbox.push(event);
    }
}
