use serde::{Deserialize, Serialize};

use super::event::DeathCause;
use super::role::{Role, Team};

pub type PlayerId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    Alive,
    Dead,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Option<Role>,
    pub team: Team,
    pub status: PlayerStatus,
    /// Known to the engine only; projected to omniscient viewers.
    pub death_cause: Option<DeathCause>,
    pub is_protected: bool,
    pub is_injured: bool,
    pub elder_lives: u8,
    pub save_potion_used: bool,
    pub kill_potion_used: bool,
    pub last_protected_target_id: Option<PlayerId>,
    pub fox_active: bool,
    pub alpha_ability_used: bool,
    pub lovers_link_id: Option<PlayerId>,
    pub idol_id: Option<PlayerId>,
    pub has_shot: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            role: None,
            team: Team::Village,
            status: PlayerStatus::Alive,
            death_cause: None,
            is_protected: false,
            is_injured: false,
            elder_lives: 0,
            save_potion_used: false,
            kill_potion_used: false,
            last_protected_target_id: None,
            fox_active: false,
            alpha_ability_used: false,
            lovers_link_id: None,
            idol_id: None,
            has_shot: false,
        }
    }

    /// Deals a role, resetting team and counters to the role's defaults.
    pub fn assign_role(&mut self, role: Role) {
        let counters = role.default_counters();
        self.role = Some(role);
        self.team = role.team();
        self.elder_lives = counters.elder_lives;
        self.fox_active = counters.fox_active;
    }

    pub fn is_alive(&self) -> bool {
        self.status == PlayerStatus::Alive
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }

    pub fn is_wolf_team(&self) -> bool {
        self.team == Team::Werewolf
    }
}
