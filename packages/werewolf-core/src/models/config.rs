use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::phase::Phase;
use super::role::Role;
use crate::error::ConfigError;

pub const MIN_PLAYERS: usize = 5;
pub const MAX_PLAYERS: usize = 20;
/// Longest any single phase may last, before the speed multiplier.
pub const MAX_PHASE_SECS: u64 = 3600;
pub const MAX_TRANSITION_MS: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl GameSpeed {
    pub fn multiplier(self) -> f64 {
        match self {
            GameSpeed::Slow => 1.5,
            GameSpeed::Normal => 1.0,
            GameSpeed::Fast => 0.6,
        }
    }
}

/// Threshold the wolves must reach against the other living players to win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WolfMajority {
    /// wolves >= rest
    #[default]
    AtLeastEqual,
    /// wolves > rest
    Strict,
}

impl WolfMajority {
    pub fn is_met(self, wolves: usize, rest: usize) -> bool {
        match self {
            WolfMajority::AtLeastEqual => wolves >= rest,
            WolfMajority::Strict => wolves > rest,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub enabled_roles: BTreeSet<Role>,
    pub role_counts: BTreeMap<Role, usize>,
    pub night_duration_secs: u64,
    pub discussion_duration_secs: u64,
    pub vote_duration_secs: u64,
    #[serde(default)]
    pub speed: GameSpeed,
    #[serde(default = "default_true")]
    pub reveal_role_on_death: bool,
    #[serde(default)]
    pub doctor_self_save: bool,
    #[serde(default)]
    pub wolf_majority: WolfMajority,
    #[serde(default = "default_reveal_secs")]
    pub reveal_duration_secs: u64,
    #[serde(default = "default_hunter_secs")]
    pub hunter_duration_secs: u64,
    // NIGHT_START is never left instantly, even with nobody to wait for
    #[serde(default = "default_transition_ms")]
    pub transition_delay_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_reveal_secs() -> u64 {
    10
}

fn default_hunter_secs() -> u64 {
    30
}

fn default_transition_ms() -> u64 {
    1500
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            enabled_roles: BTreeSet::new(),
            role_counts: BTreeMap::new(),
            night_duration_secs: 30,
            discussion_duration_secs: 120,
            vote_duration_secs: 45,
            speed: GameSpeed::Normal,
            reveal_role_on_death: true,
            doctor_self_save: false,
            wolf_majority: WolfMajority::AtLeastEqual,
            reveal_duration_secs: default_reveal_secs(),
            hunter_duration_secs: default_hunter_secs(),
            transition_delay_ms: default_transition_ms(),
        }
    }
}

impl GameConfig {
    /// Enables exactly the given roles with the given counts.
    pub fn with_roles(roles: &[(Role, usize)]) -> Self {
        let mut config = Self::default();
        for &(role, count) in roles {
            config.enabled_roles.insert(role);
            *config.role_counts.entry(role).or_insert(0) += count;
        }
        config
    }

    pub fn is_enabled(&self, role: Role) -> bool {
        self.enabled_roles.contains(&role)
    }

    pub fn validate(&self, player_count: usize) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
            return Err(ConfigError::PlayerCount {
                min: MIN_PLAYERS,
                max: MAX_PLAYERS,
                actual: player_count,
            });
        }

        let dealt = self
            .role_counts
            .values()
            .try_fold(0usize, |total, count| total.checked_add(*count));
        match dealt {
            Some(dealt) if dealt == player_count => {}
            other => {
                return Err(ConfigError::RoleCountMismatch {
                    players: player_count,
                    roles: other.unwrap_or(usize::MAX),
                })
            }
        }

        for (role, count) in &self.role_counts {
            if *count > 0 && !self.is_enabled(*role) {
                return Err(ConfigError::RoleNotEnabled(*role));
            }
        }

        let wolves: usize = self
            .role_counts
            .iter()
            .filter(|(role, _)| role.is_wolf())
            .map(|(_, count)| count)
            .sum();
        if wolves == 0 {
            return Err(ConfigError::NoWolves);
        }

        if self.night_duration_secs == 0
            || self.discussion_duration_secs == 0
            || self.vote_duration_secs == 0
        {
            return Err(ConfigError::ZeroDuration);
        }
        let longest = [
            self.night_duration_secs,
            self.discussion_duration_secs,
            self.vote_duration_secs,
            self.reveal_duration_secs,
            self.hunter_duration_secs,
        ]
        .into_iter()
        .max()
        .unwrap_or(0);
        if longest > MAX_PHASE_SECS || self.transition_delay_ms > MAX_TRANSITION_MS {
            return Err(ConfigError::DurationTooLong {
                max_secs: MAX_PHASE_SECS,
                max_transition_ms: MAX_TRANSITION_MS,
            });
        }

        Ok(())
    }

    /// The deck of roles to deal, in catalog order.
    pub fn role_deck(&self) -> Vec<Role> {
        self.role_counts
            .iter()
            .flat_map(|(role, count)| std::iter::repeat(*role).take(*count))
            .collect()
    }

    pub fn phase_duration(&self, phase: Phase) -> Duration {
        let secs = match phase {
            Phase::NightStart => {
                return Duration::milliseconds(self.transition_delay_ms.max(1) as i64)
            }
            Phase::Night(_) => self.night_duration_secs,
            Phase::DayReveal | Phase::DayVoteResult => self.reveal_duration_secs,
            Phase::DayDiscussion => self.discussion_duration_secs,
            Phase::DayVote => self.vote_duration_secs,
            Phase::HunterShot => self.hunter_duration_secs,
            Phase::GameOver => 0,
        };
        let millis = (secs as f64 * 1000.0 * self.speed.multiplier()).round() as i64;
        Duration::milliseconds(millis.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::phase::NightPhase;

    fn classic() -> GameConfig {
        GameConfig::with_roles(&[(Role::Villager, 3), (Role::Werewolf, 2), (Role::Seer, 1)])
    }

    #[test]
    fn accepts_counts_matching_the_table() {
        assert!(classic().validate(6).is_ok());
    }

    #[test]
    fn rejects_counts_that_do_not_sum_to_players() {
        assert_eq!(
            classic().validate(7),
            Err(ConfigError::RoleCountMismatch { players: 7, roles: 6 })
        );
    }

    #[test]
    fn rejects_tables_outside_player_bounds() {
        let config = GameConfig::with_roles(&[(Role::Villager, 3), (Role::Werewolf, 1)]);
        assert!(matches!(
            config.validate(4),
            Err(ConfigError::PlayerCount { actual: 4, .. })
        ));
    }

    #[test]
    fn rejects_counted_roles_that_are_not_enabled() {
        let mut config = classic();
        config.enabled_roles.remove(&Role::Seer);
        assert_eq!(config.validate(6), Err(ConfigError::RoleNotEnabled(Role::Seer)));
    }

    #[test]
    fn rejects_tables_without_wolves() {
        let config = GameConfig::with_roles(&[(Role::Villager, 5), (Role::Seer, 1)]);
        assert_eq!(config.validate(6), Err(ConfigError::NoWolves));
    }

    #[test]
    fn rejects_durations_past_the_cap() {
        let mut config = classic();
        config.night_duration_secs = u64::MAX;
        assert!(matches!(
            config.validate(6),
            Err(ConfigError::DurationTooLong { .. })
        ));

        let mut config = classic();
        config.hunter_duration_secs = MAX_PHASE_SECS + 1;
        assert!(config.validate(6).is_err());

        let mut config = classic();
        config.transition_delay_ms = MAX_TRANSITION_MS + 1;
        assert!(config.validate(6).is_err());

        let mut config = classic();
        config.discussion_duration_secs = MAX_PHASE_SECS;
        config.speed = GameSpeed::Slow;
        assert!(config.validate(6).is_ok());
    }

    #[test]
    fn overflowing_counts_are_a_mismatch() {
        let mut config = classic();
        config.role_counts.insert(Role::Villager, usize::MAX);
        assert_eq!(
            config.validate(6),
            Err(ConfigError::RoleCountMismatch {
                players: 6,
                roles: usize::MAX
            })
        );
    }

    #[test]
    fn speed_scales_phase_durations() {
        let mut config = classic();
        config.night_duration_secs = 30;
        let night = Phase::Night(NightPhase::Seer);

        config.speed = GameSpeed::Slow;
        assert_eq!(config.phase_duration(night), Duration::seconds(45));
        config.speed = GameSpeed::Fast;
        assert_eq!(config.phase_duration(night), Duration::seconds(18));
        config.speed = GameSpeed::Normal;
        assert_eq!(config.phase_duration(night), Duration::seconds(30));
    }
}
