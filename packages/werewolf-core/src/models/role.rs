use serde::{Deserialize, Serialize};
use std::fmt;

use super::phase::NightPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Villager,
    Werewolf,
    Seer,
    Doctor,
    Bodyguard,
    Witch,
    Hunter,
    Cupid,
    WildChild,
    Fox,
    Medium,
    Elder,
    Mayor,
    Servant,
    Knight,
    CursedVillager,
    AlphaWolf,
    WhiteWolf,
    WolfCub,
    SerialKiller,
    Jester,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Team {
    Village,
    Werewolf,
    SerialKiller,
    Jester,
}

/// Static catalog entry for a role.
#[derive(Debug, Clone, Copy)]
pub struct RoleInfo {
    pub role: Role,
    pub team: Team,
    /// The night sub-phase this role acts in, if any.
    pub night_phase: Option<NightPhase>,
    pub description: &'static str,
}

/// Counters a player starts the game with, derived from their role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleCounters {
    pub elder_lives: u8,
    pub fox_active: bool,
}

impl Role {
    pub const ALL: [Role; 21] = [
        Role::Villager,
        Role::Werewolf,
        Role::Seer,
        Role::Doctor,
        Role::Bodyguard,
        Role::Witch,
        Role::Hunter,
        Role::Cupid,
        Role::WildChild,
        Role::Fox,
        Role::Medium,
        Role::Elder,
        Role::Mayor,
        Role::Servant,
        Role::Knight,
        Role::CursedVillager,
        Role::AlphaWolf,
        Role::WhiteWolf,
        Role::WolfCub,
        Role::SerialKiller,
        Role::Jester,
    ];

    pub fn info(self) -> RoleInfo {
        let (team, night_phase, description) = match self {
            Role::Villager => (Team::Village, None, "No ability. Finds the wolves by talking."),
            Role::Werewolf => (
                Team::Werewolf,
                Some(NightPhase::Werewolves),
                "Chooses a victim with the pack each night.",
            ),
            Role::Seer => (
                Team::Village,
                Some(NightPhase::Seer),
                "Learns the role of one player each night.",
            ),
            Role::Doctor => (
                Team::Village,
                Some(NightPhase::Doctor),
                "Protects one player from the wolves each night.",
            ),
            Role::Bodyguard => (
                Team::Village,
                Some(NightPhase::Bodyguard),
                "Guards one player and dies in their place if the wolves strike.",
            ),
            Role::Witch => (
                Team::Village,
                Some(NightPhase::Witch),
                "Holds one healing and one poison potion.",
            ),
            Role::Hunter => (Team::Village, None, "Takes one player down when dying."),
            Role::Cupid => (
                Team::Village,
                Some(NightPhase::Cupid),
                "Binds two lovers on the first night.",
            ),
            Role::WildChild => (
                Team::Village,
                Some(NightPhase::WildChild),
                "Picks an idol on the first night and turns wolf if it dies.",
            ),
            Role::Fox => (
                Team::Village,
                Some(NightPhase::Fox),
                "Sniffs three players for wolves; loses the gift on a miss.",
            ),
            Role::Medium => (
                Team::Village,
                Some(NightPhase::Medium),
                "Questions one dead player each night.",
            ),
            Role::Elder => (Team::Village, None, "Survives the first village vote against them."),
            Role::Mayor => (Team::Village, None, "Their vote counts twice."),
            Role::Servant => (
                Team::Village,
                None,
                "Takes over the role of an eliminated Mayor or Elder.",
            ),
            Role::Knight => (
                Team::Village,
                None,
                "Wounds one attacking wolf when killed by the pack.",
            ),
            Role::CursedVillager => (
                Team::Village,
                None,
                "Joins the wolves instead of dying when attacked by them.",
            ),
            Role::AlphaWolf => (
                Team::Werewolf,
                Some(NightPhase::AlphaWolf),
                "Once per game turns the pack's victim into a wolf.",
            ),
            Role::WhiteWolf => (
                Team::Werewolf,
                Some(NightPhase::WhiteWolf),
                "Every second night may devour a fellow wolf.",
            ),
            Role::WolfCub => (
                Team::Werewolf,
                Some(NightPhase::Werewolves),
                "Its death enrages the pack into a double kill.",
            ),
            Role::SerialKiller => (
                Team::SerialKiller,
                Some(NightPhase::SerialKiller),
                "Kills alone every night and is immune to the pack.",
            ),
            Role::Jester => (Team::Jester, None, "Wins alone by being voted out."),
        };

        RoleInfo {
            role: self,
            team,
            night_phase,
            description,
        }
    }

    pub fn team(self) -> Team {
        self.info().team
    }

    pub fn is_wolf(self) -> bool {
        self.team() == Team::Werewolf
    }

    pub fn default_counters(self) -> RoleCounters {
        RoleCounters {
            elder_lives: if self == Role::Elder { 1 } else { 0 },
            fox_active: self == Role::Fox,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Villager => "Villager",
            Role::Werewolf => "Werewolf",
            Role::Seer => "Seer",
            Role::Doctor => "Doctor",
            Role::Bodyguard => "Bodyguard",
            Role::Witch => "Witch",
            Role::Hunter => "Hunter",
            Role::Cupid => "Cupid",
            Role::WildChild => "Wild Child",
            Role::Fox => "Fox",
            Role::Medium => "Medium",
            Role::Elder => "Elder",
            Role::Mayor => "Mayor",
            Role::Servant => "Servant",
            Role::Knight => "Knight",
            Role::CursedVillager => "Cursed Villager",
            Role::AlphaWolf => "Alpha Wolf",
            Role::WhiteWolf => "White Wolf",
            Role::WolfCub => "Wolf Cub",
            Role::SerialKiller => "Serial Killer",
            Role::Jester => "Jester",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Village => write!(f, "Village"),
            Team::Werewolf => write!(f, "Werewolves"),
            Team::SerialKiller => write!(f, "Serial Killer"),
            Team::Jester => write!(f, "Jester"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wolf_roles_share_the_pack_phase_or_their_own() {
        for role in Role::ALL {
            if role.is_wolf() {
                assert!(role.info().night_phase.is_some(), "{} has no night", role);
            }
        }
        assert_eq!(Role::WolfCub.info().night_phase, Some(NightPhase::Werewolves));
    }

    #[test]
    fn solo_roles_have_their_own_team() {
        assert_eq!(Role::SerialKiller.team(), Team::SerialKiller);
        assert_eq!(Role::Jester.team(), Team::Jester);
        assert_eq!(Role::CursedVillager.team(), Team::Village);
    }

    #[test]
    fn only_elder_starts_with_an_extra_life() {
        for role in Role::ALL {
            let counters = role.default_counters();
            assert_eq!(counters.elder_lives > 0, role == Role::Elder);
            assert_eq!(counters.fox_active, role == Role::Fox);
        }
    }
}
