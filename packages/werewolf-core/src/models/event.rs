use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::phase::Phase;
use super::player::PlayerId;
use super::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    WolfAttack,
    /// The Bodyguard took the pack's blow.
    Sacrifice,
    Poison,
    SerialKiller,
    WhiteWolf,
    /// A Knight's wound from a previous night.
    Wound,
    Heartbreak,
    Vote,
    HunterShot,
}

/// When a death became known to the table. Unlike [`DeathCause`] this never
/// says anything about roles or links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathOccasion {
    Night,
    Vote,
    HunterShot,
}

impl DeathOccasion {
    pub fn during(phase: Phase) -> Self {
        match phase {
            Phase::DayVote | Phase::DayVoteResult => DeathOccasion::Vote,
            Phase::HunterShot => DeathOccasion::HunterShot,
            _ => DeathOccasion::Night,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Death {
    pub player_id: PlayerId,
    pub cause: DeathCause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Village,
    Werewolves,
    SerialKiller,
    Jester,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteEntry {
    pub voter_id: PlayerId,
    pub target_id: PlayerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCount {
    pub target_id: PlayerId,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleReveal {
    pub player_id: PlayerId,
    pub role: Option<Role>,
}

/// Outbound notifications, queued on the state and drained by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    PhaseChanged {
        phase: Phase,
        round: u32,
        deadline: Option<DateTime<Utc>>,
    },
    PlayerDied {
        player_id: PlayerId,
        /// Present only when the reveal policy allows it.
        role: Option<Role>,
        occasion: DeathOccasion,
    },
    VoteTally {
        votes: Vec<VoteEntry>,
        tally: Vec<VoteCount>,
    },
    GameOver {
        winner: Winner,
        winner_ids: Vec<PlayerId>,
        full_reveal: Vec<RoleReveal>,
    },
}
