use serde::{Deserialize, Serialize};
use std::fmt;

/// Night sub-phases, declared in the order they are played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NightPhase {
    Cupid,
    WildChild,
    Seer,
    Fox,
    Bodyguard,
    Doctor,
    Werewolves,
    AlphaWolf,
    WhiteWolf,
    Witch,
    SerialKiller,
    Medium,
}

impl NightPhase {
    pub const ORDER: [NightPhase; 12] = [
        NightPhase::Cupid,
        NightPhase::WildChild,
        NightPhase::Seer,
        NightPhase::Fox,
        NightPhase::Bodyguard,
        NightPhase::Doctor,
        NightPhase::Werewolves,
        NightPhase::AlphaWolf,
        NightPhase::WhiteWolf,
        NightPhase::Witch,
        NightPhase::SerialKiller,
        NightPhase::Medium,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    NightStart,
    Night(NightPhase),
    DayReveal,
    DayDiscussion,
    DayVote,
    DayVoteResult,
    HunterShot,
    GameOver,
}

impl Phase {
    pub fn is_night(&self) -> bool {
        matches!(self, Phase::NightStart | Phase::Night(_))
    }

    pub fn is_terminal(&self) -> bool {
        *self == Phase::GameOver
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::NightStart => write!(f, "NIGHT_START"),
            Phase::Night(night) => write!(f, "NIGHT_{:?}", night),
            Phase::DayReveal => write!(f, "DAY_REVEAL"),
            Phase::DayDiscussion => write!(f, "DAY_DISCUSSION"),
            Phase::DayVote => write!(f, "DAY_VOTE"),
            Phase::DayVoteResult => write!(f, "DAY_VOTE_RESULT"),
            Phase::HunterShot => write!(f, "HUNTER_SHOT"),
            Phase::GameOver => write!(f, "GAME_OVER"),
        }
    }
}

/// Where play resumes once every owed Hunter shot has been taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HunterResume {
    Discussion,
    NextNight,
}
