use serde::Serialize;
use thiserror::Error;

use crate::models::phase::{NightPhase, Phase};
use crate::models::player::PlayerId;
use crate::models::role::Role;

/// A rejected submission. The state is left untouched and only the acting
/// player is told.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ValidationError {
    #[error("the game is already over")]
    GameOver,
    #[error("action not allowed during {actual}")]
    WrongPhase { actual: Phase },
    #[error("unknown player: {0}")]
    UnknownPlayer(PlayerId),
    #[error("player {0} is dead")]
    ActorDead(PlayerId),
    #[error("player {player_id} cannot act during the {phase:?} phase")]
    WrongRole { player_id: PlayerId, phase: NightPhase },
    #[error("player {0} already acted this phase")]
    AlreadySubmitted(PlayerId),
    #[error("expected {expected} target(s), got {actual}")]
    TargetCount { expected: usize, actual: usize },
    #[error("target {0} was chosen more than once")]
    DuplicateTarget(PlayerId),
    #[error("target {0} is not alive")]
    TargetNotAlive(PlayerId),
    #[error("target {0} is not dead")]
    TargetNotDead(PlayerId),
    #[error("you cannot target yourself")]
    SelfTarget,
    #[error("target {0} was already protected last night")]
    RepeatTarget(PlayerId),
    #[error("target {0} is a werewolf")]
    TargetIsWolf(PlayerId),
    #[error("target {0} is not a werewolf")]
    TargetNotWolf(PlayerId),
    #[error("that potion has already been used")]
    PotionUsed,
    #[error("player {0} does not owe a hunter shot")]
    NoShotOwed(PlayerId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ConfigError {
    #[error("a game needs {min} to {max} players, got {actual}")]
    PlayerCount { min: usize, max: usize, actual: usize },
    #[error("role counts add up to {roles} but there are {players} players")]
    RoleCountMismatch { players: usize, roles: usize },
    #[error("role {0} is counted but not enabled")]
    RoleNotEnabled(Role),
    #[error("at least one werewolf role must be dealt")]
    NoWolves,
    #[error("phase durations must be positive")]
    ZeroDuration,
    #[error("phases may last at most {max_secs}s and the night transition {max_transition_ms}ms")]
    DurationTooLong { max_secs: u64, max_transition_ms: u64 },
    #[error("player id {0} appears twice")]
    DuplicatePlayer(PlayerId),
    #[error("the dealt roles do not match the configured role counts")]
    DealMismatch,
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("invalid game configuration: {0}")]
    Config(#[from] ConfigError),
    /// A programming fault. Callers must not keep driving the session.
    #[error("state invariant violated: {0}")]
    Invariant(String),
}

impl GameError {
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        let message = message.into();
        log::error!("state invariant violated: {}", message);
        GameError::Invariant(message)
    }
}
