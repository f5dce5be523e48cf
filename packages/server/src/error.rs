use thiserror::Error;
use werewolf_core::{GameError, PlayerId};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("room {0} not found")]
    RoomNotFound(String),
    #[error("no game is running in room {0}")]
    GameNotFound(String),
    #[error("room {0} is not accepting players")]
    RoomNotOpen(String),
    #[error("room {0} is full")]
    RoomFull(String),
    #[error("player {0} is already in the room")]
    AlreadyJoined(PlayerId),
    #[error("player {0} is not in the room")]
    NotInRoom(PlayerId),
    #[error("the game in room {0} has not finished")]
    GameInProgress(String),
    #[error(transparent)]
    Game(#[from] GameError),
}

impl ServiceError {
    /// Stable machine-readable code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::RoomNotFound(_) => "room_not_found",
            ServiceError::GameNotFound(_) => "game_not_found",
            ServiceError::RoomNotOpen(_) => "room_not_open",
            ServiceError::RoomFull(_) => "room_full",
            ServiceError::AlreadyJoined(_) => "already_joined",
            ServiceError::NotInRoom(_) => "not_in_room",
            ServiceError::GameInProgress(_) => "game_in_progress",
            ServiceError::Game(GameError::Validation(_)) => "invalid_action",
            ServiceError::Game(GameError::Config(_)) => "invalid_config",
            ServiceError::Game(GameError::Invariant(_)) => "internal_error",
        }
    }
}

impl From<werewolf_core::ValidationError> for ServiceError {
    fn from(err: werewolf_core::ValidationError) -> Self {
        ServiceError::Game(err.into())
    }
}
