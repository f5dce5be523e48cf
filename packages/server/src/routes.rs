use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use werewolf_core::GameError;

use crate::error::ServiceError;
use crate::models::api::ErrorResponse;
use crate::state::AppState;

mod game;
mod room;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .nest("/api/room", room::routes(state.clone()))
        .nest("/api/game", game::routes(state))
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::RoomNotFound(_)
            | ServiceError::GameNotFound(_)
            | ServiceError::NotInRoom(_) => StatusCode::NOT_FOUND,
            ServiceError::RoomNotOpen(_)
            | ServiceError::RoomFull(_)
            | ServiceError::AlreadyJoined(_)
            | ServiceError::GameInProgress(_) => StatusCode::CONFLICT,
            ServiceError::Game(GameError::Validation(_)) => StatusCode::BAD_REQUEST,
            ServiceError::Game(GameError::Config(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Game(GameError::Invariant(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            log::error!("request failed: {}", self);
        }

        let body = Json(ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}
