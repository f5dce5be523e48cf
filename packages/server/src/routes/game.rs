use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use werewolf_core::GameConfig;

use crate::error::ServiceError;
use crate::models::api::{HunterShotRequest, NightActionRequest, VoteRequest};
use crate::services::game_service;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .nest(
            "/:roomid",
            Router::new()
                // curl -X POST -H 'Content-Type: application/json' -d @config.json \
                //   http://localhost:8080/api/game/{roomid}/start
                .route("/start", post(start_game))
                .route("/state/:playerid", get(get_game_state))
                .nest(
                    "/actions",
                    Router::new()
                        .route("/night-action", post(night_action_handler))
                        .route("/vote", post(cast_vote_handler))
                        .route("/hunter-shot", post(hunter_shot_handler)),
                )
                .route("/phase/next", post(advance_phase_handler))
                .route("/reset", post(reset_handler)),
        )
        .with_state(state)
}

pub async fn start_game(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(config): Json<GameConfig>,
) -> Result<impl IntoResponse, ServiceError> {
    let status = game_service::start_game(&state, &room_id, config, Utc::now()).await?;
    Ok((StatusCode::OK, Json(status)))
}

pub async fn get_game_state(
    State(state): State<AppState>,
    Path((room_id, player_id)): Path<(String, u32)>,
) -> Result<impl IntoResponse, ServiceError> {
    let view = game_service::get_player_view(&state, &room_id, player_id).await?;
    Ok((StatusCode::OK, Json(view)))
}

async fn night_action_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(request): Json<NightActionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let response =
        game_service::submit_night_action(&state, &room_id, request, Utc::now()).await?;
    Ok((StatusCode::OK, Json(response)))
}

async fn cast_vote_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(request): Json<VoteRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let status = game_service::cast_vote(&state, &room_id, request).await?;
    Ok((StatusCode::OK, Json(status)))
}

async fn hunter_shot_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(request): Json<HunterShotRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = game_service::hunter_shot(&state, &room_id, request, Utc::now()).await?;
    Ok((StatusCode::OK, Json(response)))
}

async fn advance_phase_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let status = game_service::advance_phase(&state, &room_id, Utc::now()).await?;
    Ok((StatusCode::OK, Json(status)))
}

async fn reset_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    game_service::reset_game(&state, &room_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::room_service;
    use crate::utils::test_setup::setup_test_env;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;
    use werewolf_core::Role;

    fn config_body() -> Body {
        let config =
            GameConfig::with_roles(&[(Role::Werewolf, 1), (Role::Seer, 1), (Role::Villager, 3)]);
        Body::from(serde_json::to_vec(&config).unwrap())
    }

    #[tokio::test]
    async fn test_start_game() {
        setup_test_env();
        let state = AppState::new();
        let app = routes(state.clone());
        let room_id = room_service::create_room(&state, None).await;
        for id in 1..=5 {
            room_service::join_room(&state, &room_id, id, None).await.unwrap();
        }

        let request = Request::builder()
            .method("POST")
            .uri(format!("/{}/start", room_id))
            .header("content-type", "application/json")
            .body(config_body())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_state_without_game_is_not_found() {
        setup_test_env();
        let state = AppState::new();
        let app = routes(state.clone());
        let room_id = room_service::create_room(&state, None).await;

        let request = Request::builder()
            .method("GET")
            .uri(format!("/{}/state/1", room_id))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
