use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};

use crate::{
    error::ServiceError,
    models::api::{CreateRoomRequest, JoinRoomRequest, RoomCreated},
    services::room_service,
    state::AppState,
    utils::websocket,
};

pub fn routes(state: AppState) -> Router {
    Router::new()
        // curl -X POST http://localhost:8080/api/room/create
        .route("/create", post(create_room))
        // curl http://localhost:8080/api/room/rooms
        .route("/rooms", get(get_rooms))
        // curl http://localhost:8080/api/room/{roomid}
        .route("/:roomid", get(get_room_info))
        // curl -X POST http://localhost:8080/api/room/{roomid}/join/{playerid}
        .route("/:roomid/join/:playerid", post(join_room))
        // curl -X POST http://localhost:8080/api/room/{roomid}/leave/{playerid}
        .route("/:roomid/leave/:playerid", post(leave_room))
        // curl -X DELETE http://localhost:8080/api/room/{roomid}/delete
        .route("/:roomid/delete", delete(delete_room))
        // websocat "ws://localhost:8080/api/room/{roomid}/ws?player_id=1"
        .route("/:roomid/ws", get(websocket::handler))
        .with_state(state)
}

/// The body is optional; an empty request creates an unnamed room.
pub async fn create_room(
    State(state): State<AppState>,
    body: Option<Json<CreateRoomRequest>>,
) -> impl IntoResponse {
    let name = body.and_then(|Json(req)| req.name);
    let room_id = room_service::create_room(&state, name).await;
    (StatusCode::OK, Json(RoomCreated { room_id }))
}

async fn get_rooms(State(state): State<AppState>) -> impl IntoResponse {
    let rooms = room_service::get_rooms(&state).await;
    (StatusCode::OK, Json(rooms))
}

async fn get_room_info(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let room = room_service::get_room_info(&state, &room_id).await?;
    Ok((StatusCode::OK, Json(room)))
}

pub async fn join_room(
    State(state): State<AppState>,
    Path((room_id, player_id)): Path<(String, u32)>,
    body: Option<Json<JoinRoomRequest>>,
) -> Result<impl IntoResponse, ServiceError> {
    let name = body.and_then(|Json(req)| req.name);
    let room = room_service::join_room(&state, &room_id, player_id, name).await?;
    Ok((StatusCode::OK, Json(room)))
}

pub async fn leave_room(
    State(state): State<AppState>,
    Path((room_id, player_id)): Path<(String, u32)>,
) -> Result<impl IntoResponse, ServiceError> {
    let room = room_service::leave_room(&state, &room_id, player_id).await?;
    Ok((StatusCode::OK, Json(room)))
}

async fn delete_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    room_service::delete_room(&state, &room_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
