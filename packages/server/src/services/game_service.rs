use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::sync::Mutex;
use werewolf_core::{ClientView, GameConfig, GameSession, PlayerId};

use crate::{
    error::ServiceError,
    models::{
        api::{
            GameStatus, HunterShotRequest, HunterShotResponse, NightActionRequest,
            NightActionResponse, VoteRequest,
        },
        room::RoomStatus,
    },
    state::AppState,
};

pub fn status_of(room_id: &str, session: &GameSession) -> GameStatus {
    let state = session.state();
    GameStatus {
        room_id: room_id.to_string(),
        phase: state.phase,
        round: state.round,
        deadline: state.phase_deadline,
        winner: state.winner,
    }
}

/// Deals roles to the room's seated players and opens the first night.
pub async fn start_game(
    state: &AppState,
    room_id: &str,
    config: GameConfig,
    now: DateTime<Utc>,
) -> Result<GameStatus, ServiceError> {
    let mut rooms = state.rooms.lock().await;
    let room = rooms
        .get_mut(room_id)
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))?;
    if room.status != RoomStatus::Open {
        return Err(ServiceError::GameInProgress(room_id.to_string()));
    }

    let seats = room.seats();
    let mut session = match state.config.deal_seed {
        Some(seed) => GameSession::initialize_game_with_rng(
            room_id.to_string(),
            seats,
            config,
            &mut StdRng::seed_from_u64(seed),
            now,
        )?,
        None => GameSession::initialize_game(room_id.to_string(), seats, config, now)?,
    };
    room.status = RoomStatus::InProgress;
    let room_snapshot = room.clone();

    let status = status_of(room_id, &session);
    state.publish(room_id, &mut session).await;
    state
        .games
        .lock()
        .await
        .insert(room_id.to_string(), Arc::new(Mutex::new(session)));
    drop(rooms);

    log::info!("room {}: game started, {}", room_id, status.phase);
    state.publish_room(&room_snapshot).await;
    Ok(status)
}

pub async fn get_player_view(
    state: &AppState,
    room_id: &str,
    player_id: PlayerId,
) -> Result<ClientView, ServiceError> {
    let session = state.session(room_id).await?;
    let session = session.lock().await;
    Ok(session.project(player_id)?)
}

pub async fn submit_night_action(
    state: &AppState,
    room_id: &str,
    request: NightActionRequest,
    now: DateTime<Utc>,
) -> Result<NightActionResponse, ServiceError> {
    let session = state.session(room_id).await?;
    let mut session = session.lock().await;
    let result = session.submit_night_action(request.player_id, request.phase, &request.payload, now);
    // the action stays recorded even if the advance it triggers fails
    state.publish(room_id, &mut session).await;
    let receipt = result?;
    Ok(NightActionResponse {
        receipt,
        status: status_of(room_id, &session),
    })
}

pub async fn cast_vote(
    state: &AppState,
    room_id: &str,
    request: VoteRequest,
) -> Result<GameStatus, ServiceError> {
    let session = state.session(room_id).await?;
    let mut session = session.lock().await;
    session.cast_vote(request.voter_id, request.target_id)?;
    state.publish(room_id, &mut session).await;
    Ok(status_of(room_id, &session))
}

pub async fn hunter_shot(
    state: &AppState,
    room_id: &str,
    request: HunterShotRequest,
    now: DateTime<Utc>,
) -> Result<HunterShotResponse, ServiceError> {
    let session = state.session(room_id).await?;
    let mut session = session.lock().await;
    let deaths = session.hunter_shoot(request.hunter_id, request.target_id, now)?;
    state.publish(room_id, &mut session).await;
    Ok(HunterShotResponse {
        killed: deaths.iter().map(|death| death.player_id).collect(),
        status: status_of(room_id, &session),
    })
}

/// Ends the current phase immediately, exactly as its deadline would.
pub async fn advance_phase(
    state: &AppState,
    room_id: &str,
    now: DateTime<Utc>,
) -> Result<GameStatus, ServiceError> {
    let session = state.session(room_id).await?;
    let mut session = session.lock().await;
    let result = session.advance(now);
    state.publish(room_id, &mut session).await;
    result?;
    Ok(status_of(room_id, &session))
}

/// Discards a finished session and reopens the room's lobby.
pub async fn reset_game(state: &AppState, room_id: &str) -> Result<(), ServiceError> {
    let room = {
        let mut rooms = state.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))?;
        let mut games = state.games.lock().await;
        let session = games
            .get(room_id)
            .cloned()
            .ok_or_else(|| ServiceError::GameNotFound(room_id.to_string()))?;
        if !session.lock().await.is_over() {
            return Err(ServiceError::GameInProgress(room_id.to_string()));
        }
        games.remove(room_id);
        room.status = RoomStatus::Open;
        room.clone()
    };
    log::info!("room {}: reset to lobby", room_id);
    state.publish_room(&room).await;
    Ok(())
}
