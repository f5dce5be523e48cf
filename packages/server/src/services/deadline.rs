//! The server-wide deadline ticker.
//!
//! One task wakes up every `tick_interval_ms` and asks each running session
//! whether its phase deadline has passed. Sessions are locked one at a time,
//! so a slow room never holds up the registry.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::task::JoinHandle;
use werewolf_core::GameError;

use crate::models::message::{MessageBody, ServerMessage};
use crate::models::room::RoomStatus;
use crate::state::AppState;

/// Runs one sweep and returns the rooms whose phase moved on.
pub async fn tick(state: &AppState, now: DateTime<Utc>) -> Vec<String> {
    let sessions: Vec<_> = state
        .games
        .lock()
        .await
        .iter()
        .map(|(room_id, session)| (room_id.clone(), session.clone()))
        .collect();

    let mut advanced = Vec::new();
    let mut broken = Vec::new();
    for (room_id, session) in sessions {
        let mut session = session.lock().await;
        match session.check_timeout(now) {
            Ok(true) => {
                state.publish(&room_id, &mut session).await;
                advanced.push(room_id);
            }
            Ok(false) => {}
            Err(GameError::Invariant(message)) => {
                log::error!("room {}: halting session: {}", room_id, message);
                state
                    .send(ServerMessage::broadcast(
                        &room_id,
                        MessageBody::Error {
                            message: "the game was halted by an internal error".to_string(),
                        },
                    ))
                    .await;
                broken.push(room_id);
            }
            Err(e) => log::warn!("room {}: timeout handling failed: {}", room_id, e),
        }
    }

    for room_id in &broken {
        halt_session(state, room_id).await;
    }
    advanced
}

/// Drops a session that can no longer be driven and reopens its lobby.
pub async fn halt_session(state: &AppState, room_id: &str) {
    let reopened = {
        let mut rooms = state.rooms.lock().await;
        state.games.lock().await.remove(room_id);
        rooms.get_mut(room_id).map(|room| {
            room.status = RoomStatus::Open;
            room.clone()
        })
    };
    match reopened {
        Some(room) => state.publish_room(&room).await,
        None => log::warn!("room {}: halted session had no room", room_id),
    }
}

pub fn spawn_deadline_ticker(state: AppState) -> JoinHandle<()> {
    let period = Duration::from_millis(state.config.tick_interval_ms);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        log::info!("deadline ticker running every {:?}", period);
        loop {
            interval.tick().await;
            let advanced = tick(&state, Utc::now()).await;
            if !advanced.is_empty() {
                log::debug!("deadline ticker advanced rooms {:?}", advanced);
            }
        }
    })
}
