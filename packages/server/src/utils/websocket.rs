use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::info;
use werewolf_core::PlayerId;

use crate::models::message::{MessageBody, ServerMessage};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Without an id the socket only receives room-wide messages.
    pub player_id: Option<PlayerId>,
}

pub async fn handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, room_id, query.player_id))
}

/// Current projection for a player who connects mid-game.
async fn initial_view(state: &AppState, room_id: &str, player_id: PlayerId) -> Option<ServerMessage> {
    let session = state.session(room_id).await.ok()?;
    let session = session.lock().await;
    let view = session.project(player_id).ok()?;
    Some(ServerMessage::to_player(
        room_id,
        player_id,
        MessageBody::StateUpdate(Box::new(view)),
    ))
}

pub async fn handle_socket(ws: WebSocket, state: AppState, room_id: String, player_id: Option<PlayerId>) {
    info!(
        "New WebSocket connection established for room {} (player {:?})",
        room_id, player_id
    );
    let mut rx = state.get_or_create_room_channel(&room_id).await.subscribe();
    let (mut sender, mut receiver) = ws.split();

    let greeting = match player_id {
        Some(player_id) => initial_view(&state, &room_id, player_id).await,
        None => None,
    };

    let room_id_for_send = room_id.clone();
    let mut send_task = tokio::spawn(async move {
        if let Some(message) = greeting {
            if let Ok(text) = serde_json::to_string(&message) {
                if sender.send(Message::Text(text)).await.is_err() {
                    return;
                }
            }
        }
        loop {
            let message = match rx.recv().await {
                Ok(message) => message,
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!(
                        "socket in room {} lagged, {} messages dropped",
                        room_id_for_send,
                        skipped
                    );
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            if !message.is_visible_to(player_id) {
                continue;
            }
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    log::error!("cannot encode message {}: {}", message.message_id, e);
                    continue;
                }
            };
            if let Err(e) = sender.send(Message::Text(text)).await {
                log::debug!("socket in room {} closed: {}", room_id_for_send, e);
                break;
            }
        }
    });

    // Inbound traffic is not part of the protocol; the loop only notices when
    // the client goes away.
    let mut receive_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => receive_task.abort(),
        _ = &mut receive_task => send_task.abort(),
    }
    info!("WebSocket connection closed for room {} (player {:?})", room_id, player_id);
}
