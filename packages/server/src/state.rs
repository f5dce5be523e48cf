use std::{collections::HashMap, sync::Arc};
use tokio::sync::{broadcast, Mutex};
use werewolf_core::GameSession;

use crate::error::ServiceError;
use crate::models::config::ServerConfig;
use crate::models::message::{MessageBody, ServerMessage};
use crate::models::room::Room;

pub type SharedSession = Arc<Mutex<GameSession>>;

/// Lock order is always `rooms`, then `games`, then a single session. The
/// `channel` map is a leaf and is never held across another lock.
#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<Mutex<HashMap<String, Room>>>,
    pub games: Arc<Mutex<HashMap<String, SharedSession>>>,
    pub channel: Arc<Mutex<HashMap<String, broadcast::Sender<ServerMessage>>>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        AppState {
            rooms: Arc::new(Mutex::new(HashMap::new())),
            games: Arc::new(Mutex::new(HashMap::new())),
            channel: Arc::new(Mutex::new(HashMap::new())),
            config: Arc::new(config),
        }
    }

    pub async fn get_or_create_room_channel(&self, room_id: &str) -> broadcast::Sender<ServerMessage> {
        let mut channels = self.channel.lock().await;
        if let Some(channel) = channels.get(room_id) {
            channel.clone()
        } else {
            let (tx, _) = broadcast::channel(self.config.channel_capacity);
            channels.insert(room_id.to_string(), tx.clone());
            tx
        }
    }

    pub async fn drop_room_channel(&self, room_id: &str) {
        self.channel.lock().await.remove(room_id);
    }

    /// Sends to everyone subscribed to the room. A room nobody listens to is
    /// not an error.
    pub async fn send(&self, message: ServerMessage) {
        let tx = self.get_or_create_room_channel(&message.room_id).await;
        if let Err(e) = tx.send(message) {
            log::debug!("no subscribers for room {}: {}", e.0.room_id, e);
        }
    }

    pub async fn session(&self, room_id: &str) -> Result<SharedSession, ServiceError> {
        self.games
            .lock()
            .await
            .get(room_id)
            .cloned()
            .ok_or_else(|| ServiceError::GameNotFound(room_id.to_string()))
    }

    /// Flushes the session's queued events to the room, then pushes every
    /// player their own projection. The caller holds the session lock.
    pub async fn publish(&self, room_id: &str, session: &mut GameSession) {
        for event in session.drain_events() {
            self.send(ServerMessage::broadcast(room_id, MessageBody::GameEvent(event)))
                .await;
        }
        for player_id in session.player_ids() {
            match session.project(player_id) {
                Ok(view) => {
                    self.send(ServerMessage::to_player(
                        room_id,
                        player_id,
                        MessageBody::StateUpdate(Box::new(view)),
                    ))
                    .await
                }
                Err(e) => log::warn!("room {}: cannot project for {}: {}", room_id, player_id, e),
            }
        }
    }

    pub async fn publish_room(&self, room: &Room) {
        self.send(ServerMessage::broadcast(
            &room.room_id,
            MessageBody::RoomUpdate(room.clone()),
        ))
        .await;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
