use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use werewolf_core::{ClientView, GameEvent, PlayerId};

use super::room::Room;

/// Envelope for everything pushed over a room's WebSocket channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerMessage {
    pub message_id: Uuid,
    pub room_id: String,
    /// Set when only one player may receive this message.
    pub target_player_id: Option<PlayerId>,
    pub timestamp: DateTime<Utc>,
    pub body: MessageBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "message_type", content = "data", rename_all = "snake_case")]
pub enum MessageBody {
    GameEvent(GameEvent),
    StateUpdate(Box<ClientView>),
    RoomUpdate(Room),
    Error { message: String },
}

impl ServerMessage {
    pub fn broadcast(room_id: &str, body: MessageBody) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            room_id: room_id.to_string(),
            target_player_id: None,
            timestamp: Utc::now(),
            body,
        }
    }

    pub fn to_player(room_id: &str, player_id: PlayerId, body: MessageBody) -> Self {
        Self {
            target_player_id: Some(player_id),
            ..Self::broadcast(room_id, body)
        }
    }

    pub fn is_visible_to(&self, player_id: Option<PlayerId>) -> bool {
        match self.target_player_id {
            None => true,
            Some(target) => player_id == Some(target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targeted_messages_reach_only_their_player() {
        let message = ServerMessage::to_player(
            "1",
            3,
            MessageBody::Error {
                message: "nope".to_string(),
            },
        );
        assert!(message.is_visible_to(Some(3)));
        assert!(!message.is_visible_to(Some(4)));
        assert!(!message.is_visible_to(None));
    }

    #[test]
    fn envelope_tags_its_body() {
        let message = ServerMessage::broadcast(
            "1",
            MessageBody::Error {
                message: "boom".to_string(),
            },
        );
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["body"]["message_type"], "error");
        assert_eq!(json["body"]["data"]["message"], "boom");
    }
}
