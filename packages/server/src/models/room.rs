use super::player::Player;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub enum RoomStatus {
    /// Lobby: players may join and leave.
    Open,
    /// A game session exists for this room.
    InProgress,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Room {
    pub room_id: String,
    pub name: Option<String>,
    pub players: Vec<Player>,
    pub max_players: usize,
    pub status: RoomStatus,
}

impl Room {
    pub fn new(room_id: String, name: Option<String>, max_players: usize) -> Self {
        Room {
            room_id,
            name,
            players: Vec::new(),
            max_players,
            status: RoomStatus::Open,
        }
    }

    pub fn seats(&self) -> Vec<(u32, String)> {
        self.players
            .iter()
            .map(|p| (p.id, p.name.clone()))
            .collect()
    }

    pub fn has_player(&self, player_id: u32) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }
}
