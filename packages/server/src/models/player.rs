use serde::{Deserialize, Serialize};
use werewolf_core::PlayerId;

/// A seat in a room's lobby. Roles live in the game session, not here.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    pub fn new(id: PlayerId, name: Option<String>) -> Self {
        Self {
            id,
            name: name.unwrap_or_else(|| format!("Player {}", id)),
        }
    }
}
