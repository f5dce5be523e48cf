use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use werewolf_core::{
    ActionReceipt, NightActionPayload, NightPhase, Phase, PlayerId, Winner,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoomCreated {
    pub room_id: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct JoinRoomRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NightActionRequest {
    pub player_id: PlayerId,
    pub phase: NightPhase,
    #[serde(flatten)]
    pub payload: NightActionPayload,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteRequest {
    pub voter_id: PlayerId,
    /// Absent or null withdraws the vote.
    #[serde(default)]
    pub target_id: Option<PlayerId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HunterShotRequest {
    pub hunter_id: PlayerId,
    pub target_id: PlayerId,
}

/// Where a session stands after a request was applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStatus {
    pub room_id: String,
    pub phase: Phase,
    pub round: u32,
    pub deadline: Option<DateTime<Utc>>,
    pub winner: Option<Winner>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NightActionResponse {
    pub receipt: ActionReceipt,
    pub status: GameStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HunterShotResponse {
    /// Everyone who died from the shot. Causes stay in the projections.
    pub killed: Vec<PlayerId>,
    pub status: GameStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
