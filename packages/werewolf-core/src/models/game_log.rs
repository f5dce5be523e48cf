use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use super::role::Team;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameLog {
    pub entries: Vec<LogEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub seq: u64,
    pub round: u32,
    pub content: String,
    pub visibility: LogVisibility,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogVisibility {
    Public,
    /// Only the living members of a team (and the dead).
    Team(Team),
    /// Only this player (and the dead).
    Private(PlayerId),
}

impl GameLog {
    pub fn new() -> Self {
        GameLog {
            entries: Vec::new(),
        }
    }

    pub fn push(
        &mut self,
        round: u32,
        visibility: LogVisibility,
        content: String,
        now: DateTime<Utc>,
    ) {
        let seq = self.entries.len() as u64;
        self.entries.push(LogEntry {
            seq,
            round,
            content,
            visibility,
            timestamp: now,
        });
    }

    pub fn public(&mut self, round: u32, content: String, now: DateTime<Utc>) {
        self.push(round, LogVisibility::Public, content, now);
    }

    pub fn private(&mut self, round: u32, player_id: PlayerId, content: String, now: DateTime<Utc>) {
        self.push(round, LogVisibility::Private(player_id), content, now);
    }

    pub fn entries_for(&self, visibility: LogVisibility) -> Vec<&LogEntry> {
        self.entries
            .iter()
            .filter(|e| e.visibility == visibility)
            .collect()
    }
}

impl Default for GameLog {
    fn default() -> Self {
        Self::new()
    }
}
