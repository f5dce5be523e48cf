use std::env;

use werewolf_core::MAX_PLAYERS;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: [u8; 4],
    pub port: u16,
    pub allowed_origins: Vec<String>,
    /// How often the deadline ticker checks every room.
    pub tick_interval_ms: u64,
    pub max_players_per_room: usize,
    pub channel_capacity: usize,
    /// Fixed seed for role dealing. Unset means a fresh random deal per game.
    pub deal_seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: [127, 0, 0, 1],
            port: 8080,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            tick_interval_ms: 250,
            max_players_per_room: MAX_PLAYERS,
            channel_capacity: 1000,
            deal_seed: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let default = Self::default();

        let host = env::var("WEREWOLF_HOST")
            .ok()
            .and_then(|v| parse_host(&v))
            .unwrap_or(default.host);
        let port = env::var("WEREWOLF_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(default.port);
        let allowed_origins = env::var("WEREWOLF_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or(default.allowed_origins);
        let tick_interval_ms = env::var("WEREWOLF_TICK_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(default.tick_interval_ms);
        let max_players_per_room = env::var("WEREWOLF_MAX_PLAYERS_PER_ROOM")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|n| n.min(MAX_PLAYERS))
            .unwrap_or(default.max_players_per_room);
        let channel_capacity = env::var("WEREWOLF_CHANNEL_CAPACITY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(default.channel_capacity);
        let deal_seed = env::var("WEREWOLF_DEAL_SEED")
            .ok()
            .and_then(|v| v.parse::<u64>().ok());

        Self {
            host,
            port,
            allowed_origins,
            tick_interval_ms,
            max_players_per_room,
            channel_capacity,
            deal_seed,
        }
    }
}

fn parse_host(value: &str) -> Option<[u8; 4]> {
    value
        .parse::<std::net::Ipv4Addr>()
        .ok()
        .map(|addr| addr.octets())
}
