pub mod api;
pub mod config;
pub mod message;
pub mod player;
pub mod room;
