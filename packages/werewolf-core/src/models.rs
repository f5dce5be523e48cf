pub mod action;
pub mod config;
pub mod event;
pub mod game;
pub mod game_log;
pub mod phase;
pub mod player;
pub mod role;

pub use action::*;
pub use config::*;
pub use event::*;
pub use game::*;
pub use game_log::*;
pub use phase::*;
pub use player::*;
pub use role::*;
