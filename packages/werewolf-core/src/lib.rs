//! Session engine for hidden-role werewolf games.
//!
//! The engine is synchronous and does no I/O. Every operation that can move
//! time-dependent state takes `now` from the caller, and outbound
//! notifications are queued as [`GameEvent`]s for the host to drain.

mod deaths;
pub mod error;
pub mod hunter;
pub mod models;
pub mod night;
pub mod scheduler;
pub mod session;
pub mod view;
pub mod vote;
pub mod win;

pub use error::{ConfigError, GameError, ValidationError};
pub use models::*;
pub use session::GameSession;
pub use view::{AbilityView, ClientView, PlayerView};
pub use vote::VoteOutcome;
