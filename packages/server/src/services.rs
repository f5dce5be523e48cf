pub mod deadline;
pub mod game_service;
pub mod room_service;
