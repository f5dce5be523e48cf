use std::collections::HashMap;

use werewolf_core::PlayerId;

use crate::{
    error::ServiceError,
    models::{
        player::Player,
        room::{Room, RoomStatus},
    },
    state::AppState,
};

pub async fn create_room(state: &AppState, name: Option<String>) -> String {
    let mut rooms = state.rooms.lock().await;
    let new_id = rooms
        .keys()
        .filter_map(|k| k.parse::<u32>().ok())
        .max()
        .unwrap_or(0)
        + 1;
    let room = Room::new(new_id.to_string(), name, state.config.max_players_per_room);
    rooms.insert(room.room_id.clone(), room);
    log::info!("room {} created", new_id);
    new_id.to_string()
}

pub async fn join_room(
    state: &AppState,
    room_id: &str,
    player_id: PlayerId,
    name: Option<String>,
) -> Result<Room, ServiceError> {
    let room = {
        let mut rooms = state.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))?;

        if room.status != RoomStatus::Open {
            return Err(ServiceError::RoomNotOpen(room_id.to_string()));
        }
        if room.players.len() >= room.max_players {
            return Err(ServiceError::RoomFull(room_id.to_string()));
        }
        if room.has_player(player_id) {
            return Err(ServiceError::AlreadyJoined(player_id));
        }

        room.players.push(Player::new(player_id, name));
        room.clone()
    };
    log::info!("player {} joined room {}", player_id, room_id);
    state.publish_room(&room).await;
    Ok(room)
}

/// Seats are fixed once a game starts, so leaving is a lobby-only action.
pub async fn leave_room(state: &AppState, room_id: &str, player_id: PlayerId) -> Result<Room, ServiceError> {
    let room = {
        let mut rooms = state.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))?;
        if room.status != RoomStatus::Open {
            return Err(ServiceError::RoomNotOpen(room_id.to_string()));
        }
        let index = room
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(ServiceError::NotInRoom(player_id))?;
        room.players.remove(index);
        room.clone()
    };
    log::info!("player {} left room {}", player_id, room_id);
    state.publish_room(&room).await;
    Ok(room)
}

pub async fn get_rooms(state: &AppState) -> HashMap<String, Room> {
    state.rooms.lock().await.clone()
}

pub async fn get_room_info(state: &AppState, room_id: &str) -> Result<Room, ServiceError> {
    let rooms = state.rooms.lock().await;
    rooms
        .get(room_id)
        .cloned()
        .ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))
}

/// Removes the room, its session and its channel. Refused while a game is
/// still being played so no deadline can fire against a reused id.
pub async fn delete_room(state: &AppState, room_id: &str) -> Result<(), ServiceError> {
    let mut rooms = state.rooms.lock().await;
    if !rooms.contains_key(room_id) {
        return Err(ServiceError::RoomNotFound(room_id.to_string()));
    }
    let mut games = state.games.lock().await;
    if let Some(session) = games.get(room_id) {
        if !session.lock().await.is_over() {
            return Err(ServiceError::GameInProgress(room_id.to_string()));
        }
    }
    games.remove(room_id);
    rooms.remove(room_id);
    drop(games);
    drop(rooms);
    state.drop_room_channel(room_id).await;
    log::info!("room {} deleted", room_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn room_ids_count_up() {
        let state = AppState::new();
        assert_eq!(create_room(&state, None).await, "1");
        assert_eq!(create_room(&state, Some("second".to_string())).await, "2");
        assert_eq!(state.rooms.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn joining_twice_is_rejected() {
        let state = AppState::new();
        let room_id = create_room(&state, None).await;
        join_room(&state, &room_id, 1, None).await.unwrap();
        let err = join_room(&state, &room_id, 1, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyJoined(1)));
    }

    #[tokio::test]
    async fn full_rooms_turn_players_away() {
        let state = AppState::new();
        let room_id = create_room(&state, None).await;
        state.rooms.lock().await.get_mut(&room_id).unwrap().max_players = 1;
        join_room(&state, &room_id, 1, None).await.unwrap();
        let err = join_room(&state, &room_id, 2, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::RoomFull(_)));
    }

    #[tokio::test]
    async fn leaving_frees_the_seat() {
        let state = AppState::new();
        let room_id = create_room(&state, None).await;
        join_room(&state, &room_id, 7, Some("Ann".to_string())).await.unwrap();
        let room = leave_room(&state, &room_id, 7).await.unwrap();
        assert!(room.players.is_empty());
        let err = leave_room(&state, &room_id, 7).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotInRoom(7)));
    }

    #[tokio::test]
    async fn unknown_rooms_are_reported() {
        let state = AppState::new();
        assert!(matches!(
            get_room_info(&state, "42").await,
            Err(ServiceError::RoomNotFound(_))
        ));
        assert!(matches!(
            delete_room(&state, "42").await,
            Err(ServiceError::RoomNotFound(_))
        ));
    }
}
