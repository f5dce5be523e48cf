use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use server::app;
use server::models::api::{ErrorResponse, GameStatus, NightActionResponse, RoomCreated};
use server::utils::test_setup::setup_test_env;
use tower::ServiceExt;
use werewolf_core::{ActionReceipt, ClientView, GameConfig, Phase, Role, Winner};

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn send_ok<T: DeserializeOwned>(app: &Router, method: &str, uri: &str, body: Option<Value>) -> T {
    let (status, bytes) = send(app, method, uri, body).await;
    assert_eq!(
        status,
        StatusCode::OK,
        "{} {} failed: {}",
        method,
        uri,
        String::from_utf8_lossy(&bytes)
    );
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_room(app: &Router) -> String {
    let created: RoomCreated = send_ok(app, "POST", "/api/room/create", None).await;
    created.room_id
}

fn classic_config() -> GameConfig {
    GameConfig::with_roles(&[(Role::Werewolf, 1), (Role::Seer, 1), (Role::Villager, 3)])
}

#[tokio::test]
async fn test_create_and_join_room() {
    setup_test_env();
    let app = app::create_app();
    let room_id = create_room(&app).await;

    let room: Value = send_ok(
        &app,
        "POST",
        &format!("/api/room/{}/join/1", room_id),
        Some(json!({ "name": "Alice" })),
    )
    .await;
    assert_eq!(room["players"][0]["name"], "Alice");

    let (status, body) = send(&app, "POST", &format!("/api/room/{}/join/1", room_id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error, "already_joined");
}

#[tokio::test]
async fn test_start_rejects_a_bad_table() {
    setup_test_env();
    let app = app::create_app();
    let room_id = create_room(&app).await;
    for id in 1..=4 {
        send_ok::<Value>(&app, "POST", &format!("/api/room/{}/join/{}", room_id, id), None).await;
    }

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/game/{}/start", room_id),
        Some(serde_json::to_value(classic_config()).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error, "invalid_config");
}

#[tokio::test]
async fn test_full_game_over_http() {
    setup_test_env();
    let app = app::create_app();
    let room_id = create_room(&app).await;
    for id in 1..=5 {
        send_ok::<Value>(&app, "POST", &format!("/api/room/{}/join/{}", room_id, id), None).await;
    }

    let status: GameStatus = send_ok(
        &app,
        "POST",
        &format!("/api/game/{}/start", room_id),
        Some(serde_json::to_value(classic_config()).unwrap()),
    )
    .await;
    assert_eq!(status.round, 1);

    // each player sees exactly one role: their own
    let mut roles = Vec::new();
    for id in 1..=5u32 {
        let view: ClientView =
            send_ok(&app, "GET", &format!("/api/game/{}/state/{}", room_id, id), None).await;
        let visible: Vec<_> = view.players.iter().filter(|p| p.role.is_some()).collect();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, id);
        roles.push((id, visible[0].role.unwrap()));
    }
    let find = |role: Role| roles.iter().find(|(_, r)| *r == role).unwrap().0;
    let wolf = find(Role::Werewolf);
    let seer = find(Role::Seer);
    let villagers: Vec<u32> = roles
        .iter()
        .filter(|(_, r)| *r == Role::Villager)
        .map(|(id, _)| *id)
        .collect();

    // voting at night is refused
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/game/{}/actions/vote", room_id),
        Some(json!({ "voter_id": seer, "target_id": wolf })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error, "invalid_action");

    let inspected: NightActionResponse = send_ok(
        &app,
        "POST",
        &format!("/api/game/{}/actions/night-action", room_id),
        Some(json!({ "player_id": seer, "phase": "Seer", "target_id": wolf })),
    )
    .await;
    assert_eq!(
        inspected.receipt,
        ActionReceipt::Inspection {
            target_id: wolf,
            role: Role::Werewolf
        }
    );

    let attacked: NightActionResponse = send_ok(
        &app,
        "POST",
        &format!("/api/game/{}/actions/night-action", room_id),
        Some(json!({ "player_id": wolf, "phase": "Werewolves", "target_id": villagers[0] })),
    )
    .await;
    assert_eq!(attacked.status.phase, Phase::DayReveal);

    let status: GameStatus =
        send_ok(&app, "POST", &format!("/api/game/{}/phase/next", room_id), None).await;
    assert_eq!(status.phase, Phase::DayDiscussion);
    let status: GameStatus =
        send_ok(&app, "POST", &format!("/api/game/{}/phase/next", room_id), None).await;
    assert_eq!(status.phase, Phase::DayVote);

    for voter in [seer, villagers[1], villagers[2]] {
        send_ok::<GameStatus>(
            &app,
            "POST",
            &format!("/api/game/{}/actions/vote", room_id),
            Some(json!({ "voter_id": voter, "target_id": wolf })),
        )
        .await;
    }
    let status: GameStatus =
        send_ok(&app, "POST", &format!("/api/game/{}/phase/next", room_id), None).await;
    assert_eq!(status.phase, Phase::GameOver);
    assert_eq!(status.winner, Some(Winner::Village));
    assert_eq!(status.deadline, None);

    // everything is revealed once the game is over
    let view: ClientView =
        send_ok(&app, "GET", &format!("/api/game/{}/state/{}", room_id, villagers[1]), None).await;
    assert!(view.players.iter().all(|p| p.role.is_some()));

    let (status, _) = send(&app, "POST", &format!("/api/game/{}/reset", room_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let room: Value = send_ok(&app, "GET", &format!("/api/room/{}", room_id), None).await;
    assert_eq!(room["status"], "Open");
}

#[tokio::test]
async fn test_room_with_running_game_cannot_be_deleted() {
    setup_test_env();
    let app = app::create_app();
    let room_id = create_room(&app).await;
    for id in 1..=5 {
        send_ok::<Value>(&app, "POST", &format!("/api/room/{}/join/{}", room_id, id), None).await;
    }
    send_ok::<GameStatus>(
        &app,
        "POST",
        &format!("/api/game/{}/start", room_id),
        Some(serde_json::to_value(classic_config()).unwrap()),
    )
    .await;

    let (status, _) = send(&app, "DELETE", &format!("/api/room/{}/delete", room_id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&app, "POST", &format!("/api/room/{}/leave/1", room_id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_start_rejects_endless_phases() {
    setup_test_env();
    let app = app::create_app();
    let room_id = create_room(&app).await;
    for id in 1..=5 {
        send_ok::<Value>(&app, "POST", &format!("/api/room/{}/join/{}", room_id, id), None).await;
    }
    let config = GameConfig {
        night_duration_secs: u64::MAX,
        ..classic_config()
    };

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/game/{}/start", room_id),
        Some(serde_json::to_value(config).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error, "invalid_config");

    let room: Value = send_ok(&app, "GET", &format!("/api/room/{}", room_id), None).await;
    assert_eq!(room["status"], "Open");
}
