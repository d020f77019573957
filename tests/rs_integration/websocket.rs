//! Integration tests for rooms and timer sync over the websocket.

use pomodoro_companion::{ServerEvent, rooms::events::Membership};
use serde_json::json;

use crate::common::{assert_silent, connect_ws, next_event, send_frame, spawn_companion};

fn membership(room_id: &str, members: usize) -> Membership {
    Membership {
        room_id: room_id.to_owned(),
        members,
    }
}

fn ack_ok(id: u64, room_id: &str, members: usize) -> ServerEvent {
    ServerEvent::Ack(pomodoro_companion::rooms::events::Ack::success(
        Some(id),
        membership(room_id, members),
    ))
}

#[tokio::test]
async fn two_clients_share_a_room_and_sync() {
    let companion = spawn_companion().await;
    let mut a = connect_ws(&companion).await;
    let mut b = connect_ws(&companion).await;

    send_frame(&mut a, &json!({"type": "room:create", "payload": {"roomId": "focus"}, "id": 1})).await;
    assert_eq!(next_event(&mut a).await, ServerEvent::RoomCreated(membership("focus", 1)));
    assert_eq!(next_event(&mut a).await, ServerEvent::RoomMembers(membership("focus", 1)));
    assert_eq!(next_event(&mut a).await, ack_ok(1, "focus", 1));

    send_frame(&mut b, &json!({"type": "room:join", "payload": {"roomId": "focus"}, "id": 2})).await;
    assert_eq!(next_event(&mut b).await, ServerEvent::RoomJoined(membership("focus", 2)));
    assert_eq!(next_event(&mut b).await, ServerEvent::RoomMembers(membership("focus", 2)));
    assert_eq!(next_event(&mut b).await, ack_ok(2, "focus", 2));
    assert_eq!(next_event(&mut a).await, ServerEvent::RoomMembers(membership("focus", 2)));

    let snapshot = json!({"roomId": "focus", "remaining": 1200, "running": true});
    send_frame(&mut a, &json!({"type": "timer:sync", "payload": snapshot})).await;
    assert_eq!(next_event(&mut b).await, ServerEvent::TimerState(snapshot));
    assert_silent(&mut a).await;

    let penalty = json!({"roomId": "focus", "reason": "tab-switch"});
    send_frame(&mut b, &json!({"type": "timer:penalty", "payload": penalty})).await;
    assert_eq!(next_event(&mut a).await, ServerEvent::TimerPenalty(penalty));
    assert_silent(&mut b).await;
}

#[tokio::test]
async fn disconnect_updates_remaining_members() {
    let companion = spawn_companion().await;
    let mut a = connect_ws(&companion).await;
    let mut b = connect_ws(&companion).await;

    send_frame(&mut a, &json!({"type": "room:join", "payload": {"roomId": "study"}})).await;
    for _ in 0..3 {
        next_event(&mut a).await;
    }
    send_frame(&mut b, &json!({"type": "room:join", "payload": {"roomId": "study"}})).await;
    for _ in 0..3 {
        next_event(&mut b).await;
    }
    assert_eq!(next_event(&mut a).await, ServerEvent::RoomMembers(membership("study", 2)));

    b.close(None).await.unwrap();
    drop(b);
    assert_eq!(next_event(&mut a).await, ServerEvent::RoomMembers(membership("study", 1)));
}

#[tokio::test]
async fn join_without_room_id_is_rejected() {
    let companion = spawn_companion().await;
    let mut a = connect_ws(&companion).await;

    send_frame(&mut a, &json!({"type": "room:join", "payload": {"roomId": "   "}, "id": 9})).await;
    assert_eq!(
        next_event(&mut a).await,
        ServerEvent::Ack(pomodoro_companion::rooms::events::Ack::failure(
            Some(9),
            "missing roomId".to_owned()
        ))
    );
}

#[tokio::test]
async fn malformed_frames_are_ignored() {
    let companion = spawn_companion().await;
    let mut a = connect_ws(&companion).await;

    send_frame(&mut a, &json!({"type": "room:explode"})).await;
    send_frame(&mut a, &json!("just a string")).await;
    assert_silent(&mut a).await;

    // the connection is still usable afterwards
    send_frame(&mut a, &json!({"type": "room:create", "id": 4})).await;
    let ServerEvent::RoomCreated(created) = next_event(&mut a).await else {
        panic!("expected room:created");
    };
    assert!(created.room_id.starts_with("room-"));
    assert_eq!(created.members, 1);
}
