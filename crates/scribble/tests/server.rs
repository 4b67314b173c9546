//! Integration tests for the Scribble server with real WebSocket clients.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use scribble::prelude::*;
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns the address.
async fn start_server(builder: ScribbleServerBuilder) -> String {
    let server = builder
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

/// A server whose only word is "cat".
async fn start_default() -> String {
    start_server(ScribbleServer::builder().words(WordPool::new(["cat"]).unwrap())).await
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("send");
}

/// Reads the next JSON event, failing after a second.
async fn recv(ws: &mut ClientWs) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(1), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .expect("websocket error");
        match msg {
            Message::Text(_) | Message::Binary(_) => {
                return serde_json::from_slice(&msg.into_data()).expect("json event");
            }
            _ => continue,
        }
    }
}

async fn join(ws: &mut ClientWs, room: &str, name: &str) -> Value {
    send(ws, json!({ "type": "join", "roomId": room, "playerName": name })).await;
    recv(ws).await
}

async fn status(ws: &mut ClientWs) -> u64 {
    send(ws, json!({ "type": "status" })).await;
    let reply = recv(ws).await;
    assert_eq!(reply["type"], "status");
    assert_eq!(reply["status"], "ok");
    reply["activeRoomCount"].as_u64().expect("count")
}

/// Two clients seated in `room`, with all join notifications drained.
/// Returns the clients and their player ids.
async fn seated_pair(addr: &str, room: &str) -> (ClientWs, ClientWs, Value, Value) {
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;

    let joined_a = join(&mut a, room, "Ann").await;
    let a_id = joined_a["players"][0]["id"].clone();

    let joined_b = join(&mut b, room, "Bo").await;
    let b_id = joined_b["players"][1]["id"].clone();
    let notice = recv(&mut a).await;
    assert_eq!(notice["type"], "playerJoined");

    (a, b, a_id, b_id)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_full_round_over_websocket() {
    let addr = start_default().await;
    let mut a = connect(&addr).await;
    let mut b = connect(&addr).await;

    let joined = join(&mut a, "r1", "Ann").await;
    assert_eq!(joined["type"], "roomJoined");
    assert_eq!(joined["roomId"], "r1");
    assert_eq!(joined["phase"], "waiting");
    assert_eq!(joined["players"].as_array().unwrap().len(), 1);
    let a_id = joined["players"][0]["id"].clone();

    let joined = join(&mut b, "r1", "Bo").await;
    assert_eq!(joined["type"], "roomJoined");
    assert_eq!(joined["players"].as_array().unwrap().len(), 2);
    let b_id = joined["players"][1]["id"].clone();

    let notice = recv(&mut a).await;
    assert_eq!(
        notice,
        json!({ "type": "playerJoined", "connectionId": b_id, "name": "Bo" })
    );

    send(&mut a, json!({ "type": "start", "roomId": "r1" })).await;
    let expected = json!({
        "type": "gameStarted",
        "currentDrawerId": a_id,
        "currentWord": "cat",
        "round": 1,
        "maxRounds": 3,
    });
    assert_eq!(recv(&mut a).await, expected);
    assert_eq!(recv(&mut b).await, expected);

    send(
        &mut b,
        json!({ "type": "guess", "roomId": "r1", "guess": "CAT", "playerName": "Bo" }),
    )
    .await;
    for ws in [&mut a, &mut b] {
        let correct = recv(ws).await;
        assert_eq!(correct["type"], "correctGuess");
        assert_eq!(correct["connectionId"], b_id);
        assert_eq!(correct["displayName"], "Bo");

        let next = recv(ws).await;
        assert_eq!(next["type"], "nextRound");
        assert_eq!(next["currentDrawerId"], b_id);
        assert_eq!(next["round"], 2);
        assert_eq!(next["scores"][b_id.to_string()], 10);
    }
}

#[tokio::test]
async fn test_stroke_relayed_to_others_only() {
    let addr = start_default().await;
    let (mut a, mut b, _, _) = seated_pair(&addr, "draw").await;

    send(&mut a, json!({ "type": "start", "roomId": "draw" })).await;
    recv(&mut a).await;
    recv(&mut b).await;

    let stroke = json!({ "kind": "start", "x": 1.5, "y": 2.0, "color": "#f00", "width": 3.0 });
    send(&mut a, json!({ "type": "stroke", "roomId": "draw", "data": stroke })).await;
    assert_eq!(recv(&mut b).await, json!({ "type": "drawing", "data": stroke }));

    // The next thing A sees is its own status reply, not an echo.
    assert_eq!(status(&mut a).await, 1);
}

#[tokio::test]
async fn test_clear_reaches_others() {
    let addr = start_default().await;
    let (mut a, mut b, _, _) = seated_pair(&addr, "wipe").await;

    send(&mut b, json!({ "type": "clear", "roomId": "wipe" })).await;
    assert_eq!(recv(&mut a).await, json!({ "type": "canvasCleared" }));
}

#[tokio::test]
async fn test_wrong_guess_before_start() {
    let addr = start_default().await;
    let (mut a, mut b, _, _) = seated_pair(&addr, "early").await;

    send(
        &mut b,
        json!({ "type": "guess", "roomId": "early", "guess": "cat", "playerName": "Bo" }),
    )
    .await;
    assert_eq!(
        recv(&mut a).await,
        json!({ "type": "wrongGuess", "displayName": "Bo", "text": "cat" })
    );
}

#[tokio::test]
async fn test_status_tracks_room_count() {
    let addr = start_default().await;
    let mut ws = connect(&addr).await;

    assert_eq!(status(&mut ws).await, 0);

    join(&mut ws, "one", "Ann").await;
    join(&mut ws, "two", "Ann").await;
    assert_eq!(status(&mut ws).await, 2);

    send(&mut ws, json!({ "type": "leave", "roomId": "one" })).await;
    assert_eq!(status(&mut ws).await, 1);
}

#[tokio::test]
async fn test_undecodable_frame_gets_error_and_connection_survives() {
    let addr = start_default().await;
    let mut ws = connect(&addr).await;

    ws.send(Message::Text("not json".into())).await.expect("send");
    let reply = recv(&mut ws).await;
    assert_eq!(reply["type"], "error");
    assert!(reply["message"].as_str().unwrap().contains("decode"));

    send(&mut ws, json!({ "type": "teleport", "roomId": "r1" })).await;
    assert_eq!(recv(&mut ws).await["type"], "error");

    assert_eq!(status(&mut ws).await, 0);
}

#[tokio::test]
async fn test_oversized_frame_rejected() {
    let addr = start_server(ScribbleServer::builder().max_frame_bytes(64)).await;
    let mut ws = connect(&addr).await;

    let name = "x".repeat(200);
    send(&mut ws, json!({ "type": "join", "roomId": "big", "playerName": name })).await;
    let reply = recv(&mut ws).await;
    assert_eq!(reply["type"], "error");
    assert!(reply["message"].as_str().unwrap().contains("exceeds limit"));

    assert_eq!(status(&mut ws).await, 0);
}

#[tokio::test]
async fn test_intents_for_unknown_room_are_ignored() {
    let addr = start_default().await;
    let mut ws = connect(&addr).await;

    send(&mut ws, json!({ "type": "start", "roomId": "ghost" })).await;
    send(&mut ws, json!({ "type": "clear", "roomId": "ghost" })).await;
    send(&mut ws, json!({ "type": "leave", "roomId": "ghost" })).await;

    // Nothing came back for those, and no room was created.
    assert_eq!(status(&mut ws).await, 0);
}

#[tokio::test]
async fn test_closing_socket_notifies_room() {
    let addr = start_default().await;
    let (mut a, mut b, _, b_id) = seated_pair(&addr, "bye").await;

    b.close(None).await.expect("close");
    drop(b);

    assert_eq!(
        recv(&mut a).await,
        json!({ "type": "playerLeft", "connectionId": b_id, "name": "Bo" })
    );
    assert_eq!(status(&mut a).await, 1);
}

#[tokio::test]
async fn test_last_disconnect_destroys_room() {
    let addr = start_default().await;
    let mut a = connect(&addr).await;
    let mut observer = connect(&addr).await;

    join(&mut a, "short", "Ann").await;
    assert_eq!(status(&mut observer).await, 1);

    a.close(None).await.expect("close");
    drop(a);

    let mut count = 1;
    for _ in 0..50 {
        count = status(&mut observer).await;
        if count == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(count, 0);
}

/// Keeps reading until `dur` has passed, answering pings along the way,
/// and returns the JSON events seen. Panics if the server hangs up.
async fn drain_for(ws: &mut ClientWs, dur: Duration) -> Vec<Value> {
    let deadline = tokio::time::Instant::now() + dur;
    let mut events = Vec::new();
    loop {
        match tokio::time::timeout_at(deadline, ws.next()).await {
            Err(_) => return events,
            Ok(Some(Ok(msg @ (Message::Text(_) | Message::Binary(_))))) => {
                events.push(serde_json::from_slice(&msg.into_data()).expect("json event"));
            }
            Ok(Some(Ok(Message::Close(_)))) | Ok(None) => panic!("server hung up"),
            Ok(Some(Ok(_))) => {}
            Ok(Some(Err(e))) => panic!("websocket error: {e}"),
        }
    }
}

#[tokio::test]
async fn test_quiet_player_stays_seated() {
    let addr = start_server(
        ScribbleServer::builder()
            .words(WordPool::new(["cat"]).unwrap())
            .idle_timeout(Duration::from_millis(300)),
    )
    .await;
    let (mut a, mut b, _, _) = seated_pair(&addr, "quiet").await;

    // Neither client sends anything for over three idle timeouts.
    let (seen_a, seen_b) = tokio::join!(
        drain_for(&mut a, Duration::from_secs(1)),
        drain_for(&mut b, Duration::from_secs(1)),
    );
    assert!(seen_a.iter().all(|e| e["type"] != "playerLeft"), "{seen_a:?}");
    assert!(seen_b.iter().all(|e| e["type"] != "playerLeft"), "{seen_b:?}");

    assert_eq!(status(&mut a).await, 1);
    send(&mut b, json!({ "type": "start", "roomId": "quiet" })).await;
    assert_eq!(recv(&mut a).await["type"], "gameStarted");
}

#[tokio::test]
async fn test_unresponsive_peer_is_dropped() {
    let addr = start_server(
        ScribbleServer::builder()
            .words(WordPool::new(["cat"]).unwrap())
            .idle_timeout(Duration::from_millis(200)),
    )
    .await;
    let (a, mut b, a_id, _) = seated_pair(&addr, "sleepy").await;

    // A's socket stays open but is never read, so no pong ever goes back.
    let seen = drain_for(&mut b, Duration::from_secs(2)).await;
    assert!(
        seen.iter()
            .any(|e| e["type"] == "playerLeft" && e["connectionId"] == a_id),
        "{seen:?}"
    );
    drop(a);
}

#[tokio::test]
async fn test_rooms_are_isolated() {
    let addr = start_default().await;
    let (mut a, mut b, _, _) = seated_pair(&addr, "left").await;
    let (mut c, _d, _, _) = seated_pair(&addr, "right").await;

    send(&mut a, json!({ "type": "start", "roomId": "left" })).await;
    assert_eq!(recv(&mut b).await["type"], "gameStarted");

    // C's first event is its status reply; nothing leaked from "left".
    assert_eq!(status(&mut c).await, 2);
}
