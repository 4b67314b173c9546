//! Per-connection handler: decode intents, route them to rooms, and write
//! room events back to the socket.
//!
//! Each accepted connection gets two tasks:
//!   1. the handler itself, reading frames and routing intents; it also
//!      pings the peer whenever the socket goes quiet
//!   2. a writer draining the connection's outbox onto the socket
//!
//! A peer is dropped only when nothing at all, pongs included, has come
//! back for the idle timeout. Watching without sending is fine.
//!
//! Rooms never touch the socket directly. They push into the outbox, and
//! so do direct replies (`status`, `error`), which keeps everything sent
//! to one client in a single ordered stream.

use std::sync::Arc;

use scribble_protocol::{
    ClientIntent, Codec, PlayerId, ProtocolError, RoomId, ServerEvent,
};
use scribble_room::{Outbox, RoomError, RoomHandle};
use scribble_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::ScribbleError;
use crate::server::ServerState;

/// Drop guard that pulls the player out of every room when the handler
/// exits, however it exits.
///
/// `Drop` is synchronous, so the cleanup runs on a spawned task.
struct ConnectionGuard<C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<C>>,
    writer: JoinHandle<()>,
}

impl<C: Codec> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        let writer = self.writer.abort_handle();
        tokio::spawn(async move {
            let rooms = state.registry.lock().await.disconnect(player_id).await;
            writer.abort();
            tracing::debug!(%player_id, rooms, "connection cleaned up");
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ScribbleError> {
    let conn = Arc::new(conn);
    let player_id = PlayerId(conn.id().into_inner());
    tracing::debug!(%player_id, peer = %conn.peer_addr(), "connection accepted");

    let (outbox, inbox) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_events(
        Arc::clone(&conn),
        Arc::clone(&state),
        inbox,
    ));
    let _guard = ConnectionGuard {
        player_id,
        state: Arc::clone(&state),
        writer,
    };

    let heartbeat = state.heartbeat();
    loop {
        // `recv` is cancel-safe, so timing it out only wakes us to check on
        // the peer.
        let data = match tokio::time::timeout(heartbeat, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::info!(%player_id, "connection closed");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                return Err(e.into());
            }
            Err(_) => {
                let idle = conn.idle_for();
                if idle >= state.idle_timeout {
                    tracing::info!(
                        %player_id,
                        idle_ms = idle.as_millis() as u64,
                        "peer unresponsive, dropping"
                    );
                    let _ = tokio::time::timeout(heartbeat, conn.close()).await;
                    break;
                }
                match tokio::time::timeout(heartbeat, conn.ping()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => tracing::debug!(%player_id, error = %e, "ping failed"),
                    Err(_) => tracing::debug!(%player_id, "ping stalled"),
                }
                continue;
            }
        };

        let intent = match decode_frame(&state, &data) {
            Ok(intent) => intent,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "rejecting frame");
                let _ = outbox.send(ServerEvent::Error {
                    message: e.to_string(),
                });
                continue;
            }
        };

        if let Err(e) = route_intent(&state, player_id, &outbox, intent).await {
            tracing::debug!(%player_id, error = %e, "intent dropped");
        }
    }

    // _guard drops here → disconnect cleanup fires.
    Ok(())
}

fn decode_frame<C: Codec>(
    state: &ServerState<C>,
    data: &[u8],
) -> Result<ClientIntent, ProtocolError> {
    if data.len() > state.max_frame_bytes {
        return Err(ProtocolError::FrameTooLarge {
            size: data.len(),
            max: state.max_frame_bytes,
        });
    }
    state.codec.decode(data)
}

/// Applies one intent.
///
/// Membership changes hold the registry lock for the whole round-trip to
/// the room. Game intents only borrow a handle; an unknown room is
/// ignored.
async fn route_intent<C: Codec>(
    state: &ServerState<C>,
    player_id: PlayerId,
    outbox: &Outbox,
    intent: ClientIntent,
) -> Result<(), RoomError> {
    match intent {
        ClientIntent::Join {
            room_id,
            player_name,
        } => {
            let mut registry = state.registry.lock().await;
            registry
                .join(&room_id, player_id, &player_name, outbox.clone())
                .await?;
        }
        ClientIntent::Leave { room_id } => {
            let mut registry = state.registry.lock().await;
            registry.leave(&room_id, player_id).await?;
        }
        ClientIntent::Start { room_id } => {
            if let Some(room) = find_room(state, &room_id).await {
                room.start(player_id).await?;
            }
        }
        ClientIntent::Stroke { room_id, data } => {
            if let Some(room) = find_room(state, &room_id).await {
                room.submit_stroke(player_id, data).await?;
            }
        }
        ClientIntent::Clear { room_id } => {
            if let Some(room) = find_room(state, &room_id).await {
                room.clear_canvas(player_id).await?;
            }
        }
        ClientIntent::Guess {
            room_id,
            guess,
            player_name,
        } => {
            if let Some(room) = find_room(state, &room_id).await {
                room.submit_guess(player_id, &guess, &player_name).await?;
            }
        }
        ClientIntent::Status => {
            let count = state.registry.lock().await.active_room_count();
            let _ = outbox.send(ServerEvent::status_ok(count));
        }
    }
    Ok(())
}

async fn find_room<C: Codec>(
    state: &ServerState<C>,
    room_id: &RoomId,
) -> Option<RoomHandle> {
    let room = state.registry.lock().await.get(room_id);
    if room.is_none() {
        tracing::debug!(%room_id, "intent for unknown room");
    }
    room
}

/// Drains the outbox onto the socket until every sender is gone or the
/// socket fails.
async fn write_events<C: Codec>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
    mut inbox: mpsc::UnboundedReceiver<ServerEvent>,
) {
    while let Some(event) = inbox.recv().await {
        let bytes = match state.codec.encode(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(conn_id = %conn.id(), error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(conn_id = %conn.id(), error = %e, "send failed, stopping writer");
            break;
        }
    }
}
