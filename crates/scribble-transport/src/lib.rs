//! Transport abstraction layer for Scribble.
//!
//! Provides the [`Transport`] and [`Connection`] traits so the gateway can
//! stay ignorant of the socket library underneath. Every accepted
//! connection gets a process-unique [`ConnectionId`], which the layers
//! above use as the player's identity inside a room.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Returns the address the transport is listening on.
    fn local_addr(&self) -> Result<SocketAddr, Self::Error>;
}

/// A single connection that can send and receive frames.
///
/// Sending and receiving are independent: a task blocked in
/// [`recv`](Connection::recv) must not stop another task from calling
/// [`send`](Connection::send) on the same connection.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one frame to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed. Control
    /// frames are consumed here but still count as activity for
    /// [`idle_for`](Connection::idle_for). Must be cancel-safe: dropping
    /// the future loses no data frame.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Asks the peer to prove it is still there.
    ///
    /// A live peer answers on its own (a WebSocket pong), which the next
    /// [`recv`](Connection::recv) records without returning it.
    async fn ping(&self) -> Result<(), Self::Error>;

    /// Time since the peer last sent anything, control frames included.
    fn idle_for(&self) -> Duration;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;

    /// Returns the remote peer's address.
    fn peer_addr(&self) -> SocketAddr;
}
