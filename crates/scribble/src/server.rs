//! `ScribbleServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → rooms.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use scribble_protocol::{Codec, JsonCodec};
use scribble_room::{GameConfig, RoomRegistry, WordPool};
use scribble_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::ScribbleError;
use crate::handler::handle_connection;

/// How long a peer may go without sending anything, pongs included,
/// before it is dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Floor for the ping interval derived from the idle timeout.
const MIN_HEARTBEAT: Duration = Duration::from_millis(10);

/// Largest inbound frame the server will try to decode.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    /// Held across join / leave / disconnect so room creation and
    /// teardown never race. Game intents only clone a handle out of it.
    /// See `RoomRegistry` for why the hold is short.
    pub(crate) registry: Mutex<RoomRegistry>,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
    pub(crate) max_frame_bytes: usize,
}

impl<C: Codec> ServerState<C> {
    /// How often a quiet connection is pinged. Three pings fit in one idle
    /// timeout, so a single lost pong does not cost a live player the seat.
    pub(crate) fn heartbeat(&self) -> Duration {
        heartbeat_for(self.idle_timeout)
    }
}

fn heartbeat_for(idle_timeout: Duration) -> Duration {
    (idle_timeout / 3).max(MIN_HEARTBEAT)
}

/// Builder for configuring and starting a Scribble server.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use scribble::prelude::*;
///
/// # async fn run() -> Result<(), ScribbleError> {
/// let server = ScribbleServer::builder()
///     .bind("0.0.0.0:3000")
///     .game_config(GameConfig { max_rounds: 5, ..GameConfig::default() })
///     .idle_timeout(Duration::from_secs(30))
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ScribbleServerBuilder {
    bind_addr: String,
    game_config: GameConfig,
    words: WordPool,
    idle_timeout: Duration,
    max_frame_bytes: usize,
}

impl ScribbleServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            game_config: GameConfig::default(),
            words: WordPool::default(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the rules every room is created with.
    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.game_config = config;
        self
    }

    /// Replaces the built-in vocabulary.
    pub fn words(mut self, words: WordPool) -> Self {
        self.words = words;
        self
    }

    /// Sets how long a peer may go without sending anything before it is
    /// dropped.
    ///
    /// Quiet connections are pinged well inside this window, so a client
    /// that only watches stays seated as long as its socket answers.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Sets the inbound frame size limit.
    pub fn max_frame_bytes(mut self, max: usize) -> Self {
        self.max_frame_bytes = max;
        self
    }

    /// Binds the listener and creates the room registry.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    ///
    /// # Errors
    /// Fails on a zero idle timeout, an invalid [`GameConfig`], or a
    /// bind error.
    pub async fn build(self) -> Result<ScribbleServer, ScribbleError> {
        if self.idle_timeout.is_zero() {
            return Err(ScribbleError::InvalidConfig("idle_timeout must be non-zero"));
        }
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: Mutex::new(RoomRegistry::new(self.game_config, self.words)?),
            codec: JsonCodec,
            idle_timeout: self.idle_timeout,
            max_frame_bytes: self.max_frame_bytes,
        });

        Ok(ScribbleServer { transport, state })
    }
}

impl Default for ScribbleServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Scribble server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ScribbleServer<C: Codec = JsonCodec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl ScribbleServer {
    /// Creates a new builder.
    pub fn builder() -> ScribbleServerBuilder {
        ScribbleServerBuilder::new()
    }
}

impl<C: Codec> ScribbleServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ScribbleError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the accept loop, spawning one handler task per connection.
    ///
    /// Never returns under normal operation; failed accepts are logged and
    /// skipped.
    pub async fn run(mut self) -> Result<(), ScribbleError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "scribble server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribble_room::RoomError;

    #[test]
    fn test_builder_defaults() {
        let builder = ScribbleServerBuilder::default();
        assert_eq!(builder.bind_addr, "127.0.0.1:3000");
        assert_eq!(builder.idle_timeout, DEFAULT_IDLE_TIMEOUT);
        assert_eq!(builder.max_frame_bytes, DEFAULT_MAX_FRAME_BYTES);
        assert_eq!(builder.game_config, GameConfig::default());
    }

    #[test]
    fn test_builder_setters() {
        let builder = ScribbleServer::builder()
            .bind("0.0.0.0:9000")
            .idle_timeout(Duration::from_secs(5))
            .max_frame_bytes(128)
            .game_config(GameConfig {
                max_rounds: 7,
                ..GameConfig::default()
            });
        assert_eq!(builder.bind_addr, "0.0.0.0:9000");
        assert_eq!(builder.idle_timeout, Duration::from_secs(5));
        assert_eq!(builder.max_frame_bytes, 128);
        assert_eq!(builder.game_config.max_rounds, 7);
    }

    #[tokio::test]
    async fn test_build_binds_ephemeral_port() {
        let server = ScribbleServer::builder()
            .bind("127.0.0.1:0")
            .build()
            .await
            .unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_build_rejects_zero_rounds() {
        let result = ScribbleServer::builder()
            .bind("127.0.0.1:0")
            .game_config(GameConfig {
                max_rounds: 0,
                ..GameConfig::default()
            })
            .build()
            .await;
        assert!(matches!(
            result,
            Err(ScribbleError::Room(RoomError::InvalidConfig(_)))
        ));
    }

    #[tokio::test]
    async fn test_build_rejects_zero_idle_timeout() {
        let result = ScribbleServer::builder()
            .bind("127.0.0.1:0")
            .idle_timeout(Duration::ZERO)
            .build()
            .await;
        assert!(matches!(result, Err(ScribbleError::InvalidConfig(_))));
    }

    #[test]
    fn test_heartbeat_fits_three_pings_per_timeout() {
        assert_eq!(heartbeat_for(Duration::from_secs(60)), Duration::from_secs(20));
        assert_eq!(heartbeat_for(Duration::from_millis(300)), Duration::from_millis(100));
        assert_eq!(heartbeat_for(Duration::from_millis(1)), MIN_HEARTBEAT);
    }

    #[tokio::test]
    async fn test_build_reports_bind_failure() {
        let result = ScribbleServer::builder().bind("not-an-address").build().await;
        assert!(matches!(result, Err(ScribbleError::Transport(_))));
    }
}
