//! # Scribble
//!
//! Real-time drawing-and-guessing game server.
//!
//! Players connect over WebSocket and exchange JSON frames. They join rooms
//! by id (a room is created on the first join and destroyed when its last
//! player leaves), take turns drawing, and score by guessing the drawer's
//! word. This crate is the connection gateway: it accepts sockets, decodes
//! [`ClientIntent`](scribble_protocol::ClientIntent)s, and routes them to
//! the room actors in `scribble-room`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scribble::prelude::*;
//!
//! # async fn run() -> Result<(), ScribbleError> {
//! let server = ScribbleServer::builder()
//!     .bind("0.0.0.0:3000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::ScribbleError;
pub use server::{
    DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_FRAME_BYTES, ScribbleServer,
    ScribbleServerBuilder,
};

/// Re-exports for embedding the server.
pub mod prelude {
    pub use crate::{ScribbleError, ScribbleServer, ScribbleServerBuilder};
    pub use scribble_protocol::{
        ClientIntent, Phase, Player, PlayerId, RoomId, ServerEvent,
        StrokeEvent, StrokeKind,
    };
    pub use scribble_room::{GameConfig, WordPool};
}
