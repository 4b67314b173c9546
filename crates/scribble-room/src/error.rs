//! Error types for the room layer.
//!
//! Game-flow misuse (guessing out of turn, starting too early, ...) is not
//! an error; [`GameRoom`](crate::GameRoom) absorbs it. These variants are
//! plumbing and setup failures only.

use scribble_protocol::RoomId;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room actor's command channel is closed, or it dropped a reply.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),

    /// A word pool was built from an empty (or all-blank) list.
    #[error("word pool must contain at least one word")]
    EmptyWordPool,

    /// A `GameConfig` value no room can run with.
    #[error("invalid game config: {0}")]
    InvalidConfig(&'static str),
}
