//! Unified error type for the Scribble server.

use scribble_protocol::ProtocolError;
use scribble_room::RoomError;
use scribble_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The wrapping variants are `#[from]`, so `?` lifts sub-crate errors into
/// this one.
#[derive(Debug, thiserror::Error)]
pub enum ScribbleError {
    /// Binding, accepting, or socket I/O failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room actor could not be reached, or the word pool was empty.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A builder setting the gateway cannot run with.
    #[error("invalid server config: {0}")]
    InvalidConfig(&'static str),
}
