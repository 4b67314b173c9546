//! Wire protocol for Scribble.
//!
//! - **Types** ([`ClientIntent`], [`ServerEvent`], [`StrokeEvent`], ...):
//!   the messages that travel between clients and the server.
//! - **Audience** ([`Audience`]): how the game layer says who gets an event.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (frames) → Protocol (ClientIntent) → Room (GameRoom)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Audience, ClientIntent, Phase, Player, PlayerId, RoomId, Scores,
    ServerEvent, StrokeEvent, StrokeKind,
};
