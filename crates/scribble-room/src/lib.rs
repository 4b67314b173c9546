//! Rooms for Scribble.
//!
//! Each room runs as an isolated Tokio task (actor model) owning a
//! [`GameRoom`], the pure state machine holding players, scores, rounds,
//! the current word and the stroke log.
//!
//! # Key types
//!
//! - [`GameRoom`]: the game rules; returns `(Audience, ServerEvent)` pairs
//! - [`RoomRegistry`]: room id → room, lazily created, removed when empty
//! - [`RoomHandle`]: send intents to a running room actor
//! - [`GameConfig`] / [`WordPool`]: rules and vocabulary

mod config;
mod error;
mod game;
mod registry;
mod room;
mod words;

pub use config::GameConfig;
pub use error::RoomError;
pub use game::{GameRoom, MIN_PLAYERS, Outbound};
pub use registry::RoomRegistry;
pub use room::{LeaveOutcome, Outbox, RoomHandle, RoomInfo};
pub use words::WordPool;
