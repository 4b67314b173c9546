//! Core protocol types for Scribble's wire format.
//!
//! Everything in this module travels "on the wire": clients send
//! [`ClientIntent`]s, the server answers with [`ServerEvent`]s. Both are
//! JSON objects tagged by a `"type"` field with camelCase field names, so
//! a browser client can use them without any mapping layer:
//!
//! ```text
//! → { "type": "guess", "roomId": "r1", "guess": "cat", "playerName": "Bo" }
//! ← { "type": "wrongGuess", "displayName": "Bo", "text": "cat" }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identity of a player inside a room.
///
/// A player *is* a connection: the gateway derives this from the
/// transport's connection id, so one socket equals one player. The
/// `#[serde(transparent)]` attribute keeps it a plain number on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Opaque, client-chosen room identifier.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Game vocabulary
// ---------------------------------------------------------------------------

/// A participant as other clients see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

/// Lifecycle phase of a room's game.
///
/// ```text
/// Waiting ──start (≥ 2 players)──→ Playing ──last round guessed──→ Finished
/// ```
///
/// `Finished` is terminal for a room; a rematch needs a fresh room.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Waiting,
    Playing,
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Playing => write!(f, "Playing"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

/// Whether a stroke sample begins a new line or continues the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrokeKind {
    Start,
    Draw,
}

/// One point sample of freehand drawing.
///
/// The server never looks inside: it stores samples in the room's stroke
/// log and relays them as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeEvent {
    pub kind: StrokeKind,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

/// Points per player, ordered by id so snapshots are stable.
pub type Scores = BTreeMap<PlayerId, u32>;

// ---------------------------------------------------------------------------
// Audience: who receives an event?
// ---------------------------------------------------------------------------

/// Who should receive a server event, relative to the player whose intent
/// produced it.
///
/// Server-side routing only; it never goes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Only the player who sent the intent.
    Sender,
    /// Every room member except the sender.
    RoomExceptSender,
    /// Every room member, sender included.
    WholeRoom,
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// A message from a client.
///
/// The sender's identity is never part of the payload; the gateway attaches
/// it from the connection the frame arrived on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientIntent {
    /// Join (creating if needed) a room under a display name.
    Join { room_id: RoomId, player_name: String },

    /// Ask the room to start its game.
    Start { room_id: RoomId },

    /// One drawing sample.
    Stroke { room_id: RoomId, data: StrokeEvent },

    /// Wipe the shared canvas.
    Clear { room_id: RoomId },

    /// Guess the current word.
    Guess {
        room_id: RoomId,
        guess: String,
        player_name: String,
    },

    /// Leave a room without closing the connection.
    Leave { room_id: RoomId },

    /// Liveness query; answered with [`ServerEvent::Status`].
    Status,
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// A message from the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// To the joiner: a snapshot of the room they just entered. `strokes`
    /// lets a late joiner replay what is already on the canvas.
    RoomJoined {
        room_id: RoomId,
        players: Vec<Player>,
        phase: Phase,
        strokes: Vec<StrokeEvent>,
    },

    PlayerJoined { connection_id: PlayerId, name: String },

    PlayerLeft { connection_id: PlayerId, name: String },

    GameStarted {
        current_drawer_id: PlayerId,
        current_word: String,
        round: u32,
        max_rounds: u32,
    },

    Drawing { data: StrokeEvent },

    CanvasCleared,

    CorrectGuess {
        connection_id: PlayerId,
        display_name: String,
        text: String,
    },

    WrongGuess { display_name: String, text: String },

    NextRound {
        current_drawer_id: PlayerId,
        current_word: String,
        round: u32,
        scores: Scores,
    },

    GameFinished { scores: Scores, players: Vec<Player> },

    /// Reply to [`ClientIntent::Status`].
    Status {
        status: String,
        active_room_count: usize,
    },

    /// Reply to a frame the server could not decode.
    Error { message: String },
}

impl ServerEvent {
    /// Builds the healthy reply to a status query.
    pub fn status_ok(active_room_count: usize) -> Self {
        Self::Status {
            status: "ok".to_string(),
            active_room_count,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
