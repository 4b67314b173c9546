//! Game configuration.

use serde::{Deserialize, Serialize};

use crate::RoomError;

/// Settings shared by every room a registry creates.
///
/// The defaults are the classic rules: three rounds and ten points per
/// correct guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Rounds per game. The game finishes when a correct guess would
    /// advance past this round. Must be at least 1.
    pub max_rounds: u32,

    /// Points awarded to the guesser for a correct guess.
    pub points_per_guess: u32,

    /// Capacity of each room actor's command channel. When it fills up,
    /// connection handlers wait (backpressure) instead of queueing
    /// without bound. Must be at least 1.
    pub room_channel_size: usize,
}

impl GameConfig {
    /// Checks the settings a room cannot run with.
    ///
    /// # Errors
    /// Returns `RoomError::InvalidConfig` naming the offending field.
    pub fn validate(&self) -> Result<(), RoomError> {
        if self.max_rounds == 0 {
            return Err(RoomError::InvalidConfig("max_rounds must be at least 1"));
        }
        if self.room_channel_size == 0 {
            return Err(RoomError::InvalidConfig(
                "room_channel_size must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            points_per_guess: 10,
            room_channel_size: 64,
        }
    }
}
