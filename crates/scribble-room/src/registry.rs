//! Room registry: creates rooms on demand, tracks memberships, and tears
//! rooms down the moment they empty.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use scribble_protocol::{PlayerId, RoomId};

use crate::room::spawn_room;
use crate::{GameConfig, Outbox, RoomError, RoomHandle, WordPool};

/// All live rooms, keyed by room id, plus an index of which rooms each
/// player is seated in.
///
/// `RoomRegistry` itself is not synchronized. The gateway wraps it in a
/// `tokio::sync::Mutex` and holds that lock across every membership change
/// (join, leave, disconnect), which serializes room creation and removal:
/// two joins for a brand-new id can't both create it, and a join can't
/// land in a room that is being torn down.
///
/// While it holds that lock, a membership change may wait for space in one
/// room's command channel. That wait is bounded: a room actor never awaits
/// while handling a command (outboxes are unbounded), so a full channel of
/// `room_channel_size` commands drains without touching the network.
pub struct RoomRegistry {
    rooms: HashMap<RoomId, RoomHandle>,
    memberships: HashMap<PlayerId, BTreeSet<RoomId>>,
    config: GameConfig,
    words: Arc<WordPool>,
}

impl RoomRegistry {
    /// Creates an empty registry whose rooms use the given rules and words.
    ///
    /// # Errors
    /// Returns `RoomError::InvalidConfig` if `config` fails
    /// [`GameConfig::validate`].
    pub fn new(config: GameConfig, words: WordPool) -> Result<Self, RoomError> {
        config.validate()?;
        Ok(Self {
            rooms: HashMap::new(),
            memberships: HashMap::new(),
            config,
            words: Arc::new(words),
        })
    }

    /// Returns the room for `room_id`, spawning a fresh `Waiting` room if
    /// there is none.
    pub fn get_or_create(&mut self, room_id: &RoomId) -> RoomHandle {
        if let Some(handle) = self.rooms.get(room_id) {
            return handle.clone();
        }
        let handle = spawn_room(
            room_id.clone(),
            self.config.clone(),
            Arc::clone(&self.words),
        );
        self.rooms.insert(room_id.clone(), handle.clone());
        tracing::info!(%room_id, rooms = self.rooms.len(), "room created");
        handle
    }

    /// Returns the room for `room_id` without creating one.
    pub fn get(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms.get(room_id).cloned()
    }

    /// Drops a room and stops its actor. Removing an unknown id is a no-op.
    pub async fn remove(&mut self, room_id: &RoomId) {
        let Some(handle) = self.rooms.remove(room_id) else {
            return;
        };
        let _ = handle.shutdown().await;

        self.memberships.retain(|_, rooms| {
            rooms.remove(room_id);
            !rooms.is_empty()
        });
        tracing::info!(%room_id, rooms = self.rooms.len(), "room destroyed");
    }

    /// Calls `f` for every room the player is recorded in.
    pub fn for_each_room_containing<F>(&self, player_id: PlayerId, mut f: F)
    where
        F: FnMut(&RoomId, &RoomHandle),
    {
        let Some(room_ids) = self.memberships.get(&player_id) else {
            return;
        };
        for room_id in room_ids {
            if let Some(handle) = self.rooms.get(room_id) {
                f(room_id, handle);
            }
        }
    }

    /// Seats a player in a room, creating the room if needed.
    ///
    /// A room whose actor has died is replaced by a fresh one before
    /// retrying once.
    pub async fn join(
        &mut self,
        room_id: &RoomId,
        player_id: PlayerId,
        name: &str,
        outbox: Outbox,
    ) -> Result<(), RoomError> {
        let handle = self.get_or_create(room_id);
        if let Err(e) = handle.join(player_id, name, outbox.clone()).await {
            tracing::warn!(%room_id, error = %e, "replacing dead room");
            self.remove(room_id).await;
            self.get_or_create(room_id)
                .join(player_id, name, outbox)
                .await?;
        }

        self.memberships
            .entry(player_id)
            .or_default()
            .insert(room_id.clone());
        Ok(())
    }

    /// Unseats a player. Returns `true` if they were seated.
    ///
    /// The room is destroyed if this left it empty. Leaving a room that
    /// doesn't exist is a no-op.
    pub async fn leave(
        &mut self,
        room_id: &RoomId,
        player_id: PlayerId,
    ) -> Result<bool, RoomError> {
        self.forget_membership(player_id, room_id);

        let Some(handle) = self.get(room_id) else {
            return Ok(false);
        };
        let outcome = match handle.leave(player_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.remove(room_id).await;
                return Err(e);
            }
        };

        if outcome.remaining == 0 {
            self.remove(room_id).await;
        }
        Ok(outcome.was_member)
    }

    /// Removes a player from every room they are in. Returns how many rooms
    /// they actually left.
    ///
    /// Safe to call more than once and for players that never joined
    /// anything. Rooms whose actor is gone are dropped along the way.
    pub async fn disconnect(&mut self, player_id: PlayerId) -> usize {
        let mut room_ids = Vec::new();
        self.for_each_room_containing(player_id, |room_id, _| {
            room_ids.push(room_id.clone());
        });

        let mut left = 0;
        for room_id in &room_ids {
            match self.leave(room_id, player_id).await {
                Ok(true) => left += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::debug!(%room_id, %player_id, error = %e, "stale room on disconnect");
                }
            }
        }
        self.memberships.remove(&player_id);
        left
    }

    /// Returns the ids of rooms the player is recorded in.
    pub fn rooms_of(&self, player_id: PlayerId) -> Vec<RoomId> {
        let mut room_ids = Vec::new();
        self.for_each_room_containing(player_id, |room_id, _| {
            room_ids.push(room_id.clone());
        });
        room_ids
    }

    /// Number of live rooms.
    pub fn active_room_count(&self) -> usize {
        self.rooms.len()
    }

    fn forget_membership(&mut self, player_id: PlayerId, room_id: &RoomId) {
        if let Some(rooms) = self.memberships.get_mut(&player_id) {
            rooms.remove(room_id);
            if rooms.is_empty() {
                self.memberships.remove(&player_id);
            }
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self {
            rooms: HashMap::new(),
            memberships: HashMap::new(),
            config: GameConfig::default(),
            words: Arc::new(WordPool::default()),
        }
    }
}
