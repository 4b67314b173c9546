//! Room actor: an isolated Tokio task that owns one [`GameRoom`].
//!
//! All intents for a room arrive as commands on the actor's channel and
//! are handled one at a time, to completion, so a guess and a leave can
//! never interleave half-applied updates. Rooms don't share anything, so
//! different rooms run fully in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use scribble_protocol::{
    Audience, Phase, PlayerId, RoomId, ServerEvent, StrokeEvent,
};
use tokio::sync::{mpsc, oneshot};

use crate::{GameConfig, GameRoom, RoomError, WordPool};

/// Channel sender for delivering events to one connection.
///
/// Unbounded so the actor never waits on a slow socket: delivery is
/// fire-and-forget from the room's point of view.
pub type Outbox = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        name: String,
        outbox: Outbox,
        reply: oneshot::Sender<()>,
    },
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<LeaveOutcome>,
    },
    Start {
        sender: PlayerId,
    },
    Stroke {
        sender: PlayerId,
        data: StrokeEvent,
    },
    Clear {
        sender: PlayerId,
    },
    Guess {
        sender: PlayerId,
        text: String,
        display_name: String,
    },
    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },
    Shutdown,
}

/// What a leave did to the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveOutcome {
    /// `false` if the player wasn't seated (nothing changed).
    pub was_member: bool,
    /// Players still seated afterwards.
    pub remaining: usize,
}

/// A snapshot of room metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub phase: Phase,
    pub player_count: usize,
    pub round: u32,
}

/// Handle to a running room actor.
///
/// Cheap to clone; the registry holds one per room and hands out copies
/// so game intents don't need the registry lock while they run.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's id.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Seats a player and waits until their snapshot has been queued.
    pub async fn join(
        &self,
        player_id: PlayerId,
        name: &str,
        outbox: Outbox,
    ) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            player_id,
            name: name.to_string(),
            outbox,
            reply,
        })
        .await?;
        rx.await.map_err(|_| self.unavailable())
    }

    /// Unseats a player and reports how many remain.
    pub async fn leave(
        &self,
        player_id: PlayerId,
    ) -> Result<LeaveOutcome, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Leave { player_id, reply }).await?;
        rx.await.map_err(|_| self.unavailable())
    }

    /// Asks the room to start (fire-and-forget).
    pub async fn start(&self, sender: PlayerId) -> Result<(), RoomError> {
        self.send(RoomCommand::Start { sender }).await
    }

    /// Submits a stroke sample (fire-and-forget).
    pub async fn submit_stroke(
        &self,
        sender: PlayerId,
        data: StrokeEvent,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Stroke { sender, data }).await
    }

    /// Clears the canvas (fire-and-forget).
    pub async fn clear_canvas(&self, sender: PlayerId) -> Result<(), RoomError> {
        self.send(RoomCommand::Clear { sender }).await
    }

    /// Submits a guess (fire-and-forget).
    pub async fn submit_guess(
        &self,
        sender: PlayerId,
        text: &str,
        display_name: &str,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Guess {
            sender,
            text: text.to_string(),
            display_name: display_name.to_string(),
        })
        .await
    }

    /// Requests the current room info.
    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::GetInfo { reply }).await?;
        rx.await.map_err(|_| self.unavailable())
    }

    /// Tells the room to stop.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender.send(cmd).await.map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id.clone())
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct RoomActor {
    game: GameRoom,
    /// Per-member outboxes, keyed like the game's seats.
    outboxes: HashMap<PlayerId, Outbox>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        let room_id = self.game.room_id().clone();
        tracing::info!(%room_id, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player_id,
                    name,
                    outbox,
                    reply,
                } => {
                    self.outboxes.insert(player_id, outbox);
                    let events = self.game.join(player_id, &name);
                    self.dispatch(player_id, events);
                    tracing::info!(
                        %room_id,
                        %player_id,
                        players = self.game.players().len(),
                        "player joined"
                    );
                    let _ = reply.send(());
                }
                RoomCommand::Leave { player_id, reply } => {
                    let outcome = self.handle_leave(player_id);
                    let _ = reply.send(outcome);
                }
                RoomCommand::Start { sender } => {
                    if self.is_member(sender) {
                        let events = self.game.start();
                        self.dispatch(sender, events);
                    }
                }
                RoomCommand::Stroke { sender, data } => {
                    if self.is_member(sender) {
                        let events = self.game.submit_stroke(data);
                        self.dispatch(sender, events);
                    }
                }
                RoomCommand::Clear { sender } => {
                    if self.is_member(sender) {
                        let events = self.game.clear_canvas();
                        self.dispatch(sender, events);
                    }
                }
                RoomCommand::Guess {
                    sender,
                    text,
                    display_name,
                } => {
                    if self.is_member(sender) {
                        let events =
                            self.game.submit_guess(sender, &text, &display_name);
                        self.dispatch(sender, events);
                    }
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(%room_id, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(%room_id, "room actor stopped");
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> LeaveOutcome {
        let events = self.game.leave(player_id);
        let was_member = !events.is_empty();
        self.outboxes.remove(&player_id);
        self.dispatch(player_id, events);

        if was_member {
            tracing::info!(
                room_id = %self.game.room_id(),
                %player_id,
                players = self.game.players().len(),
                "player left"
            );
        }
        LeaveOutcome {
            was_member,
            remaining: self.game.players().len(),
        }
    }

    fn is_member(&self, player_id: PlayerId) -> bool {
        let member = self.game.contains(player_id);
        if !member {
            tracing::warn!(
                room_id = %self.game.room_id(),
                %player_id,
                "intent from non-member, ignoring"
            );
        }
        member
    }

    /// Resolves each event's audience against the current members and
    /// queues it on their outboxes.
    fn dispatch(&self, sender: PlayerId, events: Vec<(Audience, ServerEvent)>) {
        for (audience, event) in events {
            match audience {
                Audience::Sender => self.send_to(sender, event),
                Audience::RoomExceptSender => {
                    for player in self.game.players() {
                        if player.id != sender {
                            self.send_to(player.id, event.clone());
                        }
                    }
                }
                Audience::WholeRoom => {
                    for player in self.game.players() {
                        self.send_to(player.id, event.clone());
                    }
                }
            }
        }
    }

    /// Silently drops the event if the connection is already gone.
    fn send_to(&self, player_id: PlayerId, event: ServerEvent) {
        if let Some(outbox) = self.outboxes.get(&player_id) {
            let _ = outbox.send(event);
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.game.room_id().clone(),
            phase: self.game.phase(),
            player_count: self.game.players().len(),
            round: self.game.round(),
        }
    }
}

/// Spawns a new room actor and returns a handle to it.
pub(crate) fn spawn_room(
    room_id: RoomId,
    config: GameConfig,
    words: Arc<WordPool>,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.room_channel_size);
    let actor = RoomActor {
        game: GameRoom::new(room_id.clone(), config, words),
        outboxes: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
