//! `GameRoom`: the rules of one drawing-and-guessing session.
//!
//! This type knows nothing about sockets, tasks, or channels. Every
//! operation mutates the room and returns the events it produced, each
//! tagged with an [`Audience`] relative to the player who caused it. The
//! room actor turns audiences into actual deliveries.
//!
//! Game-flow misuse never fails: an operation that doesn't apply in the
//! current phase returns no events (or, for guesses, a wrong-guess notice).

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use scribble_protocol::{
    Audience, Phase, Player, PlayerId, RoomId, Scores, ServerEvent,
    StrokeEvent,
};

use crate::{GameConfig, WordPool};

/// Players needed before a game can start.
pub const MIN_PLAYERS: usize = 2;

/// Events produced by one operation, in delivery order.
pub type Outbound = Vec<(Audience, ServerEvent)>;

/// State and transition logic for one room.
#[derive(Debug)]
pub struct GameRoom {
    room_id: RoomId,
    config: GameConfig,
    words: Arc<WordPool>,
    rng: StdRng,

    /// Join order doubles as turn order.
    players: Vec<Player>,
    scores: Scores,
    phase: Phase,
    round: u32,
    current_drawer: Option<PlayerId>,
    current_word: String,
    strokes: Vec<StrokeEvent>,
}

impl GameRoom {
    /// Creates an empty room in `Waiting` with an OS-seeded word picker.
    pub fn new(room_id: RoomId, config: GameConfig, words: Arc<WordPool>) -> Self {
        Self::with_rng(room_id, config, words, StdRng::from_os_rng())
    }

    /// Creates an empty room that draws words from the given generator.
    pub fn with_rng(
        room_id: RoomId,
        config: GameConfig,
        words: Arc<WordPool>,
        rng: StdRng,
    ) -> Self {
        Self {
            room_id,
            config,
            words,
            rng,
            players: Vec::new(),
            scores: Scores::new(),
            phase: Phase::Waiting,
            round: 0,
            current_drawer: None,
            current_word: String::new(),
            strokes: Vec::new(),
        }
    }

    // -----------------------------------------------------------------
    // Intents
    // -----------------------------------------------------------------

    /// Adds a player with a zero score.
    ///
    /// A player already in the room keeps their seat and score but takes
    /// the new name; only they get the room snapshot again.
    pub fn join(&mut self, id: PlayerId, name: &str) -> Outbound {
        if let Some(player) = self.players.iter_mut().find(|p| p.id == id) {
            player.name = name.to_string();
            return vec![(Audience::Sender, self.snapshot())];
        }

        self.players.push(Player {
            id,
            name: name.to_string(),
        });
        self.scores.insert(id, 0);
        tracing::debug!(
            room_id = %self.room_id,
            player_id = %id,
            players = self.players.len(),
            "player seated"
        );

        vec![
            (Audience::Sender, self.snapshot()),
            (
                Audience::RoomExceptSender,
                ServerEvent::PlayerJoined {
                    connection_id: id,
                    name: name.to_string(),
                },
            ),
        ]
    }

    /// Starts the game if it is waiting and has enough players.
    pub fn start(&mut self) -> Outbound {
        if self.phase != Phase::Waiting
            || self.players.len() < MIN_PLAYERS
        {
            return Vec::new();
        }
        let Some(first) = self.players.first().map(|p| p.id) else {
            return Vec::new();
        };

        self.phase = Phase::Playing;
        self.round = 1;
        self.current_drawer = Some(first);
        self.current_word = self.pick_word();
        self.strokes.clear();
        tracing::info!(
            room_id = %self.room_id,
            players = self.players.len(),
            drawer = %first,
            "game started"
        );

        vec![(
            Audience::WholeRoom,
            ServerEvent::GameStarted {
                current_drawer_id: first,
                current_word: self.current_word.clone(),
                round: self.round,
                max_rounds: self.config.max_rounds,
            },
        )]
    }

    /// Records a stroke sample and relays it to everyone but its author.
    ///
    /// Any member may draw; the drawer is not enforced.
    pub fn submit_stroke(&mut self, data: StrokeEvent) -> Outbound {
        if self.phase != Phase::Playing {
            return Vec::new();
        }
        self.strokes.push(data.clone());
        vec![(Audience::RoomExceptSender, ServerEvent::Drawing { data })]
    }

    /// Wipes the stroke log, in any phase.
    pub fn clear_canvas(&mut self) -> Outbound {
        self.strokes.clear();
        vec![(Audience::RoomExceptSender, ServerEvent::CanvasCleared)]
    }

    /// Checks a guess against the current word, ignoring case.
    ///
    /// A guess made while no round is running is reported as wrong.
    pub fn submit_guess(
        &mut self,
        id: PlayerId,
        text: &str,
        display_name: &str,
    ) -> Outbound {
        if self.phase != Phase::Playing || !self.is_correct(text) {
            return vec![(
                Audience::RoomExceptSender,
                ServerEvent::WrongGuess {
                    display_name: display_name.to_string(),
                    text: text.to_string(),
                },
            )];
        }

        if let Some(score) = self.scores.get_mut(&id) {
            *score += self.config.points_per_guess;
        }
        tracing::debug!(
            room_id = %self.room_id,
            player_id = %id,
            round = self.round,
            "correct guess"
        );

        let correct = ServerEvent::CorrectGuess {
            connection_id: id,
            display_name: display_name.to_string(),
            text: text.to_string(),
        };
        let next = self.advance_round();
        vec![(Audience::WholeRoom, correct), (Audience::WholeRoom, next)]
    }

    /// Removes a player and their score.
    ///
    /// The round is left as it is even if the drawer walks out; it resumes
    /// on the next correct guess.
    pub fn leave(&mut self, id: PlayerId) -> Outbound {
        let Some(index) = self.players.iter().position(|p| p.id == id) else {
            return Vec::new();
        };
        let player = self.players.remove(index);
        self.scores.remove(&id);
        tracing::debug!(
            room_id = %self.room_id,
            player_id = %id,
            players = self.players.len(),
            "player unseated"
        );

        vec![(
            Audience::RoomExceptSender,
            ServerEvent::PlayerLeft {
                connection_id: player.id,
                name: player.name,
            },
        )]
    }

    // -----------------------------------------------------------------
    // Round progression
    // -----------------------------------------------------------------

    fn advance_round(&mut self) -> ServerEvent {
        self.round += 1;

        let next = if self.round > self.config.max_rounds {
            None
        } else {
            self.next_drawer()
        };
        // An empty room has nobody left to draw, so it ends like a full game.
        let Some(drawer) = next else {
            self.phase = Phase::Finished;
            tracing::info!(room_id = %self.room_id, round = self.round, "game finished");
            return ServerEvent::GameFinished {
                scores: self.scores.clone(),
                players: self.players.clone(),
            };
        };

        self.current_drawer = Some(drawer);
        self.current_word = self.pick_word();
        self.strokes.clear();
        tracing::debug!(
            room_id = %self.room_id,
            round = self.round,
            %drawer,
            "next round"
        );
        ServerEvent::NextRound {
            current_drawer_id: drawer,
            current_word: self.current_word.clone(),
            round: self.round,
            scores: self.scores.clone(),
        }
    }

    /// The player after the current drawer in the *current* seat order,
    /// wrapping around. A drawer who has left restarts the rotation at the
    /// first seat.
    fn next_drawer(&self) -> Option<PlayerId> {
        let position = self
            .current_drawer
            .and_then(|d| self.players.iter().position(|p| p.id == d));
        let next = match position {
            Some(i) => (i + 1) % self.players.len(),
            None => 0,
        };
        self.players.get(next).map(|p| p.id)
    }

    fn pick_word(&mut self) -> String {
        self.words.pick(&mut self.rng).to_string()
    }

    fn is_correct(&self, guess: &str) -> bool {
        guess.to_lowercase() == self.current_word.to_lowercase()
    }

    fn snapshot(&self) -> ServerEvent {
        ServerEvent::RoomJoined {
            room_id: self.room_id.clone(),
            players: self.players.clone(),
            phase: self.phase,
            strokes: self.strokes.clone(),
        }
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn current_drawer(&self) -> Option<PlayerId> {
        self.current_drawer
    }

    pub fn current_word(&self) -> &str {
        &self.current_word
    }

    pub fn scores(&self) -> &Scores {
        &self.scores
    }

    pub fn strokes(&self) -> &[StrokeEvent] {
        &self.strokes
    }
}
