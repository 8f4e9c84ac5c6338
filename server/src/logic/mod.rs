use std::{collections::HashMap, sync::Arc, time::Instant};

use dashmap::DashMap;
use rocket::futures::{SinkExt, future::join_all, stream::SplitSink};
use rocket_ws::{Message, stream::DuplexStream};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use tictactoe_common::{models::GameStatus, protocol::ServerMessage};

use crate::data::{GameState, InvalidMove};

pub mod rules;

pub type Games = Arc<DashMap<String, Arc<Mutex<Game>>>>;

type Stream = SplitSink<DuplexStream, Message>;

pub struct Game {
    state: GameState,
    streams: HashMap<Uuid, Stream>,
    created_at: Instant,
    last_activity: Instant,
}

impl GameState {
    fn init_message(&self) -> ServerMessage {
        ServerMessage::Init {
            board: self.board,
            current_player: self.current_player,
            status: self.status,
        }
    }
}

async fn send(stream: &mut Stream, message: &ServerMessage) {
    if let Ok(text) = serde_json::to_string(message) {
        let _ = stream.send(Message::Text(text)).await;
    }
}

async fn broadcast(streams: &mut HashMap<Uuid, Stream>, message: &ServerMessage) {
    let futures: Vec<_> = streams
        .iter_mut()
        .map(|(_, stream)| send(stream, message))
        .collect();

    join_all(futures).await;
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    #[instrument(level = "trace")]
    pub fn new() -> Self {
        info!("Creating new game");
        let now = Instant::now();
        Self {
            state: GameState::new(),
            streams: HashMap::new(),
            created_at: now,
            last_activity: now,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Starts over with an empty board and returns the `Init` sent to every
    /// connection.
    #[instrument(level = "trace", skip(self))]
    pub async fn restart(&mut self) -> ServerMessage {
        self.state = GameState::new();
        self.last_activity = Instant::now();
        let message = self.state.init_message();
        broadcast(&mut self.streams, &message).await;
        info!(
            "Game restarted and broadcasted to {} connections",
            self.streams.len()
        );
        message
    }

    #[instrument(level = "trace", skip(self, stream))]
    pub async fn add_stream(&mut self, mut stream: Stream) -> Uuid {
        let id = Uuid::new_v4();
        debug!("Adding stream {} to game", id);
        send(&mut stream, &self.state.init_message()).await;
        self.streams.insert(id, stream);
        self.last_activity = Instant::now();
        info!(
            "Stream {} added, total connections: {}",
            id,
            self.streams.len()
        );
        id
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn remove_stream(&mut self, id: &Uuid) {
        if self.streams.remove(id).is_some() {
            info!(
                "Stream {} removed, remaining connections: {}",
                id,
                self.streams.len()
            );
        } else {
            warn!("Attempted to remove non-existent stream: {}", id);
        }
        self.last_activity = Instant::now()
    }

    pub fn has_active_connections(&self) -> bool {
        !self.streams.is_empty()
    }

    pub fn should_cleanup(&self, inactive_timeout_secs: u64, active_timeout_secs: u64) -> bool {
        let now = Instant::now();

        if now.duration_since(self.created_at).as_secs() > active_timeout_secs {
            return true;
        }

        if self.has_active_connections() {
            return false;
        }

        now.duration_since(self.last_activity).as_secs() > inactive_timeout_secs
    }

    /// Applies a cell selection for whoever's turn it is and returns the
    /// `Update` broadcast for it. Rejected selections are dropped without
    /// notifying anyone.
    #[instrument(level = "trace", skip(self))]
    pub async fn select(&mut self, index: usize) -> Option<ServerMessage> {
        let applied = match self.state.on_cell_selected(index) {
            Ok(applied) => applied,
            Err(InvalidMove::OutOfRange) => {
                warn!("Invalid cell index: {}", index);
                return None;
            }
            Err(reason) => {
                debug!("Ignoring selection of cell {}: {:?}", index, reason);
                return None;
            }
        };

        self.last_activity = Instant::now();

        match applied.status {
            GameStatus::Won { winner } => info!("Game won by {}", winner),
            GameStatus::Tied => info!("Game ended in a tie"),
            GameStatus::InProgress => debug!(
                "Player {} took cell {}, {} to move",
                applied.player, index, self.state.current_player
            ),
        }

        let message = ServerMessage::Update {
            index: applied.index,
            player: applied.player,
            current_player: self.state.current_player,
            status: applied.status,
        };
        broadcast(&mut self.streams, &message).await;
        Some(message)
    }
}
