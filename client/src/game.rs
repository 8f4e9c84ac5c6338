use std::sync::Arc;

use tictactoe_common::{
    models::{Board, Cell, GameStatus, Player},
    protocol::{ClientMessage, ServerMessage},
};
use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{Result, TicTacToeClient, TicTacToeWebSocket};

/// Events emitted by the tic-tac-toe game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Game was initialized or restarted
    GameInitialized { current_player: Player },
    /// A player took a cell
    BoardUpdated {
        index: usize,
        player: Player,
        current_player: Player,
    },
    /// The game reached a win or a tie
    GameOver { status: GameStatus },
    /// Connection was lost
    ConnectionLost,
}

/// Local mirror of a session's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub current_player: Player,
    pub status: GameStatus,
}

impl GameState {
    pub fn new(board: Board, current_player: Player, status: GameStatus) -> Self {
        Self {
            board,
            current_player,
            status,
        }
    }

    pub fn get_cell(&self, index: usize) -> Option<Cell> {
        self.board.get(index)
    }

    /// Applies a server update. Out-of-range indices are ignored.
    pub fn apply_update(
        &mut self,
        index: usize,
        player: Player,
        current_player: Player,
        status: GameStatus,
    ) {
        if Board::is_valid_index(index) {
            self.board = self.board.with(index, player.into());
        }
        self.current_player = current_player;
        self.status = status;
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn winner(&self) -> Option<Player> {
        match self.status {
            GameStatus::Won { winner } => Some(winner),
            _ => None,
        }
    }
}

/// Connection state - all fields are required when connected
struct ConnectionState {
    websocket_sender: mpsc::UnboundedSender<ClientMessage>,
    game_id: String,
    background_task: JoinHandle<()>,
}

impl ConnectionState {
    fn send_message(&self, message: ClientMessage) -> Result<()> {
        self.websocket_sender
            .send(message)
            .map_err(|_| "WebSocket sender closed")?;
        Ok(())
    }

    /// Abort the background task and wait for it to finish
    async fn abort_and_wait_background_task(self) {
        self.background_task.abort();
        let _ = self.background_task.await;
    }
}

type EventSender = Arc<RwLock<Option<mpsc::UnboundedSender<GameEvent>>>>;
type SharedState = Arc<RwLock<Option<GameState>>>;
type SharedConnection = Arc<RwLock<Option<ConnectionState>>>;

/// High-level tic-tac-toe client that mirrors the session state locally.
///
/// This is the presentation adapter's entry point: feed cell selections in
/// through [`select`](Self::select) and render from [`get_state`](Self::get_state)
/// or from the events of [`subscribe_to_events`](Self::subscribe_to_events).
pub struct TicTacToeGame {
    client: TicTacToeClient,
    connection_state: SharedConnection,
    event_sender: EventSender,
    state: SharedState,
}

impl TicTacToeGame {
    pub fn new(server_url: &str) -> Result<Self> {
        let client = TicTacToeClient::new(server_url)?;
        Ok(Self {
            client,
            connection_state: Arc::new(RwLock::new(None)),
            event_sender: Arc::new(RwLock::new(None)),
            state: Arc::new(RwLock::new(None)),
        })
    }

    /// Subscribe to game events. Returns a receiver for game events.
    pub async fn subscribe_to_events(&self) -> mpsc::UnboundedReceiver<GameEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        *self.event_sender.write().await = Some(sender);
        receiver
    }

    /// Create a new session on the server and join it
    pub async fn start_game(&self) -> Result<()> {
        let game_id = self.client.create_game().await?;
        info!("Created game with ID: {}", game_id);

        self.join_game(game_id).await
    }

    /// Join an existing session by id, replacing any current connection
    pub async fn join_game(&self, game_id: String) -> Result<()> {
        info!("Joining game with ID: {}", game_id);

        let mut conn_state = self.connection_state.write().await;

        if let Some(existing_conn) = conn_state.take() {
            existing_conn.abort_and_wait_background_task().await;
        }
        self.state.write().await.take();

        let ws_url = self.client.websocket_url(&game_id)?;
        let websocket = TicTacToeWebSocket::connect(&ws_url).await?;
        let websocket_sender = websocket.get_sender();

        info!("Connected to game with ID: {}", game_id);

        let background_task = self.start_background_listener(websocket, game_id.clone());

        *conn_state = Some(ConnectionState {
            websocket_sender,
            game_id,
            background_task,
        });

        Ok(())
    }

    async fn send_client_message(&self, message: ClientMessage) -> Result<()> {
        let conn_state = self.connection_state.read().await;

        match *conn_state {
            Some(ref conn) => conn.send_message(message),
            None => Err("Not connected to a game. Call start_game() first.".into()),
        }
    }

    /// Select the cell at `index` (0-8, row-major) for the player to move
    pub async fn select(&self, index: usize) -> Result<()> {
        debug!("Selecting cell {}", index);
        self.send_client_message(ClientMessage::Select { index })
            .await
    }

    /// Start over with an empty board
    pub async fn restart(&self) -> Result<()> {
        info!("Restarting game");
        self.send_client_message(ClientMessage::Restart).await
    }

    /// Get the current game state
    pub async fn get_state(&self) -> Option<GameState> {
        self.state.read().await.clone()
    }

    /// Get the game ID
    pub async fn get_game_id(&self) -> Option<String> {
        let conn_state = self.connection_state.read().await;
        conn_state.as_ref().map(|conn| conn.game_id.clone())
    }

    /// Check if we're connected to a game. Turns false once the server
    /// connection drops.
    pub async fn is_connected(&self) -> bool {
        self.connection_state.read().await.is_some()
    }

    /// Close the connection and clean up
    pub async fn disconnect(&self) -> Result<()> {
        if let Some(conn) = self.connection_state.write().await.take() {
            conn.abort_and_wait_background_task().await;
        }

        *self.event_sender.write().await = None;
        *self.state.write().await = None;

        info!("Disconnected from game");
        Ok(())
    }

    fn start_background_listener(
        &self,
        mut websocket: TicTacToeWebSocket,
        game_id: String,
    ) -> JoinHandle<()> {
        let state = self.state.clone();
        let event_sender = self.event_sender.clone();
        let connection_state = self.connection_state.clone();

        tokio::spawn(async move {
            loop {
                let message = match websocket.receive_message().await {
                    Ok(Some(message)) => message,
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Error receiving WebSocket message: {}", e);
                        break;
                    }
                };

                for event in handle_server_message(&state, message).await {
                    emit(&event_sender, event).await;
                }
            }

            drop_connection(&connection_state, &game_id).await;
            emit(&event_sender, GameEvent::ConnectionLost).await;
        })
    }
}

/// Forgets the connection to `game_id` after its socket closed. A newer
/// connection to another game is left alone.
async fn drop_connection(connection_state: &SharedConnection, game_id: &str) {
    let mut conn_state = connection_state.write().await;
    if conn_state
        .as_ref()
        .is_some_and(|conn| conn.game_id == game_id)
    {
        conn_state.take();
        info!("Connection to game {} lost", game_id);
    }
}

async fn emit(event_sender: &EventSender, event: GameEvent) {
    if let Some(ref sender) = *event_sender.read().await {
        let _ = sender.send(event);
    }
}

/// Folds one server message into the local mirror and returns the events it
/// produced.
async fn handle_server_message(state: &SharedState, message: ServerMessage) -> Vec<GameEvent> {
    match message {
        ServerMessage::Init {
            board,
            current_player,
            status,
        } => {
            info!("Received game state, {} to move", current_player);
            *state.write().await = Some(GameState::new(board, current_player, status));

            let mut events = vec![GameEvent::GameInitialized { current_player }];
            if status.is_terminal() {
                events.push(GameEvent::GameOver { status });
            }
            events
        }
        ServerMessage::Update {
            index,
            player,
            current_player,
            status,
        } => {
            debug!("Received update: {} took cell {}", player, index);

            let was_over = {
                let mut state_guard = state.write().await;
                let Some(ref mut game_state) = *state_guard else {
                    warn!("Update received before initial state, ignoring");
                    return Vec::new();
                };
                let was_over = game_state.is_game_over();
                game_state.apply_update(index, player, current_player, status);
                was_over
            };

            let mut events = vec![GameEvent::BoardUpdated {
                index,
                player,
                current_player,
            }];
            if status.is_terminal() && !was_over {
                events.push(GameEvent::GameOver { status });
            }
            events
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared(state: Option<GameState>) -> SharedState {
        Arc::new(RwLock::new(state))
    }

    fn connection(game_id: &str) -> (ConnectionState, mpsc::UnboundedReceiver<ClientMessage>) {
        let (websocket_sender, receiver) = mpsc::unbounded_channel();
        let conn = ConnectionState {
            websocket_sender,
            game_id: game_id.to_string(),
            background_task: tokio::spawn(async {}),
        };
        (conn, receiver)
    }

    #[tokio::test]
    async fn lost_connection_is_forgotten() {
        let (conn, _receiver) = connection("abcde");
        let connection_state: SharedConnection = Arc::new(RwLock::new(Some(conn)));

        drop_connection(&connection_state, "abcde").await;
        assert!(connection_state.read().await.is_none());
    }

    #[tokio::test]
    async fn newer_connection_survives_old_listener() {
        let (conn, _receiver) = connection("fghij");
        let connection_state: SharedConnection = Arc::new(RwLock::new(Some(conn)));

        drop_connection(&connection_state, "abcde").await;
        let game_id = connection_state
            .read()
            .await
            .as_ref()
            .map(|conn| conn.game_id.clone());
        assert_eq!(game_id, Some("fghij".to_string()));
    }

    #[test]
    fn apply_update_places_the_mark() {
        let mut state = GameState::new(Board::new(), Player::X, GameStatus::InProgress);
        state.apply_update(4, Player::X, Player::O, GameStatus::InProgress);

        assert_eq!(state.get_cell(4), Some(Cell::X));
        assert_eq!(state.current_player, Player::O);
        assert!(!state.is_game_over());
        assert_eq!(state.winner(), None);
    }

    #[test]
    fn winner_comes_from_status() {
        let state = GameState::new(
            Board::new(),
            Player::O,
            GameStatus::Won { winner: Player::X },
        );
        assert!(state.is_game_over());
        assert_eq!(state.winner(), Some(Player::X));
    }

    #[test]
    fn init_replaces_the_mirror() {
        let state = shared(None);
        let events = tokio_test::block_on(handle_server_message(
            &state,
            ServerMessage::Init {
                board: Board::new(),
                current_player: Player::X,
                status: GameStatus::InProgress,
            },
        ));

        assert_eq!(
            events,
            vec![GameEvent::GameInitialized {
                current_player: Player::X
            }]
        );
        let mirror = tokio_test::block_on(state.read()).clone();
        assert_eq!(
            mirror,
            Some(GameState::new(Board::new(), Player::X, GameStatus::InProgress))
        );
    }

    #[test]
    fn winning_update_announces_game_over_once() {
        let state = shared(Some(GameState::new(
            Board::new(),
            Player::X,
            GameStatus::InProgress,
        )));
        let won = GameStatus::Won { winner: Player::X };

        let events = tokio_test::block_on(handle_server_message(
            &state,
            ServerMessage::Update {
                index: 2,
                player: Player::X,
                current_player: Player::O,
                status: won,
            },
        ));
        assert_eq!(
            events,
            vec![
                GameEvent::BoardUpdated {
                    index: 2,
                    player: Player::X,
                    current_player: Player::O,
                },
                GameEvent::GameOver { status: won },
            ]
        );

        let events = tokio_test::block_on(handle_server_message(
            &state,
            ServerMessage::Update {
                index: 5,
                player: Player::O,
                current_player: Player::X,
                status: won,
            },
        ));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn update_without_state_is_dropped() {
        let state = shared(None);
        let events = tokio_test::block_on(handle_server_message(
            &state,
            ServerMessage::Update {
                index: 0,
                player: Player::X,
                current_player: Player::O,
                status: GameStatus::InProgress,
            },
        ));
        assert!(events.is_empty());
        assert!(tokio_test::block_on(state.read()).is_none());
    }
}
