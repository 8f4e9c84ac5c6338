//! Tic-Tac-Toe Client Library
//!
//! This library provides a Rust client for the tic-tac-toe game server,
//! supporting both HTTP API calls and WebSocket connections for real-time play.
//! It is the presentation side of a game: it forwards cell selections to the
//! server and reports every state change back to whoever renders the board.
//!
//! ## Usage
//!
//! ### High-Level Interface (Recommended)
//!
//! ```rust,no_run
//! use tictactoe_client::{GameEvent, TicTacToeGame};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let game = TicTacToeGame::new("http://localhost:8000")?;
//!     let mut events = game.subscribe_to_events().await;
//!
//!     game.start_game().await?;
//!     game.select(4).await?;
//!
//!     while let Some(event) = events.recv().await {
//!         if let GameEvent::BoardUpdated { .. } = event {
//!             break;
//!         }
//!     }
//!
//!     if let Some(state) = game.get_state().await {
//!         println!("{}", state.board);
//!     }
//!
//!     game.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! ### Low-Level Interface
//!
//! ```rust,no_run
//! use tictactoe_client::{ClientMessage, TicTacToeClient, TicTacToeWebSocket};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let client = TicTacToeClient::new("http://localhost:8000")?;
//!     let game_id = client.create_game().await?;
//!
//!     let ws_url = client.websocket_url(&game_id)?;
//!     let mut ws = TicTacToeWebSocket::connect(&ws_url).await?;
//!
//!     if let Some(message) = ws.receive_message().await? {
//!         println!("Received: {:?}", message);
//!     }
//!
//!     ws.send_message(ClientMessage::Select { index: 0 }).await?;
//!
//!     ws.close().await?;
//!     Ok(())
//! }
//! ```

mod client;
mod game;
mod websocket;

pub use client::TicTacToeClient;
pub use game::{GameEvent, GameState, TicTacToeGame};
pub use websocket::TicTacToeWebSocket;

pub use tictactoe_common::{models::*, protocol::*};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
