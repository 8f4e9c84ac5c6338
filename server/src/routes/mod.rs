use std::sync::Arc;

use dashmap::Entry;
use nanoid::nanoid;
use rocket::{State, futures::StreamExt, get, http::Status, post, serde::json::Json};
use rocket_ws::{Channel, Message, WebSocket};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use tictactoe_common::{
    models::CreateResponse,
    protocol::{ClientMessage, ServerMessage},
};

use crate::{
    logic::{Game, Games},
    rate_limit::{ClientIp, RateLimiter, check_rate_limit},
};

const MIN_ID_LENGTH: usize = 5;
const ATTEMPTS_PER_LENGTH: usize = 10;

/// Stores `game` under a fresh nanoid. Ids start at five characters and grow
/// by one whenever a length keeps colliding.
#[instrument(level = "trace", skip(games, game))]
fn register_game(games: &Games, game: Game) -> String {
    let mut length = MIN_ID_LENGTH;
    loop {
        let vacant = (0..ATTEMPTS_PER_LENGTH).find_map(|_| match games.entry(nanoid!(length)) {
            Entry::Vacant(entry) => Some(entry),
            Entry::Occupied(entry) => {
                debug!("Game ID collision on {}, retrying", entry.key());
                None
            }
        });

        if let Some(entry) = vacant {
            let id = entry.key().clone();
            entry.insert(Arc::new(Mutex::new(game)));
            info!("Created new game with ID: {}", id);
            return id;
        }

        warn!("Game IDs of length {} keep colliding, growing", length);
        length += 1;
    }
}

#[post("/create")]
#[instrument(level = "trace", skip(games, rate_limiter), fields(client_ip = %client_ip.0))]
pub fn create_game(
    games: &State<Games>,
    rate_limiter: &State<RateLimiter>,
    client_ip: ClientIp,
) -> Result<Json<CreateResponse>, Status> {
    check_rate_limit(rate_limiter, &client_ip)?;

    let id = register_game(games, Game::new());
    info!("Game {} created for {}", id, client_ip.0);
    Ok(Json(CreateResponse { id }))
}

/// Handles one text frame from a player. Returns what the session broadcast,
/// or `None` when the frame was malformed or the selection was rejected.
pub async fn handle_text(game: &Mutex<Game>, text: &str) -> Option<ServerMessage> {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            warn!("Ignoring malformed message {:?}: {}", text, e);
            return None;
        }
    };

    let mut game = game.lock().await;
    match message {
        ClientMessage::Select { index } => game.select(index).await,
        ClientMessage::Restart => Some(game.restart().await),
    }
}

#[get("/ws?<id>")]
#[instrument(level = "trace", skip(ws, games), fields(game_id = %id))]
pub fn websocket_handler(
    ws: WebSocket,
    games: &State<Games>,
    id: String,
) -> Result<Channel<'static>, Status> {
    let Some(game) = games.get(&id).map(|entry| entry.value().clone()) else {
        warn!("No game {} for WebSocket connection", id);
        return Err(Status::NotFound);
    };

    Ok(ws.channel(move |stream| {
        Box::pin(async move {
            let (write, mut read) = stream.split();
            let stream_id = game.lock().await.add_stream(write).await;
            info!("Player joined game {} on stream {}", id, stream_id);

            while let Some(frame) = read.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        handle_text(&game, &text).await;
                    }
                    Ok(Message::Ping(_) | Message::Pong(_)) => continue,
                    Ok(Message::Close(_)) => break,
                    Ok(other) => {
                        debug!(
                            "Closing stream {} after unexpected frame: {:?}",
                            stream_id, other
                        );
                        break;
                    }
                    Err(e) => {
                        error!("WebSocket error on stream {}: {}", stream_id, e);
                        break;
                    }
                }
            }

            game.lock().await.remove_stream(&stream_id).await;
            info!("Player left game {} (stream {})", id, stream_id);
            Ok(())
        })
    }))
}
