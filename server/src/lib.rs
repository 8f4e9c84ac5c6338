//! Tic-tac-toe game server.
//!
//! Each game is a session holding one board state machine. Players create a
//! session with `POST /create` and then drive it over `GET /ws?id=<id>` by
//! sending cell selections; every accepted move is broadcast to all
//! connected clients.

use std::sync::Arc;

use dashmap::DashMap;
use rocket::{
    Build, Rocket,
    fairing::{Fairing, Info, Kind},
    routes,
};
use tracing::{info, warn};

pub mod cleanup;
pub mod cors;
pub mod data;
pub mod logic;
pub mod rate_limit;
pub mod routes;

use crate::{
    cleanup::start_cleanup_task,
    cors::create_cors,
    logic::Games,
    rate_limit::create_rate_limiter,
    routes::{create_game, websocket_handler},
};

pub struct CleanupFairing;

#[rocket::async_trait]
impl Fairing for CleanupFairing {
    fn info(&self) -> Info {
        Info {
            name: "Cleanup Task",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        if let Some(games) = rocket.state::<Games>() {
            info!("Starting cleanup task for game management");
            let games_for_cleanup = games.clone();
            tokio::spawn(async move {
                start_cleanup_task(games_for_cleanup).await;
            });
        } else {
            warn!("Failed to get games state for cleanup task");
        }
        Ok(rocket)
    }
}

/// Assembles the server with fresh game storage and rate limiter.
pub fn build() -> Result<Rocket<Build>, rocket_cors::Error> {
    let games: Games = Arc::new(DashMap::new());
    let rate_limiter = create_rate_limiter();

    Ok(rocket::build()
        .attach(create_cors()?)
        .attach(CleanupFairing)
        .manage(games)
        .manage(rate_limiter)
        .mount("/", routes![create_game, websocket_handler]))
}
