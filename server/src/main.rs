use tracing::{error, info};

#[rocket::main]
async fn main() {
    tracing_subscriber::fmt::init();
    info!("🚀 Starting tic-tac-toe server");

    let rocket = match tictactoe_server::build() {
        Ok(rocket) => rocket,
        Err(e) => {
            error!("Invalid CORS configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("📡 Endpoints: POST /create, GET /ws");

    if let Err(e) = rocket.launch().await {
        error!("Server stopped with error: {}", e);
        std::process::exit(1);
    }
}
