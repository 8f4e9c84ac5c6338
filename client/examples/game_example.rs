use rand::seq::IndexedRandom;
use tictactoe_client::{GameEvent, GameStatus, TicTacToeGame};

/// Two random players sharing one session.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt::init();

    let game = TicTacToeGame::new("http://localhost:8000")?;
    let mut events = game.subscribe_to_events().await;

    game.start_game().await?;
    if let Some(id) = game.get_game_id().await {
        println!("Game started! Game ID: {}", id);
    }

    while let Some(event) = events.recv().await {
        match event {
            GameEvent::GameInitialized { current_player } => {
                println!("🎮 New game, {} moves first", current_player);
            }
            GameEvent::BoardUpdated { index, player, .. } => {
                println!("📋 {} took cell {}", player, index);
            }
            GameEvent::GameOver { status } => {
                if let Some(state) = game.get_state().await {
                    println!("{}", state.board);
                }
                match status {
                    GameStatus::Won { winner } => println!("🎉 The winner is: {}", winner),
                    GameStatus::Tied => println!("🤝 It's a tie"),
                    GameStatus::InProgress => {}
                }
                break;
            }
            GameEvent::ConnectionLost => {
                println!("🔌 Connection lost!");
                break;
            }
        }

        let Some(state) = game.get_state().await else {
            continue;
        };
        if state.is_game_over() {
            continue;
        }

        let free: Vec<usize> = state.board.empty_indices().collect();
        let choice = free.choose(&mut rand::rng()).copied();
        if let Some(index) = choice {
            game.select(index).await?;
        }
    }

    game.disconnect().await?;
    println!("Disconnected from game");

    Ok(())
}
