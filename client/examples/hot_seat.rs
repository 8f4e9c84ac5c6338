use std::io::{self, BufRead, Write};

use tictactoe_client::{GameEvent, GameState, GameStatus, TicTacToeGame};

/// Two people at one terminal, like the browser version.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt::init();

    let server = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:8000".to_string());
    let game = TicTacToeGame::new(&server)?;
    let mut events = game.subscribe_to_events().await;
    game.start_game().await?;

    let stdin = io::stdin();
    while let Some(event) = events.recv().await {
        match event {
            GameEvent::GameOver { status } => {
                match status {
                    GameStatus::Won { winner } => println!("The winner is: {}", winner),
                    _ => println!("It's a tie"),
                }
                break;
            }
            GameEvent::ConnectionLost => break,
            GameEvent::GameInitialized { .. } | GameEvent::BoardUpdated { .. } => {}
        }

        let Some(state) = game.get_state().await else {
            continue;
        };
        if state.is_game_over() {
            continue;
        }

        println!("\n{}\n", state.board);
        let Some(index) = prompt_cell(&stdin, &state)? else {
            break;
        };
        game.select(index).await?;
    }

    game.disconnect().await?;
    Ok(())
}

/// Asks until the player names a free cell. Occupied cells would be ignored
/// by the server without any reply, so they are caught here.
fn prompt_cell(stdin: &io::Stdin, state: &GameState) -> io::Result<Option<usize>> {
    loop {
        print!("Player {}, pick a cell (1-9): ", state.current_player);
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match line.trim().parse::<usize>() {
            Ok(n) if (1..=9).contains(&n) && state.board[n - 1].is_empty() => {
                return Ok(Some(n - 1));
            }
            Ok(n) if (1..=9).contains(&n) => println!("Cell {} is taken", n),
            _ => println!("Please enter a number between 1 and 9"),
        }
    }
}
