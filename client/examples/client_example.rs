use tictactoe_client::{ClientMessage, ServerMessage, TicTacToeClient, TicTacToeWebSocket};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt::init();

    let client = TicTacToeClient::new("http://localhost:8000")?;

    let game_id = client.create_game().await?;
    println!("Created game with ID: {}", game_id);

    let ws_url = client.websocket_url(&game_id)?;
    println!("Connecting to WebSocket: {}", ws_url);

    let mut ws = TicTacToeWebSocket::connect(&ws_url).await?;

    if let Some(ServerMessage::Init {
        board,
        current_player,
        status,
    }) = ws.receive_message().await?
    {
        println!("Initial board, {} to move ({:?}):", current_player, status);
        println!("{}", board);
    }

    // X takes the top row while O answers in the middle row.
    for index in [0, 3, 1, 4, 2] {
        ws.send_message(ClientMessage::Select { index }).await?;
        println!("Sent selection for cell {}", index);

        match ws.receive_message().await? {
            Some(ServerMessage::Update {
                index,
                player,
                current_player,
                status,
            }) => {
                println!(
                    "  {} took cell {}, next: {}, status: {:?}",
                    player, index, current_player, status
                );
            }
            Some(message) => println!("Received unexpected message: {:?}", message),
            None => break,
        }
    }

    // Occupied cell: the server ignores it and sends nothing back.
    ws.send_message(ClientMessage::Select { index: 0 }).await?;

    ws.send_message(ClientMessage::Restart).await?;
    if let Some(message) = ws.receive_message().await? {
        println!("After restart: {:?}", message);
    }

    ws.close().await?;
    println!("Connection closed");

    Ok(())
}
