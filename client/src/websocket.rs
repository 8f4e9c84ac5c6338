use futures_util::{SinkExt, Stream, StreamExt, stream::SplitSink};
use tictactoe_common::protocol::{ClientMessage, ServerMessage};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, Message},
};
use tracing::{debug, info, warn};

use crate::Result;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, Message>;
type WsReader = futures_util::stream::SplitStream<WsStream>;

/// WebSocket connection to one game session.
///
/// Outgoing selections go through an unbounded channel drained by a writer
/// task, so any number of handles from [`get_sender`](Self::get_sender) can
/// submit moves while this value is busy reading.
pub struct TicTacToeWebSocket {
    sender: mpsc::UnboundedSender<ClientMessage>,
    reader: WsReader,
    writer_task: JoinHandle<()>,
}

async fn run_writer(mut writer: WsWriter, mut receiver: mpsc::UnboundedReceiver<ClientMessage>) {
    while let Some(message) = receiver.recv().await {
        let json = match serde_json::to_string(&message) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize message: {}", e);
                continue;
            }
        };

        debug!("Sending message: {}", json);
        if let Err(e) = writer.send(Message::Text(json.into())).await {
            warn!("Failed to send WebSocket message: {}", e);
            break;
        }
    }

    let _ = writer.close().await;
}

/// Reads frames until the next server message. `None` means the server
/// closed the connection.
async fn next_server_message<S>(reader: &mut S) -> Result<Option<ServerMessage>>
where
    S: Stream<Item = std::result::Result<Message, tungstenite::Error>> + Unpin,
{
    while let Some(frame) = reader.next().await {
        match frame? {
            Message::Text(text) => {
                debug!("Received message: {}", text);
                return Ok(Some(serde_json::from_str(&text)?));
            }
            Message::Close(_) => {
                info!("WebSocket connection closed");
                return Ok(None);
            }
            _ => {}
        }
    }
    Ok(None)
}

impl TicTacToeWebSocket {
    /// Connect to a game session via WebSocket
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to WebSocket: {}", url);

        let (ws_stream, _) = connect_async(url).await?;
        info!("WebSocket connected successfully");

        let (writer, reader) = ws_stream.split();
        let (sender, receiver) = mpsc::unbounded_channel::<ClientMessage>();
        let writer_task = tokio::spawn(run_writer(writer, receiver));

        Ok(Self {
            sender,
            reader,
            writer_task,
        })
    }

    /// Get a cloneable sender for sending messages
    pub fn get_sender(&self) -> mpsc::UnboundedSender<ClientMessage> {
        self.sender.clone()
    }

    pub async fn send_message(&self, message: ClientMessage) -> Result<()> {
        self.sender
            .send(message)
            .map_err(|_| "WebSocket sender channel closed")?;
        Ok(())
    }

    /// Receive the next server message, skipping ping/pong and binary frames.
    /// Returns None if the connection is closed.
    pub async fn receive_message(&mut self) -> Result<Option<ServerMessage>> {
        next_server_message(&mut self.reader).await
    }

    /// Close the WebSocket connection once queued messages are flushed
    pub async fn close(self) -> Result<()> {
        drop(self.sender);
        let _ = self.writer_task.await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use futures_util::stream;
    use tictactoe_common::models::{Board, GameStatus, Player};

    use super::*;

    fn frames(
        items: Vec<std::result::Result<Message, tungstenite::Error>>,
    ) -> impl Stream<Item = std::result::Result<Message, tungstenite::Error>> + Unpin {
        stream::iter(items)
    }

    #[tokio::test]
    async fn skips_control_frames() {
        let init = r#"{"type":"init","board":["E","E","E","E","E","E","E","E","E"],"current_player":"X","status":{"state":"in_progress"}}"#;
        let mut reader = frames(vec![
            Ok(Message::Ping(Vec::<u8>::new().into())),
            Ok(Message::Text(init.to_string().into())),
        ]);

        let message = next_server_message(&mut reader).await.unwrap();
        assert_eq!(
            message,
            Some(ServerMessage::Init {
                board: Board::new(),
                current_player: Player::X,
                status: GameStatus::InProgress,
            })
        );
    }

    #[tokio::test]
    async fn close_frame_ends_the_stream() {
        let mut reader = frames(vec![Ok(Message::Close(None))]);
        assert_eq!(next_server_message(&mut reader).await.unwrap(), None);

        let mut reader = frames(Vec::new());
        assert_eq!(next_server_message(&mut reader).await.unwrap(), None);
    }

    #[tokio::test]
    async fn malformed_text_is_an_error() {
        let mut reader = frames(vec![Ok(Message::Text("{}".to_string().into()))]);
        assert!(next_server_message(&mut reader).await.is_err());
    }
}
