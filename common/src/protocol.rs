use serde::{Deserialize, Serialize};

use crate::models::{Board, GameStatus, Player};

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "action")]
pub enum ClientMessage {
    #[serde(rename = "select")]
    Select { index: usize },
    #[serde(rename = "restart")]
    Restart,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "init")]
    Init {
        board: Board,
        current_player: Player,
        status: GameStatus,
    },
    #[serde(rename = "update")]
    Update {
        index: usize,
        player: Player,
        current_player: Player,
        status: GameStatus,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_message_from_json() {
        let message: ClientMessage =
            serde_json::from_str(r#"{"action":"select","index":4}"#).unwrap();
        assert_eq!(message, ClientMessage::Select { index: 4 });
    }

    #[test]
    fn restart_message_from_json() {
        let message: ClientMessage = serde_json::from_str(r#"{"action":"restart"}"#).unwrap();
        assert_eq!(message, ClientMessage::Restart);
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"action":"undo"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>(r#"{"action":"select"}"#).is_err());
    }

    #[test]
    fn update_message_to_json() {
        let message = ServerMessage::Update {
            index: 2,
            player: Player::X,
            current_player: Player::O,
            status: GameStatus::Won { winner: Player::X },
        };
        assert_eq!(
            serde_json::to_string(&message).unwrap(),
            r#"{"type":"update","index":2,"player":"X","current_player":"O","status":{"state":"won","winner":"X"}}"#
        );
    }

    #[test]
    fn init_message_to_json() {
        let message = ServerMessage::Init {
            board: Board::new(),
            current_player: Player::X,
            status: GameStatus::InProgress,
        };
        assert_eq!(
            serde_json::to_string(&message).unwrap(),
            r#"{"type":"init","board":["E","E","E","E","E","E","E","E","E"],"current_player":"X","status":{"state":"in_progress"}}"#
        );
    }
}
