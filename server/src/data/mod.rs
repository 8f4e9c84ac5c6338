use tictactoe_common::models::{Board, GameStatus, Player};

use crate::logic::rules;

/// Why a selection was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidMove {
    OutOfRange,
    Occupied,
    GameOver,
}

/// An accepted move and the status it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveApplied {
    pub index: usize,
    pub player: Player,
    pub status: GameStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub current_player: Player,
    pub status: GameStatus,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_player: Player::X,
            status: GameStatus::InProgress,
        }
    }

    /// Runs one transition of the board state machine. A rejected selection
    /// leaves the state untouched.
    pub fn on_cell_selected(&mut self, index: usize) -> Result<MoveApplied, InvalidMove> {
        if !Board::is_valid_index(index) {
            return Err(InvalidMove::OutOfRange);
        }
        if self.status.is_terminal() {
            return Err(InvalidMove::GameOver);
        }
        if !self.board[index].is_empty() {
            return Err(InvalidMove::Occupied);
        }

        let player = self.current_player;
        self.board = rules::apply_move(self.board, index, player);
        self.status = rules::status(&self.board);
        self.current_player = rules::next_player(player);

        Ok(MoveApplied {
            index,
            player,
            status: self.status,
        })
    }
}
