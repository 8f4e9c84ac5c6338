use std::{fmt, ops::Index};

use serde::{Deserialize, Serialize};

/// Number of cells on the board.
pub const BOARD_SIZE: usize = 9;

/// Side length of the board.
pub const BOARD_WIDTH: usize = 3;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    X,
    O,
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::X => write!(f, "X"),
            Player::O => write!(f, "O"),
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    #[serde(rename = "E")]
    Empty,
    X,
    O,
}

impl Cell {
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// The player holding this cell, if any.
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Player::X),
            Cell::O => Some(Player::O),
        }
    }
}

impl From<Player> for Cell {
    fn from(value: Player) -> Self {
        match value {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }
}

/// The 3x3 board, cells in row-major order (`row = index / 3`, `col = index % 3`).
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Board([Cell; BOARD_SIZE]);

impl Board {
    pub fn new() -> Self {
        Self([Cell::Empty; BOARD_SIZE])
    }

    pub fn from_cells(cells: [Cell; BOARD_SIZE]) -> Self {
        Self(cells)
    }

    pub fn cells(&self) -> &[Cell; BOARD_SIZE] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<Cell> {
        self.0.get(index).copied()
    }

    /// Returns a copy of the board with `cell` placed at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a valid board index.
    pub fn with(mut self, index: usize, cell: Cell) -> Self {
        self.0[index] = cell;
        self
    }

    pub fn is_valid_index(index: usize) -> bool {
        index < BOARD_SIZE
    }

    pub fn empty_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(index, _)| index)
    }
}

impl Index<usize> for Board {
    type Output = Cell;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.0.chunks(BOARD_WIDTH).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            let symbols: Vec<&str> = cells
                .iter()
                .map(|cell| match cell {
                    Cell::Empty => ".",
                    Cell::X => "X",
                    Cell::O => "O",
                })
                .collect();
            write!(f, "{}", symbols.join("|"))?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(tag = "state")]
pub enum GameStatus {
    #[default]
    #[serde(rename = "in_progress")]
    InProgress,
    #[serde(rename = "won")]
    Won { winner: Player },
    #[serde(rename = "tied")]
    Tied,
}

impl GameStatus {
    /// Won and Tied end the game.
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateResponse {
    pub id: String,
}
