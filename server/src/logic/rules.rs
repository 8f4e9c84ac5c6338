//! Pure board rules. Nothing here owns state or performs I/O.

use tictactoe_common::models::{Board, Cell, GameStatus, Player};

/// Every line that can win, columns first, then rows, then diagonals.
pub const LINES: [[usize; 3]; 8] = [
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Places `player` at `index` unless the cell is already taken, in which case
/// the board comes back unchanged.
///
/// # Panics
///
/// Panics if `index` is greater than 8.
pub fn apply_move(board: Board, index: usize, player: Player) -> Board {
    if !board[index].is_empty() {
        return board;
    }
    board.with(index, Cell::from(player))
}

pub fn next_player(player: Player) -> Player {
    match player {
        Player::X => Player::O,
        Player::O => Player::X,
    }
}

/// Returns the owner of the first fully occupied line in [`LINES`] order.
pub fn check_winner(board: &Board) -> Option<Player> {
    LINES.iter().find_map(|&[a, b, c]| {
        let cell = board[a];
        if cell == board[b] && cell == board[c] {
            cell.player()
        } else {
            None
        }
    })
}

pub fn is_full(board: &Board) -> bool {
    board.cells().iter().all(|cell| !cell.is_empty())
}

pub fn is_tie(board: &Board) -> bool {
    is_full(board) && check_winner(board).is_none()
}

pub fn status(board: &Board) -> GameStatus {
    match check_winner(board) {
        Some(winner) => GameStatus::Won { winner },
        None if is_full(board) => GameStatus::Tied,
        None => GameStatus::InProgress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: Cell = Cell::X;
    const O: Cell = Cell::O;
    const E: Cell = Cell::Empty;

    #[test]
    fn move_on_occupied_cell_is_noop() {
        let board = Board::from_cells([X, O, E, E, X, E, E, E, O]);
        for index in [0, 1, 4, 8] {
            assert_eq!(apply_move(board, index, Player::X), board);
            assert_eq!(apply_move(board, index, Player::O), board);
        }
    }

    #[test]
    fn move_on_empty_cell_sets_only_that_cell() {
        let board = Board::from_cells([X, O, E, E, X, E, E, E, O]);
        for index in board.empty_indices().collect::<Vec<_>>() {
            let next = apply_move(board, index, Player::O);
            assert_eq!(next[index], O);
            for other in (0..9).filter(|&i| i != index) {
                assert_eq!(next[other], board[other]);
            }
        }
    }

    #[test]
    #[should_panic]
    fn move_out_of_range_panics() {
        apply_move(Board::new(), 9, Player::X);
    }

    #[test]
    fn next_player_is_an_involution() {
        for player in [Player::X, Player::O] {
            assert_ne!(next_player(player), player);
            assert_eq!(next_player(next_player(player)), player);
        }
    }

    #[test]
    fn top_row_win() {
        let board = [0, 1, 2]
            .into_iter()
            .fold(Board::new(), |board, i| apply_move(board, i, Player::X));
        assert_eq!(check_winner(&board), Some(Player::X));
        assert_eq!(status(&board), GameStatus::Won { winner: Player::X });
    }

    #[test]
    fn every_line_wins() {
        for line in LINES {
            let board = line
                .into_iter()
                .fold(Board::new(), |board, i| apply_move(board, i, Player::O));
            assert_eq!(check_winner(&board), Some(Player::O), "line {line:?}");
        }
    }

    #[test]
    fn diagonal_win() {
        let board = Board::from_cells([X, E, E, E, X, E, E, E, X]);
        assert_eq!(check_winner(&board), Some(Player::X));
        assert!(!is_full(&board));
        assert!(!is_tie(&board));
    }

    #[test]
    fn full_board_without_winner_is_tie() {
        let board = Board::from_cells([X, O, X, X, O, O, O, X, X]);
        assert_eq!(check_winner(&board), None);
        assert!(is_full(&board));
        assert!(is_tie(&board));
        assert_eq!(status(&board), GameStatus::Tied);
    }

    #[test]
    fn full_board_with_winner_is_not_tie() {
        let board = Board::from_cells([X, X, X, O, O, X, X, O, O]);
        assert!(is_full(&board));
        assert!(!is_tie(&board));
        assert_eq!(status(&board), GameStatus::Won { winner: Player::X });
    }

    #[test]
    fn double_line_win() {
        let board = Board::from_cells([X, X, X, O, X, O, O, O, X]);
        assert_eq!(check_winner(&board), Some(Player::X));
    }

    #[test]
    fn lines_are_columns_then_rows_then_diagonals() {
        for (i, line) in LINES[..3].iter().enumerate() {
            assert_eq!(*line, [i, i + 3, i + 6]);
        }
        for (i, line) in LINES[3..6].iter().enumerate() {
            assert_eq!(*line, [3 * i, 3 * i + 1, 3 * i + 2]);
        }
        assert_eq!(LINES[6..], [[0, 4, 8], [2, 4, 6]]);
    }

    #[test]
    fn empty_line_never_wins() {
        let board = Board::new();
        assert_eq!(check_winner(&board), None);
        assert_eq!(status(&board), GameStatus::InProgress);
    }

    #[test]
    fn check_winner_is_idempotent() {
        let board = Board::from_cells([O, X, E, X, O, E, X, E, O]);
        let before = board;
        assert_eq!(check_winner(&board), check_winner(&board));
        assert_eq!(board, before);
    }
}
