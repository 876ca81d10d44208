use crate::model::board::{Board, BoardError};
use serde::{Deserialize, Serialize};

/// Serializable picture of a board, rows listed top first, `-1` for unknown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub cols: usize,
    pub rows: usize,
    pub playable_rows: usize,
    pub cells: Vec<Vec<i32>>,
}

impl BoardSnapshot {
    pub fn capture(board: &Board) -> Self {
        BoardSnapshot {
            cols: board.cols(),
            rows: board.rows(),
            playable_rows: board.playable_rows(),
            cells: board.to_scheme(),
        }
    }

    pub fn restore(&self) -> Result<Board, BoardError> {
        let board = Board::from_scheme(self.cells.as_slice())?;
        if board.cols() != self.cols || board.rows() != self.rows {
            return Err(BoardError::Ragged {
                row: 0,
                expected: self.cols,
                found: board.cols(),
            });
        }
        board.with_playable_rows(self.playable_rows)
    }

    pub fn to_json(board: &Board) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&Self::capture(board))
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
