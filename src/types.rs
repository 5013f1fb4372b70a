use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::piece::Side;

pub const BOARD_SIZE: u8 = 8;

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub fn new(row: u8, col: u8) -> Result<Self, GameError> {
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return Err(GameError::OutOfBounds { row, col });
        }
        Ok(Self { row, col })
    }

    /// Squares pieces may stand on: `row + col` odd.
    pub fn is_dark(self) -> bool {
        (self.row + self.col) % 2 == 1
    }

    /// The neighbouring square `(dr, dc)` away, if it is still on the board.
    pub fn offset(self, dr: i8, dc: i8) -> Option<Position> {
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        let range = 0..BOARD_SIZE as i8;
        if range.contains(&row) && range.contains(&col) {
            Some(Position {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.row as usize * BOARD_SIZE as usize + self.col as usize
    }
}

/// Occupant of one square as seen by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PieceView {
    pub side: Side,
    pub king: bool,
}

/// Public game state returned from WASM APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameView {
    /// Row-major, 64 cells.
    pub board: Vec<Option<PieceView>>,
    pub current_player: Side,
    pub black_count: u8,
    pub white_count: u8,
    pub is_game_over: bool,
    pub winner: Option<Side>,
    pub black_elapsed_ms: u64,
    pub white_elapsed_ms: u64,
    /// Sum of both clocks, shown as the length of the game so far.
    pub total_elapsed_ms: u64,
    pub single_player: bool,
    pub hint_mode: bool,
    /// Contract:
    /// - `Some` while a piece of `current_player` awaits a destination.
    /// - `destinations` is empty whenever this is `None`.
    pub selected: Option<Position>,
    pub destinations: Vec<Position>,
}
