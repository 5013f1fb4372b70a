use thiserror::Error;

use crate::types::Position;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("game is already over")]
    GameOver,
    #[error("row/col out of range: ({row}, {col})")]
    OutOfBounds { row: u8, col: u8 },
    #[error("side to move has no legal moves")]
    NoLegalMoves,
    #[error("selector suggested an illegal move: {from:?} -> {to:?}")]
    IllegalSuggestion { from: Position, to: Position },
}

/// Why a saved game could not be restored. The running game is never touched
/// when one of these is returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no saved game found")]
    Missing,
    #[error("saved game is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("saved board is invalid: {0}")]
    InvalidBoard(String),
    #[error("snapshot rejected: {0}")]
    BadSnapshot(String),
}
