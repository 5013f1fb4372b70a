use wasm_bindgen::prelude::*;

pub mod ai;
pub mod api;
pub mod board;
pub mod error;
pub mod game;
pub mod input;
pub mod persist;
pub mod piece;
pub mod types;

pub use board::{Board, Captures, MoveMap};
pub use error::{GameError, LoadError};
pub use game::{ClickOutcome, Game, GameOptions, Selection};
pub use piece::{Piece, Rank, Side};
pub use types::Position;

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}
