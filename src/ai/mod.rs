//! Move suggestions: the hint shown to a human and the placeholder opponent.
//! Neither looks ahead; both only pick among the moves the board offers.

pub mod random;

pub use random::RandomMoveSelector;

use rand::Rng;
use rand::seq::IteratorRandom;
use serde::Serialize;

use crate::board::{Board, MoveMap};
use crate::piece::{Piece, Side};
use crate::types::Position;

/// A piece to pick up and the square to put it on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub from: Position,
    pub to: Position,
}

pub trait MoveSelector: Send {
    fn select_move(&mut self, board: &Board, side: Side) -> Option<Suggestion>;
}

/// Always plays the first destination of the first movable piece in board order.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstLegalMoveSelector;

impl MoveSelector for FirstLegalMoveSelector {
    fn select_move(&mut self, board: &Board, side: Side) -> Option<Suggestion> {
        movable_pieces(board, side)
            .into_iter()
            .next()
            .and_then(|(piece, moves)| {
                moves.keys().next().map(|&to| Suggestion {
                    from: piece.position,
                    to,
                })
            })
    }
}

/// Pieces of `side` with at least one legal move, in board order.
pub fn movable_pieces(board: &Board, side: Side) -> Vec<(Piece, MoveMap)> {
    board
        .pieces_of(side)
        .map(|piece| (piece, board.get_valid_moves(&piece)))
        .filter(|(_, moves)| !moves.is_empty())
        .collect()
}

/// First movable piece of `side` in board order with a random destination.
/// `None` only when `side` cannot move at all.
pub fn hint<R: Rng + ?Sized>(board: &Board, side: Side, rng: &mut R) -> Option<Suggestion> {
    board.pieces_of(side).find_map(|piece| {
        let moves = board.get_valid_moves(&piece);
        moves.keys().choose(rng).map(|&to| Suggestion {
            from: piece.position,
            to,
        })
    })
}
