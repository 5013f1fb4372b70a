use serde::{Deserialize, Serialize};

use crate::types::Position;

/// One of the two players. `Black` starts at the bottom (rows 5..=7) and moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Black,
    White,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Black, Side::White];

    pub fn opponent(self) -> Side {
        match self {
            Side::Black => Side::White,
            Side::White => Side::Black,
        }
    }

    /// Row delta of a forward step for a man of this side.
    pub fn forward(self) -> i8 {
        match self {
            Side::Black => -1,
            Side::White => 1,
        }
    }

    /// Row on which a man of this side is crowned.
    pub fn crowning_row(self) -> u8 {
        match self {
            Side::Black => 0,
            Side::White => 7,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Side::Black => 0,
            Side::White => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Man,
    King,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub position: Position,
    pub side: Side,
    pub rank: Rank,
}

impl Piece {
    pub fn man(position: Position, side: Side) -> Self {
        Self {
            position,
            side,
            rank: Rank::Man,
        }
    }

    pub fn king(position: Position, side: Side) -> Self {
        Self {
            position,
            side,
            rank: Rank::King,
        }
    }

    pub fn is_king(&self) -> bool {
        self.rank == Rank::King
    }

    /// Row deltas this piece may move along.
    pub fn row_steps(&self) -> &'static [i8] {
        match (self.rank, self.side) {
            (Rank::King, _) => &[-1, 1],
            (Rank::Man, Side::Black) => &[-1],
            (Rank::Man, Side::White) => &[1],
        }
    }

    pub(crate) fn crown(&mut self) {
        self.rank = Rank::King;
    }
}
