use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::piece::{Piece, Side};
use crate::types::{BOARD_SIZE, PieceView, Position};

const NUM_SQUARES: usize = BOARD_SIZE as usize * BOARD_SIZE as usize;
const STARTING_ROWS: u8 = 3;
const COLUMN_STEPS: [i8; 2] = [-1, 1];

/// Pieces a move would capture, in jump order.
pub type Captures = Vec<Piece>;

/// Every destination reachable by one piece, with the pieces captured on the way.
pub type MoveMap = BTreeMap<Position, Captures>;

/// Checkers board: an 8x8 grid owning every piece in play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    grid: [[Option<Piece>; BOARD_SIZE as usize]; BOARD_SIZE as usize],
}

impl Board {
    /// Creates the initial board:
    /// white men on the dark squares of rows 0..=2, black men on rows 5..=7.
    pub fn new() -> Self {
        let mut board = Self::empty();
        for pos in all_positions().filter(|pos| pos.is_dark()) {
            if pos.row < STARTING_ROWS {
                board.place(Piece::man(pos, Side::White));
            } else if pos.row >= BOARD_SIZE - STARTING_ROWS {
                board.place(Piece::man(pos, Side::Black));
            }
        }
        board
    }

    pub fn empty() -> Self {
        Self {
            grid: [[None; BOARD_SIZE as usize]; BOARD_SIZE as usize],
        }
    }

    /// Puts `piece` on the square named by its own position, replacing any occupant.
    pub fn place(&mut self, piece: Piece) {
        *self.cell_mut(piece.position) = Some(piece);
    }

    pub fn get_piece(&self, pos: Position) -> Option<Piece> {
        self.grid[pos.row as usize][pos.col as usize]
    }

    /// All pieces in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.grid.iter().flatten().flatten().copied()
    }

    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = Piece> + '_ {
        self.pieces().filter(move |piece| piece.side == side)
    }

    /// Returns `(black_count, white_count)`.
    pub fn count(&self) -> (u8, u8) {
        self.pieces().fold((0, 0), |(black, white), piece| match piece.side {
            Side::Black => (black + 1, white),
            Side::White => (black, white + 1),
        })
    }

    pub fn count_side(&self, side: Side) -> u8 {
        match side {
            Side::Black => self.count().0,
            Side::White => self.count().1,
        }
    }

    /// Legal destinations of `piece`, each with the pieces it captures.
    ///
    /// Simple steps and captures are returned side by side; taking a capture is
    /// not forced. Captures chain: after every jump the search continues from the
    /// landing square, left and right along the same row direction, so one entry
    /// may remove several pieces. Men only ever move forward, kings may start in
    /// either row direction.
    pub fn get_valid_moves(&self, piece: &Piece) -> MoveMap {
        let mut moves = MoveMap::new();

        for &dr in piece.row_steps() {
            for dc in COLUMN_STEPS {
                if let Some(step) = piece.position.offset(dr, dc)
                    && self.get_piece(step).is_none()
                {
                    moves.insert(step, Captures::new());
                }
            }
            self.collect_jumps(piece, piece.position, dr, &[], &mut moves);
        }

        moves
    }

    /// Whether any piece of `side` has at least one legal move.
    pub fn has_moves(&self, side: Side) -> bool {
        self.pieces_of(side)
            .any(|piece| !self.get_valid_moves(&piece).is_empty())
    }

    /// Relocates the piece on `from` to `to`, crowning it on its far row.
    /// No legality check happens here; callers validate against
    /// [`Board::get_valid_moves`] first. Returns the piece as it now stands.
    pub fn move_piece(&mut self, from: Position, to: Position) -> Option<Piece> {
        let mut piece = self.cell_mut(from).take()?;
        piece.position = to;
        if to.row == piece.side.crowning_row() {
            piece.crown();
        }
        *self.cell_mut(to) = Some(piece);
        Some(piece)
    }

    pub fn remove(&mut self, pieces: &[Piece]) {
        for piece in pieces {
            *self.cell_mut(piece.position) = None;
        }
    }

    /// Converts board to 64 row-major cells for the presentation layer.
    pub fn to_array(&self) -> Vec<Option<PieceView>> {
        let mut cells = vec![None; NUM_SQUARES];
        for piece in self.pieces() {
            cells[piece.position.index()] = Some(PieceView {
                side: piece.side,
                king: piece.is_king(),
            });
        }
        cells
    }

    /// Depth-first jump search from `from` along row direction `dr`.
    /// `captured` is this branch's own chain so far; each jump extends a fresh
    /// copy of it. Every jump advances two rows, so the search ends at the edge.
    fn collect_jumps(
        &self,
        piece: &Piece,
        from: Position,
        dr: i8,
        captured: &[Piece],
        moves: &mut MoveMap,
    ) {
        for dc in COLUMN_STEPS {
            let Some(over) = from.offset(dr, dc) else {
                continue;
            };
            let Some(victim) = self.get_piece(over) else {
                continue;
            };
            if victim.side == piece.side || captured.iter().any(|c| c.position == over) {
                continue;
            }
            let Some(landing) = over.offset(dr, dc) else {
                continue;
            };
            if self.get_piece(landing).is_some() {
                continue;
            }

            let mut chain = captured.to_vec();
            chain.push(victim);
            self.collect_jumps(piece, landing, dr, &chain, moves);
            insert_longest(moves, landing, chain);
        }
    }

    fn cell_mut(&mut self, pos: Position) -> &mut Option<Piece> {
        &mut self.grid[pos.row as usize][pos.col as usize]
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_longest(moves: &mut MoveMap, landing: Position, chain: Captures) {
    match moves.entry(landing) {
        Entry::Vacant(entry) => {
            entry.insert(chain);
        }
        Entry::Occupied(mut entry) => {
            if chain.len() > entry.get().len() {
                entry.insert(chain);
            }
        }
    }
}

pub(crate) fn all_positions() -> impl Iterator<Item = Position> {
    (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Position { row, col }))
}
