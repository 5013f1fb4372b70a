use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::{IteratorRandom, SliceRandom};
use web_time::{SystemTime, UNIX_EPOCH};

use super::{MoveSelector, Suggestion, movable_pieces};
use crate::board::Board;
use crate::piece::Side;

/// Placeholder opponent: a uniformly random movable piece, then a uniformly
/// random destination for it.
#[derive(Debug, Clone)]
pub struct RandomMoveSelector {
    rng: SmallRng,
}

impl RandomMoveSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Seeds from the wall clock; works in the browser where OS entropy is unavailable.
    pub fn from_clock() -> Self {
        Self::new(clock_seed())
    }
}

impl MoveSelector for RandomMoveSelector {
    fn select_move(&mut self, board: &Board, side: Side) -> Option<Suggestion> {
        let movable = movable_pieces(board, side);
        let (piece, moves) = movable.choose(&mut self.rng)?;
        let &to = moves.keys().choose(&mut self.rng)?;
        Some(Suggestion {
            from: piece.position,
            to,
        })
    }
}

pub(crate) fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}
