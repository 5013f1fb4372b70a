use crate::types::{BOARD_SIZE, Position};

/// Pixel layout of the drawn board, owned by the front end and passed in
/// whenever a pointer position has to be mapped to a square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardGeometry {
    pub board_width_px: f64,
}

impl BoardGeometry {
    pub fn new(board_width_px: f64) -> Self {
        Self { board_width_px }
    }

    pub fn square_size(&self) -> f64 {
        self.board_width_px / f64::from(BOARD_SIZE)
    }

    /// Square under the pointer, or `None` when it is outside the board
    /// (for example over a side menu).
    pub fn cell_at(&self, x: f64, y: f64) -> Option<Position> {
        let size = self.square_size();
        if !size.is_finite() || size <= 0.0 || !x.is_finite() || !y.is_finite() {
            return None;
        }
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / size).floor();
        let row = (y / size).floor();
        if col >= f64::from(BOARD_SIZE) || row >= f64::from(BOARD_SIZE) {
            return None;
        }
        Position::new(row as u8, col as u8).ok()
    }
}
