//! Save files.
//!
//! The document is JSON:
//! `{"board": 8x8 of null | {row, col, side, king}, "turn", "single_player", "hint_mode"}`.
//! Timers and the game-over flag are not saved; a restored game starts its
//! clocks at zero and re-runs win detection.
//!
//! For storage that may corrupt bytes, the same JSON can be wrapped in a
//! snapshot: a 16-byte header (`CKRS`, version, payload length, CRC32, all
//! little-endian u32 after the magic) followed by the payload.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::ai::{MoveSelector, RandomMoveSelector};
use crate::board::Board;
use crate::error::LoadError;
use crate::game::{Game, GameOptions};
use crate::piece::{Piece, Rank, Side};
use crate::types::{BOARD_SIZE, Position};

const MAGIC: &[u8; 4] = b"CKRS";
const VERSION: u32 = 1;
const HEADER_SIZE: usize = 16;
const MAX_PIECES_PER_SIDE: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPiece {
    pub row: u8,
    pub col: u8,
    pub side: Side,
    pub king: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    pub board: Vec<Vec<Option<SavedPiece>>>,
    pub turn: Side,
    pub single_player: bool,
    pub hint_mode: bool,
}

impl SavedGame {
    pub fn capture(game: &Game) -> Self {
        let board = game.board();
        let rows = (0..BOARD_SIZE)
            .map(|row| {
                (0..BOARD_SIZE)
                    .map(|col| {
                        board.get_piece(Position { row, col }).map(|piece| SavedPiece {
                            row,
                            col,
                            side: piece.side,
                            king: piece.is_king(),
                        })
                    })
                    .collect()
            })
            .collect();
        let options = game.options();

        Self {
            board: rows,
            turn: game.turn(),
            single_player: options.single_player,
            hint_mode: options.hint_mode,
        }
    }

    /// Rebuilds the board, rejecting anything a real game could not produce.
    pub fn to_board(&self) -> Result<Board, LoadError> {
        if self.board.len() != BOARD_SIZE as usize {
            return Err(LoadError::InvalidBoard(format!(
                "expected {BOARD_SIZE} rows, got {}",
                self.board.len()
            )));
        }

        let mut board = Board::empty();
        let mut counts = [0u8; 2];
        for (row_idx, row) in self.board.iter().enumerate() {
            if row.len() != BOARD_SIZE as usize {
                return Err(LoadError::InvalidBoard(format!(
                    "row {row_idx}: expected {BOARD_SIZE} cells, got {}",
                    row.len()
                )));
            }

            for (col_idx, saved) in row.iter().enumerate() {
                let Some(saved) = saved else {
                    continue;
                };
                if (saved.row as usize, saved.col as usize) != (row_idx, col_idx) {
                    return Err(LoadError::InvalidBoard(format!(
                        "piece in cell ({row_idx}, {col_idx}) claims ({}, {})",
                        saved.row, saved.col
                    )));
                }

                let position = Position {
                    row: saved.row,
                    col: saved.col,
                };
                if !position.is_dark() {
                    return Err(LoadError::InvalidBoard(format!(
                        "piece on light square ({row_idx}, {col_idx})"
                    )));
                }

                let count = &mut counts[saved.side.index()];
                *count += 1;
                if *count > MAX_PIECES_PER_SIDE {
                    return Err(LoadError::InvalidBoard(format!(
                        "more than {MAX_PIECES_PER_SIDE} {:?} pieces",
                        saved.side
                    )));
                }

                board.place(Piece {
                    position,
                    side: saved.side,
                    rank: if saved.king { Rank::King } else { Rank::Man },
                });
            }
        }

        Ok(board)
    }

    pub fn restore(&self) -> Result<Game, LoadError> {
        self.restore_with(Box::new(RandomMoveSelector::from_clock()))
    }

    pub fn restore_with(&self, opponent: Box<dyn MoveSelector>) -> Result<Game, LoadError> {
        let board = self.to_board()?;
        let options = GameOptions {
            single_player: self.single_player,
            hint_mode: self.hint_mode,
        };
        Ok(Game::from_position(board, self.turn, options, opponent))
    }
}

pub fn to_json(game: &Game) -> Result<String, serde_json::Error> {
    serde_json::to_string(&SavedGame::capture(game))
}

/// Parses and validates a save. `None` means nothing was ever saved.
pub fn parse_json(data: Option<&str>) -> Result<SavedGame, LoadError> {
    let data = data.ok_or(LoadError::Missing)?;
    let saved: SavedGame = serde_json::from_str(data)?;
    saved.to_board()?;
    Ok(saved)
}

pub fn from_json(data: Option<&str>) -> Result<Game, LoadError> {
    parse_json(data)
        .and_then(|saved| saved.restore())
        .inspect_err(|err| warn!("load rejected: {err}"))
}

pub fn encode_snapshot(game: &Game) -> Result<Vec<u8>, serde_json::Error> {
    let payload = serde_json::to_vec(&SavedGame::capture(game))?;
    let crc = crc32fast::hash(&payload);

    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&crc.to_le_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Checks the snapshot header and checksum, then parses the payload.
pub fn parse_snapshot(data: Option<&[u8]>) -> Result<SavedGame, LoadError> {
    let data = data.ok_or(LoadError::Missing)?;
    if data.len() < HEADER_SIZE {
        return Err(LoadError::BadSnapshot(format!(
            "snapshot too short: expected at least {HEADER_SIZE} bytes, got {}",
            data.len()
        )));
    }

    if &data[0..4] != MAGIC {
        return Err(LoadError::BadSnapshot(
            "invalid snapshot magic (expected CKRS)".to_string(),
        ));
    }

    let version = read_u32_le(data, 4)?;
    if version != VERSION {
        return Err(LoadError::BadSnapshot(format!(
            "unsupported snapshot version: expected {VERSION}, got {version}"
        )));
    }

    let payload_len = read_u32_le(data, 8)? as usize;
    let expected_crc = read_u32_le(data, 12)?;
    let payload = &data[HEADER_SIZE..];
    if payload.len() != payload_len {
        return Err(LoadError::BadSnapshot(format!(
            "payload length mismatch: header says {payload_len}, got {}",
            payload.len()
        )));
    }

    let actual_crc = crc32fast::hash(payload);
    if actual_crc != expected_crc {
        return Err(LoadError::BadSnapshot(format!(
            "CRC32 mismatch: expected {expected_crc:#010x}, got {actual_crc:#010x}"
        )));
    }

    let saved: SavedGame = serde_json::from_slice(payload)?;
    saved.to_board()?;
    Ok(saved)
}

pub fn decode_snapshot(data: Option<&[u8]>) -> Result<Game, LoadError> {
    parse_snapshot(data)
        .and_then(|saved| saved.restore())
        .inspect_err(|err| warn!("snapshot rejected: {err}"))
}

fn read_u32_le(data: &[u8], offset: usize) -> Result<u32, LoadError> {
    if offset + 4 > data.len() {
        return Err(LoadError::BadSnapshot(
            "unexpected EOF while reading u32".to_string(),
        ));
    }
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    Ok(u32::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::FirstLegalMoveSelector;
    use crate::board::tests::pos;

    fn played_game() -> Game {
        let mut game = Game::with_selector(
            GameOptions {
                single_player: true,
                hint_mode: true,
            },
            Box::new(FirstLegalMoveSelector),
        );
        for _ in 0..6 {
            game.auto_move().unwrap();
        }
        game
    }

    #[test]
    fn json_round_trip_reproduces_board_turn_and_flags() {
        let game = played_game();

        let json = to_json(&game).unwrap();
        let restored = parse_json(Some(json.as_str()))
            .unwrap()
            .restore_with(Box::new(FirstLegalMoveSelector))
            .unwrap();

        assert_eq!(restored.board(), game.board());
        assert_eq!(restored.turn(), game.turn());
        assert_eq!(restored.options(), game.options());
    }

    #[test]
    fn round_trip_keeps_kings() {
        let mut game = Game::with_selector(GameOptions::default(), Box::new(FirstLegalMoveSelector));
        let saved = {
            let mut saved = SavedGame::capture(&game);
            saved.board[7][0] = None;
            saved.board[0][1] = Some(SavedPiece {
                row: 0,
                col: 1,
                side: Side::Black,
                king: true,
            });
            saved
        };
        game = saved.restore_with(Box::new(FirstLegalMoveSelector)).unwrap();

        let json = to_json(&game).unwrap();
        let restored = parse_json(Some(json.as_str())).unwrap().to_board().unwrap();

        assert!(restored.get_piece(pos(0, 1)).unwrap().is_king());
        assert_eq!(&restored, game.board());
    }

    #[test]
    fn json_uses_documented_field_names() {
        let game = Game::with_selector(GameOptions::default(), Box::new(FirstLegalMoveSelector));

        let value: serde_json::Value = serde_json::from_str(&to_json(&game).unwrap()).unwrap();

        assert_eq!(value["turn"], "black");
        assert_eq!(value["single_player"], false);
        assert_eq!(value["hint_mode"], false);
        assert!(value["board"][0][0].is_null());
        assert_eq!(
            value["board"][0][1],
            serde_json::json!({"row": 0, "col": 1, "side": "white", "king": false})
        );
    }

    #[test]
    fn missing_save_is_distinct_from_malformed() {
        assert!(matches!(parse_json(None), Err(LoadError::Missing)));
        assert!(matches!(parse_json(Some("{not json")), Err(LoadError::Malformed(_))));
        assert!(matches!(parse_snapshot(None), Err(LoadError::Missing)));
    }

    #[test]
    fn rejects_piece_whose_coordinates_disagree_with_its_cell() {
        let game = Game::with_selector(GameOptions::default(), Box::new(FirstLegalMoveSelector));
        let mut saved = SavedGame::capture(&game);
        saved.board[0][1] = Some(SavedPiece {
            row: 2,
            col: 1,
            side: Side::White,
            king: false,
        });

        let json = serde_json::to_string(&saved).unwrap();

        assert!(matches!(parse_json(Some(json.as_str())), Err(LoadError::InvalidBoard(_))));
    }

    #[test]
    fn rejects_wrong_dimensions_and_light_squares() {
        let game = Game::with_selector(GameOptions::default(), Box::new(FirstLegalMoveSelector));
        let mut short = SavedGame::capture(&game);
        short.board.pop();
        let mut light = SavedGame::capture(&game);
        light.board[3][3] = Some(SavedPiece {
            row: 3,
            col: 3,
            side: Side::Black,
            king: false,
        });

        assert!(matches!(short.to_board(), Err(LoadError::InvalidBoard(_))));
        assert!(matches!(light.to_board(), Err(LoadError::InvalidBoard(_))));
    }

    #[test]
    fn rejects_too_many_pieces_for_one_side() {
        let game = Game::with_selector(GameOptions::default(), Box::new(FirstLegalMoveSelector));
        let mut saved = SavedGame::capture(&game);
        saved.board[3][0] = Some(SavedPiece {
            row: 3,
            col: 0,
            side: Side::Black,
            king: false,
        });

        assert!(matches!(saved.to_board(), Err(LoadError::InvalidBoard(_))));
    }

    #[test]
    fn finished_position_loads_as_finished() {
        let game = Game::with_selector(GameOptions::default(), Box::new(FirstLegalMoveSelector));
        let mut saved = SavedGame::capture(&game);
        for row in saved.board.iter_mut().take(3) {
            row.iter_mut().for_each(|cell| *cell = None);
        }

        let restored = saved.restore_with(Box::new(FirstLegalMoveSelector)).unwrap();

        assert!(restored.is_game_over());
        assert_eq!(restored.winner(), Some(Side::Black));
    }

    #[test]
    fn snapshot_round_trip() {
        let game = played_game();

        let bytes = encode_snapshot(&game).unwrap();
        let saved = parse_snapshot(Some(bytes.as_slice())).unwrap();

        assert_eq!(&bytes[0..4], MAGIC);
        assert_eq!(saved, SavedGame::capture(&game));
    }

    #[test]
    fn snapshot_rejects_invalid_magic() {
        let mut bytes = encode_snapshot(&played_game()).unwrap();
        bytes[0] = b'X';

        let err = parse_snapshot(Some(bytes.as_slice())).unwrap_err();
        assert!(err.to_string().contains("magic"));
    }

    #[test]
    fn snapshot_rejects_unsupported_version() {
        let mut bytes = encode_snapshot(&played_game()).unwrap();
        bytes[4..8].copy_from_slice(&2u32.to_le_bytes());

        let err = parse_snapshot(Some(bytes.as_slice())).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn snapshot_rejects_crc_mismatch() {
        let mut bytes = encode_snapshot(&played_game()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;

        let err = parse_snapshot(Some(bytes.as_slice())).unwrap_err();
        assert!(err.to_string().contains("CRC32"));
    }

    #[test]
    fn snapshot_rejects_truncated_payload() {
        let mut bytes = encode_snapshot(&played_game()).unwrap();
        bytes.pop();
        let recalculated_crc = crc32fast::hash(&bytes[HEADER_SIZE..]);
        bytes[12..16].copy_from_slice(&recalculated_crc.to_le_bytes());

        let err = parse_snapshot(Some(bytes.as_slice())).unwrap_err();
        assert!(err.to_string().contains("length mismatch"));
    }

    #[test]
    fn snapshot_rejects_short_input() {
        let err = parse_snapshot(Some(&b"CKRS"[..])).unwrap_err();

        assert!(matches!(err, LoadError::BadSnapshot(_)));
    }
}
