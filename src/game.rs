use std::mem;
use std::time::Duration;

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::ai::random::clock_seed;
use crate::ai::{self, MoveSelector, RandomMoveSelector, Suggestion};
use crate::board::{Board, MoveMap};
use crate::error::GameError;
use crate::piece::{Piece, Side};
use crate::types::{GameView, Position};

/// Mode flags chosen when a game starts. Missing fields default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    /// `White` is played by the game's [`MoveSelector`].
    pub single_player: bool,
    /// The front end shows [`Game::hint`] every frame.
    pub hint_mode: bool,
}

/// Interaction state between two clicks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Idle,
    PieceSelected { piece: Piece, moves: MoveMap },
}

/// What a click did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClickOutcome {
    Moved {
        from: Position,
        to: Position,
        captured: Vec<Position>,
        crowned: bool,
    },
    Selected {
        at: Position,
    },
    Ignored,
}

impl ClickOutcome {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, ClickOutcome::Ignored)
    }
}

pub struct Game {
    board: Board,
    turn: Side,
    selection: Selection,
    options: GameOptions,
    elapsed: [Duration; 2],
    turn_started: Instant,
    winner: Option<Side>,
    is_game_over: bool,
    opponent: Box<dyn MoveSelector>,
    hint_rng: SmallRng,
}

impl Game {
    pub fn new(options: GameOptions) -> Self {
        Self::with_selector(options, Box::new(RandomMoveSelector::from_clock()))
    }

    pub fn with_selector(options: GameOptions, opponent: Box<dyn MoveSelector>) -> Self {
        info!("new game: {options:?}");
        Self::from_position(Board::new(), Side::Black, options, opponent)
    }

    /// Resumes play from an arbitrary position. Win detection runs immediately,
    /// so a finished position comes back finished.
    pub(crate) fn from_position(
        board: Board,
        turn: Side,
        options: GameOptions,
        opponent: Box<dyn MoveSelector>,
    ) -> Self {
        let now = Instant::now();
        let mut game = Self {
            board,
            turn,
            selection: Selection::Idle,
            options,
            elapsed: [Duration::ZERO; 2],
            turn_started: now,
            winner: None,
            is_game_over: false,
            opponent,
            hint_rng: SmallRng::seed_from_u64(clock_seed()),
        };
        game.check_for_win();
        game
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn options(&self) -> GameOptions {
        self.options
    }

    pub fn set_hint_mode(&mut self, enabled: bool) {
        self.options.hint_mode = enabled;
    }

    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Move map of the selected piece, if any.
    pub fn valid_moves(&self) -> Option<&MoveMap> {
        match &self.selection {
            Selection::Idle => None,
            Selection::PieceSelected { moves, .. } => Some(moves),
        }
    }

    pub fn elapsed(&self, side: Side) -> Duration {
        self.elapsed[side.index()]
    }

    pub fn total_elapsed(&self) -> Duration {
        self.elapsed.iter().sum()
    }

    /// Whether the built-in opponent should play now.
    pub fn is_opponent_turn(&self) -> bool {
        self.options.single_player && self.turn == Side::White && !self.is_game_over
    }

    pub fn select(&mut self, pos: Position) -> ClickOutcome {
        self.select_at(pos, Instant::now())
    }

    /// Feeds one click into the selection state machine.
    ///
    /// With a piece selected, a click on one of its empty destinations plays
    /// that move. Any other click drops the selection and is treated as a
    /// fresh pick from `Idle`: a piece of the side to move becomes selected,
    /// anything else leaves the game `Idle` and is ignored.
    pub fn select_at(&mut self, pos: Position, now: Instant) -> ClickOutcome {
        if self.is_game_over {
            return ClickOutcome::Ignored;
        }

        if let Selection::PieceSelected { piece, moves } = mem::take(&mut self.selection)
            && let Some(outcome) = self.try_move(&piece, &moves, pos, now)
        {
            return outcome;
        }

        self.select_piece(pos)
    }

    /// Lets the opponent strategy play one full move for the side to move.
    pub fn auto_move(&mut self) -> Result<ClickOutcome, GameError> {
        if self.is_game_over {
            return Err(GameError::GameOver);
        }

        let Suggestion { from, to } = self
            .opponent
            .select_move(&self.board, self.turn)
            .ok_or(GameError::NoLegalMoves)?;

        self.selection = Selection::Idle;
        self.select(from);
        match self.select(to) {
            outcome @ ClickOutcome::Moved { .. } => Ok(outcome),
            _ => {
                self.selection = Selection::Idle;
                Err(GameError::IllegalSuggestion { from, to })
            }
        }
    }

    /// A legal move for the side to move, for display only.
    pub fn hint(&mut self) -> Option<Suggestion> {
        if self.is_game_over {
            return None;
        }
        ai::hint(&self.board, self.turn, &mut self.hint_rng)
    }

    pub fn change_turn(&mut self) {
        self.change_turn_at(Instant::now());
    }

    /// Credits the time since the last flush to the side that just moved,
    /// hands the move to the other side and checks for a winner.
    pub fn change_turn_at(&mut self, now: Instant) {
        if self.is_game_over {
            return;
        }
        self.update_timer_at(now);
        self.turn = self.turn.opponent();
        self.selection = Selection::Idle;
        self.check_for_win();
    }

    pub fn update_timer(&mut self) {
        self.update_timer_at(Instant::now());
    }

    pub fn update_timer_at(&mut self, now: Instant) {
        if self.is_game_over {
            return;
        }
        self.elapsed[self.turn.index()] += now.saturating_duration_since(self.turn_started);
        self.turn_started = now;
    }

    pub fn to_view(&self) -> GameView {
        let (black_count, white_count) = self.board.count();
        let (selected, destinations) = match &self.selection {
            Selection::Idle => (None, Vec::new()),
            Selection::PieceSelected { piece, moves } => {
                (Some(piece.position), moves.keys().copied().collect())
            }
        };
        GameView {
            board: self.board.to_array(),
            current_player: self.turn,
            black_count,
            white_count,
            is_game_over: self.is_game_over,
            winner: self.winner,
            black_elapsed_ms: self.elapsed(Side::Black).as_millis() as u64,
            white_elapsed_ms: self.elapsed(Side::White).as_millis() as u64,
            total_elapsed_ms: self.total_elapsed().as_millis() as u64,
            single_player: self.options.single_player,
            hint_mode: self.options.hint_mode,
            selected,
            destinations,
        }
    }

    fn try_move(
        &mut self,
        piece: &Piece,
        moves: &MoveMap,
        to: Position,
        now: Instant,
    ) -> Option<ClickOutcome> {
        if self.board.get_piece(to).is_some() {
            return None;
        }
        let captured = moves.get(&to)?;
        let moved = self.board.move_piece(piece.position, to)?;
        self.board.remove(captured);

        debug!(
            "{:?} moved {:?} -> {:?}, captured {}",
            piece.side,
            piece.position,
            to,
            captured.len()
        );

        self.change_turn_at(now);
        Some(ClickOutcome::Moved {
            from: piece.position,
            to,
            captured: captured.iter().map(|piece| piece.position).collect(),
            crowned: moved.is_king() && !piece.is_king(),
        })
    }

    fn select_piece(&mut self, pos: Position) -> ClickOutcome {
        match self.board.get_piece(pos) {
            Some(piece) if piece.side == self.turn => {
                let moves = self.board.get_valid_moves(&piece);
                debug!("selected {pos:?} with {} destinations", moves.len());
                self.selection = Selection::PieceSelected { piece, moves };
                ClickOutcome::Selected { at: pos }
            }
            _ => ClickOutcome::Ignored,
        }
    }

    /// A side loses when it has no pieces left, or has pieces but none can move.
    /// Running out of pieces is checked for both sides before either is
    /// checked for being blocked.
    fn check_for_win(&mut self) {
        if self.is_game_over {
            return;
        }
        let loser = Side::ALL
            .into_iter()
            .find(|&side| self.board.count_side(side) == 0)
            .or_else(|| {
                Side::ALL
                    .into_iter()
                    .find(|&side| !self.board.has_moves(side))
            });
        if let Some(loser) = loser {
            let winner = loser.opponent();
            info!("game over: {winner:?} wins");
            self.winner = Some(winner);
            self.is_game_over = true;
            self.selection = Selection::Idle;
        }
    }

    #[cfg(test)]
    fn set_board_for_test(&mut self, board: Board, turn: Side) {
        self.board = board;
        self.turn = turn;
        self.selection = Selection::Idle;
        self.winner = None;
        self.is_game_over = false;
    }
}
