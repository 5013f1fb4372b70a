//! Browser entry points. The page drives one game at a time; the session lives
//! here so the engine types themselves stay free of globals.

use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::game::{ClickOutcome, Game, GameOptions};
use crate::input::BoardGeometry;
use crate::persist;
use crate::types::{GameView, Position};

static SESSION: Lazy<Mutex<Option<Game>>> = Lazy::new(|| Mutex::new(None));

/// Result of one click, with the state to redraw.
#[derive(Debug, Serialize)]
struct ClickView {
    accepted: bool,
    outcome: ClickOutcome,
    state: GameView,
}

fn session() -> Result<MutexGuard<'static, Option<Game>>, JsError> {
    SESSION
        .lock()
        .map_err(|_| JsError::new("game session lock poisoned"))
}

fn with_game<T>(f: impl FnOnce(&mut Game) -> Result<T, JsError>) -> Result<T, JsError> {
    let mut session = session()?;
    let game = session
        .as_mut()
        .ok_or_else(|| JsError::new("no game in progress"))?;
    f(game)
}

fn replace_game(game: Game) -> Result<JsValue, JsError> {
    let view = game.to_view();
    *session()? = Some(game);
    to_js(&view)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value).map_err(|err| JsError::new(&err.to_string()))
}

fn click_view(game: &Game, outcome: ClickOutcome) -> Result<JsValue, JsError> {
    to_js(&ClickView {
        accepted: outcome.is_accepted(),
        outcome,
        state: game.to_view(),
    })
}

/// Starts a fresh game. `options` may be `undefined` or a partial
/// `{ single_player, hint_mode }` object.
#[wasm_bindgen]
pub fn new_game(options: JsValue) -> Result<JsValue, JsError> {
    let options: GameOptions = if options.is_undefined() || options.is_null() {
        GameOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|err| JsError::new(&err.to_string()))?
    };
    replace_game(Game::new(options))
}

#[wasm_bindgen]
pub fn click(row: u8, col: u8) -> Result<JsValue, JsError> {
    let pos = Position::new(row, col)?;
    with_game(|game| {
        let outcome = game.select(pos);
        click_view(game, outcome)
    })
}

/// Pointer variant of [`click`]; clicks outside the board are ignored.
#[wasm_bindgen]
pub fn click_at(x: f64, y: f64, board_width: f64) -> Result<JsValue, JsError> {
    let cell = BoardGeometry::new(board_width).cell_at(x, y);
    with_game(|game| {
        let outcome = match cell {
            Some(pos) => game.select(pos),
            None => ClickOutcome::Ignored,
        };
        click_view(game, outcome)
    })
}

/// Plays the built-in opponent's move in a single-player game.
#[wasm_bindgen]
pub fn ai_move() -> Result<JsValue, JsError> {
    with_game(|game| {
        if !game.is_opponent_turn() {
            return Err(JsError::new("it is not the opponent's turn"));
        }
        let outcome = game.auto_move()?;
        click_view(game, outcome)
    })
}

/// `{ from, to }` for the side to move, or `null` when hints are off or the game is over.
#[wasm_bindgen]
pub fn get_hint() -> Result<JsValue, JsError> {
    with_game(|game| {
        if !game.options().hint_mode {
            return Ok(JsValue::NULL);
        }
        match game.hint() {
            Some(suggestion) => to_js(&suggestion),
            None => Ok(JsValue::NULL),
        }
    })
}

#[wasm_bindgen]
pub fn set_hint_mode(enabled: bool) -> Result<JsValue, JsError> {
    with_game(|game| {
        game.set_hint_mode(enabled);
        to_js(&game.to_view())
    })
}

#[wasm_bindgen]
pub fn get_state() -> Result<JsValue, JsError> {
    with_game(|game| to_js(&game.to_view()))
}

/// Folds the time since the last call into the running side's clock.
#[wasm_bindgen]
pub fn update_timer() -> Result<JsValue, JsError> {
    with_game(|game| {
        game.update_timer();
        to_js(&game.to_view())
    })
}

#[wasm_bindgen]
pub fn save_game() -> Result<String, JsError> {
    with_game(|game| Ok(persist::to_json(game)?))
}

/// Replaces the running game with a saved one. On any error the running
/// game is kept as it was.
#[wasm_bindgen]
pub fn load_game(data: Option<String>) -> Result<JsValue, JsError> {
    let game = persist::from_json(data.as_deref())?;
    replace_game(game)
}

#[wasm_bindgen]
pub fn save_snapshot() -> Result<Vec<u8>, JsError> {
    with_game(|game| Ok(persist::encode_snapshot(game)?))
}

#[wasm_bindgen]
pub fn load_snapshot(data: Option<Vec<u8>>) -> Result<JsValue, JsError> {
    let game = persist::decode_snapshot(data.as_deref())?;
    replace_game(game)
}
