#![cfg(target_arch = "wasm32")]

use checkers::api;
use js_sys::Reflect;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

fn ok<T>(result: Result<T, wasm_bindgen::JsError>) -> T {
    result.map_err(JsValue::from).unwrap()
}

fn field(value: &JsValue, name: &str) -> JsValue {
    Reflect::get(value, &JsValue::from_str(name)).unwrap()
}

fn new_game(single_player: bool, hint_mode: bool) -> JsValue {
    let options = js_sys::Object::new();
    Reflect::set(&options, &"single_player".into(), &single_player.into()).unwrap();
    Reflect::set(&options, &"hint_mode".into(), &hint_mode.into()).unwrap();
    ok(api::new_game(options.into()))
}

#[wasm_bindgen_test]
fn wasm_ready_reports_true() {
    assert!(checkers::wasm_ready());
}

#[wasm_bindgen_test]
fn new_game_starts_with_black_to_move() {
    let state = ok(api::new_game(JsValue::UNDEFINED));

    assert_eq!(field(&state, "current_player").as_string().as_deref(), Some("black"));
    assert_eq!(field(&state, "black_count").as_f64(), Some(12.0));
    assert_eq!(field(&state, "white_count").as_f64(), Some(12.0));
    assert_eq!(field(&state, "is_game_over").as_bool(), Some(false));
}

#[wasm_bindgen_test]
fn select_then_move_switches_turn() {
    new_game(false, false);

    let selected = ok(api::click(5, 0));
    assert_eq!(field(&selected, "accepted").as_bool(), Some(true));
    let outcome = field(&selected, "outcome");
    assert_eq!(field(&outcome, "kind").as_string().as_deref(), Some("selected"));

    let moved = ok(api::click(4, 1));
    let state = field(&moved, "state");
    assert_eq!(field(&state, "current_player").as_string().as_deref(), Some("white"));
}

#[wasm_bindgen_test]
fn click_outside_the_board_is_ignored() {
    new_game(false, false);

    let view = ok(api::click_at(900.0, 100.0, 800.0));

    assert_eq!(field(&view, "accepted").as_bool(), Some(false));
}

#[wasm_bindgen_test]
fn out_of_range_click_is_an_error() {
    new_game(false, false);

    assert!(api::click(8, 0).is_err());
}

#[wasm_bindgen_test]
fn opponent_moves_only_on_its_turn() {
    new_game(true, false);
    assert!(api::ai_move().is_err());

    ok(api::click(5, 0));
    ok(api::click(4, 1));
    let view = ok(api::ai_move());

    let state = field(&view, "state");
    assert_eq!(field(&state, "current_player").as_string().as_deref(), Some("black"));
}

#[wasm_bindgen_test]
fn hint_is_null_unless_enabled() {
    new_game(false, false);
    assert!(ok(api::get_hint()).is_null());

    ok(api::set_hint_mode(true));
    let hint = ok(api::get_hint());

    assert!(field(&hint, "from").is_object());
    assert!(field(&hint, "to").is_object());
}

#[wasm_bindgen_test]
fn save_and_load_round_trip() {
    new_game(true, true);
    ok(api::click(5, 2));
    ok(api::click(4, 3));
    let saved = ok(api::save_game());

    new_game(false, false);
    let state = ok(api::load_game(Some(saved)));

    assert_eq!(field(&state, "current_player").as_string().as_deref(), Some("white"));
    assert_eq!(field(&state, "single_player").as_bool(), Some(true));
    assert_eq!(field(&state, "hint_mode").as_bool(), Some(true));
}

#[wasm_bindgen_test]
fn failed_load_keeps_the_running_game() {
    new_game(false, false);
    ok(api::click(5, 2));
    ok(api::click(4, 3));

    assert!(api::load_game(None).is_err());
    assert!(api::load_game(Some("{broken".to_string())).is_err());
    assert!(api::load_snapshot(Some(vec![0; 4])).is_err());

    let state = ok(api::get_state());
    assert_eq!(field(&state, "current_player").as_string().as_deref(), Some("white"));
}

#[wasm_bindgen_test]
fn snapshot_round_trip() {
    new_game(false, true);
    let bytes = ok(api::save_snapshot());

    let state = ok(api::load_snapshot(Some(bytes)));

    assert_eq!(field(&state, "hint_mode").as_bool(), Some(true));
    assert_eq!(field(&state, "black_count").as_f64(), Some(12.0));
}
