//! Browser-side checks for the wasm binding surface.
//! Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use ar_tictactoe::{GamePhase, GameSession, GameState, RuleResolution};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn session_roundtrips_state_json() {
    let session = GameSession::new(None).expect("session should construct");
    let json = session.state_json().expect("state should serialize");
    let restored = GameSession::new(Some(json)).expect("state should deserialize");
    assert_eq!(
        restored.state_json().expect("state should serialize"),
        session.state_json().expect("state should serialize")
    );
}

#[wasm_bindgen_test]
fn session_plays_a_full_winning_game() {
    let mut session = GameSession::with_mode("tap").expect("mode should parse");
    session.place_board().expect("place_board should succeed");
    session.start_game().expect("start should succeed");

    for index in [0u8, 3, 1, 4] {
        session.select_cell(index).expect("select should succeed");
    }
    let json = session.select_cell(2).expect("winning move should succeed");
    let resolution: RuleResolution =
        serde_json::from_str(&json).expect("resolution should deserialize");

    assert!(matches!(resolution.state.phase, GamePhase::Won { .. }));
    assert!(resolution.outcome.is_some());

    session.reset().expect("reset should succeed");
    let state: GameState = serde_json::from_str(
        &session.state_json().expect("state should serialize"),
    )
    .expect("state should deserialize");
    assert_eq!(state.phase, GamePhase::NotStarted);
    assert!(state.board_placed, "placement survives reset");
}

#[wasm_bindgen_test]
fn out_of_range_select_rejects_without_mutating() {
    let mut session = GameSession::new(None).expect("session should construct");
    session.place_board().expect("place_board should succeed");
    session.start_game().expect("start should succeed");

    assert!(session.select_cell(9).is_err());

    let state: GameState = serde_json::from_str(
        &session.state_json().expect("state should serialize"),
    )
    .expect("state should deserialize");
    assert_eq!(state.move_count, 0);
}
