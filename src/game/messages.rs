use serde::{Deserialize, Serialize};

use super::state::{GamePhase, GameState, PlacementMode};

/// 状态提示显示时长（毫秒）。计时器由表现层持有，核心只公布常量。
pub const MESSAGE_VISIBLE_MS: u32 = 3_000;
/// 点击放置模式下自动放置棋盘的等待时长（毫秒）。
pub const AUTO_PLACE_DELAY_MS: u32 = 1_000;

/// 一条带显示时长的状态提示。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Announcement {
    pub text: String,
    pub visible_ms: u32,
}

impl Announcement {
    fn transient(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            visible_ms: MESSAGE_VISIBLE_MS,
        }
    }
}

/// 由当前状态推导状态栏文案。
pub fn status_for(state: &GameState) -> Announcement {
    if !state.board_placed {
        return Announcement::transient(match state.placement_mode {
            PlacementMode::Marker => "Point the camera at the AR marker to place the board",
            PlacementMode::TapToPlace => "Tap the screen to place the board",
        });
    }

    match &state.phase {
        GamePhase::NotStarted => Announcement::transient("Board placed! Press \"Start game\""),
        GamePhase::InProgress => {
            Announcement::transient(format!("Turn: {}", state.current_mark))
        }
        GamePhase::Won { winner } => Announcement::transient(format!("Player {winner} wins!")),
        GamePhase::Drawn => Announcement::transient("Draw!"),
    }
}

/// 终局横幅文案；对局未结束时为 None。
pub fn banner_for(state: &GameState) -> Option<String> {
    match &state.phase {
        GamePhase::Won { winner } => Some(format!("Player {winner} wins!")),
        GamePhase::Drawn => Some("Draw!".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::rules::RuleEngine;
    use crate::game::state::Mark;

    #[test]
    fn status_tracks_placement_mode_and_turn() {
        let mut engine = RuleEngine::new();
        let mut state = GameState::new(PlacementMode::TapToPlace);
        assert_eq!(
            status_for(&state).text,
            "Tap the screen to place the board"
        );

        engine
            .place_board(&mut state)
            .expect("place_board should succeed");
        assert_eq!(status_for(&state).text, "Board placed! Press \"Start game\"");

        engine.start(&mut state).expect("start should succeed");
        assert_eq!(status_for(&state).text, "Turn: X");

        engine
            .select_cell(&mut state, 0)
            .expect("select should succeed");
        assert_eq!(status_for(&state).text, "Turn: O");
        assert_eq!(status_for(&state).visible_ms, MESSAGE_VISIBLE_MS);
    }

    #[test]
    fn banner_appears_only_at_game_over() {
        let mut engine = RuleEngine::new();
        let mut state = GameState::new(PlacementMode::Marker);
        engine
            .place_board(&mut state)
            .expect("place_board should succeed");
        engine.start(&mut state).expect("start should succeed");
        assert_eq!(banner_for(&state), None);

        for index in [0u8, 3, 1, 4, 2] {
            engine
                .select_cell(&mut state, index)
                .expect("select should succeed");
        }
        assert_eq!(state.phase, GamePhase::Won { winner: Mark::X });
        assert_eq!(banner_for(&state).as_deref(), Some("Player X wins!"));
    }
}
