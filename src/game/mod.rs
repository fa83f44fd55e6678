//! 游戏核心逻辑模块（状态机、规则引擎、提示文案）。

pub mod messages;
pub mod rules;
pub mod state;

pub use messages::{status_for, banner_for, Announcement, AUTO_PLACE_DELAY_MS, MESSAGE_VISIBLE_MS};
pub use rules::{RuleEngine, RuleError, RuleResolution};
pub use state::{
    CellIndex,
    GameEvent,
    GameOutcome,
    GamePhase,
    GameState,
    IntegrityError,
    Mark,
    PlacementMode,
    Snapshot,
    WinningLine,
    BOARD_CELLS,
    WIN_LINES,
};
