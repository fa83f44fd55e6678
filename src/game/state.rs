use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 棋盘格子数（3×3）。
pub const BOARD_CELLS: usize = 9;

/// 格子索引，合法范围 0..=8。
pub type CellIndex = u8;

/// 8 条固定的获胜连线，按 行、列、对角线 的顺序检查。
pub const WIN_LINES: [[CellIndex; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// 玩家符号，X 先手。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub const STARTING: Mark = Mark::X;

    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mark::X => "X",
            Mark::O => "O",
        })
    }
}

/// 棋盘放置方式：AR 标记识别或点击放置。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlacementMode {
    Marker,
    TapToPlace,
}

impl Default for PlacementMode {
    fn default() -> Self {
        PlacementMode::Marker
    }
}

impl FromStr for PlacementMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "marker" | "Marker" => Ok(PlacementMode::Marker),
            "tap" | "tap-to-place" | "TapToPlace" => Ok(PlacementMode::TapToPlace),
            other => Err(format!("unknown placement mode: {other}")),
        }
    }
}

/// 对局阶段。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GamePhase {
    NotStarted,
    InProgress,
    Won { winner: Mark },
    Drawn,
}

impl Default for GamePhase {
    fn default() -> Self {
        GamePhase::NotStarted
    }
}

/// 获胜连线：符号与三个格子的索引。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WinningLine {
    pub mark: Mark,
    pub cells: [CellIndex; 3],
}

/// 终局结果。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameOutcome {
    Won { line: WinningLine },
    Drawn,
}

/// 游戏事件流，表现层据此渲染符号、横幅与回合提示。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    BoardPlaced {
        mode: PlacementMode,
    },
    GameStarted,
    MarkPlaced {
        index: CellIndex,
        mark: Mark,
    },
    TurnChanged {
        mark: Mark,
    },
    GameWon {
        winner: Mark,
        line: WinningLine,
    },
    GameDrawn,
    GameReset,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum IntegrityError {
    MoveCountMismatch { move_count: u8, filled: u8 },
    TurnBalance { x_count: u8, o_count: u8 },
    EmptyWinningCell { index: CellIndex },
    MoveCountOutOfRange { move_count: u8 },
}

/// 单局游戏的完整状态。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    pub board: [Option<Mark>; BOARD_CELLS],
    pub current_mark: Mark,
    pub move_count: u8,
    pub phase: GamePhase,
    #[serde(default)]
    pub placement_mode: PlacementMode,
    #[serde(default)]
    pub board_placed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_winning_line: Option<WinningLine>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_log: Vec<GameEvent>,
}

/// 供表现层渲染的只读快照。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    pub board: [Option<Mark>; BOARD_CELLS],
    pub current_mark: Mark,
    pub phase: GamePhase,
    pub board_placed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_winning_line: Option<WinningLine>,
}

impl GameState {
    pub fn new(placement_mode: PlacementMode) -> Self {
        Self {
            board: [None; BOARD_CELLS],
            current_mark: Mark::STARTING,
            move_count: 0,
            phase: GamePhase::NotStarted,
            placement_mode,
            board_placed: false,
            last_winning_line: None,
            event_log: Vec::new(),
        }
    }

    pub fn record_event(&mut self, event: GameEvent) {
        self.event_log.push(event);
    }

    pub fn mark_at(&self, index: CellIndex) -> Option<Mark> {
        self.board.get(index as usize).copied().flatten()
    }

    pub fn is_cell_empty(&self, index: CellIndex) -> bool {
        self.mark_at(index).is_none()
    }

    pub fn is_full(&self) -> bool {
        self.board.iter().all(|cell| cell.is_some())
    }

    pub fn is_in_progress(&self) -> bool {
        self.phase == GamePhase::InProgress
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, GamePhase::Won { .. } | GamePhase::Drawn)
    }

    /// 按固定顺序查找第一条被同一符号占满的连线。
    pub fn find_winning_line(&self) -> Option<WinningLine> {
        for cells in WIN_LINES {
            if let Some(first) = self.mark_at(cells[0]) {
                if cells[1..].iter().all(|&i| self.mark_at(i) == Some(first)) {
                    return Some(WinningLine { mark: first, cells });
                }
            }
        }
        None
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        match &self.phase {
            GamePhase::Won { .. } => self
                .last_winning_line
                .clone()
                .map(|line| GameOutcome::Won { line }),
            GamePhase::Drawn => Some(GameOutcome::Drawn),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board,
            current_mark: self.current_mark,
            phase: self.phase.clone(),
            board_placed: self.board_placed,
            last_winning_line: self.last_winning_line.clone(),
        }
    }

    /// 结构性自检：步数、符号平衡与终局连线必须互相吻合。
    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        if self.move_count as usize > BOARD_CELLS {
            return Err(IntegrityError::MoveCountOutOfRange {
                move_count: self.move_count,
            });
        }

        let filled = self.board.iter().filter(|cell| cell.is_some()).count() as u8;
        if filled != self.move_count {
            return Err(IntegrityError::MoveCountMismatch {
                move_count: self.move_count,
                filled,
            });
        }

        let x_count = self
            .board
            .iter()
            .filter(|cell| **cell == Some(Mark::X))
            .count() as u8;
        let o_count = filled - x_count;
        // X 先手：X 的落子数等于 O 或恰好多一
        if x_count < o_count || x_count > o_count + 1 {
            return Err(IntegrityError::TurnBalance { x_count, o_count });
        }

        if let Some(line) = &self.last_winning_line {
            for &index in &line.cells {
                if self.mark_at(index) != Some(line.mark) {
                    return Err(IntegrityError::EmptyWinningCell { index });
                }
            }
        }

        Ok(())
    }

    /// 返回一个进行了几步的示例状态，方便前端调试或初始化。
    pub fn sample() -> Self {
        let mut state = GameState::new(PlacementMode::Marker);
        state.board_placed = true;
        state.record_event(GameEvent::BoardPlaced {
            mode: PlacementMode::Marker,
        });
        state.phase = GamePhase::InProgress;
        state.record_event(GameEvent::GameStarted);

        // X 占中心，O 占角
        state.board[4] = Some(Mark::X);
        state.record_event(GameEvent::MarkPlaced {
            index: 4,
            mark: Mark::X,
        });
        state.board[0] = Some(Mark::O);
        state.record_event(GameEvent::MarkPlaced {
            index: 0,
            mark: Mark::O,
        });
        state.move_count = 2;
        state.current_mark = Mark::X;
        state.record_event(GameEvent::TurnChanged { mark: Mark::X });
        state
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(PlacementMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_state_passes_integrity_check() {
        let state = GameState::sample();
        state
            .integrity_check()
            .expect("sample state should be internally consistent");
    }

    #[test]
    fn integrity_rejects_move_count_mismatch() {
        let mut state = GameState::sample();
        state.move_count = 5;
        assert!(matches!(
            state.integrity_check(),
            Err(IntegrityError::MoveCountMismatch {
                move_count: 5,
                filled: 2
            })
        ));
    }

    #[test]
    fn integrity_rejects_unbalanced_marks() {
        let mut state = GameState::new(PlacementMode::Marker);
        state.board[0] = Some(Mark::O);
        state.board[1] = Some(Mark::O);
        state.move_count = 2;
        assert!(matches!(
            state.integrity_check(),
            Err(IntegrityError::TurnBalance {
                x_count: 0,
                o_count: 2
            })
        ));
    }

    #[test]
    fn winning_line_uses_fixed_check_order() {
        let mut state = GameState::new(PlacementMode::Marker);
        // X 在 4 处同时补全 {3,4,5} 与 {1,4,7}，行先于列被报告
        for index in [1u8, 3, 4, 5, 7] {
            state.board[index as usize] = Some(Mark::X);
        }
        let line = state.find_winning_line().expect("line should be found");
        assert_eq!(line.cells, [3, 4, 5]);
        assert_eq!(line.mark, Mark::X);
    }

    #[test]
    fn placement_mode_parses_js_facing_names() {
        assert_eq!("marker".parse::<PlacementMode>(), Ok(PlacementMode::Marker));
        assert_eq!(
            "tap-to-place".parse::<PlacementMode>(),
            Ok(PlacementMode::TapToPlace)
        );
        assert!("floor".parse::<PlacementMode>().is_err());
    }
}
