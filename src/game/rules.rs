use serde::{Deserialize, Serialize};

use super::state::{
    CellIndex, GameEvent, GameOutcome, GamePhase, GameState, IntegrityError, Mark, BOARD_CELLS,
};

/// 规则层错误。唯一真正的失败是格式非法的输入：
/// 索引越界被明确拒绝，其余前置条件不满足一律静默忽略。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RuleError {
    CellIndexOutOfRange { index: CellIndex },
    IntegrityViolation { error: IntegrityError },
}

/// 每条指令执行后回传给表现层的完整结算。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResolution {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<GameOutcome>,
}

impl RuleResolution {
    pub fn new(state: GameState, events: Vec<GameEvent>) -> Self {
        let outcome = state.outcome();
        Self {
            state,
            events,
            outcome,
        }
    }
}

/// 回合制规则引擎：放置棋盘、开始、落子、重开。
/// 状态由调用方独占持有，这里只做纯粹的状态变迁。
#[derive(Debug, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    fn ensure_integrity(state: &GameState) -> Result<(), RuleError> {
        state
            .integrity_check()
            .map_err(|error| RuleError::IntegrityViolation { error })
    }

    fn record_all(state: &mut GameState, events: &[GameEvent]) {
        for event in events {
            state.record_event(event.clone());
        }
    }

    /// 标记棋盘已放置（标记识别、点击或定时放置触发）。重复调用无效果。
    pub fn place_board(&mut self, state: &mut GameState) -> Result<Vec<GameEvent>, RuleError> {
        Self::ensure_integrity(state)?;
        if state.board_placed {
            return Ok(Vec::new());
        }
        state.board_placed = true;
        let events = vec![GameEvent::BoardPlaced {
            mode: state.placement_mode,
        }];
        Self::record_all(state, &events);
        Ok(events)
    }

    /// 开局：NotStarted → InProgress。已开始或已结束时静默忽略。
    pub fn start(&mut self, state: &mut GameState) -> Result<Vec<GameEvent>, RuleError> {
        Self::ensure_integrity(state)?;
        if state.phase != GamePhase::NotStarted {
            return Ok(Vec::new());
        }
        state.phase = GamePhase::InProgress;
        let events = vec![
            GameEvent::GameStarted,
            GameEvent::TurnChanged {
                mark: state.current_mark,
            },
        ];
        Self::record_all(state, &events);
        Ok(events)
    }

    /// 在指定格子落子。未开局、已结束或格子被占时是无操作，
    /// 对应用户点到不可用格子的手势语义。
    pub fn select_cell(
        &mut self,
        state: &mut GameState,
        index: CellIndex,
    ) -> Result<Vec<GameEvent>, RuleError> {
        if index as usize >= BOARD_CELLS {
            return Err(RuleError::CellIndexOutOfRange { index });
        }
        Self::ensure_integrity(state)?;
        if !state.is_in_progress() || !state.is_cell_empty(index) {
            return Ok(Vec::new());
        }

        let mark = state.current_mark;
        state.board[index as usize] = Some(mark);
        state.move_count += 1;

        let mut events = vec![GameEvent::MarkPlaced { index, mark }];

        if let Some(line) = state.find_winning_line() {
            state.phase = GamePhase::Won { winner: line.mark };
            state.last_winning_line = Some(line.clone());
            events.push(GameEvent::GameWon {
                winner: line.mark,
                line,
            });
        } else if state.is_full() {
            state.phase = GamePhase::Drawn;
            events.push(GameEvent::GameDrawn);
        } else {
            state.current_mark = mark.opponent();
            events.push(GameEvent::TurnChanged {
                mark: state.current_mark,
            });
        }

        Self::record_all(state, &events);
        Ok(events)
    }

    /// 重开一局：任意阶段可调用，棋盘清空、X 重新先手。
    /// 棋盘放置状态保留，表现层重新显示开始按钮。
    pub fn reset(&mut self, state: &mut GameState) -> Result<Vec<GameEvent>, RuleError> {
        state.board = [None; BOARD_CELLS];
        state.current_mark = Mark::STARTING;
        state.move_count = 0;
        state.phase = GamePhase::NotStarted;
        state.last_winning_line = None;
        state.event_log.clear();
        let events = vec![GameEvent::GameReset];
        Self::record_all(state, &events);
        Ok(events)
    }

    pub fn check_outcome(state: &GameState) -> Option<GameOutcome> {
        state.outcome()
    }
}
