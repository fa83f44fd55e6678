pub mod game;

use gloo_timers::future::TimeoutFuture;
use serde_wasm_bindgen::{from_value, to_value};
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use game::{
    banner_for, status_for, Announcement, CellIndex, GameEvent, GameOutcome, GamePhase, GameState,
    IntegrityError, Mark, PlacementMode, RuleEngine, RuleError, RuleResolution, Snapshot,
    WinningLine, AUTO_PLACE_DELAY_MS, BOARD_CELLS, MESSAGE_VISIBLE_MS, WIN_LINES,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
}

fn make_resolution(state: GameState, events: Vec<GameEvent>) -> RuleResolution {
    RuleResolution::new(state, events)
}

fn to_js_error(error: RuleError) -> JsValue {
    if let RuleError::CellIndexOutOfRange { index } = &error {
        web_sys::console::warn_1(&format!("cell index out of range: {index}").into());
    }
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn make_resolution_json(resolution: RuleResolution) -> Result<String, JsValue> {
    serde_json::to_string(&resolution).map_err(serde_to_js_error)
}

fn resolution_from_events(state: &GameState, events: Vec<GameEvent>) -> RuleResolution {
    RuleResolution::new(state.clone(), events)
}

fn parse_mode(mode: Option<String>) -> Result<PlacementMode, JsValue> {
    match mode {
        Some(value) => PlacementMode::from_str(&value).map_err(serde_to_js_error),
        None => Ok(PlacementMode::default()),
    }
}

fn execute_with_engine<F>(state: &mut GameState, action: F) -> Result<Vec<GameEvent>, JsValue>
where
    F: FnOnce(&mut RuleEngine, &mut GameState) -> Result<Vec<GameEvent>, RuleError>,
{
    let mut engine = RuleEngine::new();
    action(&mut engine, state).map_err(to_js_error)
}

/// 持有单局状态的会话对象，一次页面加载构造一个。
#[wasm_bindgen]
pub struct GameSession {
    state: GameState,
}

#[wasm_bindgen]
impl GameSession {
    #[wasm_bindgen(constructor)]
    pub fn new(initial_state_json: Option<String>) -> Result<GameSession, JsValue> {
        let state = if let Some(json) = initial_state_json {
            serde_json::from_str(&json).map_err(serde_to_js_error)?
        } else {
            GameState::new(PlacementMode::default())
        };
        Ok(GameSession { state })
    }

    #[wasm_bindgen(js_name = withMode)]
    pub fn with_mode(mode: &str) -> Result<GameSession, JsValue> {
        let mode = PlacementMode::from_str(mode).map_err(serde_to_js_error)?;
        Ok(GameSession {
            state: GameState::new(mode),
        })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state).map_err(serde_to_js_error)
    }

    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let state: GameState = serde_json::from_str(json).map_err(serde_to_js_error)?;
        self.state = state;
        Ok(())
    }

    /// 棋盘已放置（标记识别或点击触发）。
    pub fn place_board(&mut self) -> Result<String, JsValue> {
        let events = execute_with_engine(&mut self.state, |engine, state| {
            engine.place_board(state)
        })?;
        make_resolution_json(resolution_from_events(&self.state, events))
    }

    /// AR 标记被识别到时由表现层调用，等价于 place_board。
    pub fn marker_found(&mut self) -> Result<String, JsValue> {
        self.place_board()
    }

    pub fn start_game(&mut self) -> Result<String, JsValue> {
        let events = execute_with_engine(&mut self.state, |engine, state| engine.start(state))?;
        make_resolution_json(resolution_from_events(&self.state, events))
    }

    pub fn select_cell(&mut self, index: CellIndex) -> Result<String, JsValue> {
        let events = execute_with_engine(&mut self.state, |engine, state| {
            engine.select_cell(state, index)
        })?;
        make_resolution_json(resolution_from_events(&self.state, events))
    }

    pub fn reset(&mut self) -> Result<String, JsValue> {
        let events = execute_with_engine(&mut self.state, |engine, state| engine.reset(state))?;
        make_resolution_json(resolution_from_events(&self.state, events))
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_value(&self.state.snapshot()).map_err(JsValue::from)
    }

    pub fn status_message(&self) -> Result<JsValue, JsValue> {
        to_value(&status_for(&self.state)).map_err(JsValue::from)
    }

    pub fn banner_text(&self) -> Option<String> {
        banner_for(&self.state)
    }

    /// 等待自动放置计时后返回放置结算（在状态副本上计算）。
    /// 调用方确认后再执行 place_board 使其生效，
    /// 以替代原型里反复 setTimeout 轮询的写法。
    pub fn await_auto_place(&self, delay_ms: Option<u32>) -> Promise {
        let state = self.state.clone();
        let delay = delay_ms.unwrap_or(AUTO_PLACE_DELAY_MS);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let mut state = state;
            let mut engine = RuleEngine::new();
            let events = engine.place_board(&mut state).map_err(to_js_error)?;
            let json = make_resolution_json(make_resolution(state, events))?;
            Ok(JsValue::from_str(&json))
        })
    }
}

/// 返回一个空白（或示例）游戏状态，方便前端调试或初始化。
#[wasm_bindgen(js_name = "createGameState")]
pub fn create_game_state(mode: Option<String>) -> Result<JsValue, JsValue> {
    let mode = parse_mode(mode)?;
    to_value(&GameState::new(mode)).map_err(JsValue::from)
}

/// 返回一个进行了几步的示例状态。
#[wasm_bindgen(js_name = "sampleGameState")]
pub fn sample_game_state() -> Result<JsValue, JsValue> {
    to_value(&GameState::sample()).map_err(JsValue::from)
}

/// 将传入的游戏状态深拷贝后返回。
#[wasm_bindgen(js_name = "cloneGameState")]
pub fn clone_game_state(state: JsValue) -> Result<JsValue, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    let cloned = state.clone();
    to_value(&cloned).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "placeBoard")]
pub fn place_board(state: JsValue) -> Result<JsValue, JsValue> {
    let mut state: GameState = from_value(state).map_err(JsValue::from)?;
    let mut engine = RuleEngine::new();
    match engine.place_board(&mut state) {
        Ok(events) => to_value(&make_resolution(state, events)).map_err(JsValue::from),
        Err(error) => Err(to_js_error(error)),
    }
}

#[wasm_bindgen(js_name = "startGame")]
pub fn start_game(state: JsValue) -> Result<JsValue, JsValue> {
    let mut state: GameState = from_value(state).map_err(JsValue::from)?;
    let mut engine = RuleEngine::new();
    match engine.start(&mut state) {
        Ok(events) => to_value(&make_resolution(state, events)).map_err(JsValue::from),
        Err(error) => Err(to_js_error(error)),
    }
}

#[wasm_bindgen(js_name = "selectCell")]
pub fn select_cell(state: JsValue, index: CellIndex) -> Result<JsValue, JsValue> {
    let mut state: GameState = from_value(state).map_err(JsValue::from)?;
    let mut engine = RuleEngine::new();
    match engine.select_cell(&mut state, index) {
        Ok(events) => to_value(&make_resolution(state, events)).map_err(JsValue::from),
        Err(error) => Err(to_js_error(error)),
    }
}

#[wasm_bindgen(js_name = "resetGame")]
pub fn reset_game(state: JsValue) -> Result<JsValue, JsValue> {
    let mut state: GameState = from_value(state).map_err(JsValue::from)?;
    let mut engine = RuleEngine::new();
    match engine.reset(&mut state) {
        Ok(events) => to_value(&make_resolution(state, events)).map_err(JsValue::from),
        Err(error) => Err(to_js_error(error)),
    }
}

#[wasm_bindgen(js_name = "statusMessage")]
pub fn status_message(state: JsValue) -> Result<JsValue, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    to_value(&status_for(&state)).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "checkOutcome")]
pub fn check_outcome(state: JsValue) -> Result<JsValue, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    let outcome = RuleEngine::check_outcome(&state);
    to_value(&outcome).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "validateState")]
pub fn validate_state(state: JsValue) -> Result<(), JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    state
        .integrity_check()
        .map_err(|error| to_js_error(RuleError::IntegrityViolation { error }))?;
    Ok(())
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
