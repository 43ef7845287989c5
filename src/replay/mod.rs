//! 回放
//!
//! 从初始快照出发，按事件顺序重建任意逻辑时刻的可视状态。

mod player;
mod scheduled;
mod state;

pub use player::{Player, state_at};
pub use state::{ClickState, PointerState, VisualState};
