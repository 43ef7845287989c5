//! 录制事件
//!
//! 四类事件的标签联合（Snapshot / Interaction / Meta / Custom），以及与 rrweb
//! 兼容的 JSON 编码。

mod types;
mod wire;

pub use types::{
    Action, ActionKind, CustomData, Event, EventKind, EventPayload, Interaction, MetaData,
    PointerPhase, Position, UnknownPhase,
};
pub use wire::decode_value;
