use crate::snapshot::{NodeId, NodeRecord};
use crate::time::SessionTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 事件种类（JSON 中整数编码，与 rrweb 的 EventType 对齐）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Snapshot,
    Interaction,
    Meta,
    Custom,
}

impl EventKind {
    pub const fn code(self) -> u8 {
        match self {
            EventKind::Snapshot => 2,
            EventKind::Interaction => 3,
            EventKind::Meta => 4,
            EventKind::Custom => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<EventKind> {
        match code {
            2 => Some(EventKind::Snapshot),
            3 => Some(EventKind::Interaction),
            4 => Some(EventKind::Meta),
            5 => Some(EventKind::Custom),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Snapshot => "Snapshot",
            EventKind::Interaction => "Interaction",
            EventKind::Meta => "Meta",
            EventKind::Custom => "Custom",
        };
        f.write_str(s)
    }
}

/// 页面上的坐标（CSS 像素）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// rrweb 的 MouseInteractions 枚举；`Click` 单独作为 [`Action::Click`]，不会出现在这里
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Up,
    Down,
    ContextMenu,
    DoubleClick,
    Focus,
    Blur,
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
    Other(UnknownPhase),
}

/// 未建模的交互码值。只能经 [`PointerPhase::from_code`] 得到，因此永远不会是 click 码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UnknownPhase(u8);

impl UnknownPhase {
    pub fn code(self) -> u8 {
        self.0
    }
}

pub(crate) const MOUSE_CLICK_CODE: u8 = 2;

impl PointerPhase {
    pub fn code(self) -> u8 {
        match self {
            PointerPhase::Up => 0,
            PointerPhase::Down => 1,
            PointerPhase::ContextMenu => 3,
            PointerPhase::DoubleClick => 4,
            PointerPhase::Focus => 5,
            PointerPhase::Blur => 6,
            PointerPhase::TouchStart => 7,
            PointerPhase::TouchMove => 8,
            PointerPhase::TouchEnd => 9,
            PointerPhase::TouchCancel => 10,
            PointerPhase::Other(c) => c.code(),
        }
    }

    /// 码值 2 是 click，不属于 PointerPhase，返回 `None`
    pub fn from_code(code: u8) -> Option<PointerPhase> {
        let phase = match code {
            0 => PointerPhase::Up,
            1 => PointerPhase::Down,
            MOUSE_CLICK_CODE => return None,
            3 => PointerPhase::ContextMenu,
            4 => PointerPhase::DoubleClick,
            5 => PointerPhase::Focus,
            6 => PointerPhase::Blur,
            7 => PointerPhase::TouchStart,
            8 => PointerPhase::TouchMove,
            9 => PointerPhase::TouchEnd,
            10 => PointerPhase::TouchCancel,
            c => PointerPhase::Other(UnknownPhase(c)),
        };
        Some(phase)
    }
}

/// 交互动作（不带负载），用于统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    PointerMove,
    Click,
    Scroll,
    PointerInteraction,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::PointerMove,
        ActionKind::Click,
        ActionKind::Scroll,
        ActionKind::PointerInteraction,
    ];
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionKind::PointerMove => "pointerMove",
            ActionKind::Click => "click",
            ActionKind::Scroll => "scroll",
            ActionKind::PointerInteraction => "pointerInteraction",
        };
        f.write_str(s)
    }
}

/// 交互动作及其负载
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    PointerMove { at: Position },
    Click { at: Position },
    /// 滚动后的偏移（rrweb 记录的是绝对滚动位置，而不是增量）
    Scroll { offset: Position },
    /// focus / blur 等交互在 rrweb 中不带坐标
    PointerInteraction {
        phase: PointerPhase,
        at: Option<Position>,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::PointerMove { .. } => ActionKind::PointerMove,
            Action::Click { .. } => ActionKind::Click,
            Action::Scroll { .. } => ActionKind::Scroll,
            Action::PointerInteraction { .. } => ActionKind::PointerInteraction,
        }
    }
}

/// 对某个快照节点的一次交互；`node_id` 只是引用，不拥有节点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    pub node_id: NodeId,
    pub action: Action,
}

/// 会话级元信息
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetaData {
    pub href: String,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "userAgent", default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// 应用自定义事件：扩展点，不绑定到任何 DOM 节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomData {
    pub tag: String,
    #[serde(default)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

/// 事件负载（四种之一）
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    Snapshot(NodeRecord),
    Interaction(Interaction),
    Meta(MetaData),
    Custom(CustomData),
}

/// 录制日志中的一条事件
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub timestamp: SessionTime,
    pub payload: EventPayload,
}

impl Event {
    pub fn snapshot(timestamp: SessionTime, root: NodeRecord) -> Self {
        Self {
            timestamp,
            payload: EventPayload::Snapshot(root),
        }
    }

    pub fn interaction(timestamp: SessionTime, node_id: NodeId, action: Action) -> Self {
        Self {
            timestamp,
            payload: EventPayload::Interaction(Interaction { node_id, action }),
        }
    }

    pub fn meta(timestamp: SessionTime, meta: MetaData) -> Self {
        Self {
            timestamp,
            payload: EventPayload::Meta(meta),
        }
    }

    pub fn custom(
        timestamp: SessionTime,
        tag: impl Into<String>,
        payload: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            timestamp,
            payload: EventPayload::Custom(CustomData {
                tag: tag.into(),
                payload,
            }),
        }
    }

    pub fn kind(&self) -> EventKind {
        match &self.payload {
            EventPayload::Snapshot(_) => EventKind::Snapshot,
            EventPayload::Interaction(_) => EventKind::Interaction,
            EventPayload::Meta(_) => EventKind::Meta,
            EventPayload::Custom(_) => EventKind::Custom,
        }
    }

    pub fn as_interaction(&self) -> Option<&Interaction> {
        match &self.payload {
            EventPayload::Interaction(i) => Some(i),
            _ => None,
        }
    }
}
