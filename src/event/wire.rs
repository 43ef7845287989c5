//! rrweb 兼容的 JSON 编解码
//!
//! 每条事件是 `{type, timestamp, data}`；`type` 为整数（2=Snapshot, 3=Interaction,
//! 4=Meta, 5=Custom）。交互事件按 rrweb incremental snapshot 的形状写出：
//! `source` 1=鼠标移动, 2=鼠标交互, 3=滚动。

use super::types::{
    Action, CustomData, Event, EventKind, EventPayload, Interaction, MOUSE_CLICK_CODE, MetaData,
    PointerPhase, Position,
};
use crate::error::{Error, Result};
use crate::snapshot::{NodeId, NodeRecord};
use crate::time::SessionTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

const SOURCE_MOUSE_MOVE: u8 = 1;
const SOURCE_MOUSE_INTERACTION: u8 = 2;
const SOURCE_SCROLL: u8 = 3;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct InitialOffset {
    #[serde(default)]
    left: f64,
    #[serde(default)]
    top: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MoveSample {
    x: f64,
    y: f64,
    id: NodeId,
    #[serde(rename = "timeOffset", default)]
    time_offset: i64,
}

#[derive(Serialize)]
struct WireOut<'a> {
    #[serde(rename = "type")]
    kind: u8,
    timestamp: u64,
    data: WireDataOut<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireDataOut<'a> {
    Snapshot {
        node: &'a NodeRecord,
        #[serde(rename = "initialOffset")]
        initial_offset: InitialOffset,
    },
    Move {
        source: u8,
        positions: [MoveSample; 1],
    },
    Mouse {
        source: u8,
        #[serde(rename = "type")]
        kind: u8,
        id: NodeId,
        #[serde(skip_serializing_if = "Option::is_none")]
        x: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        y: Option<f64>,
    },
    Scroll {
        source: u8,
        id: NodeId,
        x: f64,
        y: f64,
    },
    Meta(&'a MetaData),
    Custom(&'a CustomData),
}

impl<'a> From<&'a Event> for WireOut<'a> {
    fn from(ev: &'a Event) -> Self {
        let data = match &ev.payload {
            EventPayload::Snapshot(node) => WireDataOut::Snapshot {
                node,
                initial_offset: InitialOffset::default(),
            },
            EventPayload::Interaction(Interaction { node_id, action }) => match *action {
                Action::PointerMove { at } => WireDataOut::Move {
                    source: SOURCE_MOUSE_MOVE,
                    positions: [MoveSample {
                        x: at.x,
                        y: at.y,
                        id: *node_id,
                        time_offset: 0,
                    }],
                },
                Action::Click { at } => WireDataOut::Mouse {
                    source: SOURCE_MOUSE_INTERACTION,
                    kind: MOUSE_CLICK_CODE,
                    id: *node_id,
                    x: Some(at.x),
                    y: Some(at.y),
                },
                Action::PointerInteraction { phase, at } => WireDataOut::Mouse {
                    source: SOURCE_MOUSE_INTERACTION,
                    kind: phase.code(),
                    id: *node_id,
                    x: at.map(|p| p.x),
                    y: at.map(|p| p.y),
                },
                Action::Scroll { offset } => WireDataOut::Scroll {
                    source: SOURCE_SCROLL,
                    id: *node_id,
                    x: offset.x,
                    y: offset.y,
                },
            },
            EventPayload::Meta(meta) => WireDataOut::Meta(meta),
            EventPayload::Custom(custom) => WireDataOut::Custom(custom),
        };
        WireOut {
            kind: ev.kind().code(),
            timestamp: ev.timestamp.0,
            data,
        }
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        WireOut::from(self).serialize(serializer)
    }
}

#[derive(Deserialize)]
struct WireIn {
    #[serde(rename = "type")]
    kind: u8,
    timestamp: u64,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
struct SnapshotIn {
    node: NodeRecord,
}

#[derive(Deserialize)]
struct IncrementalIn {
    source: u8,
    #[serde(rename = "type", default)]
    kind: Option<u8>,
    #[serde(default)]
    id: Option<NodeId>,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    positions: Vec<MoveSample>,
}

fn malformed(kind: u8, timestamp: u64, err: impl std::fmt::Display) -> Error {
    Error::MalformedEvent(format!("type {kind} @ {timestamp}: {err}"))
}

fn decode_incremental(data: IncrementalIn) -> std::result::Result<Option<Interaction>, String> {
    let at = |x: Option<f64>, y: Option<f64>| -> std::result::Result<Position, String> {
        match (x, y) {
            (Some(x), Some(y)) => Ok(Position::new(x, y)),
            _ => Err("missing x/y".to_string()),
        }
    };
    let node = |id: Option<NodeId>| id.ok_or_else(|| "missing id".to_string());

    let interaction = match data.source {
        SOURCE_MOUSE_MOVE => {
            // rrweb 可能把多个采样点合并到一条事件里，取最后一个
            let Some(last) = data.positions.last() else {
                return Err("empty positions".to_string());
            };
            Interaction {
                node_id: last.id,
                action: Action::PointerMove {
                    at: Position::new(last.x, last.y),
                },
            }
        }
        SOURCE_MOUSE_INTERACTION => {
            let code = data.kind.ok_or_else(|| "missing type".to_string())?;
            let action = match PointerPhase::from_code(code) {
                None => Action::Click {
                    at: at(data.x, data.y)?,
                },
                // focus / blur 不带坐标；只给了一半坐标仍算损坏
                Some(phase) => Action::PointerInteraction {
                    phase,
                    at: match (data.x, data.y) {
                        (None, None) => None,
                        (x, y) => Some(at(x, y)?),
                    },
                },
            };
            Interaction {
                node_id: node(data.id)?,
                action,
            }
        }
        SOURCE_SCROLL => Interaction {
            node_id: node(data.id)?,
            action: Action::Scroll {
                offset: at(data.x, data.y)?,
            },
        },
        _ => return Ok(None),
    };
    Ok(Some(interaction))
}

/// 解码一条线上事件。
///
/// 本 crate 不建模的 rrweb 事件（DomContentLoaded、Load、mutation/input 等增量源）
/// 返回 `Ok(None)`；已知种类但字段缺失或类型不对则报 `MalformedEvent`。
pub fn decode_value(value: Value) -> Result<Option<Event>> {
    let WireIn {
        kind,
        timestamp,
        data,
    } = serde_json::from_value(value).map_err(|e| Error::MalformedEvent(e.to_string()))?;
    let Some(event_kind) = EventKind::from_code(kind) else {
        return Ok(None);
    };
    let timestamp_ms = timestamp;
    let timestamp = SessionTime(timestamp);

    let payload = match event_kind {
        EventKind::Snapshot => {
            let SnapshotIn { node } = serde_json::from_value(data)
                .map_err(|e| malformed(kind, timestamp_ms, e))?;
            EventPayload::Snapshot(node)
        }
        EventKind::Interaction => {
            let inc: IncrementalIn = serde_json::from_value(data)
                .map_err(|e| malformed(kind, timestamp_ms, e))?;
            match decode_incremental(inc).map_err(|e| malformed(kind, timestamp_ms, e))? {
                Some(i) => EventPayload::Interaction(i),
                None => return Ok(None),
            }
        }
        EventKind::Meta => EventPayload::Meta(
            serde_json::from_value(data).map_err(|e| malformed(kind, timestamp_ms, e))?,
        ),
        EventKind::Custom => EventPayload::Custom(
            serde_json::from_value(data).map_err(|e| malformed(kind, timestamp_ms, e))?,
        ),
    };
    Ok(Some(Event { timestamp, payload }))
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match decode_value(value) {
            Ok(Some(ev)) => Ok(ev),
            Ok(None) => Err(serde::de::Error::custom("unsupported rrweb event")),
            Err(e) => Err(serde::de::Error::custom(e)),
        }
    }
}
