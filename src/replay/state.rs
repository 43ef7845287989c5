//! 重建出的可视状态
//!
//! 不追求像素级还原，只保证按事件顺序忠实地重建：节点树加上最后已知的指针与滚动位置。

use crate::event::{Action, Event, EventPayload, PointerPhase, Position};
use crate::snapshot::{NodeId, NodeRecord};
use crate::time::SessionTime;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointerState {
    pub node_id: NodeId,
    pub position: Position,
    /// 最近一次按下后尚未抬起
    pub pressed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClickState {
    pub node_id: NodeId,
    pub position: Position,
    pub at: SessionTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualState {
    /// 已应用到的逻辑时间
    pub at: SessionTime,
    pub tree: NodeRecord,
    pub url: Option<String>,
    pub viewport: Option<(u32, u32)>,
    pub pointer: Option<PointerState>,
    pub last_click: Option<ClickState>,
    /// 每个节点最后的滚动偏移
    pub scroll: BTreeMap<NodeId, Position>,
    /// 已应用的 Custom 事件 tag（按时间顺序）
    pub custom_tags: Vec<String>,
    pub applied_events: usize,
}

impl VisualState {
    pub fn initial(tree: NodeRecord, at: SessionTime) -> Self {
        Self {
            at,
            tree,
            url: None,
            viewport: None,
            pointer: None,
            last_click: None,
            scroll: BTreeMap::new(),
            custom_tags: Vec::new(),
            applied_events: 0,
        }
    }

    fn move_pointer(&mut self, node_id: NodeId, position: Position) {
        let pressed = self.pointer.is_some_and(|p| p.pressed);
        self.pointer = Some(PointerState {
            node_id,
            position,
            pressed,
        });
    }

    /// 应用一条增量事件
    pub fn apply(&mut self, ev: &Event) {
        self.at = self.at.max(ev.timestamp);
        self.applied_events += 1;
        match &ev.payload {
            // 初始快照在构造时已经放进来了
            EventPayload::Snapshot(_) => {}
            EventPayload::Meta(meta) => {
                self.url = Some(meta.href.clone());
                self.viewport = Some((meta.width, meta.height));
            }
            EventPayload::Custom(c) => self.custom_tags.push(c.tag.clone()),
            EventPayload::Interaction(i) => match i.action {
                Action::PointerMove { at } => self.move_pointer(i.node_id, at),
                Action::Click { at } => {
                    self.move_pointer(i.node_id, at);
                    self.last_click = Some(ClickState {
                        node_id: i.node_id,
                        position: at,
                        at: ev.timestamp,
                    });
                }
                Action::Scroll { offset } => {
                    self.scroll.insert(i.node_id, offset);
                }
                Action::PointerInteraction { phase, at } => {
                    if let Some(at) = at {
                        self.move_pointer(i.node_id, at);
                    }
                    if let Some(p) = self.pointer.as_mut() {
                        match phase {
                            PointerPhase::Down | PointerPhase::TouchStart => p.pressed = true,
                            PointerPhase::Up | PointerPhase::TouchEnd | PointerPhase::TouchCancel => {
                                p.pressed = false
                            }
                            _ => {}
                        }
                    }
                }
            },
        }
    }
}
