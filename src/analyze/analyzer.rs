//! 组件分析器
//!
//! 从录制唯一的 Snapshot 重建 id → 节点映射，把每条交互解析到组件名，
//! 再按组件名聚合。引用未知节点的交互被排除并计数，不会中断分析。

use super::node_map::NodeMap;
use super::summary::ComponentSummary;
use crate::error::{Error, Result};
use crate::event::{ActionKind, EventKind, EventPayload};
use crate::recording::Recording;
use crate::snapshot::{NamingConvention, NodeId, NodeRecord};
use crate::time::SessionTime;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// 解析后的一条交互
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionRecord {
    pub timestamp: SessionTime,
    pub component_name: String,
    pub action: ActionKind,
    pub node_id: NodeId,
}

/// 非致命诊断
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// 交互引用的节点不在快照里
    DroppedInteraction {
        timestamp: SessionTime,
        node_id: NodeId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    #[serde(skip)]
    pub node_map: NodeMap,
    pub interactions: Vec<InteractionRecord>,
    pub summary: BTreeMap<String, ComponentSummary>,
    pub dropped_count: usize,
    pub diagnostics: Vec<Diagnostic>,
    /// 各类事件条数
    pub event_counts: BTreeMap<EventKind, usize>,
    /// Custom 事件按 tag 计数
    pub custom_tags: BTreeMap<String, usize>,
}

impl Analysis {
    pub fn interaction_event_count(&self) -> usize {
        self.interactions.len() + self.dropped_count
    }

    /// 所有组件上某类动作的总数
    pub fn total(&self, action: ActionKind) -> u64 {
        self.summary.values().map(|s| s.count(action)).sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    naming: NamingConvention,
}

impl Analyzer {
    pub fn new(naming: NamingConvention) -> Self {
        Self { naming }
    }

    /// 找出唯一的 Snapshot；没有或多于一个都是结构性错误
    pub fn single_snapshot(recording: &Recording) -> Result<&NodeRecord> {
        let mut snapshots = recording.events().iter().filter_map(|e| match &e.payload {
            EventPayload::Snapshot(root) => Some(root),
            _ => None,
        });
        let first = snapshots.next().ok_or(Error::MissingSnapshot)?;
        let extra = snapshots.count();
        if extra > 0 {
            return Err(Error::MultipleSnapshots { count: extra + 1 });
        }
        Ok(first)
    }

    #[tracing::instrument(skip_all, fields(events = recording.len()))]
    pub fn analyze(&self, recording: &Recording) -> Result<Analysis> {
        let root = Self::single_snapshot(recording)?;
        let node_map = NodeMap::from_root(root)?;
        debug!(nodes = node_map.len(), "重建节点映射");

        // 组件名按节点缓存，同一节点只解析一次
        let names: BTreeMap<NodeId, String> = node_map
            .iter()
            .map(|n| {
                let name =
                    self.naming
                        .resolve_parts(n.id, n.component_name.as_deref(), &n.attributes);
                (n.id, name)
            })
            .collect();

        let mut interactions = Vec::new();
        let mut diagnostics = Vec::new();
        let mut event_counts = BTreeMap::new();
        let mut custom_tags = BTreeMap::new();

        for ev in recording.events() {
            *event_counts.entry(ev.kind()).or_insert(0) += 1;
            match &ev.payload {
                EventPayload::Interaction(i) => match names.get(&i.node_id) {
                    Some(name) => interactions.push(InteractionRecord {
                        timestamp: ev.timestamp,
                        component_name: name.clone(),
                        action: i.action.kind(),
                        node_id: i.node_id,
                    }),
                    None => diagnostics.push(Diagnostic::DroppedInteraction {
                        timestamp: ev.timestamp,
                        node_id: i.node_id,
                    }),
                },
                EventPayload::Custom(c) => *custom_tags.entry(c.tag.clone()).or_insert(0) += 1,
                _ => {}
            }
        }

        let mut summary: BTreeMap<String, ComponentSummary> = BTreeMap::new();
        for rec in &interactions {
            summary
                .entry(rec.component_name.clone())
                .or_default()
                .record(rec.action, rec.timestamp);
        }

        let dropped_count = diagnostics.len();
        if dropped_count > 0 {
            warn!(dropped_count, "部分交互引用了快照外的节点，已排除");
        }
        info!(
            interactions = interactions.len(),
            components = summary.len(),
            "🔎 分析完成"
        );

        Ok(Analysis {
            node_map,
            interactions,
            summary,
            dropped_count,
            diagnostics,
            event_counts,
            custom_tags,
        })
    }
}

/// 用默认命名约定分析
pub fn analyze(recording: &Recording) -> Result<Analysis> {
    Analyzer::default().analyze(recording)
}
