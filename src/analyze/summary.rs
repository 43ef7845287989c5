//! 组件级交互汇总
//!
//! 由交互序列折叠而来，随时可以从录制重新计算，从不作为事实来源持久化。

use crate::event::ActionKind;
use crate::time::SessionTime;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ComponentSummary {
    pub pointer_moves: u64,
    pub clicks: u64,
    pub scrolls: u64,
    pub pointer_interactions: u64,
    pub first_seen: Option<SessionTime>,
    pub last_seen: Option<SessionTime>,
}

impl ComponentSummary {
    pub fn record(&mut self, action: ActionKind, at: SessionTime) {
        match action {
            ActionKind::PointerMove => self.pointer_moves += 1,
            ActionKind::Click => self.clicks += 1,
            ActionKind::Scroll => self.scrolls += 1,
            ActionKind::PointerInteraction => self.pointer_interactions += 1,
        }
        self.first_seen = Some(self.first_seen.map_or(at, |t| t.min(at)));
        self.last_seen = Some(self.last_seen.map_or(at, |t| t.max(at)));
    }

    pub fn count(&self, action: ActionKind) -> u64 {
        match action {
            ActionKind::PointerMove => self.pointer_moves,
            ActionKind::Click => self.clicks,
            ActionKind::Scroll => self.scrolls,
            ActionKind::PointerInteraction => self.pointer_interactions,
        }
    }

    pub fn total(&self) -> u64 {
        ActionKind::ALL.iter().map(|a| self.count(*a)).sum()
    }
}
