//! 回放驱动
//!
//! 维护逻辑时间与事件队列，从初始快照出发按 (时间戳, 录制顺序) 逐条应用事件。
//! 只借用录制，不修改；同样的参数重复调用得到同样的结果。

use super::scheduled::ScheduledEvent;
use super::state::VisualState;
use crate::analyze::Analyzer;
use crate::error::Result;
use crate::event::{Event, EventKind};
use crate::recording::Recording;
use crate::time::SessionTime;
use std::collections::BinaryHeap;
use tracing::{debug, trace};

pub struct Player<'a> {
    recording: &'a Recording,
    q: BinaryHeap<ScheduledEvent>,
    state: VisualState,
}

impl<'a> Player<'a> {
    /// 以录制中唯一的 Snapshot 为初始状态，其余事件全部入队
    pub fn new(recording: &'a Recording) -> Result<Self> {
        let root = Analyzer::single_snapshot(recording)?;
        let start = recording
            .events()
            .iter()
            .find(|e| e.kind() == EventKind::Snapshot)
            .map_or(SessionTime::ZERO, |e| e.timestamp);

        let q = recording
            .events()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.kind() != EventKind::Snapshot)
            .map(|(index, e)| ScheduledEvent {
                at: e.timestamp,
                seq: index as u64,
                index,
            })
            .collect::<BinaryHeap<_>>();

        debug!(queued = q.len(), start = start.0, "回放队列就绪");
        Ok(Self {
            recording,
            q,
            state: VisualState::initial(root.clone(), start),
        })
    }

    pub fn now(&self) -> SessionTime {
        self.state.at
    }

    pub fn state(&self) -> &VisualState {
        &self.state
    }

    pub fn into_state(self) -> VisualState {
        self.state
    }

    pub fn remaining(&self) -> usize {
        self.q.len()
    }

    /// 下一条待应用事件的时间
    pub fn next_at(&self) -> Option<SessionTime> {
        self.q.peek().map(|top| top.at)
    }

    /// 应用下一条事件并返回它；队列为空时返回 `None`
    pub fn step(&mut self) -> Option<&'a Event> {
        let item = self.q.pop()?;
        let ev = &self.recording.events()[item.index];
        trace!(at = item.at.0, kind = %ev.kind(), "应用事件");
        self.state.apply(ev);
        Some(ev)
    }

    /// 应用所有 `timestamp <= until` 的事件，并把逻辑时间推进到 `until`
    pub fn run_until(&mut self, until: SessionTime) {
        while let Some(top) = self.q.peek() {
            if top.at > until {
                break;
            }
            self.step();
        }
        self.state.at = self.state.at.max(until);
    }
}

/// 重建 `offset` 时刻的可视状态
#[tracing::instrument(skip(recording), fields(events = recording.len()))]
pub fn state_at(recording: &Recording, offset: SessionTime) -> Result<VisualState> {
    let mut player = Player::new(recording)?;
    player.run_until(offset);
    Ok(player.into_state())
}
