//! 回放队列中的事件
//!
//! 只存事件在录制里的下标，不拷贝事件本身。

use crate::time::SessionTime;
use std::cmp::Ordering;

pub(crate) struct ScheduledEvent {
    pub(crate) at: SessionTime,
    pub(crate) seq: u64,
    pub(crate) index: usize,
}

// BinaryHeap 是 max-heap；我们需要最小时间优先，因此反向比较。
impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.at.cmp(&other.at) {
            Ordering::Equal => self.seq.cmp(&other.seq),
            ord => ord,
        }
        .reverse()
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for ScheduledEvent {}
