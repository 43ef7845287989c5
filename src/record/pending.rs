//! 待落盘的输入
//!
//! 录制器从通道取出输入后先放进最小堆，按 (时间戳, 到达序号) 出堆追加到日志。

use crate::time::SessionTime;
use std::cmp::Ordering;

use super::source::Message;

/// 带到达序号的待处理消息
pub(crate) struct PendingInput {
    pub(crate) at: SessionTime,
    pub(crate) seq: u64,
    pub(crate) msg: Message,
}

// BinaryHeap 是 max-heap；我们需要最小时间优先，因此反向比较。
impl Ord for PendingInput {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.at.cmp(&other.at) {
            Ordering::Equal => self.seq.cmp(&other.seq),
            ord => ord,
        }
        .reverse()
    }
}

impl PartialOrd for PendingInput {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PendingInput {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for PendingInput {}
