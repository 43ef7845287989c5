//! 传输策略选择
//!
//! 策略只取决于序列化后的字节数和注入的阈值，与具体通道无关。

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// 整个录制作为一条消息发送
    Inline,
    /// 按事件条数分批，顺序发送后拼接
    Chunked,
    /// 录制写入共享存储，通道上只传句柄
    Reference,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::Inline => "inline",
            Strategy::Chunked => "chunked",
            Strategy::Reference => "reference",
        };
        f.write_str(s)
    }
}

/// 分档阈值：`size < inline_below` 走 inline，`size >= reference_at` 走 reference，其余分片
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierThresholds {
    pub inline_below: usize,
    pub reference_at: usize,
}

impl TierThresholds {
    /// 由通道上限推导阈值。
    ///
    /// inline 阈值不会超过通道上限；reference 阈值不会低于 inline 阈值。
    pub fn for_channel(
        ceiling: usize,
        inline_max_bytes: Option<usize>,
        reference_min_bytes: usize,
    ) -> Self {
        let inline_below = inline_max_bytes.map_or(ceiling, |v| v.min(ceiling));
        Self {
            inline_below,
            reference_at: reference_min_bytes.max(inline_below),
        }
    }
}

pub fn select_strategy(size_bytes: usize, thresholds: &TierThresholds) -> Strategy {
    if size_bytes < thresholds.inline_below {
        Strategy::Inline
    } else if size_bytes < thresholds.reference_at {
        Strategy::Chunked
    } else {
        Strategy::Reference
    }
}
