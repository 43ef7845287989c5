//! 标识符类型
//!
//! 定义快照节点的唯一标识符及其会话内分配器。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 节点标识符：会话内唯一，遍历时单调分配，永不复用
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 会话级的节点 id 分配器。
///
/// 起始值由调用方决定（不要求从 0 开始，也不要求和上一个会话连续）。
/// 一次失败的快照尝试会消耗掉已分配的 id，下一次尝试继续往后分配。
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }

    /// 下一个将要分配的 id（不消耗）
    pub fn peek(&self) -> NodeId {
        NodeId(self.next)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}
