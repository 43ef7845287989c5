//! 会话时间类型
//!
//! 定义会话内的单调时间（毫秒，从会话开始计）。

use serde::{Deserialize, Serialize};

/// 会话时间（毫秒）。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionTime(pub u64);

impl SessionTime {
    pub const ZERO: SessionTime = SessionTime(0);

    pub fn from_millis(ms: u64) -> SessionTime {
        SessionTime(ms)
    }
    pub fn from_secs(s: u64) -> SessionTime {
        SessionTime(s.saturating_mul(1_000))
    }
    pub fn as_millis(self) -> u64 {
        self.0
    }
    pub fn saturating_sub(self, other: SessionTime) -> u64 {
        self.0.saturating_sub(other.0)
    }
}
