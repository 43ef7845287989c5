//! 错误类型
//!
//! 结构性错误（违反数据模型不变量）一律向调用方返回，不做静默修补；
//! 单条事件级别的可恢复问题（例如引用了未知节点的交互）降级为诊断信息，不走这里。

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// 快照遍历期间宿主树发生了变化
    #[error("surface mutated during snapshot (revision {before} -> {after})")]
    ConcurrentMutation { before: u64, after: u64 },

    /// inline 传输的负载超过通道上限
    #[error("payload of {bytes} bytes exceeds channel ceiling of {ceiling} bytes")]
    PayloadTooLarge { bytes: usize, ceiling: usize },

    /// 接收端看到了乱序的分片
    #[error("chunk out of order: expected seq {expected}, got {got}")]
    ChunkOrderViolation { expected: u32, got: u32 },

    #[error("recording has no snapshot event")]
    MissingSnapshot,

    #[error("recording has {count} snapshot events, expected exactly one")]
    MultipleSnapshots { count: usize },

    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("malformed transfer frame: {0}")]
    MalformedFrame(String),

    #[error("transfer channel closed")]
    ChannelClosed,

    #[error("no stored recording for handle {0}")]
    UnknownHandle(String),

    #[error("reference handle mismatch: envelope {expected}, frame {got}")]
    HandleMismatch { expected: String, got: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// 原样重试同一操作是否可能成功
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::ConcurrentMutation { .. }
                | Error::ChunkOrderViolation { .. }
                | Error::ChannelClosed
                | Error::Io(_)
        )
    }
}
