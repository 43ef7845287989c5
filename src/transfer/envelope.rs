use super::strategy::Strategy;
use serde::{Deserialize, Serialize};

/// 策略相关的元数据
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum EnvelopeDetail {
    Inline,
    /// `batch_events` 是每片的条数上限；实际每片还受通道上限约束
    Chunked { chunk_count: u32, batch_events: usize },
    Reference { handle: String },
}

/// 描述一次录制是如何被搬运的。
///
/// 录制定稿准备传输时创建，接收方消费恰好一次后丢弃（因此不实现 `Clone`）。
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEnvelope {
    pub total_bytes: usize,
    pub event_count: usize,
    #[serde(flatten)]
    pub detail: EnvelopeDetail,
}

impl TransferEnvelope {
    pub fn strategy(&self) -> Strategy {
        match self.detail {
            EnvelopeDetail::Inline => Strategy::Inline,
            EnvelopeDetail::Chunked { .. } => Strategy::Chunked,
            EnvelopeDetail::Reference { .. } => Strategy::Reference,
        }
    }
}
