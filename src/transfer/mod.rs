//! 分档传输
//!
//! 在尺寸受限的通道上搬运录制：小的整条发送，中等的按事件分片，
//! 大的落到共享存储只传句柄。

mod channel;
mod chunk;
mod envelope;
mod layer;
mod store;
mod strategy;

pub use channel::{Channel, Frame, MemoryChannel};
pub use chunk::{ChunkLimits, Reassembler, encode_chunks, encode_chunks_within};
pub use envelope::{EnvelopeDetail, TransferEnvelope};
pub use layer::{
    DEFAULT_CHUNK_EVENTS, DEFAULT_CHUNK_HEADROOM, DEFAULT_REFERENCE_MIN_BYTES, TransferConfig,
    TransferLayer,
};
pub use store::{DEFAULT_TTL_SECS, FileStore, MemoryStore, RecordingStore, RetentionPolicy};
pub use strategy::{Strategy, TierThresholds, select_strategy};
