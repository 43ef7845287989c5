//! 分档传输层
//!
//! `send` 按序列化大小选择 inline / chunked / reference，`receive` 消费信封还原录制。
//! 两端都只读地使用录制；传输失败不会改动调用方手里的录制，可直接重试。

use super::channel::{Channel, Frame};
use super::chunk::{ChunkLimits, Reassembler, encode_chunks_within};
use super::envelope::{EnvelopeDetail, TransferEnvelope};
use super::store::RecordingStore;
use super::strategy::{Strategy, TierThresholds, select_strategy};
use crate::error::{Error, Result};
use crate::recording::Recording;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_REFERENCE_MIN_BYTES: usize = 8 * 1024 * 1024;
pub const DEFAULT_CHUNK_EVENTS: usize = 1_000;
pub const DEFAULT_CHUNK_HEADROOM: f64 = 0.9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// inline 阈值；实际生效值不超过通道上限，缺省即等于通道上限
    pub inline_max_bytes: Option<usize>,
    /// 不小于该字节数的录制走 reference
    pub reference_min_bytes: usize,
    /// 每片的最大事件数
    pub chunk_events: usize,
    /// 每片实际大小允许占用通道上限的比例
    pub chunk_headroom: f64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            inline_max_bytes: None,
            reference_min_bytes: DEFAULT_REFERENCE_MIN_BYTES,
            chunk_events: DEFAULT_CHUNK_EVENTS,
            chunk_headroom: DEFAULT_CHUNK_HEADROOM,
        }
    }
}

impl TransferConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_events == 0 {
            return Err(Error::InvalidConfig("chunk_events must be > 0".to_string()));
        }
        if !(self.chunk_headroom > 0.0 && self.chunk_headroom <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "chunk_headroom must be in (0, 1], got {}",
                self.chunk_headroom
            )));
        }
        Ok(())
    }
}

pub struct TransferLayer {
    config: TransferConfig,
    store: Arc<dyn RecordingStore>,
}

impl TransferLayer {
    pub fn new(config: TransferConfig, store: Arc<dyn RecordingStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    pub fn thresholds_for(&self, ceiling: usize) -> TierThresholds {
        TierThresholds::for_channel(
            ceiling,
            self.config.inline_max_bytes,
            self.config.reference_min_bytes,
        )
    }

    /// 分片限制：条数取配置值，目标大小为通道上限乘以余量比例
    pub fn chunk_limits(&self, ceiling: usize) -> ChunkLimits {
        ChunkLimits {
            max_events: self.config.chunk_events.max(1),
            target_bytes: (ceiling as f64 * self.config.chunk_headroom) as usize,
            ceiling,
        }
    }

    /// 按大小自动选择策略发送。
    ///
    /// 选中 chunked 但有单条事件独占一片仍超过通道上限时，升级为 reference。
    #[tracing::instrument(skip_all, fields(events = recording.len()))]
    pub fn send(
        &self,
        recording: &Recording,
        channel: &mut dyn Channel,
    ) -> Result<TransferEnvelope> {
        let bytes = recording.to_json_vec()?;
        let total_bytes = bytes.len();
        let ceiling = channel.max_message_bytes();
        let thresholds = self.thresholds_for(ceiling);
        let strategy = select_strategy(total_bytes, &thresholds);
        debug!(size = total_bytes, ?thresholds, %strategy, "选择传输策略");

        let detail = match strategy {
            Strategy::Inline => self.send_inline(bytes, channel)?,
            Strategy::Chunked => {
                let limits = self.chunk_limits(ceiling);
                match encode_chunks_within(recording, limits) {
                    Ok(chunks) => self.send_chunks(chunks, channel)?,
                    Err(Error::PayloadTooLarge { bytes: single, .. }) => {
                        warn!(single, ceiling, "单条事件超过通道上限，改走 reference");
                        self.send_reference(recording, channel)?
                    }
                    Err(e) => return Err(e),
                }
            }
            Strategy::Reference => self.send_reference(recording, channel)?,
        };
        Ok(self.sent(recording, total_bytes, detail))
    }

    /// 用指定策略发送；负载放不进通道时立即失败，不降级也不截断
    pub fn send_with(
        &self,
        recording: &Recording,
        strategy: Strategy,
        channel: &mut dyn Channel,
    ) -> Result<TransferEnvelope> {
        let bytes = recording.to_json_vec()?;
        let total_bytes = bytes.len();
        let detail = match strategy {
            Strategy::Inline => self.send_inline(bytes, channel)?,
            Strategy::Chunked => {
                let limits = self.chunk_limits(channel.max_message_bytes());
                self.send_chunks(encode_chunks_within(recording, limits)?, channel)?
            }
            Strategy::Reference => self.send_reference(recording, channel)?,
        };
        Ok(self.sent(recording, total_bytes, detail))
    }

    fn send_inline(&self, bytes: Vec<u8>, channel: &mut dyn Channel) -> Result<EnvelopeDetail> {
        let ceiling = channel.max_message_bytes();
        if bytes.len() > ceiling {
            warn!(total_bytes = bytes.len(), ceiling, "inline 负载超过通道上限");
            return Err(Error::PayloadTooLarge {
                bytes: bytes.len(),
                ceiling,
            });
        }
        channel.send(Frame::Inline { payload: bytes })?;
        Ok(EnvelopeDetail::Inline)
    }

    /// 分片已按上限切好，发送时不会出现发出一半才失败的情况
    fn send_chunks(
        &self,
        chunks: Vec<Vec<u8>>,
        channel: &mut dyn Channel,
    ) -> Result<EnvelopeDetail> {
        let chunk_count = chunks.len() as u32;
        let batch_events = self.config.chunk_events.max(1);
        let pipelined = channel.in_order();
        for (seq, payload) in chunks.into_iter().enumerate() {
            let seq = seq as u32;
            channel.send(Frame::Chunk { seq, payload })?;
            if !pipelined {
                channel.wait_ack(seq)?;
            }
        }
        debug!(chunk_count, batch_events, pipelined, "分片发送完成");
        Ok(EnvelopeDetail::Chunked {
            chunk_count,
            batch_events,
        })
    }

    /// 句柄帧发不出去时撤回存储副本，不留下无人引用的录制
    fn send_reference(
        &self,
        recording: &Recording,
        channel: &mut dyn Channel,
    ) -> Result<EnvelopeDetail> {
        let handle = self.store.put(recording)?;
        if let Err(e) = channel.send(Frame::Reference {
            handle: handle.clone(),
        }) {
            match self.store.remove(&handle) {
                Ok(_) => debug!(%handle, "句柄发送失败，已撤回存储副本"),
                Err(cleanup) => warn!(%handle, error = %cleanup, "撤回存储副本失败"),
            }
            return Err(e);
        }
        Ok(EnvelopeDetail::Reference { handle })
    }

    fn sent(
        &self,
        recording: &Recording,
        total_bytes: usize,
        detail: EnvelopeDetail,
    ) -> TransferEnvelope {
        let envelope = TransferEnvelope {
            total_bytes,
            event_count: recording.len(),
            detail,
        };
        info!(
            strategy = %envelope.strategy(),
            total_bytes,
            event_count = envelope.event_count,
            "📤 录制已发送"
        );
        envelope
    }

    /// 消费信封，从通道（以及 reference 时的存储）还原录制
    #[tracing::instrument(skip_all, fields(strategy = %envelope.strategy()))]
    pub fn receive(
        &self,
        envelope: TransferEnvelope,
        channel: &mut dyn Channel,
    ) -> Result<Recording> {
        let TransferEnvelope {
            event_count,
            detail,
            ..
        } = envelope;

        let recording = match detail {
            EnvelopeDetail::Inline => match channel.recv()? {
                Frame::Inline { payload } => serde_json::from_slice::<Recording>(&payload)?,
                other => return Err(unexpected("inline", &other)),
            },
            EnvelopeDetail::Chunked { chunk_count, .. } => {
                let mut reassembler = Reassembler::new();
                while reassembler.received() < chunk_count {
                    match channel.recv()? {
                        Frame::Chunk { seq, payload } => reassembler.accept(seq, &payload)?,
                        other => return Err(unexpected("chunk", &other)),
                    }
                }
                reassembler.finish()?
            }
            EnvelopeDetail::Reference { handle } => {
                match channel.recv()? {
                    Frame::Reference { handle: got } if got == handle => {}
                    Frame::Reference { handle: got } => {
                        return Err(Error::HandleMismatch {
                            expected: handle,
                            got,
                        });
                    }
                    other => return Err(unexpected("reference", &other)),
                }
                let recording = self.store.get(&handle)?;
                if self.store.retention().delete_on_receive {
                    self.store.remove(&handle)?;
                    debug!(%handle, "接收完成，删除存储副本");
                }
                recording
            }
        };

        if recording.len() != event_count {
            return Err(Error::MalformedFrame(format!(
                "expected {event_count} events, received {}",
                recording.len()
            )));
        }
        info!(events = recording.len(), "📥 录制已接收");
        Ok(recording)
    }
}

fn unexpected(expected: &str, got: &Frame) -> Error {
    let kind = match got {
        Frame::Inline { .. } => "inline",
        Frame::Chunk { .. } => "chunk",
        Frame::Reference { .. } => "reference",
    };
    Error::MalformedFrame(format!("expected {expected} frame, got {kind}"))
}
