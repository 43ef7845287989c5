//! 分片与重组
//!
//! 分片按事件条数和序列化字节数切分；第 0 片额外携带录制文件头。接收方只接受严格递增的序号，
//! 一旦乱序整个传输作废，需从头重传。

use crate::error::{Error, Result};
use crate::event::Event;
use crate::recording::{Recording, RecordingHeader};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct ChunkOut<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    header: Option<&'a RecordingHeader>,
    events: &'a [Event],
}

#[derive(Deserialize)]
struct ChunkIn {
    #[serde(default)]
    header: Option<RecordingHeader>,
    events: Vec<Event>,
}

/// 分片限制：条数上限、目标字节数，以及任何一片都不能超过的硬上限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLimits {
    pub max_events: usize,
    /// 贪心装箱时每片的目标大小，不超过 `ceiling`
    pub target_bytes: usize,
    pub ceiling: usize,
}

impl ChunkLimits {
    /// 只按条数切分
    pub fn by_count(max_events: usize) -> Self {
        Self {
            max_events,
            target_bytes: usize::MAX,
            ceiling: usize::MAX,
        }
    }
}

/// 把录制切成若干批，每批至多 `batch_events` 条事件，返回每批序列化后的字节。
///
/// 空录制也会产出一片（只含文件头）。
pub fn encode_chunks(recording: &Recording, batch_events: usize) -> Result<Vec<Vec<u8>>> {
    encode_chunks_within(recording, ChunkLimits::by_count(batch_events))
}

/// 按条数和实际序列化字节数贪心切分。
///
/// 每条事件先单独序列化量出长度，片的大小 = 空片外壳 + 事件长度之和 + 分隔逗号，
/// 与最终写出的字节数一致。第 0 片的外壳包含文件头。一片只要还放得下就继续装，
/// 条数到上限或超过目标大小就另起一片；单条事件独占一片仍超过 `ceiling` 时报
/// `PayloadTooLarge`。
pub fn encode_chunks_within(recording: &Recording, limits: ChunkLimits) -> Result<Vec<Vec<u8>>> {
    let max_events = limits.max_events.max(1);
    let target = limits.target_bytes.min(limits.ceiling);
    let header = recording.header();
    let events = recording.events();

    let first_shell = serde_json::to_vec(&ChunkOut {
        header: Some(header),
        events: &[],
    })?
    .len();
    let rest_shell = serde_json::to_vec(&ChunkOut {
        header: None,
        events: &[],
    })?
    .len();
    let sizes = events
        .iter()
        .map(|ev| -> Result<usize> { Ok(serde_json::to_vec(ev)?.len()) })
        .collect::<Result<Vec<usize>>>()?;

    if events.is_empty() && first_shell > limits.ceiling {
        return Err(Error::PayloadTooLarge {
            bytes: first_shell,
            ceiling: limits.ceiling,
        });
    }

    let mut bounds = Vec::new();
    let mut start = 0;
    let mut size = first_shell;
    for (i, &len) in sizes.iter().enumerate() {
        let held = i - start;
        let grown = size + len + usize::from(held > 0);
        if held > 0 && (held >= max_events || grown > target) {
            bounds.push(start..i);
            start = i;
            size = rest_shell + len;
        } else {
            size = grown;
        }
        if i == start && size > limits.ceiling {
            return Err(Error::PayloadTooLarge {
                bytes: size,
                ceiling: limits.ceiling,
            });
        }
    }
    bounds.push(start..events.len());

    bounds
        .into_iter()
        .enumerate()
        .map(|(i, range)| -> Result<Vec<u8>> {
            let out = ChunkOut {
                header: (i == 0).then_some(header),
                events: &events[range],
            };
            Ok(serde_json::to_vec(&out)?)
        })
        .collect()
}

/// 按接收顺序拼接分片
#[derive(Debug, Default)]
pub struct Reassembler {
    next_seq: u32,
    header: Option<RecordingHeader>,
    events: Vec<Event>,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> u32 {
        self.next_seq
    }

    /// 接收一片。序号必须等于期望值，否则报 `ChunkOrderViolation`
    pub fn accept(&mut self, seq: u32, payload: &[u8]) -> Result<()> {
        if seq != self.next_seq {
            return Err(Error::ChunkOrderViolation {
                expected: self.next_seq,
                got: seq,
            });
        }
        let chunk: ChunkIn = serde_json::from_slice(payload)?;
        match (seq, chunk.header) {
            (0, Some(h)) => self.header = Some(h),
            (0, None) => {
                return Err(Error::MalformedFrame(
                    "first chunk carries no header".to_string(),
                ));
            }
            (_, Some(_)) => {
                return Err(Error::MalformedFrame(format!(
                    "chunk {seq} carries a header"
                )));
            }
            (_, None) => {}
        }
        self.events.extend(chunk.events);
        self.next_seq += 1;
        Ok(())
    }

    pub fn finish(self) -> Result<Recording> {
        let header = self
            .header
            .ok_or_else(|| Error::MalformedFrame("no chunks received".to_string()))?;
        Ok(Recording::new(header, self.events))
    }
}
