//! 受限通道
//!
//! 通道是外部协作方，对单条消息大小有上限；上限由通道告知，不在本层写死。

use crate::error::{Error, Result};
use std::collections::VecDeque;
use tracing::trace;

/// 通道上的一帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Inline { payload: Vec<u8> },
    Chunk { seq: u32, payload: Vec<u8> },
    Reference { handle: String },
}

impl Frame {
    /// 计入通道上限的字节数
    pub fn payload_len(&self) -> usize {
        match self {
            Frame::Inline { payload } | Frame::Chunk { payload, .. } => payload.len(),
            Frame::Reference { handle } => handle.len(),
        }
    }
}

pub trait Channel {
    /// 单条消息的最大字节数
    fn max_message_bytes(&self) -> usize;
    /// 通道是否保证按发送顺序投递；不保证时发送方逐片等待确认
    fn in_order(&self) -> bool {
        true
    }
    fn send(&mut self, frame: Frame) -> Result<()>;
    fn wait_ack(&mut self, seq: u32) -> Result<()>;
    fn recv(&mut self) -> Result<Frame>;
}

/// 内存通道：FIFO 队列，发送时强制检查上限
#[derive(Debug)]
pub struct MemoryChannel {
    ceiling: usize,
    in_order: bool,
    frames: VecDeque<Frame>,
    acked: Vec<u32>,
}

impl MemoryChannel {
    pub fn new(ceiling: usize) -> Self {
        Self {
            ceiling,
            in_order: true,
            frames: VecDeque::new(),
            acked: Vec::new(),
        }
    }

    /// 声明通道不保证顺序，迫使发送方逐片确认
    pub fn unordered(mut self) -> Self {
        self.in_order = false;
        self
    }

    pub fn pending(&self) -> usize {
        self.frames.len()
    }

    pub fn acked(&self) -> &[u32] {
        &self.acked
    }

    /// 交换两条尚未接收的帧（模拟乱序投递）
    pub fn swap_pending(&mut self, a: usize, b: usize) {
        self.frames.swap(a, b);
    }
}

impl Channel for MemoryChannel {
    fn max_message_bytes(&self) -> usize {
        self.ceiling
    }

    fn in_order(&self) -> bool {
        self.in_order
    }

    fn send(&mut self, frame: Frame) -> Result<()> {
        let bytes = frame.payload_len();
        if bytes > self.ceiling {
            return Err(Error::PayloadTooLarge {
                bytes,
                ceiling: self.ceiling,
            });
        }
        trace!(bytes, queued = self.frames.len(), "帧入队");
        self.frames.push_back(frame);
        Ok(())
    }

    fn wait_ack(&mut self, seq: u32) -> Result<()> {
        self.acked.push(seq);
        Ok(())
    }

    fn recv(&mut self) -> Result<Frame> {
        self.frames.pop_front().ok_or(Error::ChannelClosed)
    }
}
