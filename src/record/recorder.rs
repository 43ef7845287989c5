//! 事件录制器
//!
//! 单线程协作式模型：来源把输入投递到 mpsc 通道，录制器是唯一的消费者，
//! 在 `pump`/`stop` 时把积压的输入按时间顺序追加到内存日志。
//! 录制器内部不做任何 I/O，落盘与传输都发生在 `stop` 之后。

use super::pending::PendingInput;
use super::source::{InputSender, Message, RecordingHandle, SourceKind};
use crate::event::{Event, MetaData};
use crate::recording::{Recording, RecordingHeader};
use crate::snapshot::Snapshot;
use crate::time::SessionTime;
use chrono::Utc;
use std::collections::BinaryHeap;
use std::sync::mpsc::{self, Receiver};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

/// 会话级信息，写入 Meta 事件和录制文件头
#[derive(Debug, Clone, Default)]
pub struct SessionInfo {
    pub url: String,
    pub user_agent: String,
    pub width: u32,
    pub height: u32,
}

/// 录制统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecorderStats {
    /// 已写入日志的事件数（含 Snapshot/Meta）
    pub recorded: u64,
    /// 目标节点不在快照内而被丢弃的输入
    pub dropped_unknown_node: u64,
    /// 时间戳早于日志末尾、被钳到末尾时间的输入
    pub clamped: u64,
}

struct ActiveSession {
    handle: RecordingHandle,
    rx: Receiver<Message>,
    snapshot: Snapshot,
    header: RecordingHeader,
    events: Vec<Event>,
    pending: BinaryHeap<PendingInput>,
    next_seq: u64,
    last_ts: SessionTime,
}

/// 事件录制器：同一时刻至多一个活动会话，无进程级全局状态
#[derive(Default)]
pub struct Recorder {
    active: Option<ActiveSession>,
    stats: RecorderStats,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    pub fn stats(&self) -> RecorderStats {
        self.stats
    }

    /// 开始录制：以快照作为第一条事件，随后是 Meta。
    ///
    /// 已在录制时是幂等的空操作，直接返回现有句柄（传入的快照被丢弃）。
    #[tracing::instrument(skip_all, fields(url = %info.url))]
    pub fn start(&mut self, snapshot: Snapshot, info: SessionInfo) -> RecordingHandle {
        if let Some(active) = &self.active {
            debug!(session = %active.handle.session_id(), "已在录制，返回现有句柄");
            return active.handle.clone();
        }

        let (tx, rx) = mpsc::channel();
        let handle = RecordingHandle::new(Uuid::new_v4(), tx);
        let header = RecordingHeader {
            created_at: Utc::now(),
            user_agent: info.user_agent.clone(),
            url: info.url.clone(),
        };
        let events = vec![
            Event::snapshot(SessionTime::ZERO, snapshot.root().clone()),
            Event::meta(
                SessionTime::ZERO,
                MetaData {
                    href: info.url,
                    width: info.width,
                    height: info.height,
                    user_agent: Some(info.user_agent),
                },
            ),
        ];
        self.stats = RecorderStats {
            recorded: events.len() as u64,
            ..RecorderStats::default()
        };

        info!(
            session = %handle.session_id(),
            nodes = snapshot.node_count(),
            "▶️  开始录制"
        );
        self.active = Some(ActiveSession {
            handle: handle.clone(),
            rx,
            snapshot,
            header,
            events,
            pending: BinaryHeap::new(),
            next_seq: 0,
            last_ts: SessionTime::ZERO,
        });
        handle
    }

    /// 为一个交互来源订阅投递端；未在录制时返回 `None`
    pub fn subscribe(&mut self, kind: SourceKind) -> Option<InputSender> {
        let active = self.active.as_ref()?;
        debug!(?kind, "订阅交互来源");
        Some(active.handle.sender(kind))
    }

    /// 把通道里积压的输入全部追加到日志，返回本次新增的事件数
    pub fn pump(&mut self) -> usize {
        let Some(active) = self.active.as_mut() else {
            return 0;
        };
        Self::drain(active, &mut self.stats)
    }

    fn drain(active: &mut ActiveSession, stats: &mut RecorderStats) -> usize {
        while let Ok(msg) = active.rx.try_recv() {
            let seq = active.next_seq;
            active.next_seq = active.next_seq.wrapping_add(1);
            active.pending.push(PendingInput {
                at: msg.timestamp(),
                seq,
                msg,
            });
        }

        let before = active.events.len();
        while let Some(item) = active.pending.pop() {
            let clamped = item.at < active.last_ts;
            let at = item.at.max(active.last_ts);

            let event = match item.msg {
                Message::Input(kind, input) => {
                    match active.snapshot.node_id_for(input.source) {
                        Some(node_id) => Event::interaction(at, node_id, input.action),
                        None => {
                            debug!(?kind, source = ?input.source, "输入不在被跟踪的表面内，丢弃");
                            stats.dropped_unknown_node += 1;
                            continue;
                        }
                    }
                }
                Message::Custom {
                    tag, payload, ..
                } => Event::custom(at, tag, payload),
            };
            if clamped {
                trace!(at = item.at.0, last = active.last_ts.0, "输入时间早于日志末尾，钳位");
                stats.clamped += 1;
            }
            active.last_ts = at;
            active.events.push(event);
        }

        let added = active.events.len() - before;
        stats.recorded += added as u64;
        added
    }

    /// 停止录制并返回不可变的录制结果。
    ///
    /// 未在录制、或句柄不属于当前会话时，记录一条 warn 并返回空录制。
    #[tracing::instrument(skip_all, fields(session = %handle.session_id()))]
    pub fn stop(&mut self, handle: &RecordingHandle) -> Recording {
        let matches = self
            .active
            .as_ref()
            .is_some_and(|a| a.handle.session_id() == handle.session_id());
        if !matches {
            warn!(
                recording = self.is_recording(),
                "stop 调用时没有与句柄对应的录制，返回空录制"
            );
            return Recording::empty(RecordingHeader {
                created_at: Utc::now(),
                ..RecordingHeader::default()
            });
        }

        let Some(mut active) = self.active.take() else {
            return Recording::empty(RecordingHeader::default());
        };
        Self::drain(&mut active, &mut self.stats);
        // 丢掉接收端即取消所有来源的订阅
        let ActiveSession { header, events, .. } = active;

        info!(
            events = events.len(),
            dropped = self.stats.dropped_unknown_node,
            clamped = self.stats.clamped,
            "⏹️  录制结束"
        );
        Recording::new(header, events)
    }
}
