//! 交互来源
//!
//! 每个来源持有一个 [`InputSender`]，把原始输入投递到录制器的单消费者队列；
//! 投递从不阻塞，录制器停止后投递会被忽略。

use crate::event::Action;
use crate::snapshot::SurfaceKey;
use crate::time::SessionTime;
use serde_json::{Map, Value};
use std::sync::mpsc::Sender;
use tracing::debug;
use uuid::Uuid;

/// 交互来源种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Pointer,
    Click,
    Scroll,
}

/// 来源投递的一条原始输入
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawInput {
    /// 产生输入的宿主节点
    pub source: SurfaceKey,
    pub action: Action,
    pub timestamp: SessionTime,
}

#[derive(Debug)]
pub(crate) enum Message {
    Input(SourceKind, RawInput),
    Custom {
        timestamp: SessionTime,
        tag: String,
        payload: Map<String, Value>,
    },
}

impl Message {
    pub(crate) fn timestamp(&self) -> SessionTime {
        match self {
            Message::Input(_, input) => input.timestamp,
            Message::Custom { timestamp, .. } => *timestamp,
        }
    }
}

/// 某个交互来源的投递端
#[derive(Debug, Clone)]
pub struct InputSender {
    kind: SourceKind,
    tx: Sender<Message>,
}

impl InputSender {
    pub(crate) fn new(kind: SourceKind, tx: Sender<Message>) -> Self {
        Self { kind, tx }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// 投递一条输入；录制已停止（来源已被取消订阅）时返回 `false`
    pub fn deliver(&self, input: RawInput) -> bool {
        let ok = self.tx.send(Message::Input(self.kind, input)).is_ok();
        if !ok {
            debug!(kind = ?self.kind, "来源已取消订阅，丢弃输入");
        }
        ok
    }
}

/// 录制句柄：标识一次录制会话，并可在带外追加 Custom 事件
#[derive(Debug, Clone)]
pub struct RecordingHandle {
    session: Uuid,
    tx: Sender<Message>,
}

impl RecordingHandle {
    pub(crate) fn new(session: Uuid, tx: Sender<Message>) -> Self {
        Self { session, tx }
    }

    pub fn session_id(&self) -> Uuid {
        self.session
    }

    pub(crate) fn sender(&self, kind: SourceKind) -> InputSender {
        InputSender::new(kind, self.tx.clone())
    }

    /// 追加一条 Custom 事件；会话已结束时返回 `false`
    pub fn append_custom(
        &self,
        timestamp: SessionTime,
        tag: impl Into<String>,
        payload: Map<String, Value>,
    ) -> bool {
        self.tx
            .send(Message::Custom {
                timestamp,
                tag: tag.into(),
                payload,
            })
            .is_ok()
    }
}
