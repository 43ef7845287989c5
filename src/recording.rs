//! 录制结果与持久化格式
//!
//! 一个 [`Recording`] 是会话内按时间排序的事件序列，录制器停止后即不可变。
//! 落盘格式为 JSON：
//!
//! ```json
//! { "created_at": "...", "user_agent": "...", "url": "...", "rrweb_events": [ ... ] }
//! ```

use crate::error::{Error, Result};
use crate::event::{Event, EventKind, EventPayload, decode_value};
use crate::time::SessionTime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// 录制文件头
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordingHeader {
    pub created_at: DateTime<Utc>,
    pub user_agent: String,
    pub url: String,
}

/// 不可变的录制结果。克隆只增加引用计数，两端可以各自持有独立副本。
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    header: RecordingHeader,
    events: Arc<[Event]>,
}

impl Recording {
    pub fn new(header: RecordingHeader, events: Vec<Event>) -> Self {
        Self {
            header,
            events: events.into(),
        }
    }

    pub fn empty(header: RecordingHeader) -> Self {
        Self::new(header, Vec::new())
    }

    pub fn header(&self) -> &RecordingHeader {
        &self.header
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn count_kind(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    /// 检查良构性：恰好一个 Snapshot，时间戳不递减，Snapshot 不晚于第一条交互
    pub fn validate(&self) -> Result<()> {
        match self.count_kind(EventKind::Snapshot) {
            0 => return Err(Error::MissingSnapshot),
            1 => {}
            count => return Err(Error::MultipleSnapshots { count }),
        }
        let mut last = SessionTime::ZERO;
        let mut seen_snapshot = false;
        for (i, ev) in self.events.iter().enumerate() {
            if i > 0 && ev.timestamp < last {
                return Err(Error::MalformedEvent(format!(
                    "timestamp decreases at index {i} ({} < {})",
                    ev.timestamp.0, last.0
                )));
            }
            last = ev.timestamp;
            match ev.kind() {
                EventKind::Snapshot => seen_snapshot = true,
                EventKind::Interaction if !seen_snapshot => {
                    return Err(Error::MalformedEvent(format!(
                        "interaction at index {i} precedes the snapshot"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn to_json_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn serialized_len(&self) -> Result<usize> {
        Ok(self.to_json_vec()?.len())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json_vec()?)?;
        debug!(path = %path.display(), events = self.len(), "录制已写盘");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Recording> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// 宽松解析：既接受完整的录制文件，也接受只有事件数组的裸 rrweb 导出。
    ///
    /// 本 crate 不建模的 rrweb 事件会被跳过并记录一条 warn；单条损坏的交互事件同样跳过，
    /// 快照、元信息等结构性事件损坏则整体失败。
    pub fn from_json_str(raw: &str) -> Result<Recording> {
        let value: Value = serde_json::from_str(raw)?;
        let (mut header, raw_events, bare) = match value {
            Value::Array(events) => (RecordingHeader::default(), events, true),
            Value::Object(mut doc) => {
                let events = match doc.remove("rrweb_events") {
                    Some(Value::Array(events)) => events,
                    _ => {
                        return Err(Error::MalformedEvent(
                            "missing rrweb_events array".to_string(),
                        ));
                    }
                };
                let header: RecordingHeader = serde_json::from_value(Value::Object(doc))?;
                (header, events, false)
            }
            _ => {
                return Err(Error::MalformedEvent(
                    "expected an object or an event array".to_string(),
                ));
            }
        };

        let total = raw_events.len();
        let mut events = Vec::with_capacity(total);
        let mut malformed = 0usize;
        for value in raw_events {
            let incremental = value.get("type").and_then(Value::as_u64)
                == Some(u64::from(EventKind::Interaction.code()));
            match decode_value(value) {
                Ok(Some(ev)) => events.push(ev),
                Ok(None) => {}
                Err(e) if incremental => {
                    warn!(error = %e, "跳过损坏的交互事件");
                    malformed += 1;
                }
                Err(e) => return Err(e),
            }
        }
        let skipped = total - events.len() - malformed;
        if skipped > 0 {
            warn!(skipped, total, "跳过不支持的 rrweb 事件");
        }

        if bare {
            if let Some(meta) = events.iter().find_map(|e| match &e.payload {
                EventPayload::Meta(m) => Some(m),
                _ => None,
            }) {
                header.url = meta.href.clone();
                header.user_agent = meta.user_agent.clone().unwrap_or_default();
            }
        }
        Ok(Recording::new(header, events))
    }
}

#[derive(Serialize)]
struct DocOut<'a> {
    created_at: &'a DateTime<Utc>,
    user_agent: &'a str,
    url: &'a str,
    rrweb_events: &'a [Event],
}

#[derive(Deserialize)]
struct DocIn {
    created_at: DateTime<Utc>,
    user_agent: String,
    url: String,
    rrweb_events: Vec<Event>,
}

impl Serialize for Recording {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        DocOut {
            created_at: &self.header.created_at,
            user_agent: &self.header.user_agent,
            url: &self.header.url,
            rrweb_events: &self.events,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Recording {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let doc = DocIn::deserialize(deserializer)?;
        Ok(Recording::new(
            RecordingHeader {
                created_at: doc.created_at,
                user_agent: doc.user_agent,
                url: doc.url,
            },
            doc.rrweb_events,
        ))
    }
}
