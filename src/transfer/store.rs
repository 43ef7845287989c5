//! reference 策略的共享存储
//!
//! 存储跨会话共享；每次写入使用新生成的 UUID v4 作为句柄，并发会话不会互相覆盖。
//! 保留策略是显式配置：按 TTL 淘汰，可选在接收成功后立即删除。

use crate::error::{Error, Result};
use crate::recording::Recording;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionPolicy {
    /// 写入超过该时长的录制会被淘汰；`None` 表示永不按时间淘汰
    pub ttl_secs: Option<u64>,
    /// 接收方成功取回后删除存储副本
    pub delete_on_receive: bool,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            ttl_secs: Some(DEFAULT_TTL_SECS),
            delete_on_receive: false,
        }
    }
}

impl RetentionPolicy {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }

    fn expired(&self, age: Duration) -> bool {
        self.ttl().is_some_and(|ttl| age >= ttl)
    }
}

/// 可通过不透明句柄寻址的录制存储
pub trait RecordingStore: Send + Sync {
    fn put(&self, recording: &Recording) -> Result<String>;
    fn get(&self, handle: &str) -> Result<Recording>;
    fn remove(&self, handle: &str) -> Result<bool>;
    /// 按保留策略淘汰过期录制，返回淘汰条数
    fn evict_expired(&self) -> Result<usize>;
    fn retention(&self) -> &RetentionPolicy;
}

fn new_handle() -> String {
    Uuid::new_v4().to_string()
}

/// 句柄必须是 UUID，防止被拼成任意路径
fn check_handle(handle: &str) -> Result<()> {
    Uuid::parse_str(handle)
        .map(|_| ())
        .map_err(|_| Error::UnknownHandle(handle.to_string()))
}

/// 只有存储自己写出的 `<uuid>.json` 和残留的 `<uuid>.json.tmp` 才归它管
fn owned_by_store(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.strip_suffix(".json.tmp")
        .or_else(|| name.strip_suffix(".json"))
        .is_some_and(|stem| check_handle(stem).is_ok())
}

/// 目录存储：每条录制一个 `<handle>.json` 文件
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    retention: RetentionPolicy,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>, retention: RetentionPolicy) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, retention })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, handle: &str) -> PathBuf {
        self.dir.join(format!("{handle}.json"))
    }
}

impl RecordingStore for FileStore {
    fn put(&self, recording: &Recording) -> Result<String> {
        let evicted = self.evict_expired()?;
        if evicted > 0 {
            debug!(evicted, "写入前淘汰过期录制");
        }
        let handle = new_handle();
        let path = self.path_for(&handle);
        // 先写临时文件再改名，读方不会看到写了一半的文件
        let tmp = self.dir.join(format!("{handle}.json.tmp"));
        fs::write(&tmp, recording.to_json_vec()?)?;
        fs::rename(&tmp, &path)?;
        info!(%handle, path = %path.display(), "💾 录制已写入存储");
        Ok(handle)
    }

    fn get(&self, handle: &str) -> Result<Recording> {
        check_handle(handle)?;
        let path = self.path_for(handle);
        if !path.exists() {
            return Err(Error::UnknownHandle(handle.to_string()));
        }
        Recording::load(&path)
    }

    fn remove(&self, handle: &str) -> Result<bool> {
        check_handle(handle)?;
        match fs::remove_file(self.path_for(handle)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn evict_expired(&self) -> Result<usize> {
        if self.retention.ttl().is_none() {
            return Ok(0);
        }
        let now = SystemTime::now();
        let mut evicted = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            // 目录里可能还有用户自己的文件，一律不碰
            if !owned_by_store(&path) {
                continue;
            }
            let modified = fs::metadata(&path)?.modified()?;
            let age = now.duration_since(modified).unwrap_or_default();
            if self.retention.expired(age) {
                match fs::remove_file(&path) {
                    Ok(()) => evicted += 1,
                    Err(e) => warn!(path = %path.display(), error = %e, "淘汰录制失败"),
                }
            }
        }
        Ok(evicted)
    }

    fn retention(&self) -> &RetentionPolicy {
        &self.retention
    }
}

/// 进程内存储，供同进程的两端或测试使用
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (Instant, Recording)>>,
    retention: RetentionPolicy,
}

impl MemoryStore {
    pub fn new(retention: RetentionPolicy) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            retention,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, (Instant, Recording)>> {
        // 持锁期间不会 panic，中毒时直接沿用内部数据
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl RecordingStore for MemoryStore {
    fn put(&self, recording: &Recording) -> Result<String> {
        self.evict_expired()?;
        let handle = new_handle();
        self.lock()
            .insert(handle.clone(), (Instant::now(), recording.clone()));
        Ok(handle)
    }

    fn get(&self, handle: &str) -> Result<Recording> {
        self.lock()
            .get(handle)
            .map(|(_, r)| r.clone())
            .ok_or_else(|| Error::UnknownHandle(handle.to_string()))
    }

    fn remove(&self, handle: &str) -> Result<bool> {
        Ok(self.lock().remove(handle).is_some())
    }

    fn evict_expired(&self) -> Result<usize> {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, (at, _)| !self.retention.expired(at.elapsed()));
        Ok(before - entries.len())
    }

    fn retention(&self) -> &RetentionPolicy {
        &self.retention
    }
}
