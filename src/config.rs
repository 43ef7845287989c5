//! 流水线配置
//!
//! JSON 文档，每一节都有默认值，缺省的字段按默认处理。

use crate::error::{Error, Result};
use crate::snapshot::NamingConvention;
use crate::transfer::{RetentionPolicy, TransferConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// 会话内第一个节点 id（rrweb 从 1 开始编号）
    pub first_id: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self { first_id: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub dir: PathBuf,
    pub retention: RetentionPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("recordings"),
            retention: RetentionPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub naming: NamingConvention,
    pub snapshot: SnapshotConfig,
    pub transfer: TransferConfig,
    pub store: StoreConfig,
}

impl PipelineConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let cfg: PipelineConfig = serde_json::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// 有路径就读文件，否则用默认值
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_path(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.naming.component_attribute.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "naming.component_attribute must not be empty".to_string(),
            ));
        }
        self.transfer.validate()
    }
}
