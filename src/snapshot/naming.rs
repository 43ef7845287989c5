//! 组件命名约定
//!
//! 宿主页面通过专用属性（默认 `data-component`）声明组件身份，与样式 class 无关。
//! 快照构建器和分析器读取同一个属性名。

use super::id::NodeId;
use super::node::NodeRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_COMPONENT_ATTRIBUTE: &str = "data-component";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConvention {
    /// 声明组件名的属性
    pub component_attribute: String,
    /// 没有显式组件名时，依次尝试的“类 name”属性
    pub name_attributes: Vec<String>,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            component_attribute: DEFAULT_COMPONENT_ATTRIBUTE.to_string(),
            name_attributes: vec![
                "name".to_string(),
                "aria-label".to_string(),
                "title".to_string(),
            ],
        }
    }
}

fn non_empty(v: &str) -> Option<&str> {
    let v = v.trim();
    if v.is_empty() { None } else { Some(v) }
}

impl NamingConvention {
    /// 宿主显式声明的组件名（空白值视为未声明）
    pub fn declared<'a>(&self, attributes: &'a BTreeMap<String, String>) -> Option<&'a str> {
        attributes
            .get(&self.component_attribute)
            .and_then(|v| non_empty(v))
    }

    /// 解析一个节点的组件名：显式标注 → 类 name 属性 → `node_<id>`。
    ///
    /// 总能返回一个名字，保证每条交互都可以归属到某个东西上。
    pub fn resolve(&self, node: &NodeRecord) -> String {
        self.resolve_parts(node.id, node.component_name.as_deref(), &node.attributes)
    }

    pub fn resolve_parts(
        &self,
        id: NodeId,
        component_name: Option<&str>,
        attributes: &BTreeMap<String, String>,
    ) -> String {
        if let Some(name) = component_name.and_then(non_empty) {
            return name.to_string();
        }
        if let Some(name) = self.declared(attributes) {
            return name.to_string();
        }
        self.name_attributes
            .iter()
            .find_map(|key| attributes.get(key).and_then(|v| non_empty(v)))
            .map(str::to_string)
            .unwrap_or_else(|| format!("node_{id}"))
    }
}
