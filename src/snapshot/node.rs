//! 快照节点
//!
//! 快照时捕获的只读节点树。父节点独占子节点，树无环且有唯一根。

use super::id::NodeId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 快照中的一个节点（JSON 字段名与 rrweb 的 serialized node 保持一致）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    /// rrweb 的 document/text 节点没有 tagName，解码时按空串处理
    #[serde(rename = "tagName", default)]
    pub tag: String,
    /// 宿主声明的语义组件名；缺省表示未标注，身份退回到 tag + attributes
    #[serde(
        rename = "componentName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub component_name: Option<String>,
    /// rrweb 会把 `checked` 之类写成布尔、把 `rr_*` 写成数字，统一转成文本
    #[serde(default, deserialize_with = "lenient_attributes")]
    pub attributes: BTreeMap<String, String>,
    #[serde(rename = "childNodes", default)]
    pub children: Vec<NodeRecord>,
}

impl NodeRecord {
    pub fn new(id: NodeId, tag: impl Into<String>) -> Self {
        Self {
            id,
            tag: tag.into(),
            component_name: None,
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_component(mut self, name: impl Into<String>) -> Self {
        self.component_name = Some(name.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: NodeRecord) -> Self {
        self.children.push(child);
        self
    }

    /// 深度优先、先序遍历整棵子树（包括自身）
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    pub fn find(&self, id: NodeId) -> Option<&NodeRecord> {
        self.iter().find(|n| n.id == id)
    }
}

fn lenient_attributes<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, String>, D::Error> {
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s,
                other => other.to_string(),
            };
            Some((key, text))
        })
        .collect())
}

/// 先序遍历迭代器
pub struct PreOrder<'a> {
    stack: Vec<&'a NodeRecord>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a NodeRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // 逆序压栈，保证左边的孩子先出栈
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
