//! 宿主可视化表面
//!
//! 快照构建器只通过 [`Surface`] 只读地遍历宿主树；[`DomTree`] 是一个内存实现，
//! 供演示程序和测试使用。

use std::collections::BTreeMap;

/// 宿主节点句柄（由宿主分配，对本 crate 不透明）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceKey(pub usize);

/// 可深度优先遍历的宿主节点树。
///
/// `revision` 在任何结构或属性变更后必须改变；构建器据此检测遍历期间的并发修改。
/// 对已被移除的节点，`tag`/`attributes` 返回 `None`。
pub trait Surface {
    fn root(&self) -> SurfaceKey;
    fn tag(&self, key: SurfaceKey) -> Option<String>;
    fn attributes(&self, key: SurfaceKey) -> Option<BTreeMap<String, String>>;
    /// 子节点句柄的快照副本（按文档顺序）
    fn children(&self, key: SurfaceKey) -> Vec<SurfaceKey>;
    fn revision(&self) -> u64;
}

#[derive(Debug, Clone)]
struct DomNode {
    tag: String,
    attributes: BTreeMap<String, String>,
    children: Vec<SurfaceKey>,
    parent: Option<SurfaceKey>,
    detached: bool,
}

/// 内存中的 DOM 风格节点树（arena 存储）
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<DomNode>,
    revision: u64,
}

impl DomTree {
    pub fn new(root_tag: &str) -> Self {
        Self {
            nodes: vec![DomNode {
                tag: root_tag.to_string(),
                attributes: BTreeMap::new(),
                children: Vec::new(),
                parent: None,
                detached: false,
            }],
            revision: 0,
        }
    }

    pub fn root_key(&self) -> SurfaceKey {
        SurfaceKey(0)
    }

    fn live(&self, key: SurfaceKey) -> Option<&DomNode> {
        self.nodes.get(key.0).filter(|n| !n.detached)
    }

    /// 在 `parent` 下追加一个子节点；父节点不存在时返回 `None`
    pub fn append(
        &mut self,
        parent: SurfaceKey,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> Option<SurfaceKey> {
        self.live(parent)?;
        let key = SurfaceKey(self.nodes.len());
        self.nodes.push(DomNode {
            tag: tag.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            children: Vec::new(),
            parent: Some(parent),
            detached: false,
        });
        self.nodes[parent.0].children.push(key);
        self.revision += 1;
        Some(key)
    }

    pub fn set_attribute(&mut self, key: SurfaceKey, name: &str, value: &str) -> bool {
        match self.nodes.get_mut(key.0).filter(|n| !n.detached) {
            Some(node) => {
                node.attributes.insert(name.to_string(), value.to_string());
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    /// 把节点及其子树从树上摘除（根节点不可摘除）
    pub fn remove(&mut self, key: SurfaceKey) -> bool {
        let Some(parent) = self.live(key).and_then(|n| n.parent) else {
            return false;
        };
        self.nodes[parent.0].children.retain(|c| *c != key);
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            let node = &mut self.nodes[k.0];
            node.detached = true;
            stack.extend(node.children.iter().copied());
        }
        self.revision += 1;
        true
    }

    /// 按属性值查找第一个活着的节点（先序）
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<SurfaceKey> {
        let mut stack = vec![self.root_key()];
        while let Some(key) = stack.pop() {
            let node = self.live(key)?;
            if node.attributes.get(name).map(String::as_str) == Some(value) {
                return Some(key);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }
}

impl Surface for DomTree {
    fn root(&self) -> SurfaceKey {
        self.root_key()
    }

    fn tag(&self, key: SurfaceKey) -> Option<String> {
        self.live(key).map(|n| n.tag.clone())
    }

    fn attributes(&self, key: SurfaceKey) -> Option<BTreeMap<String, String>> {
        self.live(key).map(|n| n.attributes.clone())
    }

    fn children(&self, key: SurfaceKey) -> Vec<SurfaceKey> {
        self.live(key).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}
