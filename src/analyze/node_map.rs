//! 节点 arena
//!
//! 每个快照构建一次，之后按 id 查询；父子关系用 id 表示，不存在循环引用。

use crate::error::{Error, Result};
use crate::snapshot::{NodeId, NodeRecord};
use std::collections::{BTreeMap, HashMap};

/// 拍平后的节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatNode {
    pub id: NodeId,
    pub tag: String,
    pub component_name: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub depth: usize,
}

/// id → 节点 的只读映射，节点按先序存放
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeMap {
    nodes: Vec<FlatNode>,
    index: HashMap<NodeId, usize>,
}

impl NodeMap {
    /// 先序拍平整棵树；同一个 id 出现两次视为快照损坏
    pub fn from_root(root: &NodeRecord) -> Result<Self> {
        let mut map = NodeMap::default();
        let mut stack: Vec<(&NodeRecord, Option<NodeId>, usize)> = vec![(root, None, 0)];
        while let Some((node, parent, depth)) = stack.pop() {
            if map.index.contains_key(&node.id) {
                return Err(Error::MalformedEvent(format!(
                    "duplicate node id {} in snapshot",
                    node.id
                )));
            }
            map.index.insert(node.id, map.nodes.len());
            map.nodes.push(FlatNode {
                id: node.id,
                tag: node.tag.clone(),
                component_name: node.component_name.clone(),
                attributes: node.attributes.clone(),
                parent,
                children: node.children.iter().map(|c| c.id).collect(),
                depth,
            });
            for child in node.children.iter().rev() {
                stack.push((child, Some(node.id), depth + 1));
            }
        }
        Ok(map)
    }

    pub fn get(&self, id: NodeId) -> Option<&FlatNode> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 先序遍历所有节点
    pub fn iter(&self) -> impl Iterator<Item = &FlatNode> {
        self.nodes.iter()
    }

    /// 从根到该节点的 id 路径；节点不存在时为空
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cur = self.get(id);
        while let Some(node) = cur {
            path.push(node.id);
            cur = node.parent.and_then(|p| self.get(p));
        }
        path.reverse();
        path
    }
}
