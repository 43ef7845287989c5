//! 快照构建器
//!
//! 对宿主树做一次深度优先、先序遍历，为每个节点分配会话内唯一的 id，
//! 并记录宿主句柄到 id 的映射，供录制器做身份查找。

use super::id::{IdAllocator, NodeId};
use super::naming::NamingConvention;
use super::node::NodeRecord;
use super::surface::{Surface, SurfaceKey};
use crate::error::{Error, Result};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// 一次完整的快照：节点树 + 宿主句柄到节点 id 的索引
#[derive(Debug, Clone)]
pub struct Snapshot {
    root: NodeRecord,
    index: HashMap<SurfaceKey, NodeId>,
}

impl Snapshot {
    pub fn root(&self) -> &NodeRecord {
        &self.root
    }

    pub fn into_root(self) -> NodeRecord {
        self.root
    }

    /// 宿主节点对应的快照 id；不在被跟踪的表面内则返回 `None`
    pub fn node_id_for(&self, key: SurfaceKey) -> Option<NodeId> {
        self.index.get(&key).copied()
    }

    pub fn node_count(&self) -> usize {
        self.index.len()
    }
}

/// 快照构建器：持有会话级的 id 分配器，多次构建不会复用 id
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    naming: NamingConvention,
    ids: IdAllocator,
}

impl SnapshotBuilder {
    pub fn new(naming: NamingConvention, first_id: u64) -> Self {
        Self {
            naming,
            ids: IdAllocator::starting_at(first_id),
        }
    }

    pub fn naming(&self) -> &NamingConvention {
        &self.naming
    }

    /// 遍历宿主树生成快照。
    ///
    /// 子节点列表在递归前就被整体拷贝出来；遍历结束后若宿主 revision 变化，
    /// 或遍历途中某个节点消失，则整体失败为 `ConcurrentMutation`，不返回半成品。
    #[tracing::instrument(skip_all, fields(first_id = self.ids.peek().0))]
    pub fn build<S: Surface + ?Sized>(&mut self, surface: &S) -> Result<Snapshot> {
        let before = surface.revision();
        let mut index = HashMap::new();
        let root = self.visit(surface, surface.root(), before, &mut index)?;

        let after = surface.revision();
        if after != before {
            warn!(before, after, "快照期间宿主树发生变化，放弃本次快照");
            return Err(Error::ConcurrentMutation { before, after });
        }

        info!(nodes = index.len(), root_id = root.id.0, "📸 快照完成");
        Ok(Snapshot { root, index })
    }

    fn visit<S: Surface + ?Sized>(
        &mut self,
        surface: &S,
        key: SurfaceKey,
        before: u64,
        index: &mut HashMap<SurfaceKey, NodeId>,
    ) -> Result<NodeRecord> {
        let vanished = || Error::ConcurrentMutation {
            before,
            after: surface.revision(),
        };
        let tag = surface.tag(key).ok_or_else(vanished)?;
        let attributes = surface.attributes(key).ok_or_else(vanished)?;
        let children = surface.children(key);

        let id = self.ids.next_id();
        index.insert(key, id);
        let component_name = self.naming.declared(&attributes).map(str::to_string);
        if let Some(name) = &component_name {
            debug!(id = id.0, component = %name, "标注组件");
        }

        let mut record = NodeRecord {
            id,
            tag,
            component_name,
            attributes,
            children: Vec::with_capacity(children.len()),
        };
        for child in children {
            record
                .children
                .push(self.visit(surface, child, before, index)?);
        }
        Ok(record)
    }
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self::new(NamingConvention::default(), 1)
    }
}

/// 便捷函数：用给定约定和起始 id 构建一次快照
pub fn build_snapshot<S: Surface + ?Sized>(
    surface: &S,
    naming: &NamingConvention,
    first_id: u64,
) -> Result<Snapshot> {
    SnapshotBuilder::new(naming.clone(), first_id).build(surface)
}
