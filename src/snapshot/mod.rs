//! 快照树构建
//!
//! 录制开始时对宿主可视化表面做一次只读拷贝，给每个节点分配稳定的整数 id，
//! 并按命名约定标注语义组件名。

mod builder;
mod id;
mod naming;
mod node;
mod surface;

pub use builder::{Snapshot, SnapshotBuilder, build_snapshot};
pub use id::{IdAllocator, NodeId};
pub use naming::{DEFAULT_COMPONENT_ATTRIBUTE, NamingConvention};
pub use node::{NodeRecord, PreOrder};
pub use surface::{DomTree, Surface, SurfaceKey};
