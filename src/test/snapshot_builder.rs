use crate::error::Error;
use crate::snapshot::{
    DomTree, NamingConvention, NodeId, NodeRecord, Surface, SurfaceKey, SnapshotBuilder,
    build_snapshot,
};
use std::cell::Cell;
use std::collections::BTreeMap;

/// body > [div > (a, b)] [span]
fn sample_tree() -> (DomTree, [SurfaceKey; 4]) {
    let mut tree = DomTree::new("body");
    let root = tree.root_key();
    let div = tree.append(root, "div", &[("class", "panel")]).expect("div");
    let a = tree
        .append(div, "button", &[("data-component", "start-recording")])
        .expect("a");
    let b = tree.append(div, "button", &[("name", "cancel")]).expect("b");
    let span = tree.append(root, "span", &[]).expect("span");
    (tree, [div, a, b, span])
}

#[test]
fn ids_are_assigned_in_pre_order_from_first_id() {
    let (tree, [div, a, b, span]) = sample_tree();
    let snap = build_snapshot(&tree, &NamingConvention::default(), 100).expect("snapshot");

    let order: Vec<(u64, &str)> = snap
        .root()
        .iter()
        .map(|n| (n.id.0, n.tag.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            (100, "body"),
            (101, "div"),
            (102, "button"),
            (103, "button"),
            (104, "span"),
        ]
    );
    assert_eq!(snap.node_count(), 5);
    assert_eq!(snap.node_id_for(tree.root_key()), Some(NodeId(100)));
    assert_eq!(snap.node_id_for(div), Some(NodeId(101)));
    assert_eq!(snap.node_id_for(a), Some(NodeId(102)));
    assert_eq!(snap.node_id_for(b), Some(NodeId(103)));
    assert_eq!(snap.node_id_for(span), Some(NodeId(104)));
    assert_eq!(snap.node_id_for(SurfaceKey(999)), None);
}

#[test]
fn declared_component_names_are_captured() {
    let (tree, _) = sample_tree();
    let snap = build_snapshot(&tree, &NamingConvention::default(), 1).expect("snapshot");
    let root = snap.root();

    let start = root.find(NodeId(3)).expect("start button");
    assert_eq!(start.component_name.as_deref(), Some("start-recording"));
    assert_eq!(
        start.attributes.get("data-component").map(String::as_str),
        Some("start-recording")
    );

    // 只有 name 属性的节点不算显式标注
    let cancel = root.find(NodeId(4)).expect("cancel button");
    assert_eq!(cancel.component_name, None);
    assert_eq!(root.component_name, None);
}

#[test]
fn custom_component_attribute_is_honoured() {
    let mut tree = DomTree::new("body");
    let root = tree.root_key();
    tree.append(root, "div", &[("data-testid", "chart"), ("data-component", "x")]);
    let naming = NamingConvention {
        component_attribute: "data-testid".to_string(),
        ..NamingConvention::default()
    };
    let snap = build_snapshot(&tree, &naming, 1).expect("snapshot");
    let div = snap.root().find(NodeId(2)).expect("div");
    assert_eq!(div.component_name.as_deref(), Some("chart"));
}

#[test]
fn blank_component_attribute_is_not_a_name() {
    let mut tree = DomTree::new("body");
    let root = tree.root_key();
    tree.append(root, "div", &[("data-component", "   ")]);
    let snap = build_snapshot(&tree, &NamingConvention::default(), 1).expect("snapshot");
    assert_eq!(snap.root().children[0].component_name, None);
}

#[test]
fn repeated_builds_never_reuse_ids() {
    let (tree, _) = sample_tree();
    let mut builder = SnapshotBuilder::default();
    let first = builder.build(&tree).expect("first");
    let second = builder.build(&tree).expect("second");

    let max_first = first.root().iter().map(|n| n.id).max().expect("nodes");
    let min_second = second.root().iter().map(|n| n.id).min().expect("nodes");
    assert_eq!(max_first, NodeId(5));
    assert_eq!(min_second, NodeId(6));
}

#[test]
fn snapshot_leaves_the_surface_untouched() {
    let (tree, _) = sample_tree();
    let revision = tree.revision();
    let snap = build_snapshot(&tree, &NamingConvention::default(), 1).expect("snapshot");
    assert_eq!(tree.revision(), revision);
    assert_eq!(snap.root().node_count(), 5);
}

#[test]
fn removed_subtree_is_not_captured() {
    let (mut tree, [div, a, _, span]) = sample_tree();
    assert!(tree.remove(div));
    let snap = build_snapshot(&tree, &NamingConvention::default(), 1).expect("snapshot");
    assert_eq!(snap.node_count(), 2);
    assert_eq!(snap.node_id_for(a), None);
    assert_eq!(snap.node_id_for(span), Some(NodeId(2)));
}

/// 在第 `bump_after` 次读取子节点后，revision 变化（模拟宿主在遍历中被改动）
struct MutatingSurface {
    inner: DomTree,
    reads: Cell<u32>,
    bump_after: u32,
}

impl Surface for MutatingSurface {
    fn root(&self) -> SurfaceKey {
        self.inner.root()
    }

    fn tag(&self, key: SurfaceKey) -> Option<String> {
        self.inner.tag(key)
    }

    fn attributes(&self, key: SurfaceKey) -> Option<BTreeMap<String, String>> {
        self.inner.attributes(key)
    }

    fn children(&self, key: SurfaceKey) -> Vec<SurfaceKey> {
        self.reads.set(self.reads.get() + 1);
        self.inner.children(key)
    }

    fn revision(&self) -> u64 {
        if self.reads.get() > self.bump_after {
            self.inner.revision() + 1
        } else {
            self.inner.revision()
        }
    }
}

#[test]
fn mutation_during_traversal_fails_the_whole_snapshot() {
    let (tree, _) = sample_tree();
    let surface = MutatingSurface {
        inner: tree,
        reads: Cell::new(0),
        bump_after: 2,
    };
    let err = build_snapshot(&surface, &NamingConvention::default(), 1)
        .expect_err("mutation must be detected");
    assert!(matches!(err, Error::ConcurrentMutation { .. }), "{err}");
    assert!(err.is_retryable());
}

/// 某个节点在遍历途中消失
struct VanishingSurface {
    inner: DomTree,
    gone: SurfaceKey,
}

impl Surface for VanishingSurface {
    fn root(&self) -> SurfaceKey {
        self.inner.root()
    }

    fn tag(&self, key: SurfaceKey) -> Option<String> {
        if key == self.gone {
            None
        } else {
            self.inner.tag(key)
        }
    }

    fn attributes(&self, key: SurfaceKey) -> Option<BTreeMap<String, String>> {
        self.inner.attributes(key)
    }

    fn children(&self, key: SurfaceKey) -> Vec<SurfaceKey> {
        self.inner.children(key)
    }

    fn revision(&self) -> u64 {
        self.inner.revision()
    }
}

#[test]
fn vanished_node_fails_the_snapshot() {
    let (tree, [_, _, b, _]) = sample_tree();
    let surface = VanishingSurface { inner: tree, gone: b };
    let err = build_snapshot(&surface, &NamingConvention::default(), 1)
        .expect_err("vanished node must be detected");
    assert!(matches!(err, Error::ConcurrentMutation { .. }));
}

#[test]
fn node_record_serializes_with_rrweb_field_names() {
    let node = NodeRecord::new(NodeId(7), "div")
        .with_component("viewer")
        .with_child(NodeRecord::new(NodeId(8), "svg"));
    let v = serde_json::to_value(&node).expect("serialize");
    assert_eq!(v["id"], 7);
    assert_eq!(v["tagName"], "div");
    assert_eq!(v["componentName"], "viewer");
    assert_eq!(v["childNodes"][0]["id"], 8);
    assert!(v["childNodes"][0].get("componentName").is_none());
}
