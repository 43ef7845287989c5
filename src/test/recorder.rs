use crate::event::{Action, EventKind, EventPayload, Position};
use crate::record::{RawInput, Recorder, SessionInfo, SourceKind};
use crate::snapshot::{DomTree, NamingConvention, NodeId, Snapshot, SurfaceKey, build_snapshot};
use crate::time::SessionTime;
use serde_json::Map;

/// body > [button(start), div(viewer)]
fn surface() -> (DomTree, SurfaceKey, SurfaceKey) {
    let mut tree = DomTree::new("body");
    let root = tree.root_key();
    let button = tree
        .append(root, "button", &[("data-component", "start-recording")])
        .expect("button");
    let viewer = tree
        .append(root, "div", &[("data-component", "main-visualization")])
        .expect("viewer");
    (tree, button, viewer)
}

fn snapshot(tree: &DomTree) -> Snapshot {
    build_snapshot(tree, &NamingConvention::default(), 1).expect("snapshot")
}

fn info() -> SessionInfo {
    SessionInfo {
        url: "http://localhost/".to_string(),
        user_agent: "ua".to_string(),
        width: 800,
        height: 600,
    }
}

fn click(source: SurfaceKey, ms: u64) -> RawInput {
    RawInput {
        source,
        action: Action::Click {
            at: Position::new(1.0, 2.0),
        },
        timestamp: SessionTime(ms),
    }
}

#[test]
fn recording_begins_with_snapshot_then_meta() {
    let (tree, button, _) = surface();
    let mut recorder = Recorder::new();
    let handle = recorder.start(snapshot(&tree), info());
    let clicks = recorder.subscribe(SourceKind::Click).expect("subscribe");
    assert!(clicks.deliver(click(button, 120)));

    let rec = recorder.stop(&handle);
    let kinds: Vec<EventKind> = rec.events().iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec![EventKind::Snapshot, EventKind::Meta, EventKind::Interaction]
    );
    assert_eq!(rec.events()[0].timestamp, SessionTime::ZERO);
    let i = rec.events()[2].as_interaction().expect("interaction");
    assert_eq!(i.node_id, NodeId(2));
    assert_eq!(rec.header().url, "http://localhost/");
    rec.validate().expect("valid recording");
}

#[test]
fn start_while_recording_returns_the_existing_handle() {
    let (tree, _, _) = surface();
    let mut recorder = Recorder::new();
    let first = recorder.start(snapshot(&tree), info());
    let second = recorder.start(snapshot(&tree), info());
    assert_eq!(first.session_id(), second.session_id());

    let rec = recorder.stop(&second);
    assert_eq!(rec.count_kind(EventKind::Snapshot), 1);
    assert!(!recorder.is_recording());
}

#[test]
fn stop_without_recording_yields_empty() {
    let (tree, _, _) = surface();
    let mut recorder = Recorder::new();
    let handle = recorder.start(snapshot(&tree), info());
    let full = recorder.stop(&handle);
    assert_eq!(full.len(), 2);

    // 同一个句柄再 stop 一次
    let again = recorder.stop(&handle);
    assert!(again.is_empty());
}

#[test]
fn stale_handle_does_not_stop_the_active_session() {
    let (tree, _, _) = surface();
    let mut recorder = Recorder::new();
    let old = recorder.start(snapshot(&tree), info());
    recorder.stop(&old);

    let current = recorder.start(snapshot(&tree), info());
    assert_ne!(old.session_id(), current.session_id());
    assert!(recorder.stop(&old).is_empty());
    assert!(recorder.is_recording());
    assert_eq!(recorder.stop(&current).len(), 2);
}

#[test]
fn subscribe_requires_an_active_session() {
    let mut recorder = Recorder::new();
    assert!(recorder.subscribe(SourceKind::Pointer).is_none());
    assert_eq!(recorder.pump(), 0);
}

#[test]
fn inputs_outside_the_snapshot_are_dropped() {
    let (mut tree, button, _) = surface();
    let snap = snapshot(&tree);
    // 快照之后才加入的节点不在索引里
    let late = tree
        .append(tree.root_key(), "span", &[])
        .expect("late node");

    let mut recorder = Recorder::new();
    let handle = recorder.start(snap, info());
    let clicks = recorder.subscribe(SourceKind::Click).expect("subscribe");
    clicks.deliver(click(late, 10));
    clicks.deliver(click(button, 20));

    let rec = recorder.stop(&handle);
    assert_eq!(rec.count_kind(EventKind::Interaction), 1);
    assert_eq!(recorder.stats().dropped_unknown_node, 1);
    assert_eq!(recorder.stats().recorded, 3);
}

#[test]
fn pending_inputs_are_appended_in_timestamp_order() {
    let (tree, button, viewer) = surface();
    let mut recorder = Recorder::new();
    let handle = recorder.start(snapshot(&tree), info());
    let clicks = recorder.subscribe(SourceKind::Click).expect("click");
    let scroll = recorder.subscribe(SourceKind::Scroll).expect("scroll");

    scroll.deliver(RawInput {
        source: viewer,
        action: Action::Scroll {
            offset: Position::new(0.0, 120.0),
        },
        timestamp: SessionTime(340),
    });
    clicks.deliver(click(button, 120));
    assert_eq!(recorder.pump(), 2);

    let rec = recorder.stop(&handle);
    let ts: Vec<u64> = rec.events().iter().map(|e| e.timestamp.0).collect();
    assert_eq!(ts, vec![0, 0, 120, 340]);
}

#[test]
fn late_inputs_are_clamped_to_the_log_tail() {
    let (tree, button, _) = surface();
    let mut recorder = Recorder::new();
    let handle = recorder.start(snapshot(&tree), info());
    let clicks = recorder.subscribe(SourceKind::Click).expect("click");

    clicks.deliver(click(button, 100));
    recorder.pump();
    clicks.deliver(click(button, 50));
    clicks.deliver(click(button, 200));

    let rec = recorder.stop(&handle);
    let ts: Vec<u64> = rec.events().iter().map(|e| e.timestamp.0).collect();
    assert_eq!(ts, vec![0, 0, 100, 100, 200]);
    assert_eq!(recorder.stats().clamped, 1);
    rec.validate().expect("still ordered");
}

#[test]
fn stopping_unsubscribes_every_source() {
    let (tree, button, _) = surface();
    let mut recorder = Recorder::new();
    let handle = recorder.start(snapshot(&tree), info());
    let pointer = recorder.subscribe(SourceKind::Pointer).expect("pointer");
    let rec = recorder.stop(&handle);

    let moved = RawInput {
        source: button,
        action: Action::PointerMove {
            at: Position::new(0.0, 0.0),
        },
        timestamp: SessionTime(5),
    };
    assert!(!pointer.deliver(moved));
    assert!(!handle.append_custom(SessionTime(6), "late", Map::new()));
    // 已返回的录制不受影响
    assert_eq!(rec.len(), 2);
}

#[test]
fn custom_events_are_recorded_with_their_tag() {
    let (tree, _, _) = surface();
    let mut recorder = Recorder::new();
    let handle = recorder.start(snapshot(&tree), info());
    assert!(handle.append_custom(SessionTime(30), "canvas-snapshot", Map::new()));

    let rec = recorder.stop(&handle);
    let tags: Vec<&str> = rec
        .events()
        .iter()
        .filter_map(|e| match &e.payload {
            EventPayload::Custom(c) => Some(c.tag.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(tags, vec!["canvas-snapshot"]);
}

#[test]
fn consecutive_sessions_are_independent() {
    let (tree, button, _) = surface();
    let mut recorder = Recorder::new();

    let h1 = recorder.start(snapshot(&tree), info());
    let c1 = recorder.subscribe(SourceKind::Click).expect("click");
    c1.deliver(click(button, 10));
    let first = recorder.stop(&h1);

    let h2 = recorder.start(snapshot(&tree), info());
    let second = recorder.stop(&h2);

    assert_eq!(first.len(), 3);
    assert_eq!(second.len(), 2);
    assert_eq!(recorder.stats().recorded, 2);
}
