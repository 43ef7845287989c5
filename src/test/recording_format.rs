use super::fixtures::{header, scenario_recording, scenario_root};
use crate::error::Error;
use crate::event::{Action, Event, EventKind, EventPayload, PointerPhase, Position};
use crate::recording::{Recording, RecordingHeader};
use crate::snapshot::NodeId;
use crate::time::SessionTime;
use serde_json::{Value, json};

#[test]
fn document_layout_matches_the_persisted_format() {
    let rec = scenario_recording();
    let v: Value = serde_json::from_slice(&rec.to_json_vec().expect("encode")).expect("json");
    assert_eq!(v["created_at"], "2025-01-02T03:04:05Z");
    assert_eq!(v["user_agent"], "test-agent/1.0");
    assert_eq!(v["url"], "http://localhost:5006/app");
    let events = v["rrweb_events"].as_array().expect("events array");
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["type"], 2);
    assert_eq!(events[0]["data"]["node"]["id"], 1);
}

#[test]
fn encoded_recording_decodes_to_an_equal_recording() {
    let rec = scenario_recording();
    let bytes = rec.to_json_vec().expect("encode");
    let back: Recording = serde_json::from_slice(&bytes).expect("decode");
    assert_eq!(back, rec);
    assert_eq!(back.to_json_vec().expect("re-encode"), bytes);
    assert_eq!(rec.serialized_len().expect("len"), bytes.len());
}

#[test]
fn save_and_load_through_a_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("session.json");
    let rec = scenario_recording();
    rec.save(&path).expect("save");
    let back = Recording::load(&path).expect("load");
    assert_eq!(back, rec);
}

#[test]
fn bare_event_array_is_accepted() {
    let raw = json!([
        { "type": 4, "timestamp": 0, "data": { "href": "http://example.test/", "width": 1024, "height": 768, "userAgent": "ua/2" } },
        { "type": 2, "timestamp": 0, "data": { "node": { "id": 1, "tagName": "body", "childNodes": [] }, "initialOffset": { "left": 0, "top": 0 } } },
        { "type": 0, "timestamp": 1, "data": {} },
        { "type": 3, "timestamp": 10, "data": { "source": 2, "type": 2, "id": 1, "x": 3.0, "y": 4.0 } },
        { "type": 3, "timestamp": 12, "data": { "source": 5, "id": 1, "text": "hi", "isChecked": false } }
    ])
    .to_string();

    let rec = Recording::from_json_str(&raw).expect("lenient parse");
    assert_eq!(rec.len(), 3);
    assert_eq!(rec.header().url, "http://example.test/");
    assert_eq!(rec.header().user_agent, "ua/2");
    assert_eq!(rec.count_kind(EventKind::Interaction), 1);
}

#[test]
fn dashboard_dump_with_focus_events_loads() {
    let raw = json!([
        { "type": 2, "timestamp": 1700000000001u64, "data": { "node": { "id": 1, "tagName": "body", "childNodes": [
            { "id": 2, "tagName": "button", "attributes": { "id": "start-recording" }, "childNodes": [] }
        ] } } },
        { "type": 3, "timestamp": 1700000000100u64, "data": { "source": 2, "type": 2, "id": 2, "x": 10.0, "y": 12.0 } },
        { "type": 3, "timestamp": 1700000000101u64, "data": { "source": 2, "type": 5, "id": 2 } },
        { "type": 3, "timestamp": 1700000000180u64, "data": { "source": 2, "type": 6, "id": 2 } }
    ])
    .to_string();

    let rec = Recording::from_json_str(&raw).expect("lenient parse");
    assert_eq!(rec.count_kind(EventKind::Interaction), 3);
    assert_eq!(
        rec.events()[2].as_interaction().map(|i| i.action),
        Some(Action::PointerInteraction {
            phase: PointerPhase::Focus,
            at: None
        })
    );
}

#[test]
fn broken_interactions_are_skipped_but_broken_snapshots_are_not() {
    let raw = json!([
        { "type": 2, "timestamp": 0, "data": { "node": { "id": 1, "tagName": "body", "childNodes": [] } } },
        { "type": 3, "timestamp": 5, "data": { "source": 3, "id": 1 } },
        { "type": 3, "timestamp": 10, "data": { "source": 2, "type": 2, "id": 1, "x": 3.0, "y": 4.0 } }
    ])
    .to_string();
    let rec = Recording::from_json_str(&raw).expect("lenient parse");
    assert_eq!(rec.len(), 2);
    assert_eq!(rec.count_kind(EventKind::Interaction), 1);

    let broken_snapshot = json!([
        { "type": 2, "timestamp": 0, "data": { "node": "oops" } }
    ])
    .to_string();
    assert!(matches!(
        Recording::from_json_str(&broken_snapshot),
        Err(Error::MalformedEvent(_))
    ));
}

#[test]
fn non_string_attributes_are_kept_as_text() {
    let raw = json!([
        { "type": 2, "timestamp": 1700000000001u64, "data": { "node": { "id": 1, "tagName": "body", "childNodes": [
            { "id": 2, "tagName": "input", "attributes": { "type": "checkbox", "checked": true, "rr_width": 120, "value": null }, "childNodes": [] }
        ] } } }
    ])
    .to_string();

    let rec = Recording::from_json_str(&raw).expect("parse");
    let root = rec
        .events()
        .iter()
        .find_map(|e| match &e.payload {
            EventPayload::Snapshot(node) => Some(node),
            _ => None,
        })
        .expect("snapshot");
    let input = &root.children[0].attributes;
    assert_eq!(input.get("type").map(String::as_str), Some("checkbox"));
    assert_eq!(input.get("checked").map(String::as_str), Some("true"));
    assert_eq!(input.get("rr_width").map(String::as_str), Some("120"));
    assert!(!input.contains_key("value"));
}

#[test]
fn legacy_document_nodes_without_tag_decode() {
    let raw = json!({
        "created_at": "2025-01-02T03:04:05Z",
        "user_agent": "ua",
        "url": "u",
        "rrweb_events": [
            { "type": 2, "timestamp": 0, "data": { "node": { "type": 0, "id": 1, "childNodes": [
                { "type": 2, "id": 2, "tagName": "html", "attributes": {}, "childNodes": [] }
            ] } } }
        ]
    })
    .to_string();
    let rec = Recording::from_json_str(&raw).expect("parse");
    assert_eq!(rec.len(), 1);
    rec.validate().expect("valid");
}

#[test]
fn document_without_events_is_rejected() {
    let raw = json!({ "created_at": "2025-01-02T03:04:05Z", "user_agent": "", "url": "" }).to_string();
    assert!(matches!(
        Recording::from_json_str(&raw),
        Err(Error::MalformedEvent(_))
    ));
    assert!(Recording::from_json_str("42").is_err());
}

#[test]
fn validate_checks_snapshot_and_ordering() {
    scenario_recording().validate().expect("scenario is valid");

    let empty = Recording::empty(RecordingHeader::default());
    assert!(matches!(empty.validate(), Err(Error::MissingSnapshot)));

    let twice = Recording::new(
        header(),
        vec![
            Event::snapshot(SessionTime(0), scenario_root()),
            Event::snapshot(SessionTime(5), scenario_root()),
        ],
    );
    assert!(matches!(
        twice.validate(),
        Err(Error::MultipleSnapshots { count: 2 })
    ));

    let click = Action::Click {
        at: Position::new(0.0, 0.0),
    };
    let backwards = Recording::new(
        header(),
        vec![
            Event::snapshot(SessionTime(0), scenario_root()),
            Event::interaction(SessionTime(50), NodeId(234), click),
            Event::interaction(SessionTime(40), NodeId(234), click),
        ],
    );
    assert!(matches!(backwards.validate(), Err(Error::MalformedEvent(_))));

    let early = Recording::new(
        header(),
        vec![
            Event::interaction(SessionTime(0), NodeId(234), click),
            Event::snapshot(SessionTime(0), scenario_root()),
        ],
    );
    assert!(matches!(early.validate(), Err(Error::MalformedEvent(_))));
}

#[test]
fn clones_share_events_without_copying() {
    let rec = scenario_recording();
    let copy = rec.clone();
    assert_eq!(copy.events().as_ptr(), rec.events().as_ptr());
    assert_eq!(copy, rec);
}
