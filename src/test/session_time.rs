use crate::time::SessionTime;

#[test]
fn session_time_unit_conversions() {
    assert_eq!(SessionTime::from_millis(7), SessionTime(7));
    assert_eq!(SessionTime::from_secs(2), SessionTime(2_000));
    assert_eq!(SessionTime::from_secs(u64::MAX), SessionTime(u64::MAX));
}

#[test]
fn session_time_serializes_as_bare_millis() {
    let raw = serde_json::to_string(&SessionTime(340)).expect("serialize");
    assert_eq!(raw, "340");
    assert_eq!(SessionTime(340).saturating_sub(SessionTime(400)), 0);
}
