use super::test_record;
use crate::{SessionPatch, SessionRecord, TimerSetting, is_valid_id};

#[test]
fn test_record_uses_camel_case_on_the_wire() {
    let json = serde_json::to_value(test_record("abc")).unwrap();
    assert_eq!(json["createdAt"], 1_700_000_000_000i64);
    assert_eq!(json["timer"], 3);
    assert!(json.get("created_at").is_none());
}

#[test]
fn test_timer_accepts_only_three_or_five() {
    let ok: SessionRecord = serde_json::from_str(
        r#"{"id":"a","layout":"4-grid","photos":[],"timer":5,"createdAt":1}"#,
    )
    .unwrap();
    assert_eq!(ok.timer, TimerSetting::Five);

    let bad = serde_json::from_str::<SessionRecord>(
        r#"{"id":"a","layout":"4-grid","photos":[],"timer":4,"createdAt":1}"#,
    );
    assert!(bad.is_err());
}

#[test]
fn test_merge_keeps_id_and_created_at() {
    let mut record = test_record("keep-me");
    record.merge(SessionPatch {
        layout: Some("3-grid".into()),
        photos: None,
        timer: Some(TimerSetting::Five),
    });
    assert_eq!(record.id, "keep-me");
    assert_eq!(record.created_at, 1_700_000_000_000);
    assert_eq!(record.layout, "3-grid");
    assert_eq!(record.timer, TimerSetting::Five);
    assert_eq!(record.photos.len(), 1);
}

#[test]
fn test_patch_deserializes_partial_body() {
    let patch: SessionPatch = serde_json::from_str(r#"{"photos":["a","b"]}"#).unwrap();
    assert_eq!(patch.photos.as_deref(), Some(&["a".to_string(), "b".to_string()][..]));
    assert!(patch.layout.is_none());
    assert!(patch.timer.is_none());
}

#[test]
fn test_id_validation() {
    assert!(is_valid_id("0b7c1e9a-5d2f-4c1b-9e0a-123456789abc"));
    assert!(is_valid_id("session_1"));
    assert!(!is_valid_id(""));
    assert!(!is_valid_id("../etc/passwd"));
    assert!(!is_valid_id("a b"));
}
