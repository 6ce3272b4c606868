//! Wire-format tests for the persisted entry shape.

use super::types::{EntrySource, HistoryEntry};

#[test]
fn text_entries_are_internally_tagged() {
    let entry = HistoryEntry::Text {
        text: "hi".to_string(),
        html: None,
        rtf: None,
        pinned: true,
        ts: 1234,
        source: Some(EntrySource {
            app_name: Some("Firefox".to_string()),
            app_id: None,
            wm_class: Some("firefox".to_string()),
        }),
    };
    let json: serde_json::Value = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["type"], "text");
    assert_eq!(json["ts"], 1234);
    assert_eq!(json["pinned"], true);
    // Source fields keep the camelCase wire names.
    assert_eq!(json["source"]["appName"], "Firefox");
    assert_eq!(json["source"]["wmClass"], "firefox");
}

#[test]
fn image_entries_tolerate_absent_optional_fields() {
    let entry: HistoryEntry = serde_json::from_str(r#"{"type": "image", "data": "QUJD"}"#).unwrap();
    match entry {
        HistoryEntry::Image {
            data,
            hash,
            width,
            height,
            pinned,
            ts,
            source,
        } => {
            assert_eq!(data, "QUJD");
            assert!(hash.is_empty());
            assert_eq!((width, height), (0, 0));
            assert!(!pinned);
            assert_eq!(ts, 0);
            assert!(source.is_none());
        }
        HistoryEntry::Text { .. } => panic!("expected an image entry"),
    }
}

#[test]
fn constructors_stamp_current_time() {
    let before = chrono::Utc::now().timestamp_millis();
    let entry = HistoryEntry::new_text("x".to_string(), None, None, None);
    assert!(entry.ts() >= before);
    assert!(!entry.pinned());
}
