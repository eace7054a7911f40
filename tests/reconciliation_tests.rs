//! Reconciliation properties of the location store and its derivations.

use locshare::prelude::*;

fn rec(id: &str, lat: f64, lng: f64) -> LocationRecord {
    LocationRecord::new(id, format!("user-{id}"), lat, lng)
}

#[test]
fn snapshot_then_stream_event_appends_in_order() {
    let store = LocationStore::new();
    store.replace_all(vec![rec("a", 1.0, 2.0)]);
    store.upsert(rec("b", 3.0, 4.0));

    let ids: Vec<_> = store.records().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn snapshot_then_stream_event_with_same_id_updates_in_place() {
    let store = LocationStore::new();
    store.replace_all(vec![rec("a", 1.0, 2.0)]);
    store.upsert(rec("a", 9.0, 9.0));

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].latitude, 9.0);
    assert_eq!(records[0].longitude, 9.0);
}

#[test]
fn one_record_per_distinct_id_for_any_upsert_sequence() {
    let store = LocationStore::new();
    let sequence = ["a", "b", "a", "c", "b", "a", "c", "c"];
    for (step, id) in sequence.iter().enumerate() {
        store.upsert(rec(id, step as f64, step as f64));
    }

    let ids: Vec<_> = store.records().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    // Position of an updated record is its first-insertion position
    assert_eq!(store.records()[0].latitude, 5.0);
}

#[test]
fn replace_all_never_resurrects_removed_records() {
    let store = LocationStore::new();
    store.upsert(rec("gone", 0.0, 0.0));
    store.replace_all(vec![rec("kept", 1.0, 1.0)]);
    store.upsert(rec("new", 2.0, 2.0));
    store.upsert(rec("kept", 3.0, 3.0));

    let ids: Vec<_> = store.records().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["kept", "new"]);
}

#[test]
fn most_recent_is_insertion_order_not_timestamp_order() {
    let store = LocationStore::new();
    assert!(store.most_recent().is_none());

    let mut earlier = rec("a", 1.0, 1.0);
    earlier.timestamp = "2099-12-31T23:59:59Z".to_string();
    let mut later = rec("b", 2.0, 2.0);
    later.timestamp = "2000-01-01T00:00:00Z".to_string();

    store.upsert(earlier);
    store.upsert(later);
    assert_eq!(store.most_recent().unwrap().id, "b");
}

#[test]
fn viewport_tracks_most_recent_and_falls_back_to_default() {
    let store = LocationStore::new();
    let viewport = ViewportController::new(&SessionConfig::default());
    viewport.attach(&store);

    assert_eq!(viewport.current().center, DEFAULT_CENTER);
    assert_eq!(viewport.current().zoom, DEFAULT_ZOOM);

    store.upsert(rec("a", 12.0, 34.0));
    assert_eq!(viewport.current().center, LatLng::new(12.0, 34.0));
}

#[test]
fn deep_link_round_trip() {
    let base = reqwest::Url::parse("http://example.com/").unwrap();
    let link = share_link(&base, "xyz");
    assert_eq!(link.as_str(), "http://example.com/?locationId=xyz");
    assert_eq!(location_id_from_url(link.as_str()), Some("xyz".to_string()));
    assert_eq!(location_id_from_url("http://example.com/"), None);
}
