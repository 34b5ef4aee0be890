//! Integration tests for strata-store
//!
//! These tests verify that events and warnings written through the sink
//! interface can be read back intact.

use std::sync::Arc;
use std::thread;
use strata_domain::{
    BashHistoryCommand, Event, EventAttributes, EventData, EventOrigin, EventSink,
    ExtractionWarning, FirefoxDownload, Timestamp, TimestampRole,
};
use strata_store::{MemorySink, SqliteEventStore};

fn origin(chain: &str) -> EventOrigin {
    EventOrigin {
        parser_chain: chain.to_string(),
        source: "fixture".to_string(),
    }
}

fn bash_event(command: &str, secs: i64) -> Event {
    let data = EventData::new(EventAttributes::BashHistory(BashHistoryCommand {
        command: command.to_string(),
    }))
    .with_offset(0);

    Event::new(
        Timestamp::from_micros(secs * 1_000_000).unwrap(),
        TimestampRole::Modification,
        Arc::new(data),
        origin("text/bash"),
    )
}

#[test]
fn test_store_initialization() {
    let store = SqliteEventStore::new(":memory:");
    assert!(store.is_ok(), "Store should initialize successfully");
    assert_eq!(store.unwrap().scan_id().len(), 36);
}

#[test]
fn test_write_and_read_event() {
    let store = SqliteEventStore::new(":memory:").unwrap();

    store.write_event(&bash_event("ls -la", 1_609_459_200)).unwrap();

    assert_eq!(store.count_events().unwrap(), 1);

    let events = store.events_by_data_type("bash:history:command").unwrap();
    assert_eq!(events.len(), 1);

    let stored = &events[0];
    assert_eq!(stored.timestamp.to_rfc3339(), "2021-01-01T00:00:00Z");
    assert_eq!(stored.timestamp_role, TimestampRole::Modification);
    assert_eq!(stored.parser_chain, "text/bash");
    assert_eq!(stored.source, "fixture");
    assert_eq!(stored.offset, Some(0));
    assert_eq!(stored.query, None);
    assert_eq!(stored.attributes["command"], "ls -la");
    assert_eq!(stored.attributes["data_type"], "bash:history:command");
}

#[test]
fn test_events_ordered_by_timestamp() {
    let store = SqliteEventStore::new(":memory:").unwrap();

    store.write_event(&bash_event("whoami", 1_609_459_260)).unwrap();
    store.write_event(&bash_event("ls -la", 1_609_459_200)).unwrap();

    let events = store.events_by_data_type("bash:history:command").unwrap();
    let commands: Vec<_> = events
        .iter()
        .map(|e| e.attributes["command"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(commands, vec!["ls -la", "whoami"]);
}

#[test]
fn test_query_provenance_is_stored() {
    let store = SqliteEventStore::new(":memory:").unwrap();

    let data = EventData::new(EventAttributes::FirefoxDownload(FirefoxDownload {
        full_path: Some("/tmp/file.zip".to_string()),
        mime_type: None,
        name: Some("file.zip".to_string()),
        received_bytes: Some(10),
        referrer: None,
        temporary_location: None,
        total_bytes: Some(10),
        url: Some("https://example.com/file.zip".to_string()),
    }))
    .with_offset(7)
    .with_query("SELECT * FROM moz_downloads");

    let event = Event::new(
        Timestamp::from_micros(1_000_000).unwrap(),
        TimestampRole::Start,
        Arc::new(data),
        origin("sqlite/firefox_downloads"),
    );
    store.write_event(&event).unwrap();

    let events = store.events_by_data_type("firefox:downloads:download").unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].offset, Some(7));
    assert_eq!(events[0].query.as_deref(), Some("SELECT * FROM moz_downloads"));
    assert_eq!(events[0].attributes["total_bytes"], 10);
}

#[test]
fn test_warnings_are_stored() {
    let store = SqliteEventStore::new(":memory:").unwrap();

    store
        .write_warning(&ExtractionWarning {
            parser_chain: "text/bash".to_string(),
            source: "fixture".to_string(),
            message: "unable to parse log line".to_string(),
        })
        .unwrap();

    assert_eq!(store.count_warnings().unwrap(), 1);
    assert_eq!(store.count_events().unwrap(), 0);
}

#[test]
fn test_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timeline.db");

    {
        let store = SqliteEventStore::new(&path).unwrap();
        store.write_event(&bash_event("ls -la", 1_609_459_200)).unwrap();
    }

    let store = SqliteEventStore::new(&path).unwrap();
    assert_eq!(store.count_events().unwrap(), 1);
}

#[test]
fn test_concurrent_writers() {
    let store = Arc::new(SqliteEventStore::new(":memory:").unwrap());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for j in 0..25 {
                    let sink: &dyn EventSink = store.as_ref();
                    sink.write_event(&bash_event("true", 1_609_459_200 + i * 100 + j))
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.count_events().unwrap(), 100);
}

#[test]
fn test_memory_sink_preserves_order() {
    let sink = MemorySink::new();

    sink.write_event(&bash_event("first", 1_609_459_260)).unwrap();
    sink.write_event(&bash_event("second", 1_609_459_200)).unwrap();

    let events = sink.events();
    assert_eq!(sink.event_count(), 2);
    match events[0].data().attributes() {
        EventAttributes::BashHistory(cmd) => assert_eq!(cmd.command, "first"),
        other => panic!("unexpected attributes: {:?}", other),
    }
}
