//! End-to-end: static JSON -> options, selection, filtered list -> mutation
//! -> next query -> fresh derivation.

use eventboard_core::observer::{ManualVisibility, SectionObserver, ThresholdBand};
use eventboard_core::sections::{group_by_month, section_ids};
use eventboard_core::source::parse_events;
use eventboard_core::{Dimension, FilterEngine, Mutation, QueryParams, TracingSink};

const EVENTS: &str = r#"{
  "events": [
    {
      "id": "a",
      "name": "A",
      "start": "1970-01-01T00:01:40Z",
      "end": "1970-01-01T00:02:00Z",
      "location": "NYC",
      "hosts": ["Ada"],
      "topics": ["rust"],
      "access": "free"
    },
    {
      "id": "b",
      "name": "B",
      "start": "1970-01-01T00:00:50Z",
      "end": "1970-01-01T00:01:00Z",
      "location": "SF",
      "hosts": ["Grace", "Ada"],
      "topics": ["wasm"],
      "access": "paid",
      "mode": "online",
      "featured": true
    },
    {
      "id": "c",
      "name": "C",
      "start": "1970-02-10T12:00:00Z",
      "end": "1970-02-10T13:00:00Z",
      "location": "SF",
      "topics": ["rust", "wasm"],
      "mode": "hybrid"
    }
  ]
}"#;

fn names(engine: &FilterEngine<impl eventboard_core::AnalyticsSink>) -> Vec<String> {
    engine.filtered_events().into_iter().map(|e| e.name).collect()
}

#[test]
fn scenario_location_filter_and_default_sort() {
    let events = parse_events(EVENTS).unwrap();

    let engine = FilterEngine::new(events.clone(), &QueryParams::parse("location=SF"));
    assert_eq!(names(&engine), vec!["B", "C"]);

    let engine = FilterEngine::new(events, &QueryParams::new());
    assert_eq!(names(&engine), vec!["B", "A", "C"]);
}

#[test]
fn scenario_pipe_delimited_location() {
    let events = parse_events(EVENTS).unwrap();
    let engine = FilterEngine::new(events, &QueryParams::parse("?location=SF|NYC"));

    let expected: std::collections::BTreeSet<String> =
        ["SF", "NYC"].iter().map(|s| s.to_string()).collect();
    assert_eq!(engine.selected().locations, expected);
}

#[test]
fn mutations_drive_the_next_request() {
    let events = parse_events(EVENTS).unwrap();
    let mut engine = FilterEngine::with_sink(
        events.clone(),
        &Dimension::ALL,
        &QueryParams::parse("location=SF"),
        TracingSink,
    );

    engine.apply(&Mutation::ToggleMultiValue {
        dimension: "topic".into(),
        value: "rust".into(),
    });
    let query = engine.apply(&Mutation::SetSingleValue {
        dimension: "mode".into(),
        value: "hybrid".into(),
    });
    assert_eq!(query.to_query_string(), "location=SF&mode=hybrid&topic=rust");

    // The host navigates; the next request derives from the new URL alone.
    let next = FilterEngine::new(events, &QueryParams::parse(&query.to_query_string()));
    assert_eq!(names(&next), vec!["C"]);
    assert_eq!(next.selected(), engine.selected());

    let cleared = engine.apply(&Mutation::ClearAll);
    assert!(cleared.is_empty());
    assert_eq!(names(&engine), vec!["B", "A", "C"]);
}

#[test]
fn view_serializes_for_renderers() {
    let events = parse_events(EVENTS).unwrap();
    let engine = FilterEngine::new(events, &QueryParams::parse("host=Ada&featured=true"));

    let json = serde_json::to_value(engine.view()).unwrap();
    assert_eq!(json["query"], "featured=true&host=Ada");
    assert_eq!(json["filteredEvents"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["selectedFilterValues"]["hosts"], serde_json::json!(["Ada"]));
    assert_eq!(json["availableFilters"][1]["options"], serde_json::json!(["Ada", "Grace"]));
}

#[test]
fn month_sections_feed_the_observer() {
    let events = parse_events(EVENTS).unwrap();
    let engine = FilterEngine::new(events, &QueryParams::new());
    let sections = group_by_month(&engine.filtered_events());
    assert_eq!(section_ids(&sections), vec!["1970-01", "1970-02"]);

    let source = ManualVisibility::new();
    let mut observer = SectionObserver::new(
        section_ids(&sections),
        ThresholdBand::default(),
        |_, _| {},
    );
    observer.observe(&source);

    source.report("1970-02", 1.0);
    assert_eq!(observer.active_section().as_deref(), Some("1970-02"));

    drop(observer);
    assert_eq!(source.subscriber_count(), 0);
}
