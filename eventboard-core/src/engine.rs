//! The filter state engine.
//!
//! Ties derivation and mutation together: `events + query -> view`, and
//! `mutation -> next query`. The engine never navigates; callers push the
//! returned parameters into their own history and call `navigate` (or build
//! a fresh engine) when the URL changes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::analytics::{
    AnalyticsParams, AnalyticsSink, FILTER_CLEAR, FILTER_DATE_RANGE, FILTER_SET, FILTER_TOGGLE,
    NoopSink,
};
use crate::date_range::DateRange;
use crate::dimension::Dimension;
use crate::event::Event;
use crate::filter::filter_events;
use crate::options::AvailableFilters;
use crate::query::QueryParams;
use crate::selection::{SelectedFilterValues, StaleValue};

/// A user action on the filter controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Mutation {
    ToggleMultiValue { dimension: String, value: String },
    SetSingleValue { dimension: String, value: String },
    SetDateRange {
        #[serde(default)]
        start: Option<NaiveDate>,
        #[serde(default)]
        end: Option<NaiveDate>,
    },
    ClearAll,
}

/// Everything the rendering layer needs for one request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterView {
    pub available_filters: AvailableFilters,
    pub selected_filter_values: SelectedFilterValues,
    pub filtered_events: Vec<Event>,
    /// Selected values carried over from the URL that match no event
    pub stale_values: Vec<StaleValue>,
    /// Canonical query string for the current selection
    pub query: String,
}

/// Events are shared, not copied: hosts that serve many requests from one
/// collection hand each engine a clone of the same `Arc`.
pub struct FilterEngine<S = NoopSink> {
    events: Arc<[Event]>,
    dimensions: Vec<Dimension>,
    available: AvailableFilters,
    selected: SelectedFilterValues,
    sink: S,
}

impl FilterEngine<NoopSink> {
    /// Engine over every dimension, without analytics.
    pub fn new(events: impl Into<Arc<[Event]>>, params: &QueryParams) -> Self {
        FilterEngine::with_sink(events, &Dimension::ALL, params, NoopSink)
    }
}

impl<S: AnalyticsSink> FilterEngine<S> {
    pub fn with_sink(
        events: impl Into<Arc<[Event]>>,
        dimensions: &[Dimension],
        params: &QueryParams,
        sink: S,
    ) -> Self {
        let events = events.into();
        let available = AvailableFilters::derive(&events, dimensions);
        let dimensions = available.dimensions();
        let selected = SelectedFilterValues::from_query(params, &dimensions);

        debug!(
            events = events.len(),
            dimensions = dimensions.len(),
            active = !selected.is_empty(),
            "filter engine ready"
        );

        FilterEngine {
            events,
            dimensions,
            available,
            selected,
            sink,
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn available_filters(&self) -> &AvailableFilters {
        &self.available
    }

    pub fn selected(&self) -> &SelectedFilterValues {
        &self.selected
    }

    pub fn filtered_events(&self) -> Vec<Event> {
        filter_events(&self.events, &self.selected)
    }

    /// Query parameters for the current selection.
    pub fn query(&self) -> QueryParams {
        self.selected.to_query()
    }

    pub fn view(&self) -> FilterView {
        FilterView {
            available_filters: self.available.clone(),
            selected_filter_values: self.selected.clone(),
            filtered_events: self.filtered_events(),
            stale_values: self.selected.stale_values(&self.available),
            query: self.query().to_query_string(),
        }
    }

    /// Re-derive the selection after the host navigated to `params`.
    pub fn navigate(&mut self, params: &QueryParams) {
        self.selected = SelectedFilterValues::from_query(params, &self.dimensions);
    }

    pub fn toggle_multi_value(&mut self, dimension: &str, value: &str) -> QueryParams {
        if let Some(dim) = self.enabled(dimension) {
            self.update(FILTER_TOGGLE, &[dim], |sel| sel.toggle_multi(dim, value));
        }
        self.query()
    }

    /// Set a single-select value, or the toggle (`true`/`false`).
    /// An empty value clears the dimension.
    pub fn set_single_value(&mut self, dimension: &str, value: &str) -> QueryParams {
        if let Some(dim) = self.enabled(dimension) {
            self.update(FILTER_SET, &[dim], |sel| sel.set_single(dim, value));
        }
        self.query()
    }

    pub fn set_date_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> QueryParams {
        if self.dimensions.contains(&Dimension::Dates) {
            self.update(FILTER_DATE_RANGE, &[Dimension::Dates], |sel| {
                sel.set_dates(DateRange::new(start, end))
            });
        }
        self.query()
    }

    pub fn clear_all(&mut self) -> QueryParams {
        let dimensions = self.dimensions.clone();
        self.update(FILTER_CLEAR, &dimensions, SelectedFilterValues::clear);
        self.query()
    }

    pub fn apply(&mut self, mutation: &Mutation) -> QueryParams {
        match mutation {
            Mutation::ToggleMultiValue { dimension, value } => {
                self.toggle_multi_value(dimension, value)
            }
            Mutation::SetSingleValue { dimension, value } => self.set_single_value(dimension, value),
            Mutation::SetDateRange { start, end } => self.set_date_range(*start, *end),
            Mutation::ClearAll => self.clear_all(),
        }
    }

    /// Resolve a dimension key, ignoring unknown or disabled dimensions.
    fn enabled(&self, key: &str) -> Option<Dimension> {
        let dimension = Dimension::from_key(key).filter(|d| self.dimensions.contains(d));
        if dimension.is_none() {
            debug!(dimension = key, "ignoring mutation on unknown dimension");
        }
        dimension
    }

    /// Apply `change` and report every touched dimension whose value moved.
    fn update<F>(&mut self, event: &str, touched: &[Dimension], change: F)
    where
        F: FnOnce(&mut SelectedFilterValues) -> bool,
    {
        let before = self.selected.clone();
        if !change(&mut self.selected) {
            return;
        }

        for &dimension in touched {
            let old_value = before.describe(dimension);
            let new_value = self.selected.describe(dimension);
            if old_value != new_value {
                self.sink.record(
                    event,
                    &AnalyticsParams {
                        dimension,
                        old_value,
                        new_value,
                    },
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        records: Mutex<Vec<(String, AnalyticsParams)>>,
    }

    impl AnalyticsSink for RecordingSink {
        fn record(&self, event: &str, params: &AnalyticsParams) {
            self.records.lock().push((event.to_string(), params.clone()));
        }
    }

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn events() -> Vec<Event> {
        vec![
            Event::new("A", ts(100), ts(100)).with_location("NYC").with_access("free"),
            Event::new("B", ts(50), ts(50)).with_location("SF").with_access("paid"),
        ]
    }

    #[test]
    fn test_view_from_query() {
        let engine = FilterEngine::new(events(), &QueryParams::parse("location=SF"));
        let view = engine.view();

        assert_eq!(view.filtered_events.len(), 1);
        assert_eq!(view.filtered_events[0].name, "B");
        assert_eq!(view.query, "location=SF");
        assert!(view.stale_values.is_empty());
        assert_eq!(view.available_filters.options(Dimension::Location), ["NYC", "SF"]);
    }

    #[test]
    fn test_toggle_selected_value_removes_it() {
        let mut engine = FilterEngine::new(events(), &QueryParams::parse("location=SF"));
        let params = engine.toggle_multi_value("location", "SF");

        assert!(params.is_empty());
        assert!(engine.selected().locations.is_empty());
        assert_eq!(engine.filtered_events().len(), 2);
    }

    #[test]
    fn test_unknown_dimension_is_noop() {
        let mut engine = FilterEngine::new(events(), &QueryParams::parse("location=SF"));
        let before = engine.query();

        assert_eq!(engine.toggle_multi_value("venue", "SF"), before);
        assert_eq!(engine.set_single_value("venue", "x"), before);
        // Wrong kind for the operation
        assert_eq!(engine.toggle_multi_value("access", "free"), before);
    }

    #[test]
    fn test_disabled_dimension_is_noop() {
        let mut engine = FilterEngine::with_sink(
            events(),
            &[Dimension::Location],
            &QueryParams::parse("access=free"),
            NoopSink,
        );
        assert!(engine.selected().access.is_none());
        assert!(engine.set_single_value("access", "free").is_empty());
        assert!(engine.set_date_range(NaiveDate::from_ymd_opt(2025, 1, 1), None).is_empty());
    }

    #[test]
    fn test_mutations_round_trip_through_navigate() {
        let mut engine = FilterEngine::new(events(), &QueryParams::new());
        engine.toggle_multi_value("location", "NYC");
        engine.set_single_value("access", "free");
        engine.set_single_value("featured", "true");
        let params = engine.set_date_range(NaiveDate::from_ymd_opt(1970, 1, 2), None);

        let reloaded = FilterEngine::new(events(), &params);
        assert_eq!(reloaded.selected(), engine.selected());

        let mut navigated = FilterEngine::new(events(), &QueryParams::new());
        navigated.navigate(&params);
        assert_eq!(navigated.selected(), engine.selected());
    }

    #[test]
    fn test_apply_and_clear_all() {
        let mut engine = FilterEngine::new(events(), &QueryParams::parse("location=SF&access=paid"));
        let params = engine.apply(&Mutation::ClearAll);
        assert!(params.is_empty());
        assert!(engine.selected().is_empty());

        let params = engine.apply(&Mutation::SetSingleValue {
            dimension: "access".into(),
            value: "free".into(),
        });
        assert_eq!(params.to_query_string(), "access=free");
    }

    #[test]
    fn test_mutation_json_shape() {
        let mutation: Mutation =
            serde_json::from_str(r#"{"op": "toggle-multi-value", "dimension": "topic", "value": "rust"}"#)
                .unwrap();
        assert_eq!(
            mutation,
            Mutation::ToggleMultiValue {
                dimension: "topic".into(),
                value: "rust".into()
            }
        );

        let mutation: Mutation =
            serde_json::from_str(r#"{"op": "set-date-range", "start": "2025-05-01"}"#).unwrap();
        assert_eq!(
            mutation,
            Mutation::SetDateRange {
                start: NaiveDate::from_ymd_opt(2025, 5, 1),
                end: None
            }
        );
    }

    #[test]
    fn test_analytics_records_changes() {
        let sink = RecordingSink::default();
        let mut engine = FilterEngine::with_sink(
            events(),
            &Dimension::ALL,
            &QueryParams::parse("location=SF"),
            &sink,
        );

        engine.toggle_multi_value("location", "NYC");
        engine.set_single_value("access", "free");
        // No change, no record
        engine.set_single_value("access", "free");
        engine.clear_all();

        let records = sink.records.lock();
        let summary: Vec<(&str, Dimension, &str, &str)> = records
            .iter()
            .map(|(event, p)| (event.as_str(), p.dimension, p.old_value.as_str(), p.new_value.as_str()))
            .collect();

        assert_eq!(
            summary,
            vec![
                (FILTER_TOGGLE, Dimension::Location, "SF", "NYC|SF"),
                (FILTER_SET, Dimension::Access, "", "free"),
                (FILTER_CLEAR, Dimension::Location, "NYC|SF", ""),
                (FILTER_CLEAR, Dimension::Access, "free", ""),
            ]
        );
    }

    #[test]
    fn test_analytics_records_date_range_changes() {
        let sink = RecordingSink::default();
        let mut engine =
            FilterEngine::with_sink(events(), &Dimension::ALL, &QueryParams::new(), &sink);
        let may_1 = NaiveDate::from_ymd_opt(2025, 5, 1);
        let may_31 = NaiveDate::from_ymd_opt(2025, 5, 31);

        engine.set_date_range(may_1, may_31);
        // Same range again, and an inverted spelling of it: no change
        engine.set_date_range(may_1, may_31);
        engine.set_date_range(may_31, may_1);
        engine.set_date_range(None, may_31);
        engine.set_date_range(None, None);

        let records = sink.records.lock();
        let summary: Vec<(&str, Dimension, &str, &str)> = records
            .iter()
            .map(|(event, p)| (event.as_str(), p.dimension, p.old_value.as_str(), p.new_value.as_str()))
            .collect();

        assert_eq!(
            summary,
            vec![
                (FILTER_DATE_RANGE, Dimension::Dates, "", "2025-05-01..2025-05-31"),
                (FILTER_DATE_RANGE, Dimension::Dates, "2025-05-01..2025-05-31", "..2025-05-31"),
                (FILTER_DATE_RANGE, Dimension::Dates, "..2025-05-31", ""),
            ]
        );
    }

    #[test]
    fn test_engines_share_one_collection() {
        let shared: Arc<[Event]> = events().into();
        let first = FilterEngine::new(Arc::clone(&shared), &QueryParams::parse("location=SF"));
        let second = FilterEngine::new(Arc::clone(&shared), &QueryParams::new());

        assert!(std::ptr::eq(first.events(), second.events()));
        assert_eq!(Arc::strong_count(&shared), 3);
        assert_eq!(first.filtered_events().len(), 1);
        assert_eq!(second.filtered_events().len(), 2);
    }

    #[test]
    fn test_stale_url_values_are_tolerated() {
        let engine = FilterEngine::new(events(), &QueryParams::parse("location=Atlantis|SF"));
        let view = engine.view();

        assert_eq!(view.filtered_events.len(), 1);
        assert_eq!(
            view.stale_values,
            vec![StaleValue {
                dimension: Dimension::Location,
                value: "Atlantis".into()
            }]
        );
    }
}
