//! Selected filter values and their query-string form.
//!
//! Parsing never fails. A parameter whose shape does not fit its dimension
//! (a list where one value is expected, an unreadable boolean or date) is
//! dropped and the dimension keeps its default.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::date_range::{DateRange, format_date, parse_date};
use crate::dimension::{Dimension, DimensionKind};
use crate::options::AvailableFilters;
use crate::query::{QueryParams, QueryValue, join_values, split_values};

/// Query key for the first day of the date range
pub const START_KEY: &str = "start";
/// Query key for the last day of the date range
pub const END_KEY: &str = "end";

/// The user's current selection, one field per dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedFilterValues {
    pub locations: BTreeSet<String>,
    pub hosts: BTreeSet<String>,
    pub topics: BTreeSet<String>,
    pub access: Option<String>,
    pub mode: Option<String>,
    pub featured: bool,
    pub dates: DateRange,
}

/// A selected value that matches no event in the current collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleValue {
    pub dimension: Dimension,
    pub value: String,
}

impl SelectedFilterValues {
    /// Derive the selection from query parameters for the enabled dimensions.
    pub fn from_query(params: &QueryParams, dimensions: &[Dimension]) -> Self {
        let mut selection = SelectedFilterValues::default();

        for &dimension in dimensions {
            match dimension.kind() {
                DimensionKind::MultiSelect => {
                    if let (Some(value), Some(set)) =
                        (params.get(dimension.key()), selection.multi_mut(dimension))
                    {
                        set.extend(value.items().iter().flat_map(|raw| split_values(raw)));
                    }
                }
                DimensionKind::SingleSelect => {
                    let value = single_param(params, dimension.key())
                        .filter(|v| !v.is_empty())
                        .map(str::to_string);
                    if let Some(slot) = selection.single_mut(dimension) {
                        *slot = value;
                    }
                }
                DimensionKind::Toggle => {
                    selection.featured = single_param(params, dimension.key())
                        .and_then(|raw| parse_flag(dimension.key(), raw))
                        .unwrap_or(false);
                }
                DimensionKind::DateRange => {
                    let start = date_param(params, START_KEY);
                    let end = date_param(params, END_KEY);
                    selection.dates = DateRange::new(start, end);
                }
            }
        }

        selection
    }

    /// Serialize in the format `from_query` reads. Dimensions at their
    /// default are omitted, so the empty selection is the empty query.
    pub fn to_query(&self) -> QueryParams {
        let mut params = QueryParams::new();

        for dimension in Dimension::ALL {
            match dimension.kind() {
                DimensionKind::MultiSelect => {
                    if let Some(set) = self.multi(dimension).filter(|s| !s.is_empty()) {
                        params.insert(dimension.key(), join_values(set.iter().map(String::as_str)));
                    }
                }
                DimensionKind::SingleSelect => {
                    if let Some(value) = self.single(dimension) {
                        params.insert(dimension.key(), value);
                    }
                }
                DimensionKind::Toggle => {
                    if self.featured {
                        params.insert(dimension.key(), "true");
                    }
                }
                DimensionKind::DateRange => {
                    if let Some(start) = self.dates.start {
                        params.insert(START_KEY, format_date(start));
                    }
                    if let Some(end) = self.dates.end {
                        params.insert(END_KEY, format_date(end));
                    }
                }
            }
        }

        params
    }

    pub fn multi(&self, dimension: Dimension) -> Option<&BTreeSet<String>> {
        match dimension {
            Dimension::Location => Some(&self.locations),
            Dimension::Host => Some(&self.hosts),
            Dimension::Topic => Some(&self.topics),
            _ => None,
        }
    }

    fn multi_mut(&mut self, dimension: Dimension) -> Option<&mut BTreeSet<String>> {
        match dimension {
            Dimension::Location => Some(&mut self.locations),
            Dimension::Host => Some(&mut self.hosts),
            Dimension::Topic => Some(&mut self.topics),
            _ => None,
        }
    }

    pub fn single(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Access => self.access.as_deref(),
            Dimension::Mode => self.mode.as_deref(),
            _ => None,
        }
    }

    fn single_mut(&mut self, dimension: Dimension) -> Option<&mut Option<String>> {
        match dimension {
            Dimension::Access => Some(&mut self.access),
            Dimension::Mode => Some(&mut self.mode),
            _ => None,
        }
    }

    /// Whether the dimension narrows the list.
    pub fn is_active(&self, dimension: Dimension) -> bool {
        match dimension.kind() {
            DimensionKind::MultiSelect => self.multi(dimension).is_some_and(|s| !s.is_empty()),
            DimensionKind::SingleSelect => self.single(dimension).is_some(),
            DimensionKind::Toggle => self.featured,
            DimensionKind::DateRange => !self.dates.is_all(),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == SelectedFilterValues::default()
    }

    /// Add `value` if absent, remove it if present.
    /// Returns false (and changes nothing) for non-multi-select dimensions
    /// or an empty value.
    pub fn toggle_multi(&mut self, dimension: Dimension, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }
        let Some(set) = self.multi_mut(dimension) else {
            return false;
        };

        if !set.remove(value) {
            set.insert(value.to_string());
        }
        true
    }

    /// Set a single-select value or the toggle. An empty value clears it.
    /// Returns whether the selection changed.
    pub fn set_single(&mut self, dimension: Dimension, value: &str) -> bool {
        match dimension.kind() {
            DimensionKind::SingleSelect => {
                let next = (!value.is_empty()).then(|| value.to_string());
                match self.single_mut(dimension) {
                    Some(slot) if *slot != next => {
                        *slot = next;
                        true
                    }
                    _ => false,
                }
            }
            DimensionKind::Toggle => {
                let next = if value.is_empty() {
                    Some(false)
                } else {
                    parse_flag(dimension.key(), value)
                };
                match next {
                    Some(flag) if flag != self.featured => {
                        self.featured = flag;
                        true
                    }
                    _ => false,
                }
            }
            DimensionKind::MultiSelect | DimensionKind::DateRange => false,
        }
    }

    pub fn set_dates(&mut self, range: DateRange) -> bool {
        let range = DateRange::new(range.start, range.end);
        if self.dates == range {
            return false;
        }
        self.dates = range;
        true
    }

    pub fn clear(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        *self = SelectedFilterValues::default();
        true
    }

    /// Human-readable value of one dimension, as reported to analytics.
    pub fn describe(&self, dimension: Dimension) -> String {
        match dimension.kind() {
            DimensionKind::MultiSelect => self
                .multi(dimension)
                .map(|set| join_values(set.iter().map(String::as_str)))
                .unwrap_or_default(),
            DimensionKind::SingleSelect => self.single(dimension).unwrap_or_default().to_string(),
            DimensionKind::Toggle => self.featured.to_string(),
            DimensionKind::DateRange => {
                if self.dates.is_all() {
                    String::new()
                } else {
                    self.dates.to_string()
                }
            }
        }
    }

    /// Selected values that are no longer offered by `available`.
    /// Only option-bearing dimensions that are enabled are checked.
    pub fn stale_values(&self, available: &AvailableFilters) -> Vec<StaleValue> {
        let mut stale = Vec::new();

        for filter in available.iter().filter(|f| f.dimension().has_options()) {
            let dimension = filter.dimension();
            let selected: Vec<&str> = match dimension.kind() {
                DimensionKind::MultiSelect => self
                    .multi(dimension)
                    .map(|set| set.iter().map(String::as_str).collect())
                    .unwrap_or_default(),
                _ => self.single(dimension).into_iter().collect(),
            };

            stale.extend(
                selected
                    .into_iter()
                    .filter(|value| !filter.contains(value))
                    .map(|value| StaleValue {
                        dimension,
                        value: value.to_string(),
                    }),
            );
        }

        stale
    }
}

/// The single string value of a scalar parameter. Lists are malformed here.
fn single_param<'a>(params: &'a QueryParams, key: &str) -> Option<&'a str> {
    match params.get(key)? {
        QueryValue::Single(value) => Some(value.as_str()),
        QueryValue::Many(items) => {
            debug!(key, count = items.len(), "ignoring repeated scalar parameter");
            None
        }
    }
}

fn date_param(params: &QueryParams, key: &str) -> Option<chrono::NaiveDate> {
    let raw = single_param(params, key).filter(|v| !v.is_empty())?;
    match parse_date(raw) {
        Ok(date) => Some(date),
        Err(reason) => {
            debug!(key, %reason, "ignoring date parameter");
            None
        }
    }
}

fn parse_flag(key: &str, raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => {
            debug!(key, value = raw, "ignoring unreadable toggle parameter");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use chrono::{NaiveDate, TimeZone, Utc};
    use proptest::prelude::*;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn parse(query: &str) -> SelectedFilterValues {
        SelectedFilterValues::from_query(&QueryParams::parse(query), &Dimension::ALL)
    }

    #[test]
    fn test_delimited_multi_select() {
        let selection = parse("?location=SF|NYC");
        assert_eq!(selection.locations, set(&["SF", "NYC"]));
        assert!(selection.hosts.is_empty());
    }

    #[test]
    fn test_repeated_multi_select() {
        let selection = parse("topic=rust&topic=wasm|web");
        assert_eq!(selection.topics, set(&["rust", "wasm", "web"]));
    }

    #[test]
    fn test_scalars_and_dates() {
        let selection = parse("access=free&mode=online&featured=1&start=2025-05-01&end=2025-05-31");
        assert_eq!(selection.access.as_deref(), Some("free"));
        assert_eq!(selection.mode.as_deref(), Some("online"));
        assert!(selection.featured);
        assert_eq!(selection.dates.start, NaiveDate::from_ymd_opt(2025, 5, 1));
        assert_eq!(selection.dates.end, NaiveDate::from_ymd_opt(2025, 5, 31));
    }

    #[test]
    fn test_malformed_degrades_to_defaults() {
        let selection = parse("access=free&access=paid&featured=maybe&start=yesterday&end=2025-13-01&mode=");
        assert_eq!(selection, SelectedFilterValues::default());
    }

    #[test]
    fn test_inverted_dates_are_swapped() {
        let selection = parse("start=2025-06-01&end=2025-05-01");
        assert_eq!(selection.dates.start, NaiveDate::from_ymd_opt(2025, 5, 1));
        assert_eq!(selection.dates.end, NaiveDate::from_ymd_opt(2025, 6, 1));
    }

    #[test]
    fn test_disabled_dimensions_ignored() {
        let params = QueryParams::parse("location=SF&topic=rust");
        let selection = SelectedFilterValues::from_query(&params, &[Dimension::Topic]);
        assert!(selection.locations.is_empty());
        assert_eq!(selection.topics, set(&["rust"]));
    }

    #[test]
    fn test_toggle_multi_adds_and_removes() {
        let mut selection = parse("location=SF");
        assert!(selection.toggle_multi(Dimension::Location, "SF"));
        assert!(selection.locations.is_empty());
        assert!(selection.toggle_multi(Dimension::Location, "NYC"));
        assert_eq!(selection.locations, set(&["NYC"]));
    }

    #[test]
    fn test_toggle_multi_wrong_kind_is_noop() {
        let mut selection = SelectedFilterValues::default();
        assert!(!selection.toggle_multi(Dimension::Access, "free"));
        assert!(!selection.toggle_multi(Dimension::Location, ""));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_set_single() {
        let mut selection = SelectedFilterValues::default();
        assert!(selection.set_single(Dimension::Access, "paid"));
        assert!(!selection.set_single(Dimension::Access, "paid"));
        assert!(selection.set_single(Dimension::Featured, "true"));
        assert!(!selection.set_single(Dimension::Featured, "sure"));
        assert!(selection.featured);
        assert!(selection.set_single(Dimension::Access, ""));
        assert_eq!(selection.access, None);
        assert!(!selection.set_single(Dimension::Topic, "rust"));
    }

    #[test]
    fn test_to_query_omits_defaults() {
        assert!(SelectedFilterValues::default().to_query().is_empty());

        let selection = parse("location=SF|NYC&featured=yes");
        assert_eq!(selection.to_query().to_query_string(), "featured=true&location=NYC%7CSF");
    }

    #[test]
    fn test_describe() {
        let selection = parse("location=SF|NYC&start=2025-05-01");
        assert_eq!(selection.describe(Dimension::Location), "NYC|SF");
        assert_eq!(selection.describe(Dimension::Access), "");
        assert_eq!(selection.describe(Dimension::Featured), "false");
        assert_eq!(selection.describe(Dimension::Dates), "2025-05-01..");
    }

    #[test]
    fn test_stale_values_are_reported() {
        let start = Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, 0).unwrap();
        let events = vec![Event::new("A", start, start).with_location("SF").with_access("free")];
        let available = crate::options::derive_filters(&events);

        let selection = parse("location=SF|Atlantis&access=paid");
        let stale = selection.stale_values(&available);
        assert_eq!(
            stale,
            vec![
                StaleValue { dimension: Dimension::Location, value: "Atlantis".into() },
                StaleValue { dimension: Dimension::Access, value: "paid".into() },
            ]
        );
    }

    fn arb_value() -> impl Strategy<Value = String> {
        // Includes the delimiter, the escape character and characters that
        // need percent-encoding.
        "[a-zA-Z0-9 |\\\\&=%+?é]{1,12}"
    }

    fn arb_date() -> impl Strategy<Value = Option<NaiveDate>> {
        prop::option::of((2000i32..2040, 1u32..=12, 1u32..=28))
            .prop_map(|d| d.and_then(|(y, m, day)| NaiveDate::from_ymd_opt(y, m, day)))
    }

    prop_compose! {
        fn arb_selection()(
            locations in prop::collection::btree_set(arb_value(), 0..4),
            hosts in prop::collection::btree_set(arb_value(), 0..4),
            topics in prop::collection::btree_set(arb_value(), 0..4),
            access in prop::option::of(arb_value()),
            mode in prop::option::of(arb_value()),
            featured in any::<bool>(),
            start in arb_date(),
            end in arb_date(),
        ) -> SelectedFilterValues {
            SelectedFilterValues {
                locations,
                hosts,
                topics,
                access,
                mode,
                featured,
                dates: DateRange::new(start, end),
            }
        }
    }

    proptest! {
        #[test]
        fn selection_round_trips_through_query_string(selection in arb_selection()) {
            let query = selection.to_query().to_query_string();
            let parsed = SelectedFilterValues::from_query(&QueryParams::parse(&query), &Dimension::ALL);
            prop_assert_eq!(parsed, selection);
        }

        #[test]
        fn parsing_never_panics(query in ".{0,64}") {
            let _ = SelectedFilterValues::from_query(&QueryParams::parse(&query), &Dimension::ALL);
        }
    }
}
