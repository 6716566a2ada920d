//! Filter option derivation.
//!
//! Options are recomputed from the full, unfiltered event collection on
//! every request. Nothing here is stored.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

use crate::dimension::{Dimension, DimensionKind};
use crate::event::Event;

/// Available options for one dimension, shaped by its kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FilterValue {
    MultiSelect {
        dimension: Dimension,
        options: Vec<String>,
    },
    SingleSelect {
        dimension: Dimension,
        options: Vec<String>,
    },
    Toggle {
        dimension: Dimension,
        /// Number of events for which the flag holds
        count: usize,
    },
    DateRange {
        dimension: Dimension,
        earliest: Option<NaiveDate>,
        latest: Option<NaiveDate>,
    },
}

impl FilterValue {
    /// Derive the options for a single dimension.
    pub fn derive(dimension: Dimension, events: &[Event]) -> Self {
        match dimension.kind() {
            DimensionKind::MultiSelect => FilterValue::MultiSelect {
                dimension,
                options: distinct_values(dimension, events),
            },
            DimensionKind::SingleSelect => FilterValue::SingleSelect {
                dimension,
                options: distinct_values(dimension, events),
            },
            DimensionKind::Toggle => FilterValue::Toggle {
                dimension,
                count: events.iter().filter(|e| e.featured).count(),
            },
            DimensionKind::DateRange => FilterValue::DateRange {
                dimension,
                earliest: events.iter().map(|e| e.start.date_naive()).min(),
                latest: events.iter().map(|e| e.end.max(e.start).date_naive()).max(),
            },
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            FilterValue::MultiSelect { dimension, .. }
            | FilterValue::SingleSelect { dimension, .. }
            | FilterValue::Toggle { dimension, .. }
            | FilterValue::DateRange { dimension, .. } => *dimension,
        }
    }

    /// Distinct values; empty for toggle and date dimensions.
    pub fn options(&self) -> &[String] {
        match self {
            FilterValue::MultiSelect { options, .. } | FilterValue::SingleSelect { options, .. } => {
                options.as_slice()
            }
            FilterValue::Toggle { .. } | FilterValue::DateRange { .. } => &[],
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.options().iter().any(|o| o == value)
    }
}

/// Distinct values in order of first occurrence, compared case-sensitively.
fn distinct_values(dimension: Dimension, events: &[Event]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut options = Vec::new();

    for value in events.iter().flat_map(|e| e.dimension_values(dimension)) {
        if seen.insert(value) {
            options.push(value.to_string());
        }
    }

    options
}

/// Options for every enabled dimension, in dimension order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AvailableFilters {
    filters: Vec<FilterValue>,
}

impl AvailableFilters {
    pub fn derive(events: &[Event], dimensions: &[Dimension]) -> Self {
        let mut enabled = dimensions.to_vec();
        enabled.sort();
        enabled.dedup();

        AvailableFilters {
            filters: enabled
                .into_iter()
                .map(|dim| FilterValue::derive(dim, events))
                .collect(),
        }
    }

    pub fn get(&self, dimension: Dimension) -> Option<&FilterValue> {
        self.filters.iter().find(|f| f.dimension() == dimension)
    }

    /// Option values for a dimension; empty if it is disabled or has none.
    pub fn options(&self, dimension: Dimension) -> &[String] {
        self.get(dimension).map(FilterValue::options).unwrap_or(&[])
    }

    pub fn dimensions(&self) -> Vec<Dimension> {
        self.filters.iter().map(FilterValue::dimension).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterValue> {
        self.filters.iter()
    }
}

/// Derive options for every dimension.
pub fn derive_filters(events: &[Event]) -> AvailableFilters {
    AvailableFilters::derive(events, &Dimension::ALL)
}
