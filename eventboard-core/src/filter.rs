//! Event filtering and ordering.

use std::cmp::Ordering;

use crate::dimension::{Dimension, DimensionKind};
use crate::event::Event;
use crate::selection::SelectedFilterValues;

/// Events matching every active dimension of `selection`, sorted by start
/// time, then name, then id.
pub fn filter_events(events: &[Event], selection: &SelectedFilterValues) -> Vec<Event> {
    let mut filtered: Vec<Event> = events
        .iter()
        .filter(|event| matches(event, selection))
        .cloned()
        .collect();

    sort_events(&mut filtered);
    filtered
}

/// Whether an event passes all active dimensions.
pub fn matches(event: &Event, selection: &SelectedFilterValues) -> bool {
    Dimension::ALL
        .into_iter()
        .filter(|&dim| selection.is_active(dim))
        .all(|dim| matches_dimension(event, selection, dim))
}

fn matches_dimension(event: &Event, selection: &SelectedFilterValues, dimension: Dimension) -> bool {
    match dimension.kind() {
        DimensionKind::MultiSelect => {
            let Some(selected) = selection.multi(dimension) else {
                return true;
            };
            event
                .dimension_values(dimension)
                .into_iter()
                .any(|value| selected.contains(value))
        }
        DimensionKind::SingleSelect => {
            let Some(selected) = selection.single(dimension) else {
                return true;
            };
            event.dimension_values(dimension).contains(&selected)
        }
        DimensionKind::Toggle => event.featured,
        DimensionKind::DateRange => selection.dates.overlaps(event.start, event.end),
    }
}

pub fn sort_events(events: &mut [Event]) {
    events.sort_by(compare_events);
}

fn compare_events(a: &Event, b: &Event) -> Ordering {
    a.start
        .cmp(&b.start)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}
