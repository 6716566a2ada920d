//! Month sections for calendar and list views.
//!
//! Section ids double as the ids the [`SectionObserver`](crate::observer::SectionObserver)
//! watches, so a month selector can follow list scrolling.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::event::Event;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSection {
    /// `YYYY-MM`
    pub id: String,
    /// e.g. `May 2025`
    pub label: String,
    pub events: Vec<Event>,
}

pub fn section_id(start: DateTime<Utc>) -> String {
    start.format("%Y-%m").to_string()
}

/// Group events by the month they start in, in chronological order.
/// Events keep their relative order within a month.
pub fn group_by_month(events: &[Event]) -> Vec<MonthSection> {
    let mut months: BTreeMap<(i32, u32), MonthSection> = BTreeMap::new();

    for event in events {
        let key = (event.start.year(), event.start.month());
        months
            .entry(key)
            .or_insert_with(|| MonthSection {
                id: section_id(event.start),
                label: event.start.format("%B %Y").to_string(),
                events: Vec::new(),
            })
            .events
            .push(event.clone());
    }

    months.into_values().collect()
}

pub fn section_ids(sections: &[MonthSection]) -> Vec<&str> {
    sections.iter().map(|s| s.id.as_str()).collect()
}
