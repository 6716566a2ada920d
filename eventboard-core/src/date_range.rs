//! Date range for filtering events.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Format of `start`/`end` in query strings
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive range of days.
/// None values mean unbounded in that direction; the default is all dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Build a range, swapping the bounds if they are inverted.
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        match (start, end) {
            (Some(s), Some(e)) if s > e => DateRange {
                start: Some(e),
                end: Some(s),
            },
            _ => DateRange { start, end },
        }
    }

    pub fn all() -> Self {
        DateRange::default()
    }

    /// The calendar month containing `day`.
    pub fn month_of(day: NaiveDate) -> Self {
        let first = day.with_day(1).unwrap_or(day);
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(first);

        DateRange {
            start: Some(first),
            end: Some(last),
        }
    }

    pub fn is_all(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether an event spanning `from..=to` touches any day of this range.
    pub fn overlaps(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        let first_day = from.date_naive();
        let last_day = to.max(from).date_naive();

        let after_start = self.start.is_none_or(|start| last_day >= start);
        let before_end = self.end.is_none_or(|end| first_day <= end);

        after_start && before_end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |d: Option<NaiveDate>| {
            d.map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default()
        };
        write!(f, "{}..{}", bound(self.start), bound(self.end))
    }
}

/// Parse YYYY-MM-DD
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
