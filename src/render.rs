//! Terminal rendering for eventboard types.
//!
//! Extension traits that add colored output to eventboard-core types
//! using owo_colors.

use chrono::{DateTime, Local, Utc};
use eventboard_core::{Event, FilterValue, StaleValue};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Event {
    fn render(&self) -> String {
        let star = if self.featured { "★".yellow().to_string() } else { " ".to_string() };

        let mut details = Vec::new();
        if let Some(location) = &self.location {
            details.push(location.clone());
        }
        details.push(self.mode.to_string());
        if let Some(access) = &self.access {
            details.push(access.clone());
        }
        if !self.hosts.is_empty() {
            details.push(format!("by {}", self.hosts.join(", ")));
        }

        let topics = if self.topics.is_empty() {
            String::new()
        } else {
            format!(" {}", format!("#{}", self.topics.join(" #")).cyan())
        };

        format!(
            "{} {} {} {}{}",
            format_time(self.start),
            star,
            self.name.bold(),
            format!("({})", details.join(" · ")).dimmed(),
            topics
        )
    }
}

impl Render for FilterValue {
    fn render(&self) -> String {
        let label = self.dimension().to_string().bold().to_string();
        match self {
            FilterValue::MultiSelect { options, .. } | FilterValue::SingleSelect { options, .. } => {
                if options.is_empty() {
                    format!("{} {}", label, "(none)".dimmed())
                } else {
                    format!("{} {}", label, options.join(", "))
                }
            }
            FilterValue::Toggle { count, .. } => {
                format!("{} {} events", label, count)
            }
            FilterValue::DateRange { earliest, latest, .. } => match (earliest, latest) {
                (Some(from), Some(to)) => format!("{} {} to {}", label, from, to),
                _ => format!("{} {}", label, "(none)".dimmed()),
            },
        }
    }
}

impl Render for StaleValue {
    fn render(&self) -> String {
        format!(
            "{} {}={} matches no event",
            "!".yellow(),
            self.dimension,
            self.value
        )
    }
}

/// Day heading (e.g. "Today", "Tomorrow", "Wed Feb 25 2026")
pub fn format_date_label(start: DateTime<Utc>) -> String {
    let today = Local::now().date_naive();
    let date = start.with_timezone(&Local).date_naive();

    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}

/// Local start time, right-aligned (e.g. "  15:00")
pub fn format_time(start: DateTime<Utc>) -> String {
    format!("{:>7}", start.with_timezone(&Local).format("%H:%M"))
}
