//! Event listing types.
//!
//! Events arrive from the CMS or static JSON already shaped like this and
//! are never mutated by the filter engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::dimension::Dimension;

fn new_event_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A listed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default = "new_event_id")]
    pub id: String,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    /// Access type as published by the CMS ("free", "paid", "invite-only", ...)
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub mode: EventMode,
    #[serde(default)]
    pub featured: bool,

    // Passed through to renderers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Where an event takes place
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventMode {
    #[default]
    InPerson,
    Online,
    Hybrid,
}

impl EventMode {
    pub fn as_str(self) -> &'static str {
        match self {
            EventMode::InPerson => "in-person",
            EventMode::Online => "online",
            EventMode::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for EventMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in-person" => Ok(EventMode::InPerson),
            "online" => Ok(EventMode::Online),
            "hybrid" => Ok(EventMode::Hybrid),
            other => Err(format!("Unknown event mode '{}'", other)),
        }
    }
}

impl Event {
    pub fn new(name: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Event {
            id: new_event_id(),
            name: name.into(),
            start,
            end,
            location: None,
            hosts: Vec::new(),
            topics: Vec::new(),
            access: None,
            mode: EventMode::default(),
            featured: false,
            url: None,
            description: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_access(mut self, access: impl Into<String>) -> Self {
        self.access = Some(access.into());
        self
    }

    pub fn with_mode(mut self, mode: EventMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    /// The event's values for an option-bearing dimension.
    ///
    /// Empty strings are skipped. Toggle and date dimensions have no
    /// string values and always yield an empty list.
    pub fn dimension_values(&self, dimension: Dimension) -> Vec<&str> {
        let values: Vec<&str> = match dimension {
            Dimension::Location => self.location.as_deref().into_iter().collect(),
            Dimension::Host => self.hosts.iter().map(String::as_str).collect(),
            Dimension::Topic => self.topics.iter().map(String::as_str).collect(),
            Dimension::Access => self.access.as_deref().into_iter().collect(),
            Dimension::Mode => vec![self.mode.as_str()],
            Dimension::Featured | Dimension::Dates => Vec::new(),
        };

        values.into_iter().filter(|v| !v.is_empty()).collect()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_deserialize_cms_shape() {
        let json = r#"{
            "id": "evt-1",
            "name": "Rust Meetup",
            "start": "2025-05-01T18:00:00Z",
            "end": "2025-05-01T20:00:00Z",
            "location": "Berlin",
            "hosts": ["Ferrous"],
            "topics": ["rust", "systems"],
            "access": "free",
            "mode": "hybrid",
            "featured": true
        }"#;

        let event: Event = serde_json::from_str(json).expect("Should parse");
        assert_eq!(event.id, "evt-1");
        assert_eq!(event.location.as_deref(), Some("Berlin"));
        assert_eq!(event.mode, EventMode::Hybrid);
        assert!(event.featured);
        assert_eq!(event.url, None);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{
            "name": "Bare",
            "start": "2025-05-01T18:00:00Z",
            "end": "2025-05-01T19:00:00Z"
        }"#;

        let event: Event = serde_json::from_str(json).expect("Should parse");
        assert!(!event.id.is_empty(), "id should be generated");
        assert!(event.hosts.is_empty());
        assert_eq!(event.mode, EventMode::InPerson);
        assert!(!event.featured);
    }

    #[test]
    fn test_dimension_values() {
        let event = Event::new("Talk", at(10), at(11))
            .with_location("NYC")
            .with_hosts(["Ada", ""])
            .with_topics(["rust", "wasm"])
            .with_mode(EventMode::Online);

        assert_eq!(event.dimension_values(Dimension::Location), vec!["NYC"]);
        assert_eq!(event.dimension_values(Dimension::Host), vec!["Ada"]);
        assert_eq!(event.dimension_values(Dimension::Topic), vec!["rust", "wasm"]);
        assert!(event.dimension_values(Dimension::Access).is_empty());
        assert_eq!(event.dimension_values(Dimension::Mode), vec!["online"]);
        assert!(event.dimension_values(Dimension::Featured).is_empty());
    }

    #[test]
    fn test_event_mode_parse() {
        assert_eq!("hybrid".parse::<EventMode>(), Ok(EventMode::Hybrid));
        assert!("remote".parse::<EventMode>().is_err());
        assert_eq!(EventMode::InPerson.to_string(), "in-person");
    }
}
