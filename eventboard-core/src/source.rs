//! Event data providers.
//!
//! The engine only needs the raw collection; where it comes from (CMS
//! export, static JSON, fixtures) is up to the source.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{EventBoardError, EventBoardResult};
use crate::event::Event;

pub trait EventSource {
    fn load(&self) -> EventBoardResult<Vec<Event>>;
}

/// Accepted static JSON layouts
#[derive(Deserialize)]
#[serde(untagged)]
enum EventsFile {
    List(Vec<Event>),
    Wrapped { events: Vec<Event> },
}

/// Events from a static JSON file: either an array of events or an object
/// with an `events` array.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSource for JsonFileSource {
    fn load(&self) -> EventBoardResult<Vec<Event>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            EventBoardError::EventSource(format!("Could not read {}: {}", self.path.display(), e))
        })?;

        let events = parse_events(&content).map_err(|e| {
            EventBoardError::EventSource(format!("Invalid events in {}: {}", self.path.display(), e))
        })?;

        info!(path = %self.path.display(), count = events.len(), "loaded events");
        Ok(events)
    }
}

pub fn parse_events(json: &str) -> EventBoardResult<Vec<Event>> {
    let file: EventsFile = serde_json::from_str(json)?;
    Ok(match file {
        EventsFile::List(events) | EventsFile::Wrapped { events } => events,
    })
}

/// Events held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticSource(pub Vec<Event>);

impl EventSource for StaticSource {
    fn load(&self) -> EventBoardResult<Vec<Event>> {
        Ok(self.0.clone())
    }
}
