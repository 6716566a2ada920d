use std::sync::Arc;

use anyhow::{Context, Result};
use eventboard_core::config::EventBoardConfig;
use eventboard_core::source::{EventSource, JsonFileSource};
use eventboard_core::{
    AvailableFilters, Dimension, Event, EventBoardResult, FilterEngine, QueryParams, TracingSink,
};
use parking_lot::RwLock;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn EventSource + Send + Sync>,
    // Swapped wholesale on reload; requests keep the snapshot they started with
    events: Arc<RwLock<Arc<[Event]>>>,
    dimensions: Arc<[Dimension]>,
}

impl AppState {
    /// Load the initial collection from `source`.
    pub fn new(
        source: impl EventSource + Send + Sync + 'static,
        dimensions: &[Dimension],
    ) -> EventBoardResult<Self> {
        let events: Arc<[Event]> = source.load()?.into();

        Ok(AppState {
            source: Arc::new(source),
            events: Arc::new(RwLock::new(events)),
            dimensions: dimensions.into(),
        })
    }

    pub fn load(config: &EventBoardConfig) -> Result<Self> {
        let path = config.events_path();
        AppState::new(JsonFileSource::new(&path), &config.dimensions)
            .with_context(|| format!("Could not load events from {}", path.display()))
    }

    /// Re-read the source, keeping the current collection if that fails.
    pub fn reload(&self) -> EventBoardResult<usize> {
        let events: Arc<[Event]> = self.source.load()?.into();
        let count = events.len();
        *self.events.write() = events;

        info!(count, "events reloaded");
        Ok(count)
    }

    pub fn events(&self) -> Arc<[Event]> {
        Arc::clone(&self.events.read())
    }

    pub fn available_filters(&self) -> AvailableFilters {
        AvailableFilters::derive(&self.events(), &self.dimensions)
    }

    /// A fresh engine for one request's query parameters.
    pub fn engine(&self, params: &QueryParams) -> FilterEngine<TracingSink> {
        FilterEngine::with_sink(self.events(), &self.dimensions, params, TracingSink)
    }
}
