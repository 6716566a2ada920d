//! Core of the eventboard ecosystem.
//!
//! A pure pipeline over an in-memory event collection:
//! - `options` derives the filter choices present in the events
//! - `selection` reads and writes the user's choices as URL query parameters
//! - `filter` narrows and orders the events
//! - `engine` ties them together and turns user actions into the next query
//! - `observer` tracks the active month section while a list scrolls

pub mod analytics;
pub mod config;
pub mod date_range;
pub mod dimension;
pub mod engine;
pub mod error;
pub mod event;
pub mod filter;
pub mod observer;
pub mod options;
pub mod query;
pub mod sections;
pub mod selection;
pub mod source;

// Re-export the main types at crate root for convenience
pub use analytics::{AnalyticsParams, AnalyticsSink, NoopSink, TracingSink};
pub use date_range::DateRange;
pub use dimension::{Dimension, DimensionKind};
pub use engine::{FilterEngine, FilterView, Mutation};
pub use error::{EventBoardError, EventBoardResult};
pub use event::{Event, EventMode};
pub use filter::filter_events;
pub use options::{AvailableFilters, FilterValue, derive_filters};
pub use query::{QueryParams, QueryValue};
pub use selection::{SelectedFilterValues, StaleValue};
