//! Analytics seam for filter mutations.
//!
//! Sinks observe mutations; they never influence the result.

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::dimension::Dimension;

/// Event names reported by the engine
pub const FILTER_TOGGLE: &str = "filter_toggle";
pub const FILTER_SET: &str = "filter_set";
pub const FILTER_DATE_RANGE: &str = "filter_date_range";
pub const FILTER_CLEAR: &str = "filter_clear";

/// What changed in a single dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsParams {
    pub dimension: Dimension,
    pub old_value: String,
    pub new_value: String,
}

/// Receives one record per changed dimension.
pub trait AnalyticsSink {
    fn record(&self, event: &str, params: &AnalyticsParams);
}

/// Discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl AnalyticsSink for NoopSink {
    fn record(&self, _event: &str, _params: &AnalyticsParams) {}
}

/// Emits each record as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl AnalyticsSink for TracingSink {
    fn record(&self, event: &str, params: &AnalyticsParams) {
        info!(
            target: "eventboard::analytics",
            event,
            dimension = %params.dimension,
            old_value = %params.old_value,
            new_value = %params.new_value,
            "filter changed"
        );
    }
}

impl<S: AnalyticsSink + ?Sized> AnalyticsSink for &S {
    fn record(&self, event: &str, params: &AnalyticsParams) {
        (**self).record(event, params)
    }
}

impl<S: AnalyticsSink + ?Sized> AnalyticsSink for Arc<S> {
    fn record(&self, event: &str, params: &AnalyticsParams) {
        (**self).record(event, params)
    }
}

impl<S: AnalyticsSink + ?Sized> AnalyticsSink for Box<S> {
    fn record(&self, event: &str, params: &AnalyticsParams) {
        (**self).record(event, params)
    }
}
