//! Event listing endpoints

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    extract::RawQuery,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use eventboard_core::sections::{MonthSection, group_by_month};
use eventboard_core::{AvailableFilters, FilterView, Mutation, QueryParams};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/sections", get(list_sections))
        .route("/events/mutate", post(mutate))
        .route("/events/reload", post(reload))
        .route("/filters", get(list_filters))
}

fn params(query: Option<String>) -> QueryParams {
    QueryParams::parse(query.as_deref().unwrap_or_default())
}

/// GET /events?<query> - Options, selection and filtered events for a URL
async fn list_events(State(state): State<AppState>, RawQuery(query): RawQuery) -> Json<FilterView> {
    Json(state.engine(&params(query)).view())
}

/// GET /events/sections?<query> - Filtered events grouped by month
async fn list_sections(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Json<Vec<MonthSection>> {
    let engine = state.engine(&params(query));
    Json(group_by_month(&engine.filtered_events()))
}

/// GET /filters - Options present in the full event collection
async fn list_filters(State(state): State<AppState>) -> Json<AvailableFilters> {
    Json(state.available_filters())
}

/// Request body for a filter mutation
#[derive(Deserialize)]
pub struct MutateRequest {
    /// Query string the user is currently on
    #[serde(default)]
    pub query: String,
    pub mutation: Mutation,
}

#[derive(Serialize)]
pub struct MutateResponse {
    /// Query string to navigate to
    pub query: String,
    /// Number of events the new query matches
    pub matches: usize,
}

/// POST /events/mutate - Apply a mutation and return the next query string
async fn mutate(
    State(state): State<AppState>,
    payload: Result<Json<MutateRequest>, JsonRejection>,
) -> Result<Json<MutateResponse>, AppError> {
    let Json(req) = payload.map_err(AppError::bad_request)?;

    let mut engine = state.engine(&QueryParams::parse(&req.query));
    let next = engine.apply(&req.mutation);

    Ok(Json(MutateResponse {
        query: next.to_query_string(),
        matches: engine.filtered_events().len(),
    }))
}

#[derive(Serialize)]
pub struct ReloadResponse {
    /// Number of events now loaded
    pub events: usize,
}

/// POST /events/reload - Re-read the event source after a new export
async fn reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>, AppError> {
    let events = state.reload()?;
    Ok(Json(ReloadResponse { events }))
}
