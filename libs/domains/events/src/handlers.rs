//! HTTP handlers for the events API.
//!
//! The read endpoints parse the raw query string themselves: non-reserved
//! parameters double as exact-match filters, which a typed extractor
//! cannot express.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum_helpers::ApiResponse;
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::error::EventError;
use crate::models::{AggregateRow, CreateEvent, Event};
use crate::query::{ListQuery, StatsQuery, TimeSeriesQuery};
use crate::repository::EventRepository;
use crate::service::EventService;

/// Events router state
pub type EventsState<R> = Arc<EventService<R>>;

/// Create the events router
pub fn events_router<R: EventRepository>() -> Router<EventsState<R>> {
    Router::new()
        .route("/", get(list_events::<R>).post(create_event::<R>))
        .route("/stats", get(get_stats::<R>))
        .route("/timeseries", get(get_time_series::<R>))
        .route("/health", get(health_check::<R>))
}

/// Payload for the paginated list endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventPage {
    pub page: u64,
    pub limit: i64,
    pub events: Vec<Event>,
}

/// Payload for the grouped stats endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsPayload {
    pub group_by: String,
    pub aggregates: String,
    pub stats: Vec<AggregateRow>,
}

/// Payload for the time-series endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPayload {
    pub interval: String,
    pub aggregates: String,
    pub time_series: Vec<AggregateRow>,
}

/// Create a new event
#[utoipa::path(
    post,
    path = "/",
    request_body = CreateEvent,
    responses(
        (status = 201, description = "Event created", body = ApiResponse<Event>),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    ),
    tag = "events"
)]
#[instrument(skip(state, create))]
pub async fn create_event<R: EventRepository>(
    State(state): State<EventsState<R>>,
    Json(create): Json<CreateEvent>,
) -> Result<impl IntoResponse, EventError> {
    let event = state.create(create).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Event created successfully", event)),
    ))
}

/// List events with pagination, sorting, and filtering
#[utoipa::path(
    get,
    path = "/",
    params(
        ("page" = Option<u64>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<i64>, Query, description = "Page size, 1 to 1000"),
        ("sortBy" = Option<String>, Query, description = "Sort field: created_at, updated_at, or id"),
        ("sortOrder" = Option<String>, Query, description = "Sort order: asc or desc"),
        ("filters" = Option<String>, Query, description = "JSON object with MongoDB filter syntax"),
    ),
    responses(
        (status = 200, description = "Page of events", body = ApiResponse<EventPage>),
        (status = 400, description = "Invalid query parameters"),
        (status = 500, description = "Internal error")
    ),
    tag = "events"
)]
#[instrument(skip(state, params))]
pub async fn list_events<R: EventRepository>(
    State(state): State<EventsState<R>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<EventPage>>, EventError> {
    let query = ListQuery::from_params(&params)?;
    let events = state.list(&query).await?;

    Ok(Json(ApiResponse::ok(
        "Events retrieved successfully",
        EventPage {
            page: query.page,
            limit: query.limit,
            events,
        },
    )))
}

/// Group events by a field and aggregate
#[utoipa::path(
    get,
    path = "/stats",
    params(
        ("groupBy" = String, Query, description = "Field to group by"),
        ("aggregates" = Option<String>, Query, description = "Aggregation: count, sum, or avg"),
        ("filters" = Option<String>, Query, description = "JSON object with MongoDB filter syntax"),
    ),
    responses(
        (status = 200, description = "Grouped aggregates", body = ApiResponse<StatsPayload>),
        (status = 400, description = "Invalid query parameters"),
        (status = 500, description = "Internal error")
    ),
    tag = "events"
)]
#[instrument(skip(state, params))]
pub async fn get_stats<R: EventRepository>(
    State(state): State<EventsState<R>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<StatsPayload>>, EventError> {
    let query = StatsQuery::from_params(&params)?;
    let stats = state.stats(&query).await?;

    Ok(Json(ApiResponse::ok(
        "Stats retrieved successfully",
        StatsPayload {
            group_by: query.group_by.clone(),
            aggregates: query.aggregate.as_ref().to_string(),
            stats,
        },
    )))
}

/// Bucket events by time interval and aggregate
#[utoipa::path(
    get,
    path = "/timeseries",
    params(
        ("interval" = Option<String>, Query, description = "Bucket width: hour, day, week, or month"),
        ("aggregates" = Option<String>, Query, description = "Aggregation: count, sum, or avg"),
        ("filters" = Option<String>, Query, description = "JSON object with MongoDB filter syntax"),
    ),
    responses(
        (status = 200, description = "Time-bucketed aggregates", body = ApiResponse<TimeSeriesPayload>),
        (status = 400, description = "Invalid query parameters"),
        (status = 500, description = "Internal error")
    ),
    tag = "events"
)]
#[instrument(skip(state, params))]
pub async fn get_time_series<R: EventRepository>(
    State(state): State<EventsState<R>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<TimeSeriesPayload>>, EventError> {
    let query = TimeSeriesQuery::from_params(&params)?;
    let time_series = state.time_series(&query).await?;

    Ok(Json(ApiResponse::ok(
        "Time series retrieved successfully",
        TimeSeriesPayload {
            interval: query.interval.as_ref().to_string(),
            aggregates: query.aggregate.as_ref().to_string(),
            time_series,
        },
    )))
}

/// Event store health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Store reachable"),
        (status = 503, description = "Store unreachable or slow")
    ),
    tag = "events"
)]
pub async fn health_check<R: EventRepository>(
    State(state): State<EventsState<R>>,
) -> Result<Json<ApiResponse<serde_json::Value>>, EventError> {
    state.health().await?;
    Ok(Json(ApiResponse::ok(
        "Event store is healthy",
        serde_json::json!({ "status": "healthy" }),
    )))
}
