//! Events Domain
//!
//! Handles event ingestion, storage, and querying with:
//! - MongoDB for event persistence (open-schema `properties` payload)
//! - Paginated listing with flat or structured (MongoDB syntax) filters
//! - Grouped and time-bucketed aggregation via aggregation pipelines
//!
//! # Query model
//!
//! ```text
//! GET /api/events              ─► match ─► sort ─► skip/limit
//! GET /api/events/stats        ─► $match ─► $group(field) ─► $sort(_id)
//! GET /api/events/timeseries   ─► $match ─► $group($dateToString) ─► $sort(_id)
//! ```

use utoipa::OpenApi;

mod error;
mod filter;
mod handlers;
mod models;
mod mongodb;
mod pipeline;
mod query;
mod repository;
mod service;

pub use error::{EventError, Result};
pub use filter::build_filter;
pub use handlers::{EventPage, StatsPayload, TimeSeriesPayload, events_router};
pub use models::{AggregateRow, CreateEvent, Event};
pub use mongodb::MongoEventRepository;
pub use query::{
    Aggregate, DEFAULT_LIMIT, Interval, ListQuery, MAX_LIMIT, RESERVED_PARAMS, SORT_FIELDS,
    SortOrder, StatsQuery, TimeSeriesQuery,
};
pub use repository::EventRepository;
pub use service::EventService;

/// OpenAPI documentation for the Events API
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_event,
        handlers::list_events,
        handlers::get_stats,
        handlers::get_time_series,
        handlers::health_check,
    ),
    components(schemas(
        Event,
        CreateEvent,
        AggregateRow,
        EventPage,
        StatsPayload,
        TimeSeriesPayload,
    )),
    tags(
        (name = "events", description = "Event ingestion and aggregation over MongoDB")
    )
)]
pub struct ApiDoc;
