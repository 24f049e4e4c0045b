//! Event domain models

use bson::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// An event record as exposed over the API.
///
/// Timestamps serialize as RFC 3339 strings in JSON responses; the
/// persistence layer stores them as native BSON datetimes so date
/// operators work inside aggregation pipelines.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Event {
    /// Unique event identifier (UUIDv7, time ordered)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,

    /// Arbitrary event payload
    #[schema(value_type = Object)]
    pub properties: Document,

    /// When the event was recorded
    pub created_at: DateTime<Utc>,

    /// When the event was last modified
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating an event.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEvent {
    /// Event payload, must contain at least one field
    #[validate(custom(function = validate_properties, message = "properties must not be empty"))]
    #[schema(value_type = Object)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

fn validate_properties(
    properties: &serde_json::Map<String, serde_json::Value>,
) -> Result<(), ValidationError> {
    if properties.is_empty() {
        return Err(ValidationError::new("empty_properties"));
    }
    Ok(())
}

/// One row of an aggregation result.
///
/// `key` carries the grouping key (`_id` in MongoDB output): a group value
/// for stats queries or a time bucket label for time-series queries. `value`
/// is the computed aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AggregateRow {
    #[serde(rename = "_id")]
    #[schema(value_type = Object)]
    pub key: serde_json::Value,
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
}
