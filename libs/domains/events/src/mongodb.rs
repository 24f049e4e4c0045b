//! MongoDB-backed event repository.

use async_trait::async_trait;
use bson::{Document, doc};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::{Collection, Database, IndexModel, options::IndexOptions};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{AggregateRow, Event};
use crate::query::ListQuery;
use crate::repository::EventRepository;

const COLLECTION_NAME: &str = "events";

/// Stored representation of an event.
///
/// Differs from the API model only in timestamp encoding: native BSON
/// datetimes instead of RFC 3339 strings, so `$dateToString` and range
/// comparisons work inside aggregation pipelines.
#[derive(Debug, Serialize, Deserialize)]
struct EventDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    properties: Document,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    updated_at: DateTime<Utc>,
}

impl From<&Event> for EventDocument {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            properties: event.properties.clone(),
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

impl From<EventDocument> for Event {
    fn from(doc: EventDocument) -> Self {
        Self {
            id: doc.id,
            properties: doc.properties,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

/// MongoDB implementation of [`EventRepository`].
#[derive(Clone)]
pub struct MongoEventRepository {
    collection: Collection<EventDocument>,
    database: Database,
}

impl MongoEventRepository {
    pub fn new(database: Database) -> Self {
        let collection = database.collection(COLLECTION_NAME);
        Self {
            collection,
            database,
        }
    }

    /// Create indexes on the timestamp fields used for sorting and
    /// time-series bucketing. Safe to call on every startup.
    pub async fn create_indexes(&self) -> Result<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "created_at": -1 })
                .options(IndexOptions::builder().name("created_at_-1".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "updated_at": -1 })
                .options(IndexOptions::builder().name("updated_at_-1".to_string()).build())
                .build(),
        ];
        self.collection.create_indexes(indexes).await?;
        debug!("event indexes ensured");
        Ok(())
    }
}

#[async_trait]
impl EventRepository for MongoEventRepository {
    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn insert(&self, event: &Event) -> Result<()> {
        self.collection.insert_one(EventDocument::from(event)).await?;
        Ok(())
    }

    #[instrument(skip(self, query), fields(page = query.page, limit = query.limit))]
    async fn find(&self, query: &ListQuery) -> Result<Vec<Event>> {
        let cursor = self
            .collection
            .find(query.filter.clone())
            .sort(query.sort_doc())
            .skip(query.skip())
            .limit(query.limit)
            .await?;

        let documents: Vec<EventDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(Event::from).collect())
    }

    #[instrument(skip(self, pipeline), fields(stages = pipeline.len()))]
    async fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<AggregateRow>> {
        let cursor = self.collection.aggregate(pipeline).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;

        documents
            .into_iter()
            .map(|doc| bson::from_document::<AggregateRow>(doc).map_err(Into::into))
            .collect()
    }

    async fn ping(&self) -> Result<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
