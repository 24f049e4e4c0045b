//! Event business logic.

use std::future::Future;
use std::time::Duration;

use bson::Document;
use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{EventError, Result};
use crate::models::{AggregateRow, CreateEvent, Event};
use crate::pipeline::{group_pipeline, time_series_pipeline};
use crate::query::{ListQuery, StatsQuery, TimeSeriesQuery};
use crate::repository::EventRepository;

const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Service layer over an [`EventRepository`].
///
/// Every store call runs under a single configurable timeout; a store
/// that stalls surfaces as [`EventError::Timeout`] rather than holding
/// the request open.
#[derive(Clone)]
pub struct EventService<R: EventRepository> {
    repository: R,
    query_timeout: Duration,
}

impl<R: EventRepository> EventService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    async fn timed<T>(&self, operation: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.query_timeout, operation)
            .await
            .unwrap_or(Err(EventError::Timeout {
                limit: self.query_timeout,
            }))
    }

    /// Validate and persist a new event. Both timestamps are set server
    /// side at creation.
    #[instrument(skip(self, payload))]
    pub async fn create(&self, payload: CreateEvent) -> Result<Event> {
        payload.validate()?;

        let properties = Document::try_from(payload.properties)
            .map_err(|e| EventError::validation(format!("Invalid properties: {}", e)))?;

        let now = Utc::now();
        let event = Event {
            id: Uuid::now_v7(),
            properties,
            created_at: now,
            updated_at: now,
        };

        self.timed(self.repository.insert(&event)).await?;
        Ok(event)
    }

    /// Fetch one page of events.
    #[instrument(skip(self, query), fields(page = query.page, limit = query.limit))]
    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Event>> {
        self.timed(self.repository.find(query)).await
    }

    /// Group events by a field and aggregate.
    #[instrument(skip(self, query), fields(group_by = %query.group_by))]
    pub async fn stats(&self, query: &StatsQuery) -> Result<Vec<AggregateRow>> {
        let pipeline = group_pipeline(query.filter.clone(), &query.group_by, query.aggregate);
        self.timed(self.repository.aggregate(pipeline)).await
    }

    /// Bucket events by time interval and aggregate.
    #[instrument(skip(self, query))]
    pub async fn time_series(&self, query: &TimeSeriesQuery) -> Result<Vec<AggregateRow>> {
        let pipeline = time_series_pipeline(query.filter.clone(), query.interval, query.aggregate);
        self.timed(self.repository.aggregate(pipeline)).await
    }

    /// Check that the event store is reachable.
    pub async fn health(&self) -> Result<()> {
        self.timed(self.repository.ping()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Aggregate, Interval, SortOrder};
    use crate::repository::mock::MockEventRepo;
    use bson::doc;
    use std::collections::HashMap;

    fn service(repo: MockEventRepo) -> EventService<MockEventRepo> {
        EventService::new(repo)
    }

    fn create_payload(pairs: &[(&str, serde_json::Value)]) -> CreateEvent {
        let mut properties = serde_json::Map::new();
        for (k, v) in pairs {
            properties.insert(k.to_string(), v.clone());
        }
        CreateEvent { properties }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamps() {
        let mut repo = MockEventRepo::new();
        repo.expect_insert()
            .withf(|event| event.properties == doc! { "plan": "pro" })
            .times(1)
            .returning(|_| Ok(()));

        let event = service(repo)
            .create(create_payload(&[("plan", serde_json::json!("pro"))]))
            .await
            .unwrap();

        assert_eq!(event.created_at, event.updated_at);
        assert_eq!(event.id.get_version_num(), 7);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_properties() {
        let repo = MockEventRepo::new();
        let result = service(repo).create(create_payload(&[])).await;
        assert!(matches!(result, Err(EventError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_list_passes_query_through() {
        let mut repo = MockEventRepo::new();
        repo.expect_find()
            .withf(|query| query.page == 2 && query.limit == 10)
            .times(1)
            .returning(|_| Ok(vec![]));

        let query = ListQuery {
            filter: Document::new(),
            sort_by: "created_at".to_string(),
            order: SortOrder::Desc,
            page: 2,
            limit: 10,
        };
        let events = service(repo).list(&query).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_stats_builds_group_pipeline() {
        let mut repo = MockEventRepo::new();
        repo.expect_aggregate()
            .withf(|pipeline| {
                pipeline.len() == 3
                    && pipeline[1]
                        == doc! { "$group": { "_id": "$properties.plan", "value": { "$sum": 1 } } }
            })
            .times(1)
            .returning(|_| {
                Ok(vec![AggregateRow {
                    key: serde_json::json!("pro"),
                    value: serde_json::json!(3),
                }])
            });

        let query = StatsQuery {
            filter: Document::new(),
            group_by: "plan".to_string(),
            aggregate: Aggregate::Count,
        };
        let rows = service(repo).stats(&query).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, serde_json::json!("pro"));
    }

    #[tokio::test]
    async fn test_time_series_builds_bucket_pipeline() {
        let mut repo = MockEventRepo::new();
        repo.expect_aggregate()
            .withf(|pipeline| {
                let group = pipeline[1].get_document("$group").unwrap();
                let bucket = group.get_document("_id").unwrap();
                bucket
                    .get_document("$dateToString")
                    .map(|d| d.get_str("format") == Ok("%Y-%m"))
                    .unwrap_or(false)
            })
            .times(1)
            .returning(|_| Ok(vec![]));

        let query = TimeSeriesQuery {
            filter: Document::new(),
            interval: Interval::Month,
            aggregate: Aggregate::Count,
        };
        assert!(service(repo).time_series(&query).await.is_ok());
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let mut repo = MockEventRepo::new();
        repo.expect_find().returning(|_| {
            Err(EventError::Database {
                message: "connection reset".to_string(),
                source: None,
            })
        });

        let query = ListQuery::from_params(&HashMap::new()).unwrap();
        let result = service(repo).list(&query).await;
        assert!(matches!(result, Err(EventError::Database { .. })));
    }

    /// Repository whose every call sleeps past any reasonable timeout.
    struct StalledRepo;

    #[async_trait::async_trait]
    impl EventRepository for StalledRepo {
        async fn insert(&self, _event: &Event) -> Result<()> {
            stall().await
        }
        async fn find(&self, _query: &ListQuery) -> Result<Vec<Event>> {
            stall().await
        }
        async fn aggregate(&self, _pipeline: Vec<Document>) -> Result<Vec<AggregateRow>> {
            stall().await
        }
        async fn ping(&self) -> Result<()> {
            stall().await
        }
    }

    async fn stall<T>() -> Result<T> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        unreachable!("stalled repository should never complete")
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_store_times_out() {
        let service =
            EventService::new(StalledRepo).with_query_timeout(Duration::from_secs(1));
        let result = service.health().await;
        assert!(matches!(result, Err(EventError::Timeout { .. })));
    }
}
