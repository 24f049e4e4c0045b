//! Storage abstraction for events.

use async_trait::async_trait;
use bson::Document;

use crate::error::Result;
use crate::models::{AggregateRow, Event};
use crate::query::ListQuery;

/// Event storage operations.
///
/// The service layer is generic over this trait so it can be unit tested
/// against a mock without a running database.
#[async_trait]
pub trait EventRepository: Send + Sync + 'static {
    /// Persist a new event.
    async fn insert(&self, event: &Event) -> Result<()>;

    /// Fetch a page of events matching the query.
    async fn find(&self, query: &ListQuery) -> Result<Vec<Event>>;

    /// Run an aggregation pipeline and decode the grouped rows.
    async fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<AggregateRow>>;

    /// Check that the underlying store is reachable.
    async fn ping(&self) -> Result<()>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use mockall::mock;

    mock! {
        pub EventRepo {}

        #[async_trait]
        impl EventRepository for EventRepo {
            async fn insert(&self, event: &Event) -> Result<()>;
            async fn find(&self, query: &ListQuery) -> Result<Vec<Event>>;
            async fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<AggregateRow>>;
            async fn ping(&self) -> Result<()>;
        }
    }
}
