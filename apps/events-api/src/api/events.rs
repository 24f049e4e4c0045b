//! Events API routes

use crate::state::AppState;
use axum::Router;
use domain_events::{EventService, MongoEventRepository};
use std::sync::Arc;
use tracing::info;

/// Create the events router backed by MongoDB
pub fn router(state: &AppState) -> Router {
    let repository = MongoEventRepository::new(state.db.clone());

    let service =
        EventService::new(repository).with_query_timeout(state.config.query_timeout);

    // Use the domain's router
    domain_events::events_router().with_state(Arc::new(service))
}

/// Initialize event indexes in MongoDB
pub async fn init_indexes(db: &mongodb::Database) -> eyre::Result<()> {
    let repository = MongoEventRepository::new(db.clone());
    repository
        .create_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create event indexes: {}", e))?;
    info!("Event collection indexes created");
    Ok(())
}
