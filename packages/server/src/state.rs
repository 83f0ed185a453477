use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::dashboard::cache::SnapshotCache;
use crate::events::LifecycleBus;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub bus: LifecycleBus,
    pub dashboard: Arc<SnapshotCache>,
}
