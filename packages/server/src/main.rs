use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{Level, info};

use server::config::AppConfig;
use server::dashboard::cache::SnapshotCache;
use server::events::LifecycleBus;
use server::state::AppState;
use server::{dashboard, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = database::init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    seed::seed_role_permissions(&db)
        .await
        .context("Failed to seed roles")?;

    let state = AppState {
        db,
        bus: LifecycleBus::default(),
        dashboard: Arc::new(SnapshotCache::new(Duration::from_secs(
            config.dashboard.cache_ttl_secs,
        ))),
        config,
    };

    // Keeps the dashboard cache consistent with approve/reject actions.
    dashboard::spawn_refresh_listener(state.clone());

    let addr = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    );
    let app = server::build_router(state);

    info!("Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
