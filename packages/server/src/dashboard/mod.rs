pub mod cache;

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::{HackathonStatus, LifecycleEvent};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::entity::{hackathon, project, team, user};
use crate::models::dashboard::{
    ActivityItem, DashboardSnapshot, GrowthMetrics, PlatformInsights, PlatformStats, StatusCount,
    ThemeCount,
};
use crate::state::AppState;
use self::cache::SnapshotCache;

/// How many recent-activity entries a snapshot carries.
const RECENT_ACTIVITY_LIMIT: usize = 8;

/// Aggregate a fresh dashboard snapshot from the database.
pub async fn aggregate_snapshot(db: &DatabaseConnection) -> Result<DashboardSnapshot, DbErr> {
    let total_users = user::Entity::find().count(db).await?;
    let total_hackathons = hackathon::Entity::find().count(db).await?;
    let pending_approvals = hackathon::Entity::find()
        .filter(hackathon::Column::Status.eq(HackathonStatus::PendingApproval))
        .count(db)
        .await?;
    let published_hackathons = hackathon::Entity::find()
        .filter(hackathon::Column::Status.eq(HackathonStatus::Published))
        .count(db)
        .await?;
    let total_teams = team::Entity::find().count(db).await?;
    let total_projects = project::Entity::find().count(db).await?;

    let recent_hackathons = hackathon::Entity::find()
        .order_by_desc(hackathon::Column::CreatedAt)
        .limit(RECENT_ACTIVITY_LIMIT as u64)
        .all(db)
        .await?;
    let recent_users = user::Entity::find()
        .order_by_desc(user::Column::CreatedAt)
        .limit(RECENT_ACTIVITY_LIMIT as u64)
        .all(db)
        .await?;

    let mut recent_activity: Vec<ActivityItem> = recent_hackathons
        .into_iter()
        .map(|h| ActivityItem {
            kind: "hackathon_created".into(),
            title: h.title,
            timestamp: h.created_at,
        })
        .chain(recent_users.into_iter().map(|u| ActivityItem {
            kind: "user_registered".into(),
            title: u.username,
            timestamp: u.created_at,
        }))
        .collect();
    recent_activity.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    recent_activity.truncate(RECENT_ACTIVITY_LIMIT);

    let theme_rows: Vec<(String, i64)> = hackathon::Entity::find()
        .select_only()
        .column(hackathon::Column::Theme)
        .column_as(hackathon::Column::Id.count(), "count")
        .group_by(hackathon::Column::Theme)
        .into_tuple()
        .all(db)
        .await?;
    let mut hackathons_by_theme: Vec<ThemeCount> = theme_rows
        .into_iter()
        .map(|(theme, count)| ThemeCount {
            theme,
            count: count.max(0) as u64,
        })
        .collect();
    hackathons_by_theme.sort_by(|a, b| b.count.cmp(&a.count).then(a.theme.cmp(&b.theme)));

    let status_rows: Vec<(String, i64)> = hackathon::Entity::find()
        .select_only()
        .column(hackathon::Column::Status)
        .column_as(hackathon::Column::Id.count(), "count")
        .group_by(hackathon::Column::Status)
        .into_tuple()
        .all(db)
        .await?;
    let mut hackathons_by_status: Vec<StatusCount> = status_rows
        .into_iter()
        .map(|(status, count)| StatusCount {
            status,
            count: count.max(0) as u64,
        })
        .collect();
    hackathons_by_status.sort_by(|a, b| a.status.cmp(&b.status));

    let now = Utc::now();
    let cutoff_30d = now - Duration::days(30);
    let cutoff_60d = now - Duration::days(60);

    let new_users_30d = user::Entity::find()
        .filter(user::Column::CreatedAt.gte(cutoff_30d))
        .count(db)
        .await?;
    let new_users_prev_30d = user::Entity::find()
        .filter(user::Column::CreatedAt.gte(cutoff_60d))
        .filter(user::Column::CreatedAt.lt(cutoff_30d))
        .count(db)
        .await?;
    let new_hackathons_30d = hackathon::Entity::find()
        .filter(hackathon::Column::CreatedAt.gte(cutoff_30d))
        .count(db)
        .await?;
    let new_hackathons_prev_30d = hackathon::Entity::find()
        .filter(hackathon::Column::CreatedAt.gte(cutoff_60d))
        .filter(hackathon::Column::CreatedAt.lt(cutoff_30d))
        .count(db)
        .await?;

    Ok(DashboardSnapshot {
        stats: PlatformStats {
            total_users,
            total_hackathons,
            pending_approvals,
            published_hackathons,
            total_teams,
            total_projects,
        },
        recent_activity,
        platform_insights: PlatformInsights {
            hackathons_by_theme,
            hackathons_by_status,
        },
        growth_metrics: GrowthMetrics {
            new_users_30d,
            new_users_prev_30d,
            new_hackathons_30d,
            new_hackathons_prev_30d,
        },
        generated_at: now,
    })
}

/// Spawn the background task that keeps the dashboard cache consistent with
/// the approval state machine: every lifecycle event forces one re-aggregation
/// that overwrites the cache, regardless of remaining TTL.
pub fn spawn_refresh_listener(state: AppState) -> JoinHandle<()> {
    let db = state.db.clone();
    spawn_listener(state.bus.subscribe(), state.dashboard.clone(), move || {
        let db = db.clone();
        async move { aggregate_snapshot(&db).await }
    })
}

async fn refresh_once<F, Fut>(cache: &SnapshotCache, refresh: &F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<DashboardSnapshot, DbErr>>,
{
    match refresh().await {
        Ok(snapshot) => cache.store(snapshot).await,
        Err(e) => {
            // Keep serving nothing rather than data known to predate the
            // mutation; the next read re-aggregates.
            tracing::warn!(error = %e, "Forced dashboard refresh failed; dropping cached snapshot");
            cache.invalidate().await;
        }
    }
}

fn spawn_listener<F, Fut>(
    mut rx: broadcast::Receiver<LifecycleEvent>,
    cache: Arc<SnapshotCache>,
    refresh: F,
) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<DashboardSnapshot, DbErr>> + Send,
{
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    tracing::debug!(
                        hackathon_id = event.hackathon_id(),
                        "Lifecycle change; forcing dashboard refresh"
                    );
                    refresh_once(&cache, &refresh).await;
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Dashboard listener lagged; refreshing once to catch up");
                    refresh_once(&cache, &refresh).await;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration as StdDuration;

    use crate::events::LifecycleBus;

    fn snapshot(total_users: u64) -> DashboardSnapshot {
        DashboardSnapshot {
            stats: PlatformStats {
                total_users,
                ..Default::default()
            },
            recent_activity: vec![],
            platform_insights: PlatformInsights::default(),
            growth_metrics: GrowthMetrics::default(),
            generated_at: Utc::now(),
        }
    }

    fn status_changed(id: i32) -> LifecycleEvent {
        LifecycleEvent::StatusChanged {
            hackathon_id: id,
            from: HackathonStatus::PendingApproval,
            to: HackathonStatus::Published,
        }
    }

    async fn wait_for(condition: impl Fn() -> bool) {
        tokio::time::timeout(StdDuration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(StdDuration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_event_forces_exactly_one_refresh() {
        let bus = LifecycleBus::new(8);
        let cache = Arc::new(SnapshotCache::new(StdDuration::from_secs(300)));
        let refreshes = Arc::new(AtomicUsize::new(0));

        let counter = refreshes.clone();
        let _task = spawn_listener(bus.subscribe(), cache.clone(), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok(snapshot(n as u64)) }
        });

        bus.publish(status_changed(1));
        wait_for(|| refreshes.load(Ordering::SeqCst) == 1).await;

        bus.publish(status_changed(2));
        wait_for(|| refreshes.load(Ordering::SeqCst) == 2).await;

        // No further events: the count must stay put.
        tokio::time::sleep(StdDuration::from_millis(100)).await;
        assert_eq!(refreshes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_overwrites_a_fresh_cache_entry() {
        let bus = LifecycleBus::new(8);
        let cache = Arc::new(SnapshotCache::new(StdDuration::from_secs(300)));
        cache.store(snapshot(1)).await;

        let _task = spawn_listener(bus.subscribe(), cache.clone(), move || async move {
            Ok(snapshot(2))
        });

        // The cached entry is nowhere near its TTL, but the event must still
        // replace it.
        bus.publish(status_changed(1));

        tokio::time::timeout(StdDuration::from_secs(5), async {
            loop {
                if let Some(s) = cache.get().await {
                    if s.stats.total_users == 2 {
                        break;
                    }
                }
                tokio::time::sleep(StdDuration::from_millis(5)).await;
            }
        })
        .await
        .expect("cache was not overwritten");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_drops_the_cached_snapshot() {
        let bus = LifecycleBus::new(8);
        let cache = Arc::new(SnapshotCache::new(StdDuration::from_secs(300)));
        cache.store(snapshot(1)).await;

        let _task = spawn_listener(bus.subscribe(), cache.clone(), move || async move {
            Err(DbErr::Custom("aggregation failed".into()))
        });

        bus.publish(status_changed(1));

        tokio::time::timeout(StdDuration::from_secs(5), async {
            while cache.get().await.is_some() {
                tokio::time::sleep(StdDuration::from_millis(5)).await;
            }
        })
        .await
        .expect("stale snapshot survived a failed forced refresh");
    }
}
