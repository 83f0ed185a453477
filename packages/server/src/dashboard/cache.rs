use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::models::dashboard::DashboardSnapshot;

struct CachedSnapshot {
    snapshot: DashboardSnapshot,
    cached_at: Instant,
}

/// TTL cache for the admin dashboard snapshot.
///
/// One entry per dashboard kind; only the admin dashboard exists, so this
/// holds a single slot. The cache is process-local and never persisted.
/// `tokio::time::Instant` is used so tests can drive the TTL with a paused
/// clock.
pub struct SnapshotCache {
    inner: RwLock<Option<CachedSnapshot>>,
    ttl: Duration,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(None),
            ttl,
        }
    }

    /// Return the cached snapshot if one exists and is younger than the TTL.
    pub async fn get(&self) -> Option<DashboardSnapshot> {
        let guard = self.inner.read().await;
        match guard.as_ref() {
            Some(cached) if cached.cached_at.elapsed() < self.ttl => Some(cached.snapshot.clone()),
            _ => None,
        }
    }

    /// Store a snapshot, restarting its TTL.
    pub async fn store(&self, snapshot: DashboardSnapshot) {
        let mut guard = self.inner.write().await;
        *guard = Some(CachedSnapshot {
            snapshot,
            cached_at: Instant::now(),
        });
    }

    /// Drop the cached snapshot so the next read re-aggregates.
    pub async fn invalidate(&self) {
        let mut guard = self.inner.write().await;
        *guard = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dashboard::{
        DashboardSnapshot, GrowthMetrics, PlatformInsights, PlatformStats,
    };

    fn snapshot(total_users: u64) -> DashboardSnapshot {
        DashboardSnapshot {
            stats: PlatformStats {
                total_users,
                ..Default::default()
            },
            recent_activity: vec![],
            platform_insights: PlatformInsights::default(),
            growth_metrics: GrowthMetrics::default(),
            generated_at: chrono::Utc::now(),
        }
    }

    const TTL: Duration = Duration::from_secs(300);

    #[tokio::test(start_paused = true)]
    async fn test_fresh_snapshot_is_served() {
        let cache = SnapshotCache::new(TTL);
        cache.store(snapshot(5)).await;

        // One second short of the TTL: still fresh.
        tokio::time::advance(Duration::from_secs(299)).await;
        let got = cache.get().await.expect("snapshot should still be cached");
        assert_eq!(got.stats.total_users, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_snapshot_is_not_served() {
        let cache = SnapshotCache::new(TTL);
        cache.store(snapshot(5)).await;

        tokio::time::advance(Duration::from_secs(301)).await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_restarts_the_ttl() {
        let cache = SnapshotCache::new(TTL);
        cache.store(snapshot(1)).await;

        tokio::time::advance(Duration::from_secs(200)).await;
        cache.store(snapshot(2)).await;

        // 200s after the overwrite the original entry would be expired,
        // the new one is not.
        tokio::time::advance(Duration::from_secs(200)).await;
        let got = cache.get().await.expect("overwritten snapshot should be fresh");
        assert_eq!(got.stats.total_users, 2);
    }

    #[tokio::test]
    async fn test_invalidate_clears_the_slot() {
        let cache = SnapshotCache::new(TTL);
        cache.store(snapshot(5)).await;
        cache.invalidate().await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn test_empty_cache_misses() {
        let cache = SnapshotCache::new(TTL);
        assert!(cache.get().await.is_none());
    }
}
