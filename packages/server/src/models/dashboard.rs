use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Headline counters shown at the top of the admin dashboard.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct PlatformStats {
    pub total_users: u64,
    pub total_hackathons: u64,
    /// Hackathons currently waiting on an admin decision.
    pub pending_approvals: u64,
    pub published_hackathons: u64,
    pub total_teams: u64,
    pub total_projects: u64,
}

/// A recent noteworthy happening (new hackathon, new signup).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ActivityItem {
    /// One of: `hackathon_created`, `user_registered`.
    #[schema(example = "hackathon_created")]
    pub kind: String,
    #[schema(example = "AI for Good")]
    pub title: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ThemeCount {
    pub theme: String,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct PlatformInsights {
    pub hackathons_by_theme: Vec<ThemeCount>,
    pub hackathons_by_status: Vec<StatusCount>,
}

/// 30-day rolling window counters against the preceding window.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct GrowthMetrics {
    pub new_users_30d: u64,
    pub new_users_prev_30d: u64,
    pub new_hackathons_30d: u64,
    pub new_hackathons_prev_30d: u64,
}

/// Timestamped aggregation served to the admin dashboard.
#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct DashboardSnapshot {
    pub stats: PlatformStats,
    pub recent_activity: Vec<ActivityItem>,
    pub platform_insights: PlatformInsights,
    pub growth_metrics: GrowthMetrics,
    pub generated_at: DateTime<Utc>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct DashboardQuery {
    /// Bypass the snapshot cache and re-aggregate.
    pub refresh: Option<bool>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DashboardResponse {
    /// True when the snapshot was served from the cache.
    pub cached: bool,
    #[serde(flatten)]
    pub snapshot: DashboardSnapshot,
}
