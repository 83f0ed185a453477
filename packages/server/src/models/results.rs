use chrono::{DateTime, Utc};
use serde::Serialize;

/// One ranked team in a hackathon's published results.
#[derive(Clone, Debug, PartialEq, Serialize, utoipa::ToSchema)]
pub struct ResultEntry {
    pub team_id: i32,
    pub team_name: String,
    /// 1-based rank.
    pub rank: i32,
    pub final_score: f64,
}

/// Hackathon header attached to a results response.
#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct HackathonSummary {
    pub id: i32,
    pub title: String,
    pub theme: String,
    pub results_published: bool,
    pub results_date: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HackathonResultsResponse {
    pub hackathon: HackathonSummary,
    /// Empty until results are published.
    pub results: Vec<ResultEntry>,
}

impl From<crate::entity::hackathon::Model> for HackathonSummary {
    fn from(m: crate::entity::hackathon::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            theme: m.theme,
            results_published: m.results_published,
            results_date: m.results_date,
        }
    }
}

/// Payload of one SSE reveal event from the results watcher.
#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct ResultsReveal {
    pub hackathon_id: i32,
    pub results: Vec<ResultEntry>,
    pub revealed_at: DateTime<Utc>,
}
