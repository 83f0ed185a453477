use async_trait::async_trait;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};

use crate::entity::{result, team};
use crate::models::results::ResultEntry;

/// Seam between the results watcher and whatever holds the results.
///
/// The watcher only ever needs "give me the published entries for this
/// hackathon"; keeping that behind a trait makes the polling loop testable
/// without a database.
#[async_trait]
pub trait ResultsSource: Send + Sync + 'static {
    async fn fetch_results(&self, hackathon_id: i32) -> anyhow::Result<Vec<ResultEntry>>;
}

/// Ranked entries for a hackathon, with team names resolved.
///
/// Result rows only exist once an admin has published, so an unpublished
/// hackathon yields an empty list.
pub async fn fetch_published_results<C: ConnectionTrait>(
    db: &C,
    hackathon_id: i32,
) -> Result<Vec<ResultEntry>, DbErr> {
    let rows = result::Entity::find()
        .filter(result::Column::HackathonId.eq(hackathon_id))
        .find_also_related(team::Entity)
        .order_by_asc(result::Column::Rank)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(r, t)| ResultEntry {
            team_id: r.team_id,
            team_name: t.map(|t| t.name).unwrap_or_default(),
            rank: r.rank,
            final_score: r.final_score,
        })
        .collect())
}

/// [`ResultsSource`] backed by the application database.
pub struct DbResultsSource {
    db: DatabaseConnection,
}

impl DbResultsSource {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ResultsSource for DbResultsSource {
    async fn fetch_results(&self, hackathon_id: i32) -> anyhow::Result<Vec<ResultEntry>> {
        Ok(fetch_published_results(&self.db, hackathon_id).await?)
    }
}
