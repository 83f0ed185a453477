use axum::{Json, extract::State};
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use tracing::instrument;

use crate::entity::{project, result, team_member};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::achievement::{ACHIEVEMENTS, AchievementMetric, AchievementResponse};
use crate::state::AppState;

/// Evaluate the caller's achievements.
///
/// Achievements are derived from platform counts on every read; there is no
/// per-user unlock table to keep consistent.
#[utoipa::path(
    get,
    path = "/api/v1/achievements",
    tag = "Achievements",
    operation_id = "listAchievements",
    summary = "List the caller's achievements with progress",
    responses(
        (status = 200, description = "Achievements", body = Vec<AchievementResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_achievements(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AchievementResponse>>, AppError> {
    let my_team_ids = SeaQuery::select()
        .column(team_member::Column::TeamId)
        .from(team_member::Entity)
        .and_where(team_member::Column::UserId.eq(auth_user.user_id))
        .to_owned();

    // One team per hackathon, so memberships count hackathons joined.
    let hackathons_joined = team_member::Entity::find()
        .filter(team_member::Column::UserId.eq(auth_user.user_id))
        .count(&state.db)
        .await?;

    let projects_submitted = project::Entity::find()
        .filter(project::Column::TeamId.in_subquery(my_team_ids.clone()))
        .count(&state.db)
        .await?;

    let wins = result::Entity::find()
        .filter(result::Column::Rank.eq(1))
        .filter(result::Column::TeamId.in_subquery(my_team_ids))
        .count(&state.db)
        .await?;

    let achievements = ACHIEVEMENTS
        .iter()
        .map(|def| {
            let progress = match def.metric {
                AchievementMetric::HackathonsJoined => hackathons_joined,
                AchievementMetric::ProjectsSubmitted => projects_submitted,
                AchievementMetric::Wins => wins,
            };
            def.evaluate(progress)
        })
        .collect();

    Ok(Json(achievements))
}
