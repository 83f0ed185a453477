use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use common::{HackathonStatus, LifecyclePhase};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{hackathon, project, score};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::hackathon::{criteria_of, status_of, timeline_of};
use crate::models::judge::{
    ProjectScoresResponse, ScoreProjectRequest, ScoreResponse, validate_and_total,
};
use crate::state::AppState;

/// Check the hackathon is in its judging window: started, and results not
/// yet frozen.
fn require_scoring_open(m: &hackathon::Model) -> Result<(), AppError> {
    if status_of(m)? != HackathonStatus::Published {
        return Err(AppError::InvalidState("Hackathon is not published".into()));
    }
    let phase = timeline_of(m).phase_at(Utc::now());
    if !matches!(phase, LifecyclePhase::Ongoing | LifecyclePhase::Completed) {
        return Err(AppError::Validation(
            "Scoring opens when the hackathon starts".into(),
        ));
    }
    if m.results_published {
        return Err(AppError::InvalidState(
            "Results are already published; scores are frozen".into(),
        ));
    }
    Ok(())
}

#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}/score",
    tag = "Judging",
    operation_id = "scoreProject",
    summary = "Submit or revise a score sheet for a project",
    description = "Records the caller's per-criterion scores for the project. Every judging criterion of the hackathon must be covered and each score must lie within its criterion's range; the weighted total is computed server-side. A judge may revise their sheet until results are published. Requires `project:score` permission.",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = ScoreProjectRequest,
    responses(
        (status = 200, description = "Score recorded", body = ScoreResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Scoring window closed (INVALID_STATE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(project_id, judge = auth_user.user_id))]
pub async fn score_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<i32>,
    AppJson(payload): AppJson<ScoreProjectRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    auth_user.require_permission("project:score")?;

    let project_model = project::Entity::find_by_id(project_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

    let hackathon_model = hackathon::Entity::find_by_id(project_model.hackathon_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Hackathon not found".into()))?;
    require_scoring_open(&hackathon_model)?;

    let criteria = criteria_of(&hackathon_model);
    let total = validate_and_total(&criteria, &payload.scores)?;
    let encoded = serde_json::to_value(&payload.scores)
        .map_err(|e| AppError::Internal(format!("Score encode error: {}", e)))?;

    let now = Utc::now();
    let txn = state.db.begin().await?;

    let model = match score::Entity::find_by_id((project_id, auth_user.user_id))
        .one(&txn)
        .await?
    {
        Some(existing) => {
            let mut active: score::ActiveModel = existing.into();
            active.criterion_scores = Set(encoded);
            active.total = Set(total);
            active.updated_at = Set(now);
            active.update(&txn).await?
        }
        None => {
            let new_score = score::ActiveModel {
                project_id: Set(project_id),
                judge_id: Set(auth_user.user_id),
                criterion_scores: Set(encoded),
                total: Set(total),
                created_at: Set(now),
                updated_at: Set(now),
            };
            new_score.insert(&txn).await?
        }
    };

    txn.commit().await?;

    tracing::info!(
        project_id,
        judge = auth_user.user_id,
        total,
        "Score sheet recorded"
    );

    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/scores",
    tag = "Judging",
    operation_id = "listProjectScores",
    summary = "List all score sheets for a project",
    description = "Returns every judge's sheet and the mean weighted total. Requires `project:score` or `hackathon:manage` permission.",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Scores", body = ProjectScoresResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(project_id))]
pub async fn list_project_scores(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<i32>,
) -> Result<Json<ProjectScoresResponse>, AppError> {
    if !auth_user.has_permission("project:score") && !auth_user.has_permission("hackathon:manage") {
        return Err(AppError::PermissionDenied);
    }

    project::Entity::find_by_id(project_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

    let scores: Vec<ScoreResponse> = score::Entity::find()
        .filter(score::Column::ProjectId.eq(project_id))
        .order_by_asc(score::Column::JudgeId)
        .all(&state.db)
        .await?
        .into_iter()
        .map(ScoreResponse::from)
        .collect();

    let average_total = if scores.is_empty() {
        None
    } else {
        Some(scores.iter().map(|s| s.total).sum::<f64>() / scores.len() as f64)
    };

    Ok(Json(ProjectScoresResponse {
        project_id,
        scores,
        average_total,
    }))
}
