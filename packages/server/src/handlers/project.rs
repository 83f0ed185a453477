use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::LifecyclePhase;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{project, team_member};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::project::{
    ProjectResponse, SubmitProjectRequest, UpdateProjectRequest, validate_submit_project,
    validate_update_project,
};
use crate::state::AppState;
use crate::utils::hackathon::{
    check_hackathon_access, find_hackathon, find_team, is_team_member, require_phase,
};

#[utoipa::path(
    post,
    path = "/api/v1/teams/{id}/project",
    tag = "Projects",
    operation_id = "submitProject",
    summary = "Submit a team's project",
    description = "Creates the team's project. Only team members may submit, only while the hackathon is ongoing, and only once per team. The team must satisfy the hackathon's minimum size (1 when solo participation is allowed).",
    params(("id" = i32, Path, description = "Team ID")),
    request_body = SubmitProjectRequest,
    responses(
        (status = 201, description = "Project submitted", body = ProjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a team member (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Team not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Team already has a project (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(team_id))]
pub async fn submit_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<i32>,
    AppJson(payload): AppJson<SubmitProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_submit_project(&payload)?;

    let team_model = find_team(&state.db, team_id).await?;
    let hackathon_model = find_hackathon(&state.db, team_model.hackathon_id).await?;
    check_hackathon_access(&auth_user, &hackathon_model)?;
    require_phase(&hackathon_model, LifecyclePhase::Ongoing, "Project submission")?;

    if !is_team_member(&state.db, team_id, auth_user.user_id).await? {
        return Err(AppError::PermissionDenied);
    }

    let member_count = team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(team_id))
        .count(&state.db)
        .await?;
    let required = if hackathon_model.allow_solo {
        1
    } else {
        hackathon_model.min_team_size
    };
    if member_count < required as u64 {
        return Err(AppError::Validation(format!(
            "Team needs at least {required} members to submit"
        )));
    }

    let now = chrono::Utc::now();
    let new_project = project::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        repo_url: Set(payload.repo_url),
        demo_url: Set(payload.demo_url),
        team_id: Set(team_id),
        hackathon_id: Set(hackathon_model.id),
        submitted_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    match new_project.insert(&state.db).await {
        Ok(model) => Ok((StatusCode::CREATED, Json(ProjectResponse::from(model)))),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Err(AppError::Conflict("Team already has a project".into()))
        }
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/teams/{id}/project",
    tag = "Projects",
    operation_id = "getTeamProject",
    summary = "Get a team's project",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Project", body = ProjectResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Team or project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(team_id))]
pub async fn get_team_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<i32>,
) -> Result<Json<ProjectResponse>, AppError> {
    let team_model = find_team(&state.db, team_id).await?;
    let hackathon_model = find_hackathon(&state.db, team_model.hackathon_id).await?;
    check_hackathon_access(&auth_user, &hackathon_model)?;

    let model = project::Entity::find()
        .filter(project::Column::TeamId.eq(team_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/projects/{id}",
    tag = "Projects",
    operation_id = "updateProject",
    summary = "Update a project",
    description = "Partially updates a project while the hackathon is ongoing. Only team members may edit.",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a team member (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(project_id))]
pub async fn update_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<i32>,
    AppJson(payload): AppJson<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    validate_update_project(&payload)?;

    let existing = project::Entity::find_by_id(project_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

    let hackathon_model = find_hackathon(&state.db, existing.hackathon_id).await?;
    check_hackathon_access(&auth_user, &hackathon_model)?;
    require_phase(&hackathon_model, LifecyclePhase::Ongoing, "Project editing")?;

    if !is_team_member(&state.db, existing.team_id, auth_user.user_id).await? {
        return Err(AppError::PermissionDenied);
    }

    if payload == UpdateProjectRequest::default() {
        return Ok(Json(existing.into()));
    }

    let mut active: project::ActiveModel = existing.into();

    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(repo_url) = payload.repo_url {
        active.repo_url = Set(repo_url);
    }
    if let Some(demo_url) = payload.demo_url {
        active.demo_url = Set(demo_url);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/hackathons/{id}/projects",
    tag = "Projects",
    operation_id = "listHackathonProjects",
    summary = "List all projects in a hackathon",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Projects", body = Vec<ProjectResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(hackathon_id))]
pub async fn list_hackathon_projects(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(hackathon_id): Path<i32>,
) -> Result<Json<Vec<ProjectResponse>>, AppError> {
    let hackathon_model = find_hackathon(&state.db, hackathon_id).await?;
    check_hackathon_access(&auth_user, &hackathon_model)?;

    let projects = project::Entity::find()
        .filter(project::Column::HackathonId.eq(hackathon_id))
        .order_by_asc(project::Column::SubmittedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(ProjectResponse::from)
        .collect();

    Ok(Json(projects))
}
