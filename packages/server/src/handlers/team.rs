use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::LifecyclePhase;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{team, team_member, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::team::{
    CreateTeamRequest, TeamListItem, TeamMemberInfo, TeamResponse, team_response,
    validate_create_team,
};
use crate::state::AppState;
use crate::utils::hackathon::{
    check_hackathon_access, find_hackathon, find_team, is_team_member, require_phase,
    user_team_in_hackathon,
};

#[utoipa::path(
    post,
    path = "/api/v1/hackathons/{id}/teams",
    tag = "Teams",
    operation_id = "createTeam",
    summary = "Create a team in a hackathon",
    description = "Creates a team with the caller as its first member. Only possible while the hackathon's registration window is open. Team names are unique within a hackathon, and a user can belong to at most one team per hackathon.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = TeamResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Name taken or already in a team (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(hackathon_id))]
pub async fn create_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(hackathon_id): Path<i32>,
    AppJson(payload): AppJson<CreateTeamRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_team(&payload)?;

    let hackathon_model = find_hackathon(&state.db, hackathon_id).await?;
    check_hackathon_access(&auth_user, &hackathon_model)?;
    require_phase(
        &hackathon_model,
        LifecyclePhase::RegistrationOpen,
        "Team creation",
    )?;

    let txn = state.db.begin().await?;

    if user_team_in_hackathon(&txn, auth_user.user_id, hackathon_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Already in a team for this hackathon".into(),
        ));
    }

    let name = payload.name.trim().to_string();
    let duplicate = team::Entity::find()
        .filter(team::Column::HackathonId.eq(hackathon_id))
        .filter(team::Column::Name.eq(&name))
        .one(&txn)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::Conflict(format!(
            "Team name '{name}' is already taken in this hackathon"
        )));
    }

    let now = chrono::Utc::now();
    let new_team = team::ActiveModel {
        name: Set(name),
        hackathon_id: Set(hackathon_id),
        created_by: Set(auth_user.user_id),
        created_at: Set(now),
        ..Default::default()
    };
    let model = new_team.insert(&txn).await?;

    let membership = team_member::ActiveModel {
        team_id: Set(model.id),
        user_id: Set(auth_user.user_id),
        joined_at: Set(now),
    };
    membership.insert(&txn).await?;

    txn.commit().await?;

    let members = vec![TeamMemberInfo {
        user_id: auth_user.user_id,
        username: auth_user.username,
        joined_at: now,
    }];

    Ok((StatusCode::CREATED, Json(team_response(model, members))))
}

#[utoipa::path(
    get,
    path = "/api/v1/hackathons/{id}/teams",
    tag = "Teams",
    operation_id = "listTeams",
    summary = "List teams in a hackathon",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Teams", body = Vec<TeamListItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(hackathon_id))]
pub async fn list_teams(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(hackathon_id): Path<i32>,
) -> Result<Json<Vec<TeamListItem>>, AppError> {
    let hackathon_model = find_hackathon(&state.db, hackathon_id).await?;
    check_hackathon_access(&auth_user, &hackathon_model)?;

    let teams = team::Entity::find()
        .filter(team::Column::HackathonId.eq(hackathon_id))
        .order_by_asc(team::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let member_rows: Vec<(i32, i64)> = team_member::Entity::find()
        .select_only()
        .column(team_member::Column::TeamId)
        .column_as(team_member::Column::UserId.count(), "count")
        .filter(
            team_member::Column::TeamId.is_in(teams.iter().map(|t| t.id).collect::<Vec<_>>()),
        )
        .group_by(team_member::Column::TeamId)
        .into_tuple()
        .all(&state.db)
        .await?;
    let counts: std::collections::HashMap<i32, i64> = member_rows.into_iter().collect();

    let items = teams
        .into_iter()
        .map(|t| TeamListItem {
            member_count: std::cmp::Ord::max(counts.get(&t.id).copied().unwrap_or(0), 0) as u64,
            id: t.id,
            name: t.name,
            created_by: t.created_by,
            created_at: t.created_at,
        })
        .collect();

    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/v1/teams/{id}",
    tag = "Teams",
    operation_id = "getTeam",
    summary = "Get a team with its members",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team details", body = TeamResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Team not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(team_id))]
pub async fn get_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<i32>,
) -> Result<Json<TeamResponse>, AppError> {
    let team_model = find_team(&state.db, team_id).await?;
    let hackathon_model = find_hackathon(&state.db, team_model.hackathon_id).await?;
    check_hackathon_access(&auth_user, &hackathon_model)?;

    let members = load_members(&state.db, team_id).await?;
    Ok(Json(team_response(team_model, members)))
}

#[utoipa::path(
    post,
    path = "/api/v1/teams/{id}/join",
    tag = "Teams",
    operation_id = "joinTeam",
    summary = "Join a team",
    description = "Adds the caller to the team. Only possible while registration is open, while the team has capacity, and while the caller is not in another team of the same hackathon.",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 201, description = "Joined"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Team not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Team full or already in a team (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(team_id))]
pub async fn join_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let team_model = find_team(&state.db, team_id).await?;
    let hackathon_model = find_hackathon(&state.db, team_model.hackathon_id).await?;
    check_hackathon_access(&auth_user, &hackathon_model)?;
    require_phase(
        &hackathon_model,
        LifecyclePhase::RegistrationOpen,
        "Joining a team",
    )?;

    let txn = state.db.begin().await?;

    if user_team_in_hackathon(&txn, auth_user.user_id, hackathon_model.id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Already in a team for this hackathon".into(),
        ));
    }

    let member_count = team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(team_id))
        .count(&txn)
        .await?;
    if member_count >= hackathon_model.max_team_size as u64 {
        return Err(AppError::Conflict("Team is full".into()));
    }

    let membership = team_member::ActiveModel {
        team_id: Set(team_id),
        user_id: Set(auth_user.user_id),
        joined_at: Set(chrono::Utc::now()),
    };

    match membership.insert(&txn).await {
        Ok(_) => {
            txn.commit().await?;
            Ok(StatusCode::CREATED)
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Err(AppError::Conflict("Already a member".into()))
        }
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/teams/{id}/leave",
    tag = "Teams",
    operation_id = "leaveTeam",
    summary = "Leave a team",
    description = "Removes the caller from the team while registration is open. A team whose last member leaves is deleted.",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 204, description = "Left the team"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Team or membership not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(team_id))]
pub async fn leave_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let team_model = find_team(&state.db, team_id).await?;
    let hackathon_model = find_hackathon(&state.db, team_model.hackathon_id).await?;
    require_phase(
        &hackathon_model,
        LifecyclePhase::RegistrationOpen,
        "Leaving a team",
    )?;

    if !is_team_member(&state.db, team_id, auth_user.user_id).await? {
        return Err(AppError::NotFound("Not a member of this team".into()));
    }

    let txn = state.db.begin().await?;

    team_member::Entity::delete_by_id((team_id, auth_user.user_id))
        .exec(&txn)
        .await?;

    let remaining = team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(team_id))
        .count(&txn)
        .await?;
    if remaining == 0 {
        team::Entity::delete_by_id(team_id).exec(&txn).await?;
        tracing::info!(team_id, "Deleted empty team");
    }

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn load_members<C: ConnectionTrait>(
    db: &C,
    team_id: i32,
) -> Result<Vec<TeamMemberInfo>, AppError> {
    let rows = team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(team_id))
        .find_also_related(user::Entity)
        .order_by_asc(team_member::Column::JoinedAt)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(tm, usr)| TeamMemberInfo {
            user_id: tm.user_id,
            username: usr.map(|u| u.username).unwrap_or_default(),
            joined_at: tm.joined_at,
        })
        .collect())
}
