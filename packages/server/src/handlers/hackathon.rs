use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{HackathonStatus, LifecycleEvent, Theme};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, Query as SeaQuery};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{hackathon, project, result, score, team, team_member};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::hackathon::*;
use crate::models::shared::{Pagination, escape_like};
use crate::state::AppState;
use crate::utils::hackathon::{
    check_hackathon_access, find_hackathon, find_hackathon_for_update, require_owner_or_manager,
};

#[utoipa::path(
    post,
    path = "/api/v1/hackathons",
    tag = "Hackathons",
    operation_id = "createHackathon",
    summary = "Create a new hackathon",
    description = "Creates a hackathon owned by the caller, in `draft` status (or `pending_approval` when `submit_for_review` is set). Requires `hackathon:create` permission.",
    request_body = CreateHackathonRequest,
    responses(
        (status = 201, description = "Hackathon created", body = HackathonResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateHackathonRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("hackathon:create")?;
    validate_create_hackathon(&payload)?;

    let status = if payload.submit_for_review {
        HackathonStatus::PendingApproval
    } else {
        HackathonStatus::Draft
    };

    let criteria = serde_json::to_value(&payload.judging_criteria)
        .map_err(|e| AppError::Internal(format!("Criteria encode error: {}", e)))?;

    let now = chrono::Utc::now();
    let new_hackathon = hackathon::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        theme: Set(payload.theme.as_str().to_string()),
        banner_url: Set(payload.banner_url),
        organizer_id: Set(auth_user.user_id),
        registration_start: Set(payload.registration_start),
        registration_end: Set(payload.registration_end),
        hackathon_start: Set(payload.hackathon_start),
        hackathon_end: Set(payload.hackathon_end),
        results_date: Set(payload.results_date),
        min_team_size: Set(payload.min_team_size),
        max_team_size: Set(payload.max_team_size),
        allow_solo: Set(payload.allow_solo),
        prize_first: Set(payload.prizes.first),
        prize_second: Set(payload.prizes.second),
        prize_third: Set(payload.prizes.third),
        prize_participant: Set(payload.prizes.participant),
        judging_criteria: Set(criteria),
        status: Set(status.as_str().to_string()),
        rejection_reason: Set(None),
        results_published: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_hackathon.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(HackathonResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/api/v1/hackathons",
    tag = "Hackathons",
    operation_id = "listHackathons",
    summary = "List hackathons with pagination and search",
    description = "Returns a paginated list. Users with `hackathon:manage` see every hackathon; others see published ones plus their own. Supports filtering by stored status and theme, and case-insensitive title search.",
    params(HackathonListQuery),
    responses(
        (status = 200, description = "List of hackathons", body = HackathonListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_hackathons(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<HackathonListQuery>,
) -> Result<Json<HackathonListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = hackathon::Entity::find();

    if !auth_user.has_permission("hackathon:manage") {
        select = select.filter(
            Condition::any()
                .add(hackathon::Column::Status.eq(HackathonStatus::Published))
                .add(hackathon::Column::OrganizerId.eq(auth_user.user_id)),
        );
    }

    if let Some(ref status) = query.status {
        let status: HackathonStatus = status
            .parse()
            .map_err(|e: common::lifecycle::ParseStatusError| AppError::Validation(e.to_string()))?;
        select = select.filter(hackathon::Column::Status.eq(status));
    }

    if let Some(ref theme) = query.theme {
        let theme: Theme = theme
            .parse()
            .map_err(|e: common::theme::ParseThemeError| AppError::Validation(e.to_string()))?;
        select = select.filter(hackathon::Column::Theme.eq(theme));
    }

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(hackathon::Column::Title)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let data = select
        .order_by_desc(hackathon::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(HackathonListItem::from)
        .collect();

    Ok(Json(HackathonListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/hackathons/{id}",
    tag = "Hackathons",
    operation_id = "getHackathon",
    summary = "Get a hackathon by ID",
    description = "Published hackathons are visible to every authenticated user; drafts, pending and rejected ones only to their organizer and managers. Returns 404 (not 403) for inaccessible hackathons to prevent enumeration.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Hackathon details", body = HackathonResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<HackathonResponse>, AppError> {
    let model = find_hackathon(&state.db, id).await?;
    check_hackathon_access(&auth_user, &model)?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/hackathons/{id}",
    tag = "Hackathons",
    operation_id = "updateHackathon",
    summary = "Update a hackathon",
    description = "Partially updates a hackathon using PATCH semantics. Only the organizer (or a manager) may edit, and only while the hackathon is `draft` or `pending_approval`. Cross-field invariants are re-validated over the effective values.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = UpdateHackathonRequest,
    responses(
        (status = 200, description = "Hackathon updated", body = HackathonResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Not editable in this state (INVALID_STATE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateHackathonRequest>,
) -> Result<Json<HackathonResponse>, AppError> {
    if payload == UpdateHackathonRequest::default() {
        let existing = find_hackathon(&state.db, id).await?;
        check_hackathon_access(&auth_user, &existing)?;
        require_owner_or_manager(&auth_user, &existing)?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;
    let existing = find_hackathon_for_update(&txn, id).await?;
    check_hackathon_access(&auth_user, &existing)?;
    require_owner_or_manager(&auth_user, &existing)?;

    let current = status_of(&existing)?;
    if !matches!(
        current,
        HackathonStatus::Draft | HackathonStatus::PendingApproval
    ) {
        return Err(AppError::InvalidState(format!(
            "Hackathon is {current}; only draft or pending_approval hackathons can be edited"
        )));
    }

    validate_update_hackathon(&payload, &existing)?;

    let mut active: hackathon::ActiveModel = existing.into();

    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(theme) = payload.theme {
        active.theme = Set(theme.as_str().to_string());
    }
    if let Some(banner_url) = payload.banner_url {
        active.banner_url = Set(banner_url);
    }
    if let Some(v) = payload.registration_start {
        active.registration_start = Set(v);
    }
    if let Some(v) = payload.registration_end {
        active.registration_end = Set(v);
    }
    if let Some(v) = payload.hackathon_start {
        active.hackathon_start = Set(v);
    }
    if let Some(v) = payload.hackathon_end {
        active.hackathon_end = Set(v);
    }
    if let Some(v) = payload.results_date {
        active.results_date = Set(v);
    }
    if let Some(v) = payload.min_team_size {
        active.min_team_size = Set(v);
    }
    if let Some(v) = payload.max_team_size {
        active.max_team_size = Set(v);
    }
    if let Some(v) = payload.allow_solo {
        active.allow_solo = Set(v);
    }
    if let Some(prizes) = payload.prizes {
        active.prize_first = Set(prizes.first);
        active.prize_second = Set(prizes.second);
        active.prize_third = Set(prizes.third);
        active.prize_participant = Set(prizes.participant);
    }
    if let Some(ref criteria) = payload.judging_criteria {
        let encoded = serde_json::to_value(criteria)
            .map_err(|e| AppError::Internal(format!("Criteria encode error: {}", e)))?;
        active.judging_criteria = Set(encoded);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/hackathons/{id}",
    tag = "Hackathons",
    operation_id = "deleteHackathon",
    summary = "Delete a hackathon",
    description = "Permanently deletes a hackathon and cascade-deletes its teams, memberships, projects, scores and results. Requires `hackathon:delete` permission.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 204, description = "Hackathon deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("hackathon:delete")?;

    let txn = state.db.begin().await?;
    let _hackathon = find_hackathon_for_update(&txn, id).await?;

    let team_ids = SeaQuery::select()
        .column(team::Column::Id)
        .from(team::Entity)
        .and_where(team::Column::HackathonId.eq(id))
        .to_owned();
    let project_ids = SeaQuery::select()
        .column(project::Column::Id)
        .from(project::Entity)
        .and_where(project::Column::HackathonId.eq(id))
        .to_owned();

    score::Entity::delete_many()
        .filter(score::Column::ProjectId.in_subquery(project_ids))
        .exec(&txn)
        .await?;
    result::Entity::delete_many()
        .filter(result::Column::HackathonId.eq(id))
        .exec(&txn)
        .await?;
    project::Entity::delete_many()
        .filter(project::Column::HackathonId.eq(id))
        .exec(&txn)
        .await?;
    team_member::Entity::delete_many()
        .filter(team_member::Column::TeamId.in_subquery(team_ids))
        .exec(&txn)
        .await?;
    team::Entity::delete_many()
        .filter(team::Column::HackathonId.eq(id))
        .exec(&txn)
        .await?;
    hackathon::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/hackathons/{id}/submit",
    tag = "Hackathons",
    operation_id = "submitHackathon",
    summary = "Submit a draft hackathon for review",
    description = "Moves a draft hackathon to `pending_approval`. Only the organizer (or a manager) may submit. Emits a lifecycle-changed notification.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Submitted for review", body = HackathonResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Not a draft (INVALID_STATE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn submit_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<HackathonResponse>, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_hackathon_for_update(&txn, id).await?;
    check_hackathon_access(&auth_user, &existing)?;
    require_owner_or_manager(&auth_user, &existing)?;

    let current = status_of(&existing)?;
    if !current.can_transition_to(HackathonStatus::PendingApproval) {
        return Err(AppError::InvalidState(format!(
            "Hackathon is {current}, not draft"
        )));
    }

    let mut active: hackathon::ActiveModel = existing.into();
    active.status = Set(HackathonStatus::PendingApproval.as_str().to_string());
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&txn).await?;
    txn.commit().await?;

    // Only after the commit: observers must never refresh against
    // uncommitted state.
    state.bus.publish(LifecycleEvent::StatusChanged {
        hackathon_id: model.id,
        from: current,
        to: HackathonStatus::PendingApproval,
    });

    tracing::info!(
        hackathon_id = model.id,
        user_id = auth_user.user_id,
        "Hackathon submitted for review"
    );

    Ok(Json(model.into()))
}
