use axum::Json;
use axum::extract::{Path, Query, State};
use common::{HackathonStatus, LifecycleEvent};
use sea_orm::*;
use serde::Deserialize;
use tracing::instrument;

use crate::dashboard::aggregate_snapshot;
use crate::entity::{hackathon, project, result, score};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::dashboard::{DashboardQuery, DashboardResponse};
use crate::models::hackathon::{HackathonListItem, HackathonResponse, status_of};
use crate::state::AppState;
use crate::utils::hackathon::find_hackathon_for_update;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RejectHackathonRequest {
    /// Why the hackathon was rejected; stored verbatim and shown to the
    /// organizer.
    #[schema(example = "Insufficient detail in the judging criteria")]
    pub reason: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard",
    tag = "Admin",
    operation_id = "getDashboard",
    summary = "Aggregate platform dashboard",
    description = "Returns the admin dashboard snapshot. Served from a process-local cache with a 5-minute TTL unless `refresh=true` is passed; any approve/reject action forces a refresh regardless of TTL. Requires `dashboard:view` permission.",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Dashboard snapshot", body = DashboardResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn get_dashboard(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    auth_user.require_permission("dashboard:view")?;

    let force = query.refresh.unwrap_or(false);
    if !force {
        if let Some(snapshot) = state.dashboard.get().await {
            return Ok(Json(DashboardResponse {
                cached: true,
                snapshot,
            }));
        }
    }

    // On aggregation failure the cache is left untouched: a stale snapshot
    // is preferable to none for the next caller.
    let snapshot = aggregate_snapshot(&state.db).await?;
    state.dashboard.store(snapshot.clone()).await;

    Ok(Json(DashboardResponse {
        cached: false,
        snapshot,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/pending-hackathons",
    tag = "Admin",
    operation_id = "listPendingHackathons",
    summary = "List hackathons awaiting approval",
    description = "Returns all hackathons in `pending_approval`, oldest first. Requires `hackathon:approve` permission.",
    responses(
        (status = 200, description = "Pending hackathons", body = Vec<HackathonListItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_pending_hackathons(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<HackathonListItem>>, AppError> {
    auth_user.require_permission("hackathon:approve")?;

    let pending = hackathon::Entity::find()
        .filter(hackathon::Column::Status.eq(HackathonStatus::PendingApproval))
        .order_by_asc(hackathon::Column::CreatedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(HackathonListItem::from)
        .collect();

    Ok(Json(pending))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/hackathons/{id}/approve",
    tag = "Admin",
    operation_id = "approveHackathon",
    summary = "Approve a pending hackathon",
    description = "Transitions a hackathon from `pending_approval` to `published`. Requires `hackathon:approve` permission. Approvals are not idempotent by design: a second attempt fails with INVALID_STATE instead of silently succeeding, so each approval emits exactly one lifecycle notification.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Hackathon published", body = HackathonResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Not pending approval (INVALID_STATE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, admin = auth_user.user_id))]
pub async fn approve_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<HackathonResponse>, AppError> {
    auth_user.require_permission("hackathon:approve")?;

    let txn = state.db.begin().await?;
    let existing = find_hackathon_for_update(&txn, id).await?;

    let current = status_of(&existing)?;
    if !current.can_transition_to(HackathonStatus::Published) {
        return Err(AppError::InvalidState(format!(
            "Hackathon is {current}, not pending_approval"
        )));
    }

    let mut active: hackathon::ActiveModel = existing.into();
    active.status = Set(HackathonStatus::Published.as_str().to_string());
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&txn).await?;
    txn.commit().await?;

    state.bus.publish(LifecycleEvent::StatusChanged {
        hackathon_id: model.id,
        from: current,
        to: HackathonStatus::Published,
    });

    tracing::info!(
        hackathon_id = model.id,
        admin = auth_user.user_id,
        "Hackathon approved"
    );

    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/hackathons/{id}/reject",
    tag = "Admin",
    operation_id = "rejectHackathon",
    summary = "Reject a pending hackathon",
    description = "Transitions a hackathon from `pending_approval` to `rejected`, storing the given reason verbatim. The rejected state is terminal. Requires `hackathon:approve` permission.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = RejectHackathonRequest,
    responses(
        (status = 200, description = "Hackathon rejected", body = HackathonResponse),
        (status = 400, description = "Empty reason (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Not pending approval (INVALID_STATE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, admin = auth_user.user_id))]
pub async fn reject_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<RejectHackathonRequest>,
) -> Result<Json<HackathonResponse>, AppError> {
    auth_user.require_permission("hackathon:approve")?;

    if payload.reason.trim().is_empty() {
        return Err(AppError::Validation(
            "A rejection reason is required".into(),
        ));
    }

    let txn = state.db.begin().await?;
    let existing = find_hackathon_for_update(&txn, id).await?;

    let current = status_of(&existing)?;
    if !current.can_transition_to(HackathonStatus::Rejected) {
        return Err(AppError::InvalidState(format!(
            "Hackathon is {current}, not pending_approval"
        )));
    }

    let mut active: hackathon::ActiveModel = existing.into();
    active.status = Set(HackathonStatus::Rejected.as_str().to_string());
    // Stored verbatim; only the emptiness check trims.
    active.rejection_reason = Set(Some(payload.reason));
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&txn).await?;
    txn.commit().await?;

    state.bus.publish(LifecycleEvent::StatusChanged {
        hackathon_id: model.id,
        from: current,
        to: HackathonStatus::Rejected,
    });

    tracing::info!(
        hackathon_id = model.id,
        admin = auth_user.user_id,
        "Hackathon rejected"
    );

    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/hackathons/{id}/publish-results",
    tag = "Admin",
    operation_id = "publishResults",
    summary = "Compute and publish final results",
    description = "Averages each project's judge totals, ranks the teams (score descending, ties broken by team id) and makes the results visible. Only valid for a published hackathon whose event window has ended, and only once. Requires `results:publish` permission.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Results published", body = HackathonResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Not completed, or already published (INVALID_STATE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, admin = auth_user.user_id))]
pub async fn publish_results(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<HackathonResponse>, AppError> {
    auth_user.require_permission("results:publish")?;

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;
    let existing = find_hackathon_for_update(&txn, id).await?;

    if status_of(&existing)? != HackathonStatus::Published {
        return Err(AppError::InvalidState(
            "Hackathon is not published".into(),
        ));
    }
    if now < existing.hackathon_end {
        return Err(AppError::InvalidState(
            "Hackathon has not ended yet".into(),
        ));
    }
    if existing.results_published {
        return Err(AppError::InvalidState(
            "Results are already published".into(),
        ));
    }

    // Average each scored project's judge totals; unscored projects are
    // excluded from the ranking.
    let projects = project::Entity::find()
        .filter(project::Column::HackathonId.eq(id))
        .all(&txn)
        .await?;

    let mut standings: Vec<(i32, f64)> = Vec::new();
    for p in &projects {
        let totals: Vec<f64> = score::Entity::find()
            .filter(score::Column::ProjectId.eq(p.id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|s| s.total)
            .collect();
        if totals.is_empty() {
            continue;
        }
        let final_score = totals.iter().sum::<f64>() / totals.len() as f64;
        standings.push((p.team_id, final_score));
    }

    standings.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    for (i, &(team_id, final_score)) in standings.iter().enumerate() {
        let entry = result::ActiveModel {
            hackathon_id: Set(id),
            team_id: Set(team_id),
            rank: Set(i as i32 + 1),
            final_score: Set(final_score),
            published_at: Set(now),
        };
        entry.insert(&txn).await?;
    }

    let ranked = standings.len();

    let mut active: hackathon::ActiveModel = existing.into();
    active.results_published = Set(true);
    active.updated_at = Set(now);
    let model = active.update(&txn).await?;
    txn.commit().await?;

    state
        .bus
        .publish(LifecycleEvent::ResultsPublished { hackathon_id: id });

    tracing::info!(
        hackathon_id = id,
        ranked,
        admin = auth_user.user_id,
        "Results published"
    );

    Ok(Json(model.into()))
}
