use chrono::Utc;
use common::{HackathonStatus, LifecyclePhase};
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::{ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter};

use crate::entity::{hackathon, team, team_member};
use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::models::hackathon::{status_of, timeline_of};

/// Look up a hackathon by ID, returning 404 if not found.
pub async fn find_hackathon<C: sea_orm::ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<hackathon::Model, AppError> {
    hackathon::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Hackathon not found".into()))
}

/// Look up a hackathon with a row lock, for status transitions.
pub async fn find_hackathon_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<hackathon::Model, AppError> {
    use sea_orm::QuerySelect;
    use sea_orm::sea_query::LockType;
    hackathon::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Hackathon not found".into()))
}

/// Verify the caller can view the given hackathon.
///
/// Published hackathons are visible to every authenticated user; drafts,
/// pending and rejected ones only to their organizer and managers. Returns
/// 404 (not 403) for inaccessible hackathons to prevent enumeration.
pub fn check_hackathon_access(
    auth_user: &AuthUser,
    m: &hackathon::Model,
) -> Result<(), AppError> {
    if auth_user.has_permission("hackathon:manage") {
        return Ok(());
    }
    if status_of(m)? == HackathonStatus::Published {
        return Ok(());
    }
    if m.organizer_id == auth_user.user_id {
        return Ok(());
    }
    Err(AppError::NotFound("Hackathon not found".into()))
}

/// Verify the caller owns the hackathon or holds `hackathon:manage`.
pub fn require_owner_or_manager(
    auth_user: &AuthUser,
    m: &hackathon::Model,
) -> Result<(), AppError> {
    if auth_user.has_permission("hackathon:manage") || m.organizer_id == auth_user.user_id {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}

/// Check the hackathon is published and currently in `expected` phase.
///
/// Used to gate time-windowed actions: team formation during registration,
/// project submission and scoring while ongoing.
pub fn require_phase(
    m: &hackathon::Model,
    expected: LifecyclePhase,
    action: &str,
) -> Result<(), AppError> {
    if status_of(m)? != HackathonStatus::Published {
        return Err(AppError::InvalidState(
            "Hackathon is not published".into(),
        ));
    }
    let phase = timeline_of(m).phase_at(Utc::now());
    if phase != expected {
        return Err(AppError::Validation(format!(
            "{action} is only possible while the hackathon is {expected}, current phase is {phase}"
        )));
    }
    Ok(())
}

/// Look up a team by ID, returning 404 if not found.
pub async fn find_team<C: sea_orm::ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<team::Model, AppError> {
    team::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".into()))
}

/// The team the user belongs to within a hackathon, if any.
pub async fn user_team_in_hackathon<C: sea_orm::ConnectionTrait>(
    db: &C,
    user_id: i32,
    hackathon_id: i32,
) -> Result<Option<team::Model>, AppError> {
    let found = team::Entity::find()
        .filter(team::Column::HackathonId.eq(hackathon_id))
        .filter(
            team::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(team_member::Column::TeamId)
                    .from(team_member::Entity)
                    .and_where(team_member::Column::UserId.eq(user_id))
                    .to_owned(),
            ),
        )
        .one(db)
        .await?;
    Ok(found)
}

/// Whether the user is a member of the given team.
pub async fn is_team_member<C: sea_orm::ConnectionTrait>(
    db: &C,
    team_id: i32,
    user_id: i32,
) -> Result<bool, AppError> {
    Ok(team_member::Entity::find_by_id((team_id, user_id))
        .one(db)
        .await?
        .is_some())
}
