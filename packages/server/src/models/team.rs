use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::team;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTeamRequest {
    /// Team name, unique within the hackathon.
    #[schema(example = "Null Pointers")]
    pub name: String,
}

pub fn validate_create_team(req: &CreateTeamRequest) -> Result<(), AppError> {
    let name = req.name.trim();
    if name.is_empty() || name.chars().count() > 64 {
        return Err(AppError::Validation(
            "Team name must be 1-64 characters".into(),
        ));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TeamMemberInfo {
    pub user_id: i32,
    pub username: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TeamResponse {
    pub id: i32,
    pub hackathon_id: i32,
    pub name: String,
    pub created_by: i32,
    pub members: Vec<TeamMemberInfo>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TeamListItem {
    pub id: i32,
    pub name: String,
    pub created_by: i32,
    pub member_count: u64,
    pub created_at: DateTime<Utc>,
}

pub fn team_response(m: team::Model, members: Vec<TeamMemberInfo>) -> TeamResponse {
    TeamResponse {
        id: m.id,
        hackathon_id: m.hackathon_id,
        name: m.name,
        created_by: m.created_by,
        members,
        created_at: m.created_at,
    }
}
