use axum::Json;
use tracing::instrument;

use crate::models::skills::{SKILLS, SkillsResponse};

/// Return the predefined skill list.
///
/// Static data; no authentication and no persistence behind it.
#[utoipa::path(
    get,
    path = "/api/v1/skills",
    tag = "Skills",
    operation_id = "listSkills",
    summary = "List predefined technology/skill tags",
    responses(
        (status = 200, description = "Skill list", body = SkillsResponse),
    ),
)]
#[instrument]
pub async fn list_skills() -> Json<SkillsResponse> {
    Json(SkillsResponse {
        skills: SKILLS.to_vec(),
    })
}
