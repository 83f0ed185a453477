use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{double_option, validate_optional_url, validate_title};
use crate::entity::project;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubmitProjectRequest {
    pub title: String,
    pub description: String,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub repo_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub demo_url: Option<Option<String>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectResponse {
    pub id: i32,
    pub team_id: i32,
    pub hackathon_id: i32,
    pub title: String,
    pub description: String,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<project::Model> for ProjectResponse {
    fn from(m: project::Model) -> Self {
        Self {
            id: m.id,
            team_id: m.team_id,
            hackathon_id: m.hackathon_id,
            title: m.title,
            description: m.description,
            repo_url: m.repo_url,
            demo_url: m.demo_url,
            submitted_at: m.submitted_at,
            updated_at: m.updated_at,
        }
    }
}

fn validate_description(description: &str) -> Result<(), AppError> {
    if description.trim().is_empty() || description.len() > 100_000 {
        return Err(AppError::Validation(
            "Description must be non-empty and at most 100KB".into(),
        ));
    }
    Ok(())
}

pub fn validate_submit_project(req: &SubmitProjectRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;
    validate_description(&req.description)?;
    validate_optional_url(req.repo_url.as_deref(), "repo_url")?;
    validate_optional_url(req.demo_url.as_deref(), "demo_url")
}

pub fn validate_update_project(req: &UpdateProjectRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(ref description) = req.description {
        validate_description(description)?;
    }
    if let Some(Some(ref url)) = req.repo_url {
        validate_optional_url(Some(url), "repo_url")?;
    }
    if let Some(Some(ref url)) = req.demo_url {
        validate_optional_url(Some(url), "demo_url")?;
    }
    Ok(())
}
