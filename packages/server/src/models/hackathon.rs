use chrono::{DateTime, Utc};
use common::{HackathonStatus, LifecyclePhase, Theme, Timeline};
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, double_option, validate_optional_url, validate_title};
use crate::entity::hackathon;
use crate::error::AppError;

/// One judging dimension of a hackathon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default, utoipa::ToSchema)]
pub struct JudgingCriterion {
    /// Short name of the dimension (e.g. "Innovation").
    #[schema(example = "Innovation")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Relative weight applied to this criterion's score in the total.
    #[schema(example = 0.4)]
    pub weight: f64,
    /// Highest score a judge may assign for this criterion.
    #[schema(example = 10)]
    pub max_score: i32,
}

/// Prize pool of a hackathon; all fields free text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default, utoipa::ToSchema)]
pub struct Prizes {
    pub first: Option<String>,
    pub second: Option<String>,
    pub third: Option<String>,
    pub participant: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateHackathonRequest {
    pub title: String,
    pub description: String,
    pub theme: Theme,
    pub banner_url: Option<String>,
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    pub hackathon_start: DateTime<Utc>,
    pub hackathon_end: DateTime<Utc>,
    pub results_date: DateTime<Utc>,
    pub min_team_size: i32,
    pub max_team_size: i32,
    pub allow_solo: bool,
    #[serde(default)]
    pub prizes: Prizes,
    pub judging_criteria: Vec<JudgingCriterion>,
    /// Skip the draft stage and submit straight to review.
    #[serde(default)]
    pub submit_for_review: bool,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateHackathonRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub theme: Option<Theme>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub banner_url: Option<Option<String>>,
    pub registration_start: Option<DateTime<Utc>>,
    pub registration_end: Option<DateTime<Utc>>,
    pub hackathon_start: Option<DateTime<Utc>>,
    pub hackathon_end: Option<DateTime<Utc>>,
    pub results_date: Option<DateTime<Utc>>,
    pub min_team_size: Option<i32>,
    pub max_team_size: Option<i32>,
    pub allow_solo: Option<bool>,
    pub prizes: Option<Prizes>,
    pub judging_criteria: Option<Vec<JudgingCriterion>>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct HackathonListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Case-insensitive title search.
    pub search: Option<String>,
    /// Filter by stored status (draft, pending_approval, published, rejected).
    pub status: Option<String>,
    /// Filter by theme.
    pub theme: Option<String>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct HackathonResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub theme: String,
    pub banner_url: Option<String>,
    pub organizer_id: i32,
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    pub hackathon_start: DateTime<Utc>,
    pub hackathon_end: DateTime<Utc>,
    pub results_date: DateTime<Utc>,
    pub min_team_size: i32,
    pub max_team_size: i32,
    pub allow_solo: bool,
    pub prizes: Prizes,
    pub judging_criteria: Vec<JudgingCriterion>,
    /// Stored workflow status.
    #[schema(example = "published")]
    pub status: String,
    /// Timeline projection of the stored status (`ongoing`/`completed` for
    /// published hackathons whose event window has started/ended).
    #[schema(example = "ongoing")]
    pub display_status: String,
    pub phase: LifecyclePhase,
    pub rejection_reason: Option<String>,
    pub results_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HackathonListItem {
    pub id: i32,
    pub title: String,
    pub theme: String,
    pub organizer_id: i32,
    pub hackathon_start: DateTime<Utc>,
    pub hackathon_end: DateTime<Utc>,
    pub status: String,
    pub display_status: String,
    pub results_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HackathonListResponse {
    pub data: Vec<HackathonListItem>,
    pub pagination: Pagination,
}

/// Extract the typed timeline from a stored row.
pub fn timeline_of(m: &hackathon::Model) -> Timeline {
    Timeline {
        registration_start: m.registration_start,
        registration_end: m.registration_end,
        hackathon_start: m.hackathon_start,
        hackathon_end: m.hackathon_end,
        results_date: m.results_date,
    }
}

/// Parse the stored status string. A row that fails this check is corrupt.
pub fn status_of(m: &hackathon::Model) -> Result<HackathonStatus, AppError> {
    m.status
        .parse()
        .map_err(|_| AppError::Internal(format!("Corrupt hackathon status '{}'", m.status)))
}

/// Decode the stored criteria list. Rows are validated on write, so decode
/// failures degrade to an empty list rather than failing the response.
pub fn criteria_of(m: &hackathon::Model) -> Vec<JudgingCriterion> {
    serde_json::from_value(m.judging_criteria.clone()).unwrap_or_default()
}

impl From<hackathon::Model> for HackathonResponse {
    fn from(m: hackathon::Model) -> Self {
        let phase = timeline_of(&m).phase_at(Utc::now());
        let display_status = m
            .status
            .parse::<HackathonStatus>()
            .map(|s| s.display(phase))
            .unwrap_or("draft")
            .to_string();
        let judging_criteria = criteria_of(&m);
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            theme: m.theme,
            banner_url: m.banner_url,
            organizer_id: m.organizer_id,
            registration_start: m.registration_start,
            registration_end: m.registration_end,
            hackathon_start: m.hackathon_start,
            hackathon_end: m.hackathon_end,
            results_date: m.results_date,
            min_team_size: m.min_team_size,
            max_team_size: m.max_team_size,
            allow_solo: m.allow_solo,
            prizes: Prizes {
                first: m.prize_first,
                second: m.prize_second,
                third: m.prize_third,
                participant: m.prize_participant,
            },
            judging_criteria,
            status: m.status,
            display_status,
            phase,
            rejection_reason: m.rejection_reason,
            results_published: m.results_published,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<hackathon::Model> for HackathonListItem {
    fn from(m: hackathon::Model) -> Self {
        let phase = timeline_of(&m).phase_at(Utc::now());
        let display_status = m
            .status
            .parse::<HackathonStatus>()
            .map(|s| s.display(phase))
            .unwrap_or("draft")
            .to_string();
        Self {
            id: m.id,
            title: m.title,
            theme: m.theme,
            organizer_id: m.organizer_id,
            hackathon_start: m.hackathon_start,
            hackathon_end: m.hackathon_end,
            status: m.status,
            display_status,
            results_published: m.results_published,
            created_at: m.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_description(description: &str) -> Result<(), AppError> {
    if description.trim().is_empty() || description.len() > 1_000_000 {
        return Err(AppError::Validation(
            "Description must be non-empty and at most 1MB".into(),
        ));
    }
    Ok(())
}

fn validate_team_bounds(min: i32, max: i32, allow_solo: bool) -> Result<(), AppError> {
    if min < 1 {
        return Err(AppError::Validation("min_team_size must be at least 1".into()));
    }
    if max < min {
        return Err(AppError::Validation(
            "max_team_size must be greater than or equal to min_team_size".into(),
        ));
    }
    if allow_solo && min > 1 {
        return Err(AppError::Validation(
            "allow_solo requires min_team_size of 1".into(),
        ));
    }
    Ok(())
}

pub fn validate_criteria(criteria: &[JudgingCriterion]) -> Result<(), AppError> {
    if criteria.is_empty() {
        return Err(AppError::Validation(
            "At least one judging criterion is required".into(),
        ));
    }
    if criteria.len() > 20 {
        return Err(AppError::Validation("At most 20 judging criteria".into()));
    }
    for c in criteria {
        let title = c.title.trim();
        if title.is_empty() || title.chars().count() > 100 {
            return Err(AppError::Validation(
                "Criterion titles must be 1-100 characters".into(),
            ));
        }
        if !(c.weight > 0.0 && c.weight.is_finite()) {
            return Err(AppError::Validation(
                "Criterion weights must be positive".into(),
            ));
        }
        if c.max_score < 1 {
            return Err(AppError::Validation(
                "Criterion max_score must be at least 1".into(),
            ));
        }
    }
    Ok(())
}

fn validate_timeline(timeline: &Timeline) -> Result<(), AppError> {
    timeline
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))
}

pub fn validate_create_hackathon(req: &CreateHackathonRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;
    validate_description(&req.description)?;
    validate_optional_url(req.banner_url.as_deref(), "banner_url")?;
    validate_timeline(&Timeline {
        registration_start: req.registration_start,
        registration_end: req.registration_end,
        hackathon_start: req.hackathon_start,
        hackathon_end: req.hackathon_end,
        results_date: req.results_date,
    })?;
    validate_team_bounds(req.min_team_size, req.max_team_size, req.allow_solo)?;
    validate_criteria(&req.judging_criteria)
}

/// Validate a PATCH against the existing row: every cross-field invariant is
/// re-checked over the effective (patched) values.
pub fn validate_update_hackathon(
    req: &UpdateHackathonRequest,
    existing: &hackathon::Model,
) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(ref description) = req.description {
        validate_description(description)?;
    }
    if let Some(Some(ref banner)) = req.banner_url {
        validate_optional_url(Some(banner), "banner_url")?;
    }

    let effective = Timeline {
        registration_start: req.registration_start.unwrap_or(existing.registration_start),
        registration_end: req.registration_end.unwrap_or(existing.registration_end),
        hackathon_start: req.hackathon_start.unwrap_or(existing.hackathon_start),
        hackathon_end: req.hackathon_end.unwrap_or(existing.hackathon_end),
        results_date: req.results_date.unwrap_or(existing.results_date),
    };
    validate_timeline(&effective)?;

    let min = req.min_team_size.unwrap_or(existing.min_team_size);
    let max = req.max_team_size.unwrap_or(existing.max_team_size);
    let allow_solo = req.allow_solo.unwrap_or(existing.allow_solo);
    validate_team_bounds(min, max, allow_solo)?;

    if let Some(ref criteria) = req.judging_criteria {
        validate_criteria(criteria)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn criteria() -> Vec<JudgingCriterion> {
        vec![JudgingCriterion {
            title: "Innovation".into(),
            description: "Novelty of the idea".into(),
            weight: 1.0,
            max_score: 10,
        }]
    }

    fn create_request() -> CreateHackathonRequest {
        CreateHackathonRequest {
            title: "AI for Good".into(),
            description: "Build something useful.".into(),
            theme: Theme::Ai,
            banner_url: None,
            registration_start: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            registration_end: Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap(),
            hackathon_start: Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap(),
            hackathon_end: Utc.with_ymd_and_hms(2026, 3, 17, 0, 0, 0).unwrap(),
            results_date: Utc.with_ymd_and_hms(2026, 3, 20, 0, 0, 0).unwrap(),
            min_team_size: 1,
            max_team_size: 4,
            allow_solo: true,
            prizes: Prizes::default(),
            judging_criteria: criteria(),
            submit_for_review: false,
        }
    }

    #[test]
    fn test_valid_create_request() {
        assert!(validate_create_hackathon(&create_request()).is_ok());
    }

    #[test]
    fn test_min_greater_than_max_is_rejected() {
        let mut req = create_request();
        req.min_team_size = 2;
        req.max_team_size = 1;
        req.allow_solo = false;
        assert!(matches!(
            validate_create_hackathon(&req),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_min_team_size_is_rejected() {
        let mut req = create_request();
        req.min_team_size = 0;
        assert!(validate_create_hackathon(&req).is_err());
    }

    #[test]
    fn test_empty_criteria_rejected() {
        let mut req = create_request();
        req.judging_criteria = vec![];
        assert!(validate_create_hackathon(&req).is_err());
    }

    #[test]
    fn test_blank_criterion_title_rejected() {
        let mut req = create_request();
        req.judging_criteria[0].title = "  ".into();
        assert!(validate_create_hackathon(&req).is_err());
    }

    #[test]
    fn test_nonpositive_weight_rejected() {
        let mut req = create_request();
        req.judging_criteria[0].weight = 0.0;
        assert!(validate_create_hackathon(&req).is_err());
        req.judging_criteria[0].weight = f64::NAN;
        assert!(validate_create_hackathon(&req).is_err());
    }

    #[test]
    fn test_inverted_timeline_rejected() {
        let mut req = create_request();
        req.hackathon_end = req.hackathon_start;
        assert!(validate_create_hackathon(&req).is_err());
    }
}
