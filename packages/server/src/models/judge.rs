use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::hackathon::JudgingCriterion;
use crate::entity::score;
use crate::error::AppError;

/// A judge's score for one criterion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CriterionScore {
    /// Criterion title, matching the hackathon's criteria list.
    #[schema(example = "Innovation")]
    pub title: String,
    #[schema(example = 8.5)]
    pub score: f64,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ScoreProjectRequest {
    /// One entry per judging criterion of the hackathon, in any order.
    pub scores: Vec<CriterionScore>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ScoreResponse {
    pub project_id: i32,
    pub judge_id: i32,
    pub criterion_scores: Vec<CriterionScore>,
    /// Weighted total across all criteria.
    pub total: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<score::Model> for ScoreResponse {
    fn from(m: score::Model) -> Self {
        let criterion_scores = serde_json::from_value(m.criterion_scores).unwrap_or_default();
        Self {
            project_id: m.project_id,
            judge_id: m.judge_id,
            criterion_scores,
            total: m.total,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectScoresResponse {
    pub project_id: i32,
    pub scores: Vec<ScoreResponse>,
    /// Mean of all judges' weighted totals, if any scores exist.
    pub average_total: Option<f64>,
}

/// Check a score sheet against the hackathon's criteria and compute the
/// weighted total.
///
/// Every criterion must be covered exactly once and every score must lie in
/// `0..=max_score` for its criterion.
pub fn validate_and_total(
    criteria: &[JudgingCriterion],
    scores: &[CriterionScore],
) -> Result<f64, AppError> {
    if scores.len() != criteria.len() {
        return Err(AppError::Validation(format!(
            "Expected scores for exactly {} criteria, got {}",
            criteria.len(),
            scores.len()
        )));
    }

    let mut total = 0.0;
    for criterion in criteria {
        let mut matched = scores.iter().filter(|s| s.title == criterion.title);
        let entry = matched.next().ok_or_else(|| {
            AppError::Validation(format!("Missing score for criterion '{}'", criterion.title))
        })?;
        if matched.next().is_some() {
            return Err(AppError::Validation(format!(
                "Duplicate score for criterion '{}'",
                criterion.title
            )));
        }
        if !entry.score.is_finite() || entry.score < 0.0 || entry.score > criterion.max_score as f64 {
            return Err(AppError::Validation(format!(
                "Score for '{}' must be between 0 and {}",
                criterion.title, criterion.max_score
            )));
        }
        total += entry.score * criterion.weight;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria() -> Vec<JudgingCriterion> {
        vec![
            JudgingCriterion {
                title: "Innovation".into(),
                description: String::new(),
                weight: 0.6,
                max_score: 10,
            },
            JudgingCriterion {
                title: "Execution".into(),
                description: String::new(),
                weight: 0.4,
                max_score: 5,
            },
        ]
    }

    fn score(title: &str, score: f64) -> CriterionScore {
        CriterionScore {
            title: title.into(),
            score,
        }
    }

    #[test]
    fn test_weighted_total() {
        let total =
            validate_and_total(&criteria(), &[score("Innovation", 10.0), score("Execution", 5.0)])
                .unwrap();
        assert!((total - (10.0 * 0.6 + 5.0 * 0.4)).abs() < 1e-9);
    }

    #[test]
    fn test_order_does_not_matter() {
        let total =
            validate_and_total(&criteria(), &[score("Execution", 2.0), score("Innovation", 4.0)])
                .unwrap();
        assert!((total - (4.0 * 0.6 + 2.0 * 0.4)).abs() < 1e-9);
    }

    #[test]
    fn test_missing_criterion_rejected() {
        let err = validate_and_total(
            &criteria(),
            &[score("Innovation", 4.0), score("Polish", 3.0)],
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_wrong_count_rejected() {
        assert!(validate_and_total(&criteria(), &[score("Innovation", 4.0)]).is_err());
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(
            validate_and_total(&criteria(), &[score("Innovation", 11.0), score("Execution", 1.0)])
                .is_err()
        );
        assert!(
            validate_and_total(&criteria(), &[score("Innovation", -1.0), score("Execution", 1.0)])
                .is_err()
        );
        assert!(
            validate_and_total(
                &criteria(),
                &[score("Innovation", f64::NAN), score("Execution", 1.0)]
            )
            .is_err()
        );
    }

    #[test]
    fn test_duplicate_title_rejected() {
        assert!(
            validate_and_total(
                &criteria(),
                &[score("Innovation", 4.0), score("Innovation", 5.0)]
            )
            .is_err()
        );
    }
}
