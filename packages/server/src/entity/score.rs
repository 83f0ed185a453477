use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "score")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub project_id: i32,
    #[sea_orm(primary_key)]
    pub judge_id: i32,
    #[sea_orm(belongs_to, from = "project_id", to = "id")]
    pub project: Option<super::project::Entity>,
    #[sea_orm(belongs_to, from = "judge_id", to = "id")]
    pub judge: Option<super::user::Entity>,

    /// Per-criterion scores as a JSON array of {title, score} objects,
    /// in criteria order.
    #[sea_orm(column_type = "JsonBinary")]
    pub criterion_scores: serde_json::Value,
    /// Weighted total across all criteria.
    pub total: f64,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
