use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Final standing of one team in one hackathon.
///
/// Rows exist only after an admin publishes results; they are never mutated
/// afterwards.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "result")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub hackathon_id: i32,
    #[sea_orm(primary_key)]
    pub team_id: i32,
    #[sea_orm(belongs_to, from = "hackathon_id", to = "id")]
    pub hackathon: Option<super::hackathon::Entity>,
    #[sea_orm(belongs_to, from = "team_id", to = "id")]
    pub team: Option<super::team::Entity>,

    /// 1-based; ties are broken deterministically by team id.
    pub rank: i32,
    pub final_score: f64,

    pub published_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
