use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hackathon")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub description: String, // in Markdown
    pub theme: String,
    pub banner_url: Option<String>,

    pub organizer_id: i32,
    #[sea_orm(belongs_to, from = "organizer_id", to = "id")]
    pub organizer: HasOne<super::user::Entity>,

    pub registration_start: DateTimeUtc,
    pub registration_end: DateTimeUtc,
    pub hackathon_start: DateTimeUtc,
    pub hackathon_end: DateTimeUtc,
    pub results_date: DateTimeUtc,

    pub min_team_size: i32,
    pub max_team_size: i32,
    pub allow_solo: bool,

    pub prize_first: Option<String>,
    pub prize_second: Option<String>,
    pub prize_third: Option<String>,
    pub prize_participant: Option<String>,

    /// Ordered list of {title, description, weight, max_score} objects.
    #[sea_orm(column_type = "JsonBinary")]
    pub judging_criteria: serde_json::Value,

    /// One of: draft, pending_approval, published, rejected.
    /// The ongoing/completed statuses shown to clients are projected from
    /// the timeline, never stored.
    pub status: String,
    /// Set iff status is rejected.
    pub rejection_reason: Option<String>,
    pub results_published: bool,

    #[sea_orm(has_many)]
    pub teams: HasMany<super::team::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
