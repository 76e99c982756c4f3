use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A single judging criterion as stored in the `criteria` JSON array.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Criterion {
    pub criteria_name: String,
    pub score: f64,
    pub max_score: f64,
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "score")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub team_id: i32,
    pub round_id: String,
    pub judge_id: i32,

    /// JSON array of `Criterion`.
    #[sea_orm(column_type = "JsonBinary")]
    pub criteria: serde_json::Value,
    /// Sum of criterion scores.
    #[sea_orm(column_type = "Double")]
    pub total_score: f64,
    /// Sum of criterion maximums.
    #[sea_orm(column_type = "Double")]
    pub max_possible_score: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub remarks: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub feedback: Option<String>,
    /// Scores are finalized at creation; only finalized rows enter team
    /// aggregates.
    pub is_finalized: bool,
    pub submitted_at: DateTimeUtc,

    #[sea_orm(belongs_to, from = "team_id", to = "id")]
    pub team: HasOne<super::team::Entity>,
    #[sea_orm(belongs_to, from = "judge_id", to = "id")]
    pub judge: HasOne<super::user::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub fn criteria(&self) -> Vec<Criterion> {
        serde_json::from_value(self.criteria.clone()).unwrap_or_default()
    }
}

impl ActiveModelBehavior for ActiveModel {}
