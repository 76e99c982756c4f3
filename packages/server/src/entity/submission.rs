use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub mod status {
    pub const SUBMITTED: &str = "submitted";
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub team_id: i32,
    /// Opaque round identifier; rounds are not modeled server-side.
    pub round_id: String,
    pub submitted_by: i32,
    pub submitted_at: DateTimeUtc,

    pub project_url: Option<String>,
    pub demo_url: Option<String>,
    pub video_url: Option<String>,
    pub presentation_url: Option<String>,
    pub github_repo: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// JSON array of strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub tech_stack: serde_json::Value,
    /// One of the `status` constants.
    pub status: String,

    #[sea_orm(belongs_to, from = "team_id", to = "id")]
    pub team: HasOne<super::team::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
