use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of hackathon-scoped assignment. One row per (hackathon, user, kind);
/// this table is the single source of truth for coordinator and judge
/// membership.
pub mod kind {
    pub const COORDINATOR: &str = "coordinator";
    pub const JUDGE: &str = "judge";
}

pub mod status {
    pub const PENDING: &str = "pending";
    pub const ACCEPTED: &str = "accepted";
    pub const DECLINED: &str = "declined";
}

/// Per-hackathon coordinator capabilities, stored as JSON on the role row.
/// Judge rows carry no permission set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct CoordinatorPermissions {
    pub can_view_teams: bool,
    pub can_edit_teams: bool,
    pub can_check_in: bool,
    pub can_assign_tables: bool,
    pub can_view_submissions: bool,
    pub can_eliminate_teams: bool,
    pub can_communicate: bool,
}

impl CoordinatorPermissions {
    /// Defaults granted when an invitation omits an explicit permission set.
    pub fn standard() -> Self {
        Self {
            can_view_teams: true,
            can_check_in: true,
            can_communicate: true,
            ..Self::default()
        }
    }
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hackathon_role")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub hackathon_id: i32,
    pub user_id: i32,
    /// One of the `kind` constants.
    pub kind: String,
    /// One of the `status` constants.
    pub status: String,
    /// `CoordinatorPermissions` as JSON; null for judges.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub permissions: Option<serde_json::Value>,
    pub invited_by: i32,
    pub invited_at: DateTimeUtc,
    pub responded_at: Option<DateTimeUtc>,

    #[sea_orm(belongs_to, from = "hackathon_id", to = "id")]
    pub hackathon: HasOne<super::hackathon::Entity>,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub fn permissions(&self) -> CoordinatorPermissions {
        self.permissions
            .clone()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }
}

impl ActiveModelBehavior for ActiveModel {}
