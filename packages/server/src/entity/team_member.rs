use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub mod role {
    pub const LEADER: &str = "leader";
    pub const MEMBER: &str = "member";
}

/// Membership rows are never deleted; leaving or removal flips the status so
/// participation history survives.
pub mod status {
    pub const ACTIVE: &str = "active";
    pub const LEFT: &str = "left";
    pub const REMOVED: &str = "removed";
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "team_member")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub team_id: i32,
    /// Denormalized from the team so the one-active-membership-per-hackathon
    /// constraint can be a partial unique index.
    pub hackathon_id: i32,
    pub user_id: i32,

    /// One of the `role` constants.
    pub role: String,
    /// One of the `status` constants.
    pub status: String,
    pub joined_at: DateTimeUtc,

    pub checked_in: bool,
    pub checked_in_at: Option<DateTimeUtc>,
    pub checked_in_by: Option<i32>,

    #[sea_orm(belongs_to, from = "team_id", to = "id")]
    pub team: HasOne<super::team::Entity>,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
