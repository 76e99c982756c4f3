use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub mod status {
    pub const PENDING: &str = "pending";
    pub const ACCEPTED: &str = "accepted";
    pub const REJECTED: &str = "rejected";
    pub const CANCELLED: &str = "cancelled";
}

/// How long a pending request stays actionable. Expiry is evaluated lazily
/// at read and respond time; there is no background sweeper.
pub const TTL_DAYS: i64 = 7;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "join_request")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub team_id: i32,
    pub hackathon_id: i32,
    /// The invitee who can accept or reject.
    pub user_id: i32,
    /// The team leader who sent the invitation.
    pub sender_id: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub message: Option<String>,

    /// One of the `status` constants.
    pub status: String,
    pub responded_at: Option<DateTimeUtc>,
    pub expires_at: DateTimeUtc,

    #[sea_orm(belongs_to, from = "team_id", to = "id")]
    pub team: HasOne<super::team::Entity>,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub fn is_expired(&self, now: DateTimeUtc) -> bool {
        self.status == status::PENDING && now > self.expires_at
    }
}

impl ActiveModelBehavior for ActiveModel {}
