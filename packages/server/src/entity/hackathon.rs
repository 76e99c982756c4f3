use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Hackathon lifecycle. Registration is gated by `published` plus the
/// registration window, not by a dedicated status.
pub mod status {
    pub const DRAFT: &str = "draft";
    pub const PUBLISHED: &str = "published";
    pub const COMPLETED: &str = "completed";
    pub const ARCHIVED: &str = "archived";

    pub const ALL: &[&str] = &[DRAFT, PUBLISHED, COMPLETED, ARCHIVED];
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hackathon")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub is_public: bool,
    /// One of the `status` constants.
    pub status: String,
    /// Immutable after creation.
    pub organizer_id: i32,

    pub registration_start: DateTimeUtc,
    pub registration_end: DateTimeUtc,
    pub event_start: DateTimeUtc,
    pub event_end: DateTimeUtc,

    pub min_members: i32,
    pub max_members: i32,
    pub max_teams: i32,
    /// Count of teams ever registered. Only ever incremented; rejecting a
    /// team does not release capacity.
    pub current_registrations: i32,

    /// Major currency units; zero means registration is free.
    pub registration_fee: i64,
    pub fee_currency: String,
    pub auto_accept_teams: bool,
    pub allow_team_name_change: bool,

    #[sea_orm(belongs_to, from = "organizer_id", to = "id")]
    pub organizer: HasOne<super::user::Entity>,

    #[sea_orm(has_many)]
    pub roles: HasMany<super::hackathon_role::Entity>,
    #[sea_orm(has_many)]
    pub teams: HasMany<super::team::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub fn is_registration_open(&self, now: DateTimeUtc) -> bool {
        self.status == status::PUBLISHED
            && now >= self.registration_start
            && now < self.registration_end
    }

    pub fn has_capacity(&self) -> bool {
        self.current_registrations < self.max_teams
    }
}

impl ActiveModelBehavior for ActiveModel {}
