use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Gateway-side subscription lifecycle. Webhooks drive most transitions.
pub mod status {
    pub const CREATED: &str = "created";
    pub const AUTHENTICATED: &str = "authenticated";
    pub const ACTIVE: &str = "active";
    pub const PAUSED: &str = "paused";
    pub const HALTED: &str = "halted";
    pub const CANCELLED: &str = "cancelled";
    pub const COMPLETED: &str = "completed";
    pub const EXPIRED: &str = "expired";

    /// States that count as a live subscription for the one-per-user rule.
    pub const LIVE: &[&str] = &[CREATED, AUTHENTICATED, ACTIVE];
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscription")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    pub plan_id: i32,
    /// One of the `status` constants.
    pub status: String,
    #[sea_orm(unique)]
    pub gateway_subscription_id: String,
    pub gateway_customer_id: Option<String>,

    pub current_period_start: Option<DateTimeUtc>,
    pub current_period_end: Option<DateTimeUtc>,
    pub started_at: Option<DateTimeUtc>,
    pub cancelled_at: Option<DateTimeUtc>,
    /// Cycle charges recorded so far.
    pub paid_count: i32,
    /// Cycles the gateway subscription was created for.
    pub total_count: i32,

    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,
    #[sea_orm(belongs_to, from = "plan_id", to = "id")]
    pub plan: HasOne<super::subscription_plan::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
