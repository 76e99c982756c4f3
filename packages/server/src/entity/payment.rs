use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment state machine:
/// created -> authorized | captured | failed,
/// captured -> refund_pending -> refunded.
/// Refund initiation has no endpoint; the states exist for webhook updates.
pub mod status {
    pub const CREATED: &str = "created";
    pub const AUTHORIZED: &str = "authorized";
    pub const CAPTURED: &str = "captured";
    pub const REFUND_PENDING: &str = "refund_pending";
    pub const REFUNDED: &str = "refunded";
    pub const FAILED: &str = "failed";
}

/// What the payment was for.
pub mod kind {
    pub const HACKATHON_REGISTRATION: &str = "hackathon_registration";
    /// Recurring subscription cycle charge recorded from a webhook.
    pub const SUBSCRIPTION: &str = "subscription";
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    /// One of the `kind` constants.
    pub kind: String,
    pub hackathon_id: Option<i32>,
    pub team_id: Option<i32>,
    pub subscription_id: Option<i32>,

    /// Major currency units.
    pub amount: i64,
    pub currency: String,
    /// One of the `status` constants.
    pub status: String,

    #[sea_orm(unique, nullable)]
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub gateway_signature: Option<String>,
    pub failure_reason: Option<String>,

    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
