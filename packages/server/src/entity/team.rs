use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub mod registration_status {
    pub const PENDING: &str = "pending";
    pub const APPROVED: &str = "approved";
    pub const REJECTED: &str = "rejected";
    pub const WITHDRAWN: &str = "withdrawn";
}

pub mod payment_status {
    pub const PENDING: &str = "pending";
    pub const COMPLETED: &str = "completed";
    pub const FAILED: &str = "failed";
    pub const REFUNDED: &str = "refunded";
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "team")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub hackathon_id: i32,
    /// Unique within the hackathon.
    pub team_name: String,
    pub team_number: Option<String>,
    pub table_number: Option<String>,
    /// Immutable after registration; leadership transfer is unsupported.
    pub leader_id: i32,

    pub project_title: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub project_description: Option<String>,
    /// JSON array of strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub tech_stack: serde_json::Value,

    /// One of the `registration_status` constants.
    pub registration_status: String,
    pub registered_at: DateTimeUtc,
    pub approved_at: Option<DateTimeUtc>,
    pub approved_by: Option<i32>,

    /// One of the `payment_status` constants.
    pub payment_status: String,
    /// Major currency units.
    pub payment_amount: i64,
    pub payment_currency: String,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub gateway_signature: Option<String>,
    pub paid_at: Option<DateTimeUtc>,
    pub paid_by: Option<i32>,

    /// Percentage across all finalized scores, 0 to 100. Recomputed on
    /// every score write.
    #[sea_orm(column_type = "Double")]
    pub overall_score: f64,

    pub is_eliminated: bool,
    pub eliminated_at: Option<DateTimeUtc>,
    pub eliminated_in_round: Option<String>,
    pub eliminated_by: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub elimination_reason: Option<String>,

    pub checked_in: bool,
    pub checked_in_at: Option<DateTimeUtc>,
    pub checked_in_by: Option<i32>,
    /// Set when the last active member checks in.
    pub all_members_checked_in: bool,

    #[sea_orm(belongs_to, from = "hackathon_id", to = "id")]
    pub hackathon: HasOne<super::hackathon::Entity>,
    #[sea_orm(belongs_to, from = "leader_id", to = "id")]
    pub leader: HasOne<super::user::Entity>,

    #[sea_orm(has_many)]
    pub members: HasMany<super::team_member::Entity>,
    #[sea_orm(has_many)]
    pub submissions: HasMany<super::submission::Entity>,
    #[sea_orm(has_many)]
    pub scores: HasMany<super::score::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub fn tech_stack(&self) -> Vec<String> {
        serde_json::from_value(self.tech_stack.clone()).unwrap_or_default()
    }
}

impl ActiveModelBehavior for ActiveModel {}
