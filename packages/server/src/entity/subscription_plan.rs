use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub mod billing_cycle {
    pub const MONTHLY: &str = "monthly";
    pub const QUARTERLY: &str = "quarterly";
    pub const YEARLY: &str = "yearly";

    pub const ALL: &[&str] = &[MONTHLY, QUARTERLY, YEARLY];
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscription_plan")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,
    pub display_name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Major currency units; converted to minor units at the gateway
    /// boundary.
    pub price_amount: i64,
    pub currency: String,
    /// One of the `billing_cycle` constants.
    pub billing_cycle: String,
    /// Gateway-side plan identifier, created before the catalog row.
    #[sea_orm(unique)]
    pub gateway_plan_id: String,
    /// `SubscriptionFeatures` as JSON, copied onto subscribers.
    #[sea_orm(column_type = "JsonBinary")]
    pub features: serde_json::Value,
    pub is_active: bool,
    pub sort_order: i32,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
