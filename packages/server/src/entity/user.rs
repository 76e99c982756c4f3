use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Global roles a user may hold. A user carries a set of these (stored as
/// a JSON array); hackathon-scoped capabilities live in `hackathon_role`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Coordinator,
    Judge,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Coordinator => "coordinator",
            Role::Judge => "judge",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "student" => Some(Role::Student),
            "coordinator" => Some(Role::Coordinator),
            "judge" => Some(Role::Judge),
            "admin" => Some(Role::Admin),
            "super_admin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }

    /// True for the platform-wide roles that bypass hackathon-scoped checks.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

/// Subscription feature flags, snapshotted onto the user from the active
/// plan. Stored as JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SubscriptionFeatures {
    pub max_hackathons: i32,
    pub max_team_members: i32,
    pub can_create_hackathons: bool,
    pub can_invite_judges: bool,
    pub analytics: bool,
    pub custom_branding: bool,
}

impl Default for SubscriptionFeatures {
    fn default() -> Self {
        Self {
            max_hackathons: 1,
            max_team_members: 4,
            can_create_hackathons: false,
            can_invite_judges: false,
            analytics: false,
            custom_branding: false,
        }
    }
}

/// User subscription lifecycle states (snapshot side).
pub mod subscription_status {
    pub const ACTIVE: &str = "active";
    pub const INACTIVE: &str = "inactive";
    pub const CREATED: &str = "created";
    pub const PAUSED: &str = "paused";
    pub const EXPIRED: &str = "expired";
    pub const CANCELLED: &str = "cancelled";
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub institution: Option<String>,

    /// JSON array of `Role` strings, e.g. `["student", "judge"]`.
    #[sea_orm(column_type = "JsonBinary")]
    pub roles: serde_json::Value,

    /// Snapshot of the current subscription plan name (e.g. "free").
    pub subscription_plan: String,
    /// One of the `subscription_status` constants.
    pub subscription_status: String,
    pub gateway_subscription_id: Option<String>,
    pub gateway_customer_id: Option<String>,
    /// Snapshot of `SubscriptionFeatures` as JSON.
    #[sea_orm(column_type = "JsonBinary")]
    pub subscription_features: serde_json::Value,

    pub is_active: bool,

    #[sea_orm(has_many)]
    pub hackathon_roles: HasMany<super::hackathon_role::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Decode the stored role set, skipping anything unknown.
    pub fn roles(&self) -> Vec<Role> {
        self.roles
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().and_then(Role::parse))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles().contains(&role)
    }

    pub fn features(&self) -> SubscriptionFeatures {
        serde_json::from_value(self.subscription_features.clone()).unwrap_or_default()
    }
}

/// Encode a role set for storage, deduplicated and in precedence order.
pub fn roles_to_json(roles: &[Role]) -> serde_json::Value {
    let mut sorted: Vec<Role> = roles.to_vec();
    sorted.sort();
    sorted.dedup();
    serde_json::Value::Array(
        sorted
            .into_iter()
            .map(|r| serde_json::Value::String(r.as_str().to_string()))
            .collect(),
    )
}

impl ActiveModelBehavior for ActiveModel {}
