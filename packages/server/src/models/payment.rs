use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::subscription_plan::{self, billing_cycle};
use crate::entity::user::SubscriptionFeatures;
use crate::entity::{payment, subscription};
use crate::error::AppError;

/// Creates a gateway order for a team's registration fee.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateOrderRequest {
    pub team_id: i32,
}

/// Checkout callback payload, forwarded from the gateway's browser SDK.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct VerifyPaymentRequest {
    pub team_id: i32,
    pub order_id: String,
    pub payment_id: String,
    /// HMAC signature over `"{order_id}|{payment_id}"`.
    pub signature: String,
}

pub fn validate_verify_payment(payload: &VerifyPaymentRequest) -> Result<(), AppError> {
    if payload.order_id.trim().is_empty()
        || payload.payment_id.trim().is_empty()
        || payload.signature.trim().is_empty()
    {
        return Err(AppError::Validation(
            "order_id, payment_id and signature are required".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreatePlanRequest {
    /// Stable catalog name, unique.
    #[schema(example = "pro")]
    pub name: String,
    #[schema(example = "Pro")]
    pub display_name: String,
    pub description: String,
    /// Price in major currency units.
    #[schema(example = 999)]
    pub price_amount: i64,
    /// ISO currency code; defaults to INR.
    pub currency: Option<String>,
    /// "monthly", "quarterly" or "yearly".
    #[schema(example = "monthly")]
    pub billing_cycle: String,
    pub features: SubscriptionFeatures,
    #[serde(default)]
    pub sort_order: i32,
}

pub fn validate_create_plan(payload: &CreatePlanRequest) -> Result<(), AppError> {
    let name = payload.name.trim();
    if name.is_empty() || name.chars().count() > 64 {
        return Err(AppError::Validation(
            "Plan name must be 1-64 characters".into(),
        ));
    }
    if payload.display_name.trim().is_empty() {
        return Err(AppError::Validation(
            "Display name must not be empty".into(),
        ));
    }
    if payload.price_amount < 1 {
        return Err(AppError::Validation("Price must be >= 1".into()));
    }
    if !billing_cycle::ALL.contains(&payload.billing_cycle.as_str()) {
        return Err(AppError::Validation(format!(
            "Billing cycle must be one of: {}",
            billing_cycle::ALL.join(", ")
        )));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubscribeRequest {
    pub plan_id: i32,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct CancelSubscriptionRequest {
    /// Cancel at the end of the paid period instead of immediately.
    #[serde(default = "default_at_cycle_end")]
    pub at_cycle_end: bool,
}

fn default_at_cycle_end() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct OrderResponse {
    pub payment_id: i32,
    /// Gateway order id, handed to the browser checkout SDK.
    pub gateway_order_id: String,
    /// Amount in major currency units.
    pub amount: i64,
    pub currency: String,
    pub status: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PaymentResponse {
    pub id: i32,
    pub kind: String,
    pub team_id: Option<i32>,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<payment::Model> for PaymentResponse {
    fn from(m: payment::Model) -> Self {
        Self {
            id: m.id,
            kind: m.kind,
            team_id: m.team_id,
            amount: m.amount,
            currency: m.currency,
            status: m.status,
            gateway_order_id: m.gateway_order_id,
            gateway_payment_id: m.gateway_payment_id,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PlanResponse {
    pub id: i32,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub price_amount: i64,
    pub currency: String,
    pub billing_cycle: String,
    pub features: SubscriptionFeatures,
    pub is_active: bool,
    pub sort_order: i32,
}

impl From<subscription_plan::Model> for PlanResponse {
    fn from(m: subscription_plan::Model) -> Self {
        let features = serde_json::from_value(m.features).unwrap_or_default();
        Self {
            id: m.id,
            name: m.name,
            display_name: m.display_name,
            description: m.description,
            price_amount: m.price_amount,
            currency: m.currency,
            billing_cycle: m.billing_cycle,
            features,
            is_active: m.is_active,
            sort_order: m.sort_order,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PlanListResponse {
    pub data: Vec<PlanResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubscriptionResponse {
    pub id: i32,
    pub plan_id: i32,
    /// Gateway subscription id, handed to the browser checkout SDK for
    /// authorization.
    pub gateway_subscription_id: String,
    pub status: String,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<subscription::Model> for SubscriptionResponse {
    fn from(m: subscription::Model) -> Self {
        Self {
            id: m.id,
            plan_id: m.plan_id,
            gateway_subscription_id: m.gateway_subscription_id,
            status: m.status,
            current_period_start: m.current_period_start,
            current_period_end: m.current_period_end,
            created_at: m.created_at,
        }
    }
}

/// Webhook envelope. Only the fields the handlers consume are modeled;
/// everything else in the provider payload is ignored.
#[derive(Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl WebhookEvent {
    /// Digs out `payload.<entity>.entity.<field>` as a string, the shape
    /// Razorpay-compatible providers use.
    pub fn entity_str(&self, entity: &str, field: &str) -> Option<&str> {
        self.payload
            .get(entity)?
            .get("entity")?
            .get(field)?
            .as_str()
    }

    pub fn entity_i64(&self, entity: &str, field: &str) -> Option<i64> {
        self.payload
            .get(entity)?
            .get("entity")?
            .get(field)?
            .as_i64()
    }
}
