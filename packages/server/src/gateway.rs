use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::instrument;

use crate::config::GatewayConfig;

type HmacSha256 = Hmac<Sha256>;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("gateway returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("gateway is not configured")]
    NotConfigured,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    /// Major currency units; converted to minor units on the wire.
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Minor currency units, as the gateway reports them.
    pub amount: i64,
    pub currency: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanRequest {
    pub name: String,
    pub description: String,
    /// Major currency units.
    pub amount: i64,
    pub currency: String,
    /// "monthly" or "yearly".
    pub period: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySubscription {
    pub id: String,
    pub status: String,
}

/// Payment provider boundary. The HTTP implementation talks to a
/// Razorpay-compatible REST API; tests substitute their own.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, req: &OrderRequest) -> Result<GatewayOrder, GatewayError>;

    async fn create_plan(&self, req: &PlanRequest) -> Result<String, GatewayError>;

    async fn create_subscription(
        &self,
        gateway_plan_id: &str,
        total_count: u32,
    ) -> Result<GatewaySubscription, GatewayError>;

    async fn cancel_subscription(
        &self,
        gateway_subscription_id: &str,
        at_cycle_end: bool,
    ) -> Result<(), GatewayError>;

    /// Checks the checkout callback signature, an HMAC over
    /// `"{order_id}|{payment_id}"` with the API key secret.
    fn verify_payment_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;

    /// Checks the webhook signature, an HMAC over the raw request body with
    /// the webhook secret.
    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> bool;
}

fn hmac_matches(secret: &str, message: &[u8], signature: &str) -> bool {
    let Some(sig) = hex::decode(signature).ok() else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(message);
    mac.verify_slice(&sig).is_ok()
}

pub struct HttpPaymentGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl HttpPaymentGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, path: &str) -> Result<String, GatewayError> {
        if self.config.base_url.is_empty() {
            return Err(GatewayError::NotConfigured);
        }
        Ok(format!("{}{path}", self.config.base_url.trim_end_matches('/')))
    }

    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, GatewayError> {
        let resp = self
            .client
            .post(self.endpoint(path)?)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    #[instrument(skip(self))]
    async fn create_order(&self, req: &OrderRequest) -> Result<GatewayOrder, GatewayError> {
        let body = serde_json::json!({
            "amount": req.amount * 100,
            "currency": req.currency,
            "receipt": req.receipt,
        });
        self.post_json("/orders", &body).await
    }

    #[instrument(skip(self))]
    async fn create_plan(&self, req: &PlanRequest) -> Result<String, GatewayError> {
        #[derive(Deserialize)]
        struct PlanResponse {
            id: String,
        }

        let body = serde_json::json!({
            "period": req.period,
            "interval": 1,
            "item": {
                "name": req.name,
                "description": req.description,
                "amount": req.amount * 100,
                "currency": req.currency,
            },
        });
        let resp: PlanResponse = self.post_json("/plans", &body).await?;
        Ok(resp.id)
    }

    #[instrument(skip(self))]
    async fn create_subscription(
        &self,
        gateway_plan_id: &str,
        total_count: u32,
    ) -> Result<GatewaySubscription, GatewayError> {
        let body = serde_json::json!({
            "plan_id": gateway_plan_id,
            "total_count": total_count,
            "customer_notify": 1,
        });
        self.post_json("/subscriptions", &body).await
    }

    #[instrument(skip(self))]
    async fn cancel_subscription(
        &self,
        gateway_subscription_id: &str,
        at_cycle_end: bool,
    ) -> Result<(), GatewayError> {
        let body = serde_json::json!({
            "cancel_at_cycle_end": if at_cycle_end { 1 } else { 0 },
        });
        let _: serde_json::Value = self
            .post_json(
                &format!("/subscriptions/{gateway_subscription_id}/cancel"),
                &body,
            )
            .await?;
        Ok(())
    }

    fn verify_payment_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let message = format!("{order_id}|{payment_id}");
        hmac_matches(&self.config.key_secret, message.as_bytes(), signature)
    }

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> bool {
        hmac_matches(&self.config.webhook_secret, payload, signature)
    }
}
