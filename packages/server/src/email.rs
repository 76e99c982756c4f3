use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::EmailConfig;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("email request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("email provider returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// Transactional mail boundary. Delivery is always best-effort; callers go
/// through [`send_best_effort`] so a provider outage never fails a request.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), EmailError>;
}

/// Log and swallow delivery failures.
pub async fn send_best_effort(sender: &dyn EmailSender, to: &str, subject: &str, html_body: &str) {
    if let Err(err) = sender.send(to, subject, html_body).await {
        warn!(%to, %subject, %err, "email delivery failed");
    }
}

pub fn from_config(config: &EmailConfig) -> Arc<dyn EmailSender> {
    if config.enabled {
        Arc::new(HttpEmailSender::new(config.clone()))
    } else {
        Arc::new(NoopEmailSender)
    }
}

pub struct HttpEmailSender {
    client: reqwest::Client,
    config: EmailConfig,
}

impl HttpEmailSender {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    #[instrument(skip(self, html_body))]
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), EmailError> {
        let body = serde_json::json!({
            "from": self.config.from,
            "to": [to],
            "subject": subject,
            "html": html_body,
        });
        let resp = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(EmailError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

/// Used when email is disabled in config and in tests.
pub struct NoopEmailSender;

#[async_trait]
impl EmailSender for NoopEmailSender {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> Result<(), EmailError> {
        debug!(%to, %subject, "email disabled, dropping message");
        Ok(())
    }
}
