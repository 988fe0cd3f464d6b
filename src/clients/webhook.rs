use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::{config::Config, error::RelayError};

const MAX_ERROR_BODY_BYTES: usize = 512;

pub struct WebhookClient {
    http_client: Client,
    url: Url,
}

impl WebhookClient {
    pub fn new(url: Url, timeout: Option<Duration>) -> Result<Self, RelayError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let http_client = builder
            .build()
            .map_err(|e| RelayError::configuration(format!("failed to create HTTP client: {}", e)))?;

        info!(
            url = %url,
            timeout_seconds = timeout.map(|t| t.as_secs()),
            "Webhook client initialized"
        );

        Ok(Self { http_client, url })
    }

    pub fn from_config(config: &Config) -> Result<Self, RelayError> {
        Self::new(config.webhook_url.clone(), config.webhook_timeout)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// POSTs the notification as JSON; only a 2xx response counts as delivered.
    pub async fn deliver(&self, notification: &Value) -> Result<(), RelayError> {
        debug!(url = %self.url, "Posting notification to webhook");

        let response = self
            .http_client
            .post(self.url.clone())
            .json(notification)
            .send()
            .await
            .map_err(|e| RelayError::DeliveryTransport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();

        Err(RelayError::DeliveryStatus {
            status: status.as_u16(),
            body: truncate(&body, MAX_ERROR_BODY_BYTES),
        })
    }
}

fn truncate(body: &str, max_bytes: usize) -> String {
    if body.len() <= max_bytes {
        return body.to_string();
    }

    let mut end = max_bytes;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
