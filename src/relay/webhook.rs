use std::time::Duration;

use log::{debug, error, info};
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::{PayloadShape, RelayConfig};
use crate::error::{RecipeLinkError, Result};

const FETCH_ACTION: &str = "fetch_specific_recipe";

/// Forwards recipe links to the automation webhook
pub struct WebhookClient {
    client: Client,
    webhook_url: String,
    shape: PayloadShape,
}

impl WebhookClient {
    /// Create a new webhook client from configuration
    pub fn new(config: &RelayConfig) -> Result<Self> {
        let webhook_url = config
            .webhook_url
            .clone()
            .ok_or(RecipeLinkError::MissingSetting("relay.webhook_url"))?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            webhook_url,
            shape: config.payload,
        })
    }

    #[doc(hidden)]
    pub fn with_url(webhook_url: impl Into<String>, shape: PayloadShape) -> Self {
        Self {
            client: Client::new(),
            webhook_url: webhook_url.into(),
            shape,
        }
    }

    /// Sends `recipe_url` upstream and returns the reply, decoded as JSON when it is JSON
    pub async fn forward(&self, recipe_url: &str, timestamp: &str) -> Result<Value> {
        let payload = build_payload(self.shape, recipe_url, timestamp);
        debug!("Sending payload to webhook: {}", payload);

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        info!("Webhook response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Webhook request failed: {} {}", status, body);
            return Err(RecipeLinkError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        debug!("Webhook response data: {}", text);

        Ok(decode_reply(text))
    }
}

fn build_payload(shape: PayloadShape, recipe_url: &str, timestamp: &str) -> Value {
    match shape {
        PayloadShape::Minimal => json!({ "recipeUrl": recipe_url }),
        PayloadShape::Enriched => json!({
            "recipeUrl": recipe_url,
            "videoUrl": recipe_url,
            "url": recipe_url,
            "timestamp": timestamp,
            "action": FETCH_ACTION,
        }),
    }
}

fn decode_reply(text: String) -> Value {
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(_) => {
            debug!("Response is not JSON, treating as text");
            Value::String(text)
        }
    }
}
