use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde_json::json;

use crate::config::ClientConfig;
use crate::error::{RecipeLinkError, Result};
use crate::model::WebhookEnvelope;

/// Anything that can turn a video link into a relay envelope
#[async_trait]
pub trait RelaySender: Send + Sync {
    async fn send(&self, video_url: &str) -> Result<WebhookEnvelope>;
}

/// Calls the relay over HTTP
pub struct HttpRelayClient {
    client: Client,
    relay_url: String,
    api_key: Option<String>,
}

impl HttpRelayClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: Client::new(),
            relay_url: config.relay_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    #[doc(hidden)]
    pub fn with_url(relay_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            relay_url: relay_url.into(),
            api_key: None,
        }
    }
}

#[async_trait]
impl RelaySender for HttpRelayClient {
    async fn send(&self, video_url: &str) -> Result<WebhookEnvelope> {
        debug!("Sending recipe link to relay: {}", video_url);

        let mut request = self
            .client
            .post(&self.relay_url)
            .json(&json!({ "recipeUrl": video_url }));
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Relay returned {}: {}", status, body);
            return Err(RecipeLinkError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: WebhookEnvelope = response.json().await?;
        if !envelope.success {
            return Err(RecipeLinkError::RelayRejected(
                envelope.message.unwrap_or_default(),
            ));
        }

        debug!("Relay response: {:?}", envelope.response);
        Ok(envelope)
    }
}
