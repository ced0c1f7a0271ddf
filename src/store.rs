use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;

use crate::config::StoreConfig;
use crate::error::{RecipeLinkError, Result};
use crate::model::RecipeRecord;

/// Persistence boundary for finished recipes
#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn insert(&self, record: &RecipeRecord) -> Result<()>;
}

/// Writes recipes through the hosted database's REST interface
pub struct RestRecipeStore {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl RestRecipeStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or(RecipeLinkError::MissingSetting("store.base_url"))?;
        let api_key = config
            .api_key
            .clone()
            .ok_or(RecipeLinkError::MissingSetting("store.api_key"))?;

        Ok(Self {
            client: Client::new(),
            endpoint: format!(
                "{}/rest/v1/{}",
                base_url.trim_end_matches('/'),
                config.table
            ),
            api_key,
        })
    }
}

#[async_trait]
impl RecipeStore for RestRecipeStore {
    async fn insert(&self, record: &RecipeRecord) -> Result<()> {
        debug!("Inserting recipe '{}' into {}", record.title, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Error adding recipe: {} {}", status, body);
            return Err(RecipeLinkError::StoreError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
