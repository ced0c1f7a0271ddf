//! Recipe drafts from video links.
//!
//! A pasted TikTok, YouTube or Instagram link is sent through a small relay
//! service to an automation webhook; whatever the workflow answers is read
//! tolerantly and folded into the add-recipe form.
//!
//! ```no_run
//! use recipe_link::{AppConfig, ExtractionController};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let (mut controller, mut notifications) = ExtractionController::from_config(&config.client);
//!
//! controller.set_video_url("https://www.youtube.com/watch?v=abc");
//! if let Some(notification) = notifications.recv().await {
//!     println!("{}: {}", notification.title, notification.description);
//! }
//! println!("{:?}", controller.draft());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod parser;
pub mod relay;
pub mod store;

pub use client::{HttpRelayClient, RelaySender};
pub use config::AppConfig;
pub use controller::{ExtractionController, Notification, NotificationKind};
pub use error::{RecipeLinkError, Result};
pub use model::{Category, Country, RecipeDraft, RecipeRecord, WebhookEnvelope};
pub use parser::{extract_fields, ParseOutcome, ParsedRecipeFields};
pub use store::{RecipeStore, RestRecipeStore};

/// Sends one link through the relay and reads the reply, without any form state
pub async fn extract_recipe(relay: &dyn RelaySender, video_url: &str) -> Result<ParseOutcome> {
    let envelope = relay.send(video_url).await?;
    Ok(extract_fields(&envelope.response))
}
