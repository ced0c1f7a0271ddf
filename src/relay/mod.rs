//! The relay service.
//!
//! Browsers cannot call the automation webhook directly, so the relay sits in
//! between: it accepts `{ recipeUrl }`, forwards the link upstream and wraps
//! whatever comes back into a [`WebhookEnvelope`].

mod error;
mod webhook;

pub use error::RelayFailure;
pub use webhook::WebhookClient;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, Method,
    },
    routing::post,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use log::{error, info, warn};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::config::RelayConfig;
use crate::error::Result;
use crate::model::WebhookEnvelope;

const SUCCESS_MESSAGE: &str = "Recipe link sent successfully";

#[derive(Debug, Deserialize)]
struct LinkRequest {
    #[serde(rename = "recipeUrl", default)]
    recipe_url: Option<String>,
}

struct RelayState {
    webhook: WebhookClient,
}

/// ISO-8601 UTC timestamp with millisecond precision
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Builds the relay routes with permissive CORS for browser callers
pub fn router(webhook: WebhookClient) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            CONTENT_TYPE,
        ])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", post(send_recipe_link))
        .route("/send-recipe-link", post(send_recipe_link))
        .layer(cors)
        .with_state(Arc::new(RelayState { webhook }))
}

async fn send_recipe_link(
    State(state): State<Arc<RelayState>>,
    body: Bytes,
) -> std::result::Result<Json<WebhookEnvelope>, RelayFailure> {
    let request: LinkRequest = serde_json::from_slice(&body).map_err(|e| {
        error!("Error in send-recipe-link: {}", e);
        RelayFailure::upstream(e, iso_timestamp())
    })?;

    let recipe_url = match request.recipe_url {
        Some(url) if !url.is_empty() => url,
        _ => {
            warn!("No recipe URL provided");
            return Err(RelayFailure::MissingUrl);
        }
    };

    info!("Processing recipe URL: {}", recipe_url);

    let timestamp = iso_timestamp();
    let response = state
        .webhook
        .forward(&recipe_url, &timestamp)
        .await
        .map_err(|e| {
            error!("Error in send-recipe-link: {}", e);
            RelayFailure::upstream(e, iso_timestamp())
        })?;

    Ok(Json(WebhookEnvelope {
        success: true,
        message: Some(SUCCESS_MESSAGE.to_string()),
        response,
        original_url: recipe_url,
        timestamp: Some(timestamp),
    }))
}

/// Runs the relay until Ctrl+C or SIGTERM
pub async fn serve(config: &RelayConfig) -> Result<()> {
    let app = router(WebhookClient::new(config)?);

    let address = format!("{}:{}", config.host, config.port);
    info!("Binding to {}", address);

    let listener = TcpListener::bind(&address).await?;
    info!("Relay running on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Relay shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
