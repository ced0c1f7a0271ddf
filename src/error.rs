use thiserror::Error;

/// Errors that can occur while relaying, extracting or storing recipes
#[derive(Error, Debug)]
pub enum RecipeLinkError {
    /// Failed to reach a remote endpoint
    #[error("Request failed: {0}")]
    TransportError(#[from] reqwest::Error),

    /// The automation webhook or the relay answered with a non-2xx status
    #[error("Webhook request failed with status: {status} - {body}")]
    UpstreamStatus { status: u16, body: String },

    /// The relay answered but reported `success: false`
    #[error("Relay rejected the link: {0}")]
    RelayRejected(String),

    /// The recipe store refused the insert
    #[error("Recipe store returned status {status}: {body}")]
    StoreError { status: u16, body: String },

    /// A required setting is absent from every configuration source
    #[error("Missing configuration value: {0}")]
    MissingSetting(&'static str),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// Error encoding or decoding JSON
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error binding or serving the relay
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T, E = RecipeLinkError> = std::result::Result<T, E>;
