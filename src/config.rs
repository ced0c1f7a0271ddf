use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

/// Top-level configuration shared by the relay binary and the extraction client
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Relay service settings
    #[serde(default)]
    pub relay: RelayConfig,
    /// Settings used by the controller to reach the relay
    #[serde(default)]
    pub client: ClientConfig,
    /// Hosted recipe table settings
    #[serde(default)]
    pub store: StoreConfig,
}

/// Shape of the JSON body forwarded to the automation webhook
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PayloadShape {
    /// `{ recipeUrl }` only
    Minimal,
    /// `recipeUrl` plus the `videoUrl`/`url` aliases, a timestamp and an action tag
    #[default]
    Enriched,
}

/// Configuration for the relay service
#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    /// Automation webhook every link is forwarded to
    pub webhook_url: Option<String>,
    /// Outbound payload shape
    #[serde(default)]
    pub payload: PayloadShape,
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upstream request timeout in seconds; the transport default applies when unset
    pub timeout_secs: Option<u64>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            payload: PayloadShape::default(),
            host: default_host(),
            port: default_port(),
            timeout_secs: None,
        }
    }
}

/// Configuration for calling the relay from the extraction controller
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Full URL of the relay endpoint
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
    /// Key sent as `apikey` and bearer token (hosted function gateways require it)
    pub api_key: Option<String>,
    /// Quiet period after the last URL keystroke before extracting
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
            api_key: None,
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Configuration for the hosted recipe table
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            table: default_table(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8787
}

fn default_relay_url() -> String {
    "http://127.0.0.1:8787/send-recipe-link".to_string()
}

fn default_debounce_ms() -> u64 {
    1000
}

fn default_table() -> String {
    "recipes".to_string()
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_LINK__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_LINK__RELAY__WEBHOOK_URL
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            // Optional config file (can be missing)
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("RECIPE_LINK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Parse configuration from a TOML document, without consulting the environment
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        assert_eq!(default_port(), 8787);
        assert_eq!(default_debounce_ms(), 1000);
        assert_eq!(default_table(), "recipes");
        assert_eq!(PayloadShape::default(), PayloadShape::Enriched);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert!(config.relay.webhook_url.is_none());
        assert_eq!(config.relay.host, "0.0.0.0");
        assert!(config.relay.timeout_secs.is_none());
        assert_eq!(config.client.debounce_ms, 1000);
        assert!(config.store.base_url.is_none());
    }

    #[test]
    fn test_sections_are_read() {
        let config = AppConfig::from_toml_str(
            r#"
            [relay]
            webhook_url = "https://hooks.example.com/webhook/abc"
            payload = "minimal"
            port = 9000
            timeout_secs = 20

            [client]
            relay_url = "https://project.example.com/functions/v1/send-recipe-link"
            api_key = "anon"
            debounce_ms = 250

            [store]
            base_url = "https://project.example.com"
            table = "my_recipes"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.relay.webhook_url.as_deref(),
            Some("https://hooks.example.com/webhook/abc")
        );
        assert_eq!(config.relay.payload, PayloadShape::Minimal);
        assert_eq!(config.relay.port, 9000);
        assert_eq!(config.relay.timeout_secs, Some(20));
        assert_eq!(config.client.api_key.as_deref(), Some("anon"));
        assert_eq!(config.client.debounce_ms, 250);
        assert_eq!(config.store.table, "my_recipes");
        assert!(config.store.api_key.is_none());
    }

    #[test]
    fn test_unknown_payload_shape_is_rejected() {
        let result = AppConfig::from_toml_str("[relay]\npayload = \"verbose\"\n");
        assert!(result.is_err());
    }
}
