use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::info;

use super::SystemError;
use crate::domain::RatingSettings;

const ENV_PREFIX: &str = "STOREFRONT";
const DEFAULT_FILE: &str = "storefront";

/// Complete service configuration. Every section has working defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub actors: ActorConfig,
    pub catalog: CatalogConfig,
    pub accounts: AccountsConfig,
    pub checkout: CheckoutConfig,
    pub rating: RatingSettings,
    pub support: SupportConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, SystemError> {
        format!("{}:{}", self.address, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| SystemError::InvalidSetting {
                key: "server.address",
                reason: e.to_string(),
            })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    pub buffer_size: usize,
    pub event_capacity: usize,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            buffer_size: 32,
            event_capacity: 128,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub page_size: usize,
    pub seed_file: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            seed_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AccountsConfig {
    /// Base URL used in password reset links.
    pub site_url: String,
    pub reset_secret: String,
    pub reset_timeout_secs: u64,
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
}

impl AccountsConfig {
    pub const DEV_SECRET: &'static str = "dev-only-reset-secret";
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            site_url: "http://127.0.0.1:8000".to_string(),
            reset_secret: Self::DEV_SECRET.to_string(),
            reset_timeout_secs: 3 * 24 * 60 * 60,
            hash_memory_kib: 19 * 1024,
            hash_iterations: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    /// Base URL the gateway redirects back to.
    pub host_url: String,
    pub currency: String,
    pub gateway_url: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            host_url: "http://127.0.0.1:8000".to_string(),
            currency: "USD".to_string(),
            gateway_url: "https://secure-payment-gateway.com/pay".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SupportConfig {
    pub opening_hour: u32,
    pub closing_hour: u32,
    pub agents: Vec<String>,
    pub bot_message: String,
    /// `{content}` is replaced by the customer's message.
    pub agent_template: String,
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            opening_hour: 9,
            closing_hour: 18,
            agents: vec!["agent_1".to_string()],
            bot_message: "Our agents are available from 9:00 to 18:00. \
                          Leave your message and we will get back to you."
                .to_string(),
            agent_template: "Thanks for your message, we are reviewing '{content}'. \
                             An agent will assist you shortly."
                .to_string(),
        }
    }
}

/// Loads the configuration.
///
/// Layers, lowest first: built-in defaults, the file at `path` (or an optional
/// `storefront.{toml,json,yaml}` in the working directory), then environment
/// variables such as `STOREFRONT__SERVER__PORT=9000`.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, SystemError> {
    let file = match path {
        Some(path) => {
            info!("Loading config from {}", path.display());
            File::from(path).required(true)
        }
        None => File::with_name(DEFAULT_FILE).required(false),
    };

    let config = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("support.agents"),
        )
        .build()?
        .try_deserialize::<AppConfig>()?;

    config.validate()?;
    Ok(config)
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), SystemError> {
        if self.catalog.page_size == 0 {
            return Err(SystemError::InvalidSetting {
                key: "catalog.page_size",
                reason: "must be at least 1".into(),
            });
        }
        if self.actors.buffer_size == 0 {
            return Err(SystemError::InvalidSetting {
                key: "actors.buffer_size",
                reason: "must be at least 1".into(),
            });
        }
        if self.support.opening_hour >= self.support.closing_hour || self.support.closing_hour > 24 {
            return Err(SystemError::InvalidSetting {
                key: "support",
                reason: format!(
                    "opening hour {} must come before closing hour {}",
                    self.support.opening_hour, self.support.closing_hour
                ),
            });
        }
        if self.rating.min_stars > self.rating.max_stars {
            return Err(SystemError::InvalidSetting {
                key: "rating",
                reason: "min_stars is greater than max_stars".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.catalog.page_size, 10);
        assert_eq!(config.accounts.reset_timeout_secs, 259_200);
        assert_eq!(config.checkout.currency, "USD");
        assert_eq!(config.rating, RatingSettings::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: AppConfig = serde_json::from_value(json!({
            "server": { "port": 9100 },
            "rating": { "allow_empty_comments": false },
            "support": { "agents": ["ana", "luis"] }
        }))
        .unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.address, "0.0.0.0");
        assert!(!config.rating.allow_empty_comments);
        assert_eq!(config.rating.max_stars, 5);
        assert_eq!(config.support.agents, ["ana", "luis"]);
        assert_eq!(config.support.opening_hour, 9);
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        config.support.opening_hour = 18;
        config.support.closing_hour = 9;
        assert!(matches!(config.validate(), Err(SystemError::InvalidSetting { key: "support", .. })));

        let mut config = AppConfig::default();
        config.catalog.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_socket_addr() {
        let server = ServerConfig {
            address: "127.0.0.1".into(),
            port: 8080,
        };
        assert_eq!(server.socket_addr().unwrap().port(), 8080);
        let bad = ServerConfig {
            address: "not an ip".into(),
            port: 1,
        };
        assert!(bad.socket_addr().is_err());
    }

    #[test]
    fn test_missing_default_file_is_fine() {
        let config = load_config(None).unwrap();
        assert_eq!(config.actors.buffer_size, 32);
    }
}
