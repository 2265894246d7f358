use serde::Deserialize;
use std::path::PathBuf;

/// Used when neither the environment nor `config.toml` names a backend.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiSettings,
    pub session: SessionSettings,
    pub instruments: InstrumentSettings,
    pub notifications: NotificationSettings,
    pub logging: LoggingSettings,
}

/// How to reach the trading backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL every endpoint path is appended to (e.g. "http://localhost:3000/api").
    pub base_url: String,
    /// Requests that take longer than this fail with a transport error.
    pub timeout_secs: u64,
    /// Upper bound on the number of orders requested per listing.
    pub orders_limit: u32,
    /// Default page size for the pending-orders listing.
    pub pending_limit: u32,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 10,
            orders_limit: 200,
            pending_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// The account shown when none is selected explicitly.
    pub default_user_id: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self { default_user_id: 1 }
    }
}

/// Parameters of the instrument catalogue the trading flow offers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InstrumentSettings {
    /// Query sent to `/instruments/search` to fill the catalogue.
    pub search_query: String,
    pub search_limit: u32,
    /// The `type` parameter of the market-data endpoint.
    pub market_data_type: String,
}

impl Default for InstrumentSettings {
    fn default() -> Self {
        Self {
            search_query: "acciones".to_string(),
            search_limit: 100,
            market_data_type: "ACCIONES".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Delay after which a shown notification closes on its own.
    pub auto_hide_ms: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self { auto_hide_ms: 6000 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs are also written to a daily-rotated file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

/// Command-line overrides that take precedence over every other source.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct ConfigOverrides {
    /// Path to the configuration file.
    #[cfg_attr(feature = "clap", arg(long, global = true, default_value = "config.toml"))]
    pub config: PathBuf,

    /// Backend base URL (overrides TRADEDESK_API_URL and the config file).
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub api_url: Option<String>,
}
