use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    ApiSettings, Config, ConfigOverrides, DEFAULT_API_URL, InstrumentSettings, LoggingSettings,
    NotificationSettings, SessionSettings,
};

/// The single environment value that selects the backend host.
pub const API_URL_ENV: &str = "TRADEDESK_API_URL";

/// Loads the application configuration.
///
/// Sources, lowest precedence first: built-in defaults, the config file (if it
/// exists), `TRADEDESK__*` environment variables (`__` separates sections),
/// `TRADEDESK_API_URL`, and finally the command-line `--api-url`.
pub fn load_config(overrides: &ConfigOverrides) -> Result<Config, ConfigError> {
    let path = if overrides.config.as_os_str().is_empty() {
        Path::new("config.toml")
    } else {
        overrides.config.as_path()
    };
    let api_url = overrides
        .api_url
        .clone()
        .or_else(|| std::env::var(API_URL_ENV).ok().filter(|v| !v.trim().is_empty()));

    build(path, api_url, true)
}

/// Loads configuration from an explicit file without consulting the
/// environment.
pub fn load_config_from(path: &Path, api_url: Option<String>) -> Result<Config, ConfigError> {
    build(path, api_url, false)
}

fn build(path: &Path, api_url: Option<String>, with_env: bool) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder()
        .add_source(config::File::from(path).required(false));

    if with_env {
        builder = builder.add_source(
            config::Environment::with_prefix("TRADEDESK")
                .prefix_separator("__")
                .separator("__"),
        );
    }

    let settings = builder
        .set_override_option("api.base_url", api_url)?
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = settings.try_deserialize::<Config>()?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let url = url::Url::parse(&config.api.base_url).map_err(|e| {
        ConfigError::ValidationError(format!("api.base_url '{}': {}", config.api.base_url, e))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::ValidationError(format!(
            "api.base_url must be http or https, got '{}'",
            url.scheme()
        )));
    }
    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "api.timeout_secs must be greater than zero".to_string(),
        ));
    }
    if config.api.orders_limit == 0 || config.instruments.search_limit == 0 {
        return Err(ConfigError::ValidationError(
            "listing limits must be greater than zero".to_string(),
        ));
    }
    if config.notifications.auto_hide_ms == 0 {
        return Err(ConfigError::ValidationError(
            "notifications.auto_hide_ms must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
