//! Configuration management for the route weather service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WeatherError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteWeatherConfig {
    /// Weather provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Chat bot configuration
    #[serde(default)]
    pub bot: BotConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Favorability thresholds
    #[serde(default)]
    pub assessment: AssessmentThresholds,
}

/// Weather provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider API key
    pub api_key: Option<String>,
    /// Base URL for the provider API
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u32,
}

/// Telegram bot settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Bot access token
    pub token: Option<String>,
    /// Base URL for the Bot API
    #[serde(default = "default_bot_api_base_url")]
    pub api_base_url: String,
    /// Long-polling timeout in seconds
    #[serde(default = "default_bot_poll_timeout")]
    pub poll_timeout_seconds: u32,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Limits a metrics record must stay within to be favorable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentThresholds {
    #[serde(default = "default_min_temperature")]
    pub min_temperature: f64,
    #[serde(default = "default_max_temperature")]
    pub max_temperature: f64,
    #[serde(default = "default_min_humidity")]
    pub min_humidity: u8,
    #[serde(default = "default_max_humidity")]
    pub max_humidity: u8,
    #[serde(default = "default_max_wind_speed")]
    pub max_wind_speed: f64,
    #[serde(default = "default_min_visibility")]
    pub min_visibility: f64,
    #[serde(default = "default_max_precipitation_probability")]
    pub max_precipitation_probability: u8,
}

// Default value functions
fn default_provider_base_url() -> String {
    "http://dataservice.accuweather.com".to_string()
}

fn default_provider_timeout() -> u32 {
    30
}

fn default_bot_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_bot_poll_timeout() -> u32 {
    30
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_min_temperature() -> f64 {
    0.0
}

fn default_max_temperature() -> f64 {
    35.0
}

fn default_min_humidity() -> u8 {
    30
}

fn default_max_humidity() -> u8 {
    60
}

fn default_max_wind_speed() -> f64 {
    50.0
}

fn default_min_visibility() -> f64 {
    10.0
}

fn default_max_precipitation_probability() -> u8 {
    70
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_provider_base_url(),
            timeout_seconds: default_provider_timeout(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base_url: default_bot_api_base_url(),
            poll_timeout_seconds: default_bot_poll_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for AssessmentThresholds {
    fn default() -> Self {
        Self {
            min_temperature: default_min_temperature(),
            max_temperature: default_max_temperature(),
            min_humidity: default_min_humidity(),
            max_humidity: default_max_humidity(),
            max_wind_speed: default_max_wind_speed(),
            min_visibility: default_min_visibility(),
            max_precipitation_probability: default_max_precipitation_probability(),
        }
    }
}

impl ServerConfig {
    /// Parse host and port into a socket address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid server address {}:{}", self.host, self.port))
    }
}

impl RouteWeatherConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        // A missing .env file is fine; variables may come from the process environment
        let _ = dotenvy::dotenv();

        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. ROUTE_WEATHER_PROVIDER__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("ROUTE_WEATHER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: RouteWeatherConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_legacy_env(|name| std::env::var(name).ok());
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("route-weather").join("config.toml"))
    }

    /// Fill the provider key and bot token from the plain `API_KEY` and
    /// `API_TOKEN` variables when they are not configured otherwise
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.provider.api_key.is_none() {
            self.provider.api_key = lookup("API_KEY").filter(|v| !v.is_empty());
        }
        if self.bot.token.is_none() {
            self.bot.token = lookup("API_TOKEN").filter(|v| !v.is_empty());
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.provider.base_url.is_empty() {
            self.provider.base_url = default_provider_base_url();
        }
        if self.provider.timeout_seconds == 0 {
            self.provider.timeout_seconds = default_provider_timeout();
        }
        if self.bot.api_base_url.is_empty() {
            self.bot.api_base_url = default_bot_api_base_url();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_credentials()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API key and bot token when present
    pub fn validate_credentials(&self) -> Result<()> {
        if let Some(api_key) = &self.provider.api_key {
            if api_key.len() < 8 {
                return Err(WeatherError::config(
                    "Provider API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }
            if api_key.len() > 100 {
                return Err(WeatherError::config(
                    "Provider API key appears to be invalid (too long). Please check your API key.",
                )
                .into());
            }
        }

        if let Some(token) = &self.bot.token {
            if !token.contains(':') {
                return Err(WeatherError::config(
                    "Bot token must look like '<bot id>:<secret>'",
                )
                .into());
            }
        }

        Ok(())
    }

    /// The provider API key, required by every weather operation
    pub fn require_api_key(&self) -> Result<&str> {
        self.provider.api_key.as_deref().ok_or_else(|| {
            WeatherError::config(
                "Missing provider API key. Set API_KEY or ROUTE_WEATHER_PROVIDER__API_KEY.",
            )
            .into()
        })
    }

    /// The bot token, required only by the bot
    pub fn require_bot_token(&self) -> Result<&str> {
        self.bot.token.as_deref().ok_or_else(|| {
            WeatherError::config("Missing bot token. Set API_TOKEN or ROUTE_WEATHER_BOT__TOKEN.")
                .into()
        })
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.provider.timeout_seconds > 300 {
            return Err(
                WeatherError::config("Provider timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.bot.poll_timeout_seconds > 90 {
            return Err(WeatherError::config("Bot poll timeout cannot exceed 90 seconds").into());
        }

        let thresholds = &self.assessment;
        if thresholds.min_temperature > thresholds.max_temperature {
            return Err(WeatherError::config(
                "Assessment min_temperature must not exceed max_temperature",
            )
            .into());
        }
        if thresholds.min_humidity > thresholds.max_humidity || thresholds.max_humidity > 100 {
            return Err(WeatherError::config(
                "Assessment humidity range must lie within 0-100 with min <= max",
            )
            .into());
        }
        if thresholds.max_precipitation_probability > 100 {
            return Err(WeatherError::config(
                "Assessment max_precipitation_probability cannot exceed 100",
            )
            .into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Provider", &self.provider.base_url),
            ("Bot API", &self.bot.api_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WeatherError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = RouteWeatherConfig::default();
        assert_eq!(
            config.provider.base_url,
            "http://dataservice.accuweather.com"
        );
        assert_eq!(config.provider.timeout_seconds, 30);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.assessment.max_wind_speed, 50.0);
        assert_eq!(config.assessment.max_precipitation_probability, 70);
        assert!(config.provider.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_legacy_env_fills_missing_credentials() {
        let env: HashMap<&str, &str> =
            HashMap::from([("API_KEY", "legacy_key_123"), ("API_TOKEN", "123:abc")]);
        let mut config = RouteWeatherConfig::default();
        config.apply_legacy_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.provider.api_key.as_deref(), Some("legacy_key_123"));
        assert_eq!(config.bot.token.as_deref(), Some("123:abc"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_legacy_env_does_not_override_configured_values() {
        let mut config = RouteWeatherConfig::default();
        config.provider.api_key = Some("configured_key".to_string());
        config.apply_legacy_env(|_| Some("legacy_key_123".to_string()));
        assert_eq!(config.provider.api_key.as_deref(), Some("configured_key"));
    }

    #[test]
    fn test_config_validation_short_api_key() {
        let mut config = RouteWeatherConfig::default();
        config.provider.api_key = Some("short".to_string());
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("too short"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = RouteWeatherConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = RouteWeatherConfig::default();
        config.provider.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));

        let mut config = RouteWeatherConfig::default();
        config.assessment.min_temperature = 40.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_credentials_are_reported() {
        let config = RouteWeatherConfig::default();
        assert!(config.require_api_key().is_err());
        assert!(config.require_bot_token().is_err());
    }

    #[test]
    fn test_apply_defaults_restores_empty_values() {
        let mut config = RouteWeatherConfig::default();
        config.provider.base_url.clear();
        config.logging.format.clear();
        config.apply_defaults();
        assert_eq!(
            config.provider.base_url,
            "http://dataservice.accuweather.com"
        );
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_socket_addr() {
        let config = RouteWeatherConfig::default();
        let addr = config.server.socket_addr().unwrap();
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = RouteWeatherConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("route-weather"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
