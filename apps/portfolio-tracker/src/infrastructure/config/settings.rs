//! Tracker Configuration Settings
//!
//! Configuration types for the tracker, loaded from environment variables.

use std::time::Duration;

use crate::application::services::BootstrapSettings;

/// Default quote endpoint base URL.
const DEFAULT_QUOTE_BASE_URL: &str = "https://www.alphavantage.co";

/// Default quote request timeout.
const DEFAULT_QUOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default collection namespace.
const DEFAULT_NAMESPACE: &str = "default-app-id";

/// Quote endpoint settings.
#[derive(Clone)]
pub struct QuoteSettings {
    /// API key attached to every quote request.
    pub api_key: String,
    /// Endpoint base URL.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for QuoteSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteSettings")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Complete tracker configuration.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Collection namespace scoping all per-identity documents.
    pub namespace: String,
    /// Opaque identity-provider configuration blob. Absent or empty means
    /// bootstrap terminates in the unconfigured state.
    pub provider_config: Option<String>,
    /// Optional one-shot credential token.
    pub initial_token: Option<String>,
    /// Quote endpoint settings.
    pub quote: QuoteSettings,
}

impl TrackerConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the quote API key is missing or empty. Provider
    /// configuration is deliberately not required here: its absence is a
    /// bootstrap-time fault rendered to the user, not a startup crash.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("ALPHAVANTAGE_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("ALPHAVANTAGE_KEY".to_string()))?;
        if api_key.is_empty() {
            return Err(ConfigError::EmptyValue("ALPHAVANTAGE_KEY".to_string()));
        }

        let base_url = std::env::var("ALPHAVANTAGE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_QUOTE_BASE_URL.to_string());

        let timeout = parse_env_duration_secs("TRACKER_QUOTE_TIMEOUT_SECS", DEFAULT_QUOTE_TIMEOUT);

        let namespace =
            std::env::var("TRACKER_NAMESPACE").unwrap_or_else(|_| DEFAULT_NAMESPACE.to_string());

        Ok(Self {
            namespace,
            provider_config: non_empty_env("TRACKER_AUTH_CONFIG"),
            initial_token: non_empty_env("TRACKER_AUTH_TOKEN"),
            quote: QuoteSettings {
                api_key,
                base_url,
                timeout,
            },
        })
    }

    /// Extract the bootstrap inputs from this configuration.
    #[must_use]
    pub fn bootstrap_settings(&self) -> BootstrapSettings {
        BootstrapSettings {
            provider_config: self.provider_config.clone(),
            initial_token: self.initial_token.clone(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

fn parse_env_duration_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_settings_redacted_debug() {
        let settings = QuoteSettings {
            api_key: "secret123".to_string(),
            base_url: DEFAULT_QUOTE_BASE_URL.to_string(),
            timeout: DEFAULT_QUOTE_TIMEOUT,
        };
        let debug = format!("{settings:?}");
        assert!(!debug.contains("secret123"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn bootstrap_settings_carry_provider_config_and_token() {
        let config = TrackerConfig {
            namespace: DEFAULT_NAMESPACE.to_string(),
            provider_config: Some("{\"projectId\":\"demo\"}".to_string()),
            initial_token: Some("one-shot".to_string()),
            quote: QuoteSettings {
                api_key: "k".to_string(),
                base_url: DEFAULT_QUOTE_BASE_URL.to_string(),
                timeout: DEFAULT_QUOTE_TIMEOUT,
            },
        };

        let settings = config.bootstrap_settings();
        assert!(settings.is_configured());
        assert_eq!(settings.initial_token.as_deref(), Some("one-shot"));
    }
}
