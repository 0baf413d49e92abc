//! Client configuration.
//!
//! Defaults depend on the deployment [`Environment`] (`STAFFDESK_ENV`,
//! development when unset) and are then overridden by `STAFFDESK_*`
//! variables:
//!
//! | Variable | Setting |
//! |---|---|
//! | `STAFFDESK_API_URL` | API base URL (required outside development) |
//! | `STAFFDESK_API_TIMEOUT_SECS` | Request timeout; unset means none |
//! | `STAFFDESK_STORAGE_PATH` | File backing durable storage |
//! | `STAFFDESK_TOAST_TTL_MS` | How long a notification stays visible |
//! | `STAFFDESK_LEGACY_TOKEN_MATCH` | Treat a code-less 401 mentioning "token" as an expired session |
//! | `STAFFDESK_EXPIRY_CODES` | Comma-separated 401 codes meaning an expired session |

use serde::{Deserialize, Serialize};
use staffdesk_client::session::DEFAULT_EXPIRY_CODES;
use staffdesk_client::{ClientConfig, SessionPolicy};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    /// Unknown deployment environment
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    /// A variable holds a value of the wrong shape
    #[error("Invalid value for {key}: {value}")]
    InvalidValue {
        /// Variable name
        key: String,
        /// Offending value
        value: String,
    },

    /// Settings are individually valid but unusable
    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local API
    Development,
    /// Pre-production
    Staging,
    /// Production
    Production,
}

impl Environment {
    /// Check if this is the development environment
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Development),
            "staging" | "stage" => Ok(Self::Staging),
            "prod" | "production" => Ok(Self::Production),
            _ => Err(ConfigError::InvalidEnvironment(s.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Staging => write!(f, "staging"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// REST API access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every path is joined to
    pub base_url: String,
    /// Request timeout in seconds; `None` waits indefinitely
    pub timeout_secs: Option<u64>,
    /// Keep cookies set by the API
    pub with_credentials: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_secs: None,
            with_credentials: true,
        }
    }
}

/// How an expired session is recognized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// 401 `code` values meaning the session is gone
    pub expiry_codes: Vec<String>,
    /// Fall back to matching "token" in code-less 401 messages
    pub legacy_message_match: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expiry_codes: DEFAULT_EXPIRY_CODES.iter().map(ToString::to_string).collect(),
            legacy_message_match: true,
        }
    }
}

/// Durable storage location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding the token and the auth snapshot
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".staffdesk/storage.json"),
        }
    }
}

/// Notification display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastConfig {
    /// Time a toast stays visible, in milliseconds
    pub ttl_ms: u64,
}

impl ToastConfig {
    /// Get the TTL as a Duration
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self { ttl_ms: 4000 }
    }
}

/// Complete client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment environment
    pub environment: Environment,
    /// REST API access
    pub api: ApiConfig,
    /// Session expiry detection
    pub session: SessionConfig,
    /// Durable storage
    pub storage: StorageConfig,
    /// Notifications
    pub toasts: ToastConfig,
}

impl AppConfig {
    /// Defaults for `environment`
    #[must_use]
    pub fn for_environment(environment: Environment) -> Self {
        let mut config = Self {
            environment,
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            storage: StorageConfig::default(),
            toasts: ToastConfig::default(),
        };

        match environment {
            Environment::Development => {},
            Environment::Staging | Environment::Production => {
                config.api.base_url = String::new();
                config.toasts.ttl_ms = 3000;
            },
        }

        config
    }

    /// Load from the process environment
    ///
    /// # Errors
    ///
    /// Returns error if a variable is malformed, the API URL is missing
    /// outside development, or the result fails [`AppConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from `lookup`, which maps a variable name to its value
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = lookup("STAFFDESK_ENV")
            .map_or(Ok(Environment::Development), |value| value.parse())?;
        let mut config = Self::for_environment(environment);

        match lookup("STAFFDESK_API_URL") {
            Some(url) => config.api.base_url = url,
            None if environment.is_development() => {},
            None => return Err(ConfigError::EnvVarNotSet("STAFFDESK_API_URL".to_string())),
        }
        if let Some(secs) = lookup("STAFFDESK_API_TIMEOUT_SECS") {
            config.api.timeout_secs = Some(parse("STAFFDESK_API_TIMEOUT_SECS", &secs)?);
        }
        if let Some(path) = lookup("STAFFDESK_STORAGE_PATH") {
            config.storage.path = PathBuf::from(path);
        }
        if let Some(ttl) = lookup("STAFFDESK_TOAST_TTL_MS") {
            config.toasts.ttl_ms = parse("STAFFDESK_TOAST_TTL_MS", &ttl)?;
        }
        if let Some(flag) = lookup("STAFFDESK_LEGACY_TOKEN_MATCH") {
            config.session.legacy_message_match = parse_flag("STAFFDESK_LEGACY_TOKEN_MATCH", &flag)?;
        }
        if let Some(codes) = lookup("STAFFDESK_EXPIRY_CODES") {
            config.session.expiry_codes = codes
                .split(',')
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(ToString::to_string)
                .collect();
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "api.base_url must be an http(s) URL, got `{url}`"
            )));
        }
        if self.api.timeout_secs == Some(0) {
            return Err(ConfigError::Validation("api.timeout_secs must be > 0".to_string()));
        }
        if self.session.expiry_codes.is_empty() && !self.session.legacy_message_match {
            return Err(ConfigError::Validation(
                "session expiry needs at least one code or the legacy message match".to_string(),
            ));
        }
        if self.storage.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation("storage.path cannot be empty".to_string()));
        }
        if self.toasts.ttl_ms == 0 {
            return Err(ConfigError::Validation("toasts.ttl_ms must be > 0".to_string()));
        }
        Ok(())
    }

    /// Settings for the HTTP client
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        let mut client = ClientConfig::new(self.api.base_url.clone()).with_session_policy(SessionPolicy {
            expiry_codes: self.session.expiry_codes.clone(),
            legacy_message_match: self.session.legacy_message_match,
        });
        client.with_credentials = self.api.with_credentials;
        if let Some(secs) = self.api.timeout_secs {
            client = client.with_timeout(Duration::from_secs(secs));
        }
        client
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn development_needs_no_variables() {
        let config = load(&[]).unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.api.base_url, "http://localhost:5000/api");
        assert_eq!(config.api.timeout_secs, None);
        assert!(config.session.legacy_message_match);
        assert_eq!(config.toasts.ttl(), Duration::from_millis(4000));
    }

    #[test]
    fn production_requires_an_api_url() {
        assert_eq!(
            load(&[("STAFFDESK_ENV", "prod")]),
            Err(ConfigError::EnvVarNotSet("STAFFDESK_API_URL".to_string()))
        );

        let config = load(&[("STAFFDESK_ENV", "production"), ("STAFFDESK_API_URL", "https://hr.example.com/api")])
            .unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.toasts.ttl_ms, 3000);
    }

    #[test]
    fn variables_override_defaults() {
        let config = load(&[
            ("STAFFDESK_API_TIMEOUT_SECS", "15"),
            ("STAFFDESK_STORAGE_PATH", "/tmp/sd.json"),
            ("STAFFDESK_TOAST_TTL_MS", "500"),
            ("STAFFDESK_LEGACY_TOKEN_MATCH", "off"),
            ("STAFFDESK_EXPIRY_CODES", "JWT_EXPIRED, SESSION_GONE"),
        ])
        .unwrap();

        assert_eq!(config.api.timeout_secs, Some(15));
        assert_eq!(config.storage.path, PathBuf::from("/tmp/sd.json"));
        assert_eq!(config.toasts.ttl_ms, 500);
        assert!(!config.session.legacy_message_match);
        assert_eq!(config.session.expiry_codes, vec!["JWT_EXPIRED", "SESSION_GONE"]);

        let client = config.client_config();
        assert_eq!(client.timeout, Some(Duration::from_secs(15)));
        assert!(!client.session.legacy_message_match);
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(matches!(
            load(&[("STAFFDESK_API_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            load(&[("STAFFDESK_LEGACY_TOKEN_MATCH", "maybe")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(
            load(&[("STAFFDESK_ENV", "qa")]),
            Err(ConfigError::InvalidEnvironment("qa".to_string()))
        );
    }

    #[test]
    fn validation_catches_unusable_settings() {
        assert!(matches!(
            load(&[("STAFFDESK_API_URL", "localhost:5000")]),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            load(&[("STAFFDESK_API_TIMEOUT_SECS", "0")]),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            load(&[("STAFFDESK_LEGACY_TOKEN_MATCH", "false"), ("STAFFDESK_EXPIRY_CODES", " , ")]),
            Err(ConfigError::Validation(_))
        ));
    }
}
