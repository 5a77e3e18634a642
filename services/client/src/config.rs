//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development. Administrator bootstrap values are secrets
//! and are only ever read from the environment.

use std::fmt;
use std::time::Duration;

use reqwest::Url;
use tracing::Level;
use veritas_core::AdminPolicy;

pub const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_FEDERATED_PROVIDER: &str = "google.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone)]
pub struct Config {
    pub api_base_url: Url,
    pub identity_base_url: Url,
    pub identity_api_key: String,
    pub federated_provider: String,
    pub federated_client_id: Option<String>,
    pub admin_policy: AdminPolicy,
    pub http_timeout: Duration,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to keep tests hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        // --- Endpoints ---
        let api_base_url = parse_url(
            "VERITAS_API_BASE_URL",
            &var("VERITAS_API_BASE_URL")
                .ok_or_else(|| ConfigError::MissingVar("VERITAS_API_BASE_URL".to_string()))?,
        )?;
        let identity_base_url = parse_url(
            "VERITAS_IDENTITY_BASE_URL",
            &var("VERITAS_IDENTITY_BASE_URL")
                .unwrap_or_else(|| DEFAULT_IDENTITY_BASE_URL.to_string()),
        )?;
        let identity_api_key = var("VERITAS_IDENTITY_API_KEY")
            .ok_or_else(|| ConfigError::MissingVar("VERITAS_IDENTITY_API_KEY".to_string()))?;

        // --- Federated sign-in ---
        let federated_provider = var("VERITAS_FEDERATED_PROVIDER")
            .unwrap_or_else(|| DEFAULT_FEDERATED_PROVIDER.to_string());
        let federated_client_id = var("VERITAS_FEDERATED_CLIENT_ID");

        // --- Administrator bootstrap (both halves of the pair, or neither) ---
        let mut admin_policy = AdminPolicy::new();
        match (var("VERITAS_ADMIN_EMAIL"), var("VERITAS_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => {
                admin_policy = admin_policy.with_admin_credentials(email, password);
            }
            (None, None) => {}
            (Some(_), None) => {
                return Err(ConfigError::InvalidValue(
                    "VERITAS_ADMIN_PASSWORD".to_string(),
                    "must be set together with VERITAS_ADMIN_EMAIL".to_string(),
                ))
            }
            (None, Some(_)) => {
                return Err(ConfigError::InvalidValue(
                    "VERITAS_ADMIN_EMAIL".to_string(),
                    "must be set together with VERITAS_ADMIN_PASSWORD".to_string(),
                ))
            }
        }
        if let Some(code) = var("VERITAS_ADMIN_ENROLLMENT_CODE") {
            admin_policy = admin_policy.with_enrollment_code(code);
        }

        // --- HTTP and logging ---
        let http_timeout = match var("VERITAS_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| {
                    ConfigError::InvalidValue("VERITAS_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue(
                        "VERITAS_HTTP_TIMEOUT_SECS".to_string(),
                        "must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            api_base_url,
            identity_base_url,
            identity_api_key,
            federated_provider,
            federated_client_id,
            admin_policy,
            http_timeout,
            log_level,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url.as_str())
            .field("identity_base_url", &self.identity_base_url.as_str())
            .field("identity_api_key", &"<redacted>")
            .field("federated_provider", &self.federated_provider)
            .field("federated_client_id", &self.federated_client_id)
            .field("admin_policy", &self.admin_policy)
            .field("http_timeout", &self.http_timeout)
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("VERITAS_API_BASE_URL", "http://localhost:8000"),
        ("VERITAS_IDENTITY_API_KEY", "key-123"),
    ];

    #[test]
    fn defaults_apply_when_only_required_values_are_set() {
        let config = Config::from_lookup(lookup(&REQUIRED)).expect("config loads");

        assert_eq!(config.api_base_url.as_str(), "http://localhost:8000/");
        assert_eq!(
            config.identity_base_url.as_str(),
            "https://identitytoolkit.googleapis.com/v1"
        );
        assert_eq!(config.federated_provider, "google.com");
        assert_eq!(config.federated_client_id, None);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn missing_api_url_is_reported() {
        let err = Config::from_lookup(lookup(&[("VERITAS_IDENTITY_API_KEY", "k")]))
            .expect_err("api url is required");
        assert!(matches!(err, ConfigError::MissingVar(var) if var == "VERITAS_API_BASE_URL"));
    }

    #[test]
    fn half_an_admin_pair_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("VERITAS_ADMIN_EMAIL", "admin@veritas.com"));
        let err = Config::from_lookup(lookup(&pairs)).expect_err("pair is incomplete");
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "VERITAS_ADMIN_PASSWORD"));
    }

    #[test]
    fn invalid_values_are_reported() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("VERITAS_HTTP_TIMEOUT_SECS", "soon"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(ConfigError::InvalidValue(var, _)) if var == "VERITAS_HTTP_TIMEOUT_SECS"
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("RUST_LOG", "chatty"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(ConfigError::InvalidValue(var, _)) if var == "RUST_LOG"
        ));

        let pairs = [
            ("VERITAS_API_BASE_URL", "not a url"),
            ("VERITAS_IDENTITY_API_KEY", "k"),
        ];
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(ConfigError::InvalidValue(var, _)) if var == "VERITAS_API_BASE_URL"
        ));
    }

    #[test]
    fn debug_output_keeps_admin_secrets_out() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("VERITAS_ADMIN_EMAIL", "admin@veritas.com"));
        pairs.push(("VERITAS_ADMIN_PASSWORD", "Admin@123456"));
        pairs.push(("VERITAS_ADMIN_ENROLLMENT_CODE", "enroll-me"));
        let config = Config::from_lookup(lookup(&pairs)).expect("config loads");

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("Admin@123456"));
        assert!(!rendered.contains("enroll-me"));
        assert!(!rendered.contains("key-123"));
        assert!(rendered.contains("identity_api_key: \"<redacted>\""));
    }
}
