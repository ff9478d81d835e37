use directories::ProjectDirs;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const ENV_API_KEY: &str = "AMADEUS_API_KEY";
pub const ENV_API_SECRET: &str = "AMADEUS_API_SECRET";
pub const ENV_ENVIRONMENT: &str = "AMADEUS_ENV";
pub const ENV_TIMEOUT_SECS: &str = "AMADEUS_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{ENV_API_KEY} and {ENV_API_SECRET} must be configured")]
    MissingCredentials,
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("Failed to read provider config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed provider config {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to initialise HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiEnvironment {
    #[default]
    Test,
    Production,
}

impl ApiEnvironment {
    pub fn base_url(self) -> &'static str {
        match self {
            ApiEnvironment::Test => "https://test.api.amadeus.com",
            ApiEnvironment::Production => "https://api.amadeus.com",
        }
    }
}

impl FromStr for ApiEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" => Ok(ApiEnvironment::Test),
            "production" | "prod" => Ok(ApiEnvironment::Production),
            _ => Err(ConfigError::InvalidValue {
                key: ENV_ENVIRONMENT,
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ApiEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ApiEnvironment::Test => "test",
            ApiEnvironment::Production => "production",
        })
    }
}

/// Credentials and transport settings for the flight-data provider.
///
/// Sources, later ones winning: built-in defaults, `provider.json` in the
/// platform config directory, `AMADEUS_*` environment variables.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key: String,
    pub api_secret: String,
    pub environment: ApiEnvironment,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            environment: ApiEnvironment::Test,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("environment", &self.environment)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Config file (if present) with environment overrides applied.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        let base = if path.exists() {
            Self::load_from(&path)?
        } else {
            debug!("No provider config file — path={}", path.display());
            Self::default()
        };
        base.overlay(|key| std::env::var(key).ok())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded provider config — path={}", path.display());
        Ok(config)
    }

    pub fn default_path() -> PathBuf {
        ProjectDirs::from("org", "flightdesk", "flightdesk")
            .map(|dirs| dirs.config_dir().join("provider.json"))
            .unwrap_or_else(|| PathBuf::from("provider.json"))
    }

    /// Applies `AMADEUS_*` values returned by `lookup`; empty values are ignored.
    pub fn overlay<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = key.trim().to_string();
        }
        if let Some(secret) = get(ENV_API_SECRET) {
            self.api_secret = secret.trim().to_string();
        }
        if let Some(env) = get(ENV_ENVIRONMENT) {
            self.environment = env.parse()?;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            self.timeout_secs = raw
                .trim()
                .parse()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: ENV_TIMEOUT_SECS,
                    value: raw,
                })?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() || self.api_secret.trim().is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_TIMEOUT_SECS,
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}
