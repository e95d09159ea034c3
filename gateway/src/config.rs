use serde::Deserialize;
use std::fs::File;
use std::path::Path;

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 8080,
        }
    }
}

/// Where configuration snapshots are fetched from.
#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct CacheConfig {
    pub url: String,
    pub subscription_key: Option<String>,
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct ForwarderConfig {
    pub endpoint: String,
    #[serde(default)]
    pub path: String,
    pub subscription_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

/// Direct debt-position-core integration, enabled when configured.
#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct DirectConfig {
    pub endpoint: String,
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub listener: Listener,
    pub cache: CacheConfig,
    pub forwarder: ForwarderConfig,
    pub direct: Option<DirectConfig>,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listener.port == 0 {
            return Err(ConfigError::Invalid("listener port must be non-zero".into()));
        }
        if self.forwarder.endpoint.is_empty() {
            return Err(ConfigError::Invalid(
                "forwarder endpoint must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
