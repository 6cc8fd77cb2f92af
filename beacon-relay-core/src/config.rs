use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub beacon: BeaconConfig,
    pub twitter: TwitterConfig,
    pub relay: RelayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

/// drand beacon connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    /// HTTP endpoints of drand nodes or relays, tried in order
    pub urls: Vec<String>,
    /// Hex chain hash to follow; required unless `insecure` is set
    pub chain_hash: Option<String>,
    /// Allow following whatever chain the first URL serves
    pub insecure: bool,
    pub request_timeout_seconds: u64,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            urls: vec!["https://api.drand.sh".to_string()],
            chain_hash: None,
            insecure: false,
            request_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitterConfig {
    pub api_base: String,
    pub request_timeout_seconds: u64,
    /// Credentials file; `~/.twitter/CREDENTIALS` when unset
    pub credentials_path: Option<String>,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            api_base: beacon_relay_clients::twitter::DEFAULT_API_BASE.to_string(),
            request_timeout_seconds: 30,
            credentials_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Fixed pause before reopening a closed subscription
    pub reconnect_delay_ms: u64,
    /// Cap on concurrent publish attempts; 0 means unbounded
    pub max_in_flight: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: 1000,
            max_in_flight: 0,
        }
    }
}

impl RelayConfig {
    #[must_use]
    pub const fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if !Path::new(path).exists() {
                return Err(ConfigError::NotFound(path.to_string()));
            }
            builder = builder.add_source(File::with_name(path));
        }

        // RELAY_LOGGING__LEVEL, RELAY_RELAY__RECONNECT_DELAY_MS, ...
        builder = builder.add_source(
            Environment::with_prefix("RELAY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("beacon.urls"),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    /// Check for misconfigurations, collecting every problem found
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.beacon.urls.iter().all(|u| u.trim().is_empty()) {
            errors.push("beacon.urls must contain at least one URL".to_string());
        }
        match self.beacon.chain_hash.as_deref().map(str::trim) {
            Some(hash) if !hash.is_empty() => {
                if hex::decode(hash).is_err() {
                    errors.push(format!("beacon.chain_hash is not valid hex: {hash}"));
                }
            }
            _ => {
                if !self.beacon.insecure {
                    errors.push(
                        "no chain hash provided; set beacon.chain_hash (--hash) or allow insecure mode (--insecure)"
                            .to_string(),
                    );
                }
            }
        }
        if self.beacon.request_timeout_seconds == 0 {
            errors.push("beacon.request_timeout_seconds must be positive".to_string());
        }

        if self.twitter.api_base.trim().is_empty() {
            errors.push("twitter.api_base must not be empty".to_string());
        }
        if self.twitter.request_timeout_seconds == 0 {
            errors.push("twitter.request_timeout_seconds must be positive".to_string());
        }

        if self.relay.reconnect_delay_ms == 0 {
            errors.push("relay.reconnect_delay_ms must be positive".to_string());
        }

        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            errors.push(format!(
                "logging.format must be \"json\" or \"pretty\", got {:?}",
                self.logging.format
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
