//! Startup wiring: configuration, credentials, source and publisher
//!
//! Everything here runs once before the relay starts; any error is fatal.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use beacon_relay_clients::DrandClient;

use crate::config::{BeaconConfig, Config, TwitterConfig};
use crate::credentials::{default_credentials_path, load_credentials};
use crate::error::Error;
use crate::publisher::TwitterPublisher;
use crate::source::DrandRoundSource;

/// Load configuration from an explicit file, `RELAY_CONFIG_PATH`, or the
/// environment alone.
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let from_env = std::env::var("RELAY_CONFIG_PATH").ok();
    let path = config_path.or(from_env.as_deref());

    let config = match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config file {path}"))?,
        None => Config::from_env().context("loading config from environment")?,
    };

    Ok(config)
}

/// Fail with every validation problem in one message
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate().map_err(|errors| {
        anyhow::anyhow!(
            "Configuration validation failed with {} error(s): {}",
            errors.len(),
            errors.join("; ")
        )
    })
}

/// Build the drand client and fetch chain parameters.
pub async fn build_round_source(config: &BeaconConfig) -> Result<DrandRoundSource> {
    let chain_hash = config
        .chain_hash
        .clone()
        .filter(|h| !h.trim().is_empty());
    if chain_hash.is_none() && !config.insecure {
        return Err(Error::Configuration(
            "no chain hash provided; use --hash or --insecure".to_string(),
        )
        .into());
    }

    let client = DrandClient::new(
        &config.urls,
        chain_hash,
        Duration::from_secs(config.request_timeout_seconds),
    )
    .map_err(Error::from)?;

    let source = DrandRoundSource::connect(client)
        .await
        .map_err(Error::from)
        .context("fetching drand chain info")?;
    Ok(source)
}

/// Load credentials and authenticate the Twitter publisher.
pub fn build_publisher(config: &TwitterConfig) -> Result<TwitterPublisher> {
    let path = match config.credentials_path.as_deref() {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => default_credentials_path().map_err(Error::from)?,
    };

    let credentials = load_credentials(&path)
        .map_err(Error::from)
        .context("loading credentials")?;

    let publisher = TwitterPublisher::authenticate(credentials.client, credentials.user, config)?;
    Ok(publisher)
}
