//! drand HTTP Client
//!
//! Pure HTTP client for the drand public API, no dependency on the relay's
//! `RoundSource` trait.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::error::{check_response, DrandError};
use super::types::{ChainInfo, RandomData};
use crate::error::json_with_limit;

/// drand HTTP Client
///
/// Every request is tried against the configured URLs in order; the first
/// successful answer wins.
pub struct DrandClient {
    urls: Vec<Url>,
    chain_hash: Option<String>,
    client: Client,
}

impl DrandClient {
    /// Create a new client.
    ///
    /// `chain_hash`, when given, scopes every request to that chain and is
    /// checked against the hash reported by `/info`.
    pub fn new<I, S>(urls: I, chain_hash: Option<String>, timeout: Duration) -> Result<Self, DrandError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls = urls
            .into_iter()
            .map(|raw| parse_base_url(raw.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if urls.is_empty() {
            return Err(DrandError::InvalidConfig(
                "at least one drand URL is required".to_string(),
            ));
        }

        let chain_hash = chain_hash
            .map(|h| h.trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty());
        if let Some(ref hash) = chain_hash {
            hex::decode(hash).map_err(|e| {
                DrandError::InvalidConfig(format!("chain hash is not valid hex: {e}"))
            })?;
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .map_err(|e| DrandError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            urls,
            chain_hash,
            client,
        })
    }

    /// Configured chain hash, if any
    #[must_use]
    pub fn chain_hash(&self) -> Option<&str> {
        self.chain_hash.as_deref()
    }

    /// Configured base URLs
    #[must_use]
    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    /// Fetch the chain parameters.
    ///
    /// Fails with [`DrandError::ChainHashMismatch`] when a chain hash was
    /// configured and the node serves a different chain.
    pub async fn chain_info(&self) -> Result<ChainInfo, DrandError> {
        let info: ChainInfo = self.get_json("info").await?;

        if let Some(ref expected) = self.chain_hash {
            if !info.hash.eq_ignore_ascii_case(expected) {
                return Err(DrandError::ChainHashMismatch {
                    expected: expected.clone(),
                    actual: info.hash,
                });
            }
        }
        if info.period == 0 {
            return Err(DrandError::Parse("chain info reports a zero period".to_string()));
        }

        Ok(info)
    }

    /// Fetch the most recent round
    pub async fn latest(&self) -> Result<RandomData, DrandError> {
        self.get_json("public/latest").await
    }

    /// Fetch a specific round
    pub async fn round(&self, round: u64) -> Result<RandomData, DrandError> {
        self.get_json(&format!("public/{round}")).await
    }

    fn endpoint(&self, base: &Url, path: &str) -> String {
        let base = base.as_str().trim_end_matches('/');
        match self.chain_hash {
            Some(ref hash) => format!("{base}/{hash}/{path}"),
            None => format!("{base}/{path}"),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DrandError> {
        let mut last_err = None;

        for base in &self.urls {
            let url = self.endpoint(base, path);
            match self.fetch(&url).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    debug!(url = %url, error = %e, "drand request failed");
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            DrandError::InvalidConfig("no drand URLs configured".to_string())
        }))
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T, DrandError> {
        let response = self.client.get(url).send().await?;
        let response = check_response(response)?;
        json_with_limit(response).await
    }
}

fn parse_base_url(raw: &str) -> Result<Url, DrandError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| DrandError::InvalidConfig(format!("invalid drand URL {raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DrandError::InvalidConfig(format!(
            "unsupported scheme {other:?} in drand URL {raw:?}"
        ))),
    }
}
