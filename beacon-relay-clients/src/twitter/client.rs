//! Twitter HTTP Client

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::error::TwitterError;
use super::oauth::{ClientConfig, OAuthSigner, UserConfig};
use super::types::{ErrorResponse, Tweet};
use crate::error::json_with_limit;

/// Production API host
pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";

const UPDATE_STATUS_PATH: &str = "/1.1/statuses/update.json";
const RATE_LIMIT_RESET_HEADER: &str = "x-rate-limit-reset";

/// Twitter HTTP Client
///
/// Holds one user's OAuth credentials; they are fixed for the lifetime of
/// the client, so a single instance can be shared across tasks.
pub struct TwitterClient {
    api_base: String,
    signer: OAuthSigner,
    client: Client,
}

impl TwitterClient {
    /// Create a client against the production API
    pub fn new(client: ClientConfig, user: UserConfig) -> Result<Self, TwitterError> {
        Self::with_options(DEFAULT_API_BASE, Duration::from_secs(30), client, user)
    }

    /// Create a client with a custom API host and request timeout
    pub fn with_options(
        api_base: impl Into<String>,
        timeout: Duration,
        client: ClientConfig,
        user: UserConfig,
    ) -> Result<Self, TwitterError> {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        if api_base.is_empty() {
            return Err(TwitterError::InvalidConfig("API base URL is empty".to_string()));
        }

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .map_err(|e| TwitterError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_base,
            signer: OAuthSigner::new(client, user),
            client: http,
        })
    }

    /// Get current API host
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Post a status update.
    ///
    /// The status is sent as the form field `status`. A 429 answer carrying
    /// `x-rate-limit-reset` is reported as [`TwitterError::RateLimited`].
    pub async fn update_status(&self, status: &str) -> Result<Tweet, TwitterError> {
        let url = format!("{}{UPDATE_STATUS_PATH}", self.api_base);
        let params = [("status", status)];
        let authorization = self.signer.authorization("POST", &url, &params)?;

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, authorization)
            .form(&params)
            .send()
            .await?;

        read_tweet(response).await
    }
}

async fn read_tweet(response: reqwest::Response) -> Result<Tweet, TwitterError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        if let Some(reset) = rate_limit_reset(response.headers()) {
            return Err(TwitterError::RateLimited { reset });
        }
    }

    if !status.is_success() {
        let url = response.url().to_string();
        let body = json_with_limit::<ErrorResponse, TwitterError>(response).await;
        return Err(match body {
            Ok(body) => match body.errors.into_iter().next() {
                Some(detail) => TwitterError::Api {
                    status,
                    code: detail.code,
                    message: detail.message,
                },
                None => TwitterError::Http { status, url },
            },
            Err(e) => {
                debug!(error = %e, "unreadable error body");
                TwitterError::Http { status, url }
            }
        });
    }

    json_with_limit(response).await
}

fn rate_limit_reset(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    let secs = headers
        .get(RATE_LIMIT_RESET_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<i64>()
        .ok()?;
    DateTime::from_timestamp(secs, 0)
}
