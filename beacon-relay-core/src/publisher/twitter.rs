//! Twitter Publisher Adapter
//!
//! Calls `beacon_relay_clients::TwitterClient` to implement [`Publisher`].

use std::time::Duration;

use async_trait::async_trait;
use beacon_relay_clients::{ClientConfig, TwitterClient, TwitterError, UserConfig};

use super::{PostLocator, PublishError, Publisher};
use crate::config::TwitterConfig;
use crate::credentials::{ClientCredentials, UserCredentials};
use crate::error::Result;

pub struct TwitterPublisher {
    client: TwitterClient,
}

impl TwitterPublisher {
    /// Build an authenticated publisher for one account.
    pub fn authenticate(
        client: ClientCredentials,
        user: UserCredentials,
        config: &TwitterConfig,
    ) -> Result<Self> {
        let client = TwitterClient::with_options(
            config.api_base.as_str(),
            Duration::from_secs(config.request_timeout_seconds),
            ClientConfig {
                consumer_key: client.consumer_key,
                consumer_secret: client.consumer_secret,
            },
            UserConfig {
                access_token: user.access_token,
                access_token_secret: user.access_token_secret,
            },
        )?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Publisher for TwitterPublisher {
    async fn post(&self, status: &str) -> std::result::Result<PostLocator, PublishError> {
        let tweet = self.client.update_status(status).await?;
        Ok(PostLocator {
            id: tweet.id_str,
            handle: tweet.user.screen_name,
        })
    }
}

impl From<TwitterError> for PublishError {
    fn from(err: TwitterError) -> Self {
        match err {
            TwitterError::RateLimited { reset } => Self::RateLimited { reset },
            TwitterError::Network(_) => Self::Transport(err.to_string()),
            TwitterError::Signing(_) | TwitterError::InvalidConfig(_) => {
                Self::Payload(err.to_string())
            }
            TwitterError::Http { .. }
            | TwitterError::Api { .. }
            | TwitterError::Parse(_)
            | TwitterError::ResponseTooLarge(_) => Self::Response(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn publisher_for(server: &MockServer) -> TwitterPublisher {
        let config = TwitterConfig {
            api_base: server.uri(),
            ..TwitterConfig::default()
        };
        TwitterPublisher::authenticate(
            ClientCredentials {
                consumer_key: "ck".to_string(),
                consumer_secret: "cs".to_string(),
            },
            UserCredentials {
                access_token: "at".to_string(),
                access_token_secret: "ats".to_string(),
            },
            &config,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_post_returns_locator() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1.1/statuses/update.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id_str": "99",
                "user": { "screen_name": "randomness" }
            })))
            .mount(&server)
            .await;

        let locator = publisher_for(&server).post("{}").await.unwrap();
        assert_eq!(locator.to_string(), "https://twitter.com/randomness/status/99");
    }

    #[tokio::test]
    async fn test_rate_limit_maps_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("x-rate-limit-reset", "1700000000"))
            .mount(&server)
            .await;

        let err = publisher_for(&server).post("{}").await.unwrap_err();
        assert_eq!(
            err.rate_limit_reset().map(|reset| reset.timestamp()),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn test_error_classification() {
        let err = PublishError::from(TwitterError::Network("refused".to_string()));
        assert!(matches!(err, PublishError::Transport(_)));

        let err = PublishError::from(TwitterError::Parse("eof".to_string()));
        assert!(matches!(err, PublishError::Response(_)));

        let err = PublishError::from(TwitterError::Signing("bad key".to_string()));
        assert!(matches!(err, PublishError::Payload(_)));
    }
}
