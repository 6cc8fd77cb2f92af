// Publisher
//
// A Publisher turns one status text into one post on a remote service.
// Implementations are shared across all publish tasks, so they must not
// need `&mut self`.

pub mod twitter;

pub use twitter::TwitterPublisher;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Where a successful post can be found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostLocator {
    pub id: String,
    pub handle: String,
}

impl fmt::Display for PostLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "https://twitter.com/{}/status/{}", self.handle, self.id)
    }
}

/// Why a single publish attempt failed
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("marshaling payload: {0}")]
    Payload(String),

    #[error("rate limited, reset at {reset}")]
    RateLimited { reset: DateTime<Utc> },

    #[error("sending request: {0}")]
    Transport(String),

    #[error("parsing response: {0}")]
    Response(String),
}

impl PublishError {
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Reset time of a rate-limit failure
    #[must_use]
    pub const fn rate_limit_reset(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::RateLimited { reset } => Some(*reset),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PublishError {
    fn from(err: serde_json::Error) -> Self {
        Self::Payload(err.to_string())
    }
}

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Send `status` as a single post.
    async fn post(&self, status: &str) -> Result<PostLocator, PublishError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_format() {
        let locator = PostLocator {
            id: "1234".to_string(),
            handle: "drand_loe".to_string(),
        };
        assert_eq!(locator.to_string(), "https://twitter.com/drand_loe/status/1234");
    }

    #[test]
    fn test_rate_limit_inspection() {
        let reset = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let err = PublishError::RateLimited { reset };
        assert!(err.is_rate_limited());
        assert_eq!(err.rate_limit_reset(), Some(reset));
        assert!(err.to_string().contains("2023-11-14"));

        let err = PublishError::Transport("connection reset".to_string());
        assert!(!err.is_rate_limited());
        assert_eq!(err.rate_limit_reset(), None);
    }
}
