//! Twitter client error types

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::error::ResponseTooLarge;

#[derive(Debug, Error)]
pub enum TwitterError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error {status} for {url}")]
    Http { status: reqwest::StatusCode, url: String },

    #[error("API error {status} (code {code}): {message}")]
    Api {
        status: reqwest::StatusCode,
        code: i64,
        message: String,
    },

    #[error("Rate limited, reset at {reset}")]
    RateLimited { reset: DateTime<Utc> },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    ResponseTooLarge(#[from] ResponseTooLarge),
}

impl From<reqwest::Error> for TwitterError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for TwitterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
