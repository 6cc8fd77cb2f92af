//! drand client error types

use thiserror::Error;

use crate::error::ResponseTooLarge;

#[derive(Debug, Error)]
pub enum DrandError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error {status} for {url}")]
    Http { status: reqwest::StatusCode, url: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Chain hash mismatch: expected {expected}, got {actual}")]
    ChainHashMismatch { expected: String, actual: String },

    #[error(transparent)]
    ResponseTooLarge(#[from] ResponseTooLarge),
}

/// Check HTTP response status before processing body.
pub fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, DrandError> {
    let status = resp.status();
    if status.is_client_error() || status.is_server_error() {
        return Err(DrandError::Http {
            status,
            url: resp.url().to_string(),
        });
    }
    Ok(resp)
}

impl From<reqwest::Error> for DrandError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for DrandError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
