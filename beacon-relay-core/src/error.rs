//! Error types for startup and wiring
//!
//! Publish failures have their own type, [`crate::PublishError`]; they never
//! leave a publish task.

use beacon_relay_clients::{DrandError, TwitterError};
use thiserror::Error;

use crate::credentials::CredentialsError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Credentials error: {0}")]
    Credentials(#[from] CredentialsError),

    #[error("drand client error: {0}")]
    Drand(#[from] DrandError),

    #[error("Twitter client error: {0}")]
    Twitter(#[from] TwitterError),
}

pub type Result<T> = std::result::Result<T, Error>;
