//! Twitter credential loading
//!
//! Four secrets are needed: consumer key, consumer secret, access token and
//! access token secret. They come from one of two sources:
//!
//! 1. **File**: newline separated, in that order. Default location is
//!    `~/.twitter/CREDENTIALS`.
//! 2. **Environment variables**, only when the file cannot be read:
//!    `TWITTER_API_KEY`, `TWITTER_API_SECRET`, `TWITTER_ACCESS_TOKEN`,
//!    `TWITTER_ACCESS_TOKEN_SECRET`.
//!
//! A file that exists but does not hold exactly four non-empty lines is an
//! error; it does not fall through to the environment.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

pub const ENV_API_KEY: &str = "TWITTER_API_KEY";
pub const ENV_API_SECRET: &str = "TWITTER_API_SECRET";
pub const ENV_ACCESS_TOKEN: &str = "TWITTER_ACCESS_TOKEN";
pub const ENV_ACCESS_TOKEN_SECRET: &str = "TWITTER_ACCESS_TOKEN_SECRET";

const CREDENTIAL_LINES: usize = 4;

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("credentials file {} is malformed: expected {CREDENTIAL_LINES} non-empty lines, found {found}", path.display())]
    Malformed { path: PathBuf, found: usize },

    #[error("could not read credentials file {} ({source}) and environment is missing {}", path.display(), missing.join(", "))]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
        missing: Vec<&'static str>,
    },

    #[error("cannot determine home directory for the default credentials path")]
    NoHomeDir,
}

/// Application (consumer) credentials
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
}

/// Access token credentials of the posting account
#[derive(Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub access_token: String,
    pub access_token_secret: String,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client: ClientCredentials,
    pub user: UserCredentials,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.client.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    fn from_parts(parts: [String; CREDENTIAL_LINES]) -> Self {
        let [consumer_key, consumer_secret, access_token, access_token_secret] = parts;
        Self {
            client: ClientCredentials {
                consumer_key,
                consumer_secret,
            },
            user: UserCredentials {
                access_token,
                access_token_secret,
            },
        }
    }
}

/// `~/.twitter/CREDENTIALS`
pub fn default_credentials_path() -> Result<PathBuf, CredentialsError> {
    dirs::home_dir()
        .map(|home| home.join(".twitter").join("CREDENTIALS"))
        .ok_or(CredentialsError::NoHomeDir)
}

/// Load credentials from `path`, falling back to the environment when the
/// file cannot be read.
pub fn load_credentials(path: &Path) -> Result<Credentials, CredentialsError> {
    load_with_env(path, |name| std::env::var(name).ok())
}

fn load_with_env<F>(path: &Path, env: F) -> Result<Credentials, CredentialsError>
where
    F: Fn(&str) -> Option<String>,
{
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let creds = parse_file(path, &content)?;
            info!(path = %path.display(), "Loaded Twitter credentials from file");
            Ok(creds)
        }
        Err(source) => {
            debug!(path = %path.display(), error = %source, "Credentials file unreadable, trying environment");
            let creds = from_env(&env).map_err(|missing| CredentialsError::Unavailable {
                path: path.to_path_buf(),
                source,
                missing,
            })?;
            info!("Loaded Twitter credentials from environment");
            Ok(creds)
        }
    }
}

fn parse_file(path: &Path, content: &str) -> Result<Credentials, CredentialsError> {
    let content = content.strip_suffix('\n').unwrap_or(content);
    let lines: Vec<&str> = content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    let found = lines.iter().filter(|line| !line.is_empty()).count();
    if lines.len() != CREDENTIAL_LINES || found != CREDENTIAL_LINES {
        return Err(CredentialsError::Malformed {
            path: path.to_path_buf(),
            found,
        });
    }

    Ok(Credentials::from_parts([
        lines[0].to_string(),
        lines[1].to_string(),
        lines[2].to_string(),
        lines[3].to_string(),
    ]))
}

fn from_env<F>(env: &F) -> Result<Credentials, Vec<&'static str>>
where
    F: Fn(&str) -> Option<String>,
{
    let names = [
        ENV_API_KEY,
        ENV_API_SECRET,
        ENV_ACCESS_TOKEN,
        ENV_ACCESS_TOKEN_SECRET,
    ];
    let values = names.map(|name| env(name).filter(|v| !v.is_empty()));

    let missing: Vec<&'static str> = names
        .iter()
        .zip(&values)
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(missing);
    }

    Ok(Credentials::from_parts(values.map(Option::unwrap_or_default)))
}
