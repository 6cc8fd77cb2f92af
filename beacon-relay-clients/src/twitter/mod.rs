//! Twitter v1.1 API client
//!
//! Only what the relay needs: OAuth 1.0a request signing and posting a
//! status update.

pub mod client;
pub mod error;
pub mod oauth;
pub mod types;

pub use client::{TwitterClient, DEFAULT_API_BASE};
pub use error::TwitterError;
pub use oauth::{ClientConfig, OAuthSigner, UserConfig};
pub use types::{Tweet, TweetUser};
