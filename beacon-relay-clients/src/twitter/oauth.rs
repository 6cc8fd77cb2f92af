//! OAuth 1.0a request signing
//!
//! HMAC-SHA1 signatures as described in RFC 5849 and the Twitter
//! "Creating a signature" guide:
//! - every parameter (oauth_* plus request form/query parameters) is
//!   percent-encoded, sorted, and joined into the parameter string
//! - base string: `METHOD&enc(url)&enc(parameter string)`
//! - key: `enc(consumer_secret)&enc(token_secret)`

use std::fmt;

use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha1::Sha1;

use super::error::TwitterError;

/// RFC 3986 unreserved characters are the only ones left as-is.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

/// Application (consumer) credentials
#[derive(Clone)]
pub struct ClientConfig {
    pub consumer_key: String,
    pub consumer_secret: String,
}

/// User access token credentials
#[derive(Clone)]
pub struct UserConfig {
    pub access_token: String,
    pub access_token_secret: String,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for UserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserConfig")
            .field("access_token", &"<redacted>")
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

/// Percent-encode a string for OAuth
#[must_use]
pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Signs requests on behalf of one authorized user.
#[derive(Debug, Clone)]
pub struct OAuthSigner {
    client: ClientConfig,
    user: UserConfig,
}

impl OAuthSigner {
    #[must_use]
    pub const fn new(client: ClientConfig, user: UserConfig) -> Self {
        Self { client, user }
    }

    /// Build the `Authorization` header value for a request.
    ///
    /// `url` must not carry a query string; pass query and form parameters
    /// through `params` instead.
    pub fn authorization(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<String, TwitterError> {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        self.authorization_with(method, url, params, &nonce, Utc::now().timestamp())
    }

    pub(crate) fn authorization_with(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: i64,
    ) -> Result<String, TwitterError> {
        let timestamp = timestamp.to_string();
        let oauth_params = [
            ("oauth_consumer_key", self.client.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", self.user.access_token.as_str()),
            ("oauth_version", OAUTH_VERSION),
        ];

        let mut all_params: Vec<(&str, &str)> = oauth_params.to_vec();
        all_params.extend_from_slice(params);
        let signature = self.signature(method, url, &all_params)?;

        let header = oauth_params
            .iter()
            .copied()
            .chain(std::iter::once(("oauth_signature", signature.as_str())))
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {header}"))
    }

    pub(crate) fn signature(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<String, TwitterError> {
        let mut encoded: Vec<(String, String)> =
            params.iter().map(|(k, v)| (encode(k), encode(v))).collect();
        encoded.sort();

        let param_string = encoded
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let base_string = format!(
            "{}&{}&{}",
            method.to_ascii_uppercase(),
            encode(url),
            encode(&param_string)
        );
        let signing_key = format!(
            "{}&{}",
            encode(&self.client.consumer_secret),
            encode(&self.user.access_token_secret)
        );

        let mut mac = Hmac::<Sha1>::new_from_slice(signing_key.as_bytes())
            .map_err(|e| TwitterError::Signing(format!("Failed to create HMAC: {e}")))?;
        mac.update(base_string.as_bytes());

        Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
    }
}
