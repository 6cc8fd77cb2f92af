//! Shared response helpers for the HTTP clients.

use thiserror::Error;

/// Maximum response body size accepted from drand or Twitter (1 MB).
/// Both services answer with small JSON documents.
pub const MAX_RESPONSE_SIZE: usize = 1024 * 1024;

/// The upstream answered with a body larger than [`MAX_RESPONSE_SIZE`].
#[derive(Debug, Error)]
#[error("Response too large ({size} bytes, max {MAX_RESPONSE_SIZE})")]
pub struct ResponseTooLarge {
    pub size: u64,
}

/// Read a response body with size limit and deserialize as JSON.
///
/// Checks `Content-Length` hint first (if available), then enforces the
/// limit on the actual body bytes before deserializing.
pub async fn json_with_limit<T, E>(response: reqwest::Response) -> Result<T, E>
where
    T: serde::de::DeserializeOwned,
    E: From<reqwest::Error> + From<serde_json::Error> + From<ResponseTooLarge>,
{
    if let Some(cl) = response.content_length() {
        if cl as usize > MAX_RESPONSE_SIZE {
            return Err(ResponseTooLarge { size: cl }.into());
        }
    }
    let bytes = response.bytes().await?;
    if bytes.len() > MAX_RESPONSE_SIZE {
        return Err(ResponseTooLarge {
            size: bytes.len() as u64,
        }
        .into());
    }
    serde_json::from_slice(&bytes).map_err(Into::into)
}
