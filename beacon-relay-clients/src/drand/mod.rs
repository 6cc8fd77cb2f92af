//! drand HTTP API client
//!
//! Read-only access to a drand beacon chain over its public HTTP API.

pub mod client;
pub mod error;
pub mod types;

pub use client::DrandClient;
pub use error::DrandError;
pub use types::{ChainInfo, RandomData};
