// drand relay HTTP clients
//
// Pure HTTP client implementations for the two remote services the relay
// talks to. They know nothing about the relay's RoundSource/Publisher traits;
// beacon-relay-core wraps them in adapters.
//
// - drand: beacon chain info and round fetching, with URL failover
// - twitter: OAuth 1.0a signed status updates

// Shared response helpers
pub mod error;

pub mod drand;
pub mod twitter;

pub use drand::error::DrandError;
pub use drand::{ChainInfo, DrandClient, RandomData};
pub use error::ResponseTooLarge;
pub use twitter::error::TwitterError;
pub use twitter::{ClientConfig, Tweet, TwitterClient, UserConfig};
