pub mod bootstrap;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod publisher;
pub mod relay;
pub mod round;
pub mod source;

pub use config::Config;
pub use credentials::{ClientCredentials, Credentials, UserCredentials};
pub use error::{Error, Result};
pub use publisher::{PostLocator, PublishError, Publisher, TwitterPublisher};
pub use relay::{publish_round, PublishOutcome, Relay};
pub use round::{BeaconPost, Round};
pub use source::{DrandRoundSource, RoundSource, Subscription};
