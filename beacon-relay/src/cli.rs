use std::io;
use std::sync::LazyLock;

use beacon_relay_core::Config;
use clap::{Args, CommandFactory, Parser, Subcommand};

/// `drand Twitter relay <version> (date <date>, commit <commit>)`
pub static VERSION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "drand Twitter relay {} (date {}, commit {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("RELAY_BUILD_DATE").unwrap_or("unknown"),
        option_env!("RELAY_GIT_COMMIT").unwrap_or("none"),
    )
});

#[derive(Parser, Debug)]
#[command(name = "drand-relay-twitter")]
#[command(about = "Twitter relay for randomness beacon", long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Print version information
    #[arg(short = 'V', long)]
    pub version: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a drand Twitter relay process
    Run(RunArgs),
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// drand HTTP endpoint; repeat for failover
    #[arg(long = "url", value_name = "URL")]
    pub urls: Vec<String>,

    /// Hex chain hash of the beacon to follow
    #[arg(long, value_name = "HEX")]
    pub hash: Option<String>,

    /// Follow whatever chain the endpoint serves without a chain hash
    #[arg(long)]
    pub insecure: bool,

    /// Location of credentials file, newline separated API key, API secret,
    /// access token, access token secret (default: ~/.twitter/CREDENTIALS)
    #[arg(long, value_name = "PATH")]
    pub creds: Option<String>,

    /// Configuration file (YAML or TOML)
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Cap on concurrent publish attempts; 0 means unbounded
    #[arg(long, value_name = "N")]
    pub max_in_flight: Option<usize>,
}

/// Write the top-level help to `out`.
pub fn write_usage(out: &mut impl io::Write) -> io::Result<()> {
    Cli::command().write_help(out)
}

impl RunArgs {
    /// Flags win over file and environment values.
    pub fn apply(&self, config: &mut Config) {
        if !self.urls.is_empty() {
            config.beacon.urls.clone_from(&self.urls);
        }
        if let Some(hash) = &self.hash {
            config.beacon.chain_hash = Some(hash.clone());
        }
        if self.insecure {
            config.beacon.insecure = true;
        }
        if let Some(creds) = &self.creds {
            config.twitter.credentials_path = Some(creds.clone());
        }
        if let Some(max) = self.max_in_flight {
            config.relay.max_in_flight = max;
        }
    }
}
