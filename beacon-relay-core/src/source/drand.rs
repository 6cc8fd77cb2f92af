//! drand RoundSource Adapter
//!
//! Watches a drand chain over HTTP: sleep until the next round is due,
//! fetch it, forward it, repeat. A round the node has not served yet is
//! retried until the following round is due, then skipped. Only several
//! missed rounds in a row, or a malformed round, end the watcher, which
//! closes the subscription.

use std::sync::Arc;
use std::time::Duration;

use beacon_relay_clients::{ChainInfo, DrandClient, DrandError, RandomData};
use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{RoundSource, Subscription};
use crate::round::Round;

/// Consecutive missed rounds after which the watcher closes the stream
const MAX_MISSED_ROUNDS: u32 = 3;

/// Delay between attempts; nodes may serve a round after its time
const FETCH_RETRY_DELAY: Duration = Duration::from_millis(500);

pub struct DrandRoundSource {
    client: Arc<DrandClient>,
    info: ChainInfo,
}

impl DrandRoundSource {
    /// Fetch chain parameters once and build the source.
    pub async fn connect(client: DrandClient) -> Result<Self, DrandError> {
        let info = client.chain_info().await?;
        info!(
            chain_hash = %info.hash,
            period_secs = info.period,
            genesis_time = info.genesis_time,
            "Connected to drand chain"
        );
        Ok(Self {
            client: Arc::new(client),
            info,
        })
    }

    #[must_use]
    pub const fn chain_info(&self) -> &ChainInfo {
        &self.info
    }
}

impl RoundSource for DrandRoundSource {
    fn subscribe(&self, cancel: CancellationToken) -> Subscription {
        let (tx, subscription) = Subscription::channel(cancel.clone());
        tokio::spawn(watch(
            Arc::clone(&self.client),
            self.info.clone(),
            tx,
            cancel,
        ));
        subscription
    }
}

async fn watch(
    client: Arc<DrandClient>,
    info: ChainInfo,
    tx: mpsc::Sender<Round>,
    cancel: CancellationToken,
) {
    let mut next = info.round_at(Utc::now().timestamp()) + 1;
    let mut missed = 0;
    debug!(round = next, "drand watcher started");

    loop {
        tokio::select! {
            () = cancel.cancelled() => return,
            () = tokio::time::sleep(until(info.round_time(next))) => {}
        }

        let data = match fetch_round(&client, &info, next, &cancel).await {
            Some(Ok(data)) => data,
            Some(Err(e)) => {
                missed += 1;
                if missed >= MAX_MISSED_ROUNDS {
                    warn!(round = next, missed, error = %e, "drand rounds unavailable, closing watch");
                    return;
                }
                warn!(round = next, error = %e, "drand round not served in time, skipping");
                next += 1;
                continue;
            }
            None => return,
        };
        missed = 0;

        if data.round != next {
            warn!(expected = next, got = data.round, "drand node returned an unexpected round, closing watch");
            return;
        }

        let signature = match data.signature_bytes() {
            Ok(signature) => signature,
            Err(e) => {
                warn!(round = data.round, error = %e, "drand round has a malformed signature, closing watch");
                return;
            }
        };

        if tx.send(Round::new(data.round, signature)).await.is_err() {
            debug!("Subscription dropped, stopping drand watcher");
            return;
        }
        next = data.round + 1;
    }
}

/// Fetch `round`, retrying until the round after it is due.
///
/// Returns `None` once `cancel` fires.
async fn fetch_round(
    client: &DrandClient,
    info: &ChainInfo,
    round: u64,
    cancel: &CancellationToken,
) -> Option<Result<RandomData, DrandError>> {
    let deadline = info.round_time(round + 1);
    let mut attempt = 1;
    loop {
        let result = tokio::select! {
            () = cancel.cancelled() => return None,
            result = client.round(round) => result,
        };
        match result {
            Ok(data) => return Some(Ok(data)),
            Err(e) if until(deadline) > FETCH_RETRY_DELAY => {
                debug!(round, attempt, error = %e, "drand round not available yet, retrying");
                attempt += 1;
                tokio::select! {
                    () = cancel.cancelled() => return None,
                    () = tokio::time::sleep(FETCH_RETRY_DELAY) => {}
                }
            }
            Err(e) => return Some(Err(e)),
        }
    }
}

/// Time left until the unix timestamp `at`, zero if it has passed.
fn until(at: i64) -> Duration {
    let now_ms = Utc::now().timestamp_millis();
    let wait_ms = at.saturating_mul(1000).saturating_sub(now_ms);
    Duration::from_millis(u64::try_from(wait_ms).unwrap_or(0))
}
