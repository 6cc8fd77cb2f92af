//! Relay loop
//!
//! Keeps one subscription to the round source open for the life of the
//! process and hands every round to its own publish task. The loop only
//! ever waits on three things: the next round, the reconnect timer, and
//! cancellation.

pub mod task;

pub use task::{publish_round, PublishOutcome};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::RelayConfig;
use crate::publisher::Publisher;
use crate::round::Round;
use crate::source::RoundSource;

pub struct Relay {
    source: Arc<dyn RoundSource>,
    publisher: Arc<dyn Publisher>,
    reconnect_delay: Duration,
    in_flight: Option<Arc<Semaphore>>,
}

impl Relay {
    #[must_use]
    pub fn new(
        source: Arc<dyn RoundSource>,
        publisher: Arc<dyn Publisher>,
        config: &RelayConfig,
    ) -> Self {
        let in_flight = (config.max_in_flight > 0)
            .then(|| Arc::new(Semaphore::new(config.max_in_flight)));
        Self {
            source,
            publisher,
            reconnect_delay: config.reconnect_delay(),
            in_flight,
        }
    }

    /// Run until `cancel` fires.
    ///
    /// Publish tasks still in flight at that point are left running.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            reconnect_delay_ms = u64::try_from(self.reconnect_delay.as_millis()).unwrap_or(u64::MAX),
            max_in_flight = self.in_flight.as_ref().map_or(0, |s| s.available_permits()),
            "Relay started"
        );

        while !cancel.is_cancelled() {
            let mut subscription = self.source.subscribe(cancel.child_token());
            debug!("Subscription opened");

            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        info!("Relay cancelled");
                        return;
                    }
                    item = subscription.next() => {
                        if let Some(round) = item {
                            self.dispatch(round);
                            continue;
                        }

                        warn!("Watch channel closed");
                        tokio::select! {
                            biased;
                            () = cancel.cancelled() => {
                                info!("Relay cancelled during reconnect backoff");
                                return;
                            }
                            () = tokio::time::sleep(self.reconnect_delay) => break,
                        }
                    }
                }
            }
        }
    }

    /// Spawn the publish task for `round` without waiting on it.
    fn dispatch(&self, round: Round) {
        info!(round = round.number(), "Got randomness");

        let publisher = Arc::clone(&self.publisher);
        let in_flight = self.in_flight.clone();

        tokio::spawn(async move {
            // the permit is taken inside the task so the loop never waits
            let _permit = match in_flight {
                Some(semaphore) => match semaphore.acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => return,
                },
                None => None,
            };
            publish_round(publisher.as_ref(), round).await;
        });
    }
}
