// Round Source
//
// A RoundSource hands out live subscriptions to a beacon feed. Each
// subscription is a bounded channel fed by a producer task; the producer
// ending (for any reason) closes the channel, which is how the relay learns
// it has to reconnect.

pub mod drand;

pub use drand::DrandRoundSource;

use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::round::Round;

/// Rounds buffered between a producer and the relay loop.
pub const SUBSCRIPTION_BUFFER: usize = 16;

/// Something that can open a live feed of beacon rounds.
pub trait RoundSource: Send + Sync {
    /// Open a new subscription bound to `cancel`.
    ///
    /// The returned stream may close at any time; closure is reported as
    /// `None` from [`Subscription::next`], never as an error.
    fn subscribe(&self, cancel: CancellationToken) -> Subscription;
}

/// Receiving half of one subscription.
///
/// Dropping it cancels the producer, so at most one producer per
/// subscription outlives its consumer.
pub struct Subscription {
    rx: mpsc::Receiver<Round>,
    _guard: DropGuard,
}

impl Subscription {
    #[must_use]
    pub fn new(rx: mpsc::Receiver<Round>, cancel: CancellationToken) -> Self {
        Self {
            rx,
            _guard: cancel.drop_guard(),
        }
    }

    /// Create a subscription and the sender a producer task should feed.
    #[must_use]
    pub fn channel(cancel: CancellationToken) -> (mpsc::Sender<Round>, Self) {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        (tx, Self::new(rx, cancel))
    }

    /// Next round, or `None` once the stream has closed.
    pub async fn next(&mut self) -> Option<Round> {
        self.rx.recv().await
    }
}
