//! Publish task: one round, one post, one log line.

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::publisher::{PostLocator, PublishError, Publisher};
use crate::round::{BeaconPost, Round};

/// Result of one publish attempt
#[derive(Debug)]
pub enum PublishOutcome {
    Published { round: u64, locator: PostLocator },
    RateLimited { round: u64, reset: DateTime<Utc> },
    Failed { round: u64, error: PublishError },
}

impl PublishOutcome {
    #[must_use]
    pub const fn round(&self) -> u64 {
        match self {
            Self::Published { round, .. }
            | Self::RateLimited { round, .. }
            | Self::Failed { round, .. } => *round,
        }
    }

    #[must_use]
    pub const fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }

    fn from_result(round: u64, result: Result<PostLocator, PublishError>) -> Self {
        match result {
            Ok(locator) => Self::Published { round, locator },
            Err(PublishError::RateLimited { reset }) => Self::RateLimited { round, reset },
            Err(error) => Self::Failed { round, error },
        }
    }

    fn log(&self) {
        match self {
            Self::Published { round, locator } => {
                info!(round, location = %locator, "Tweeted randomness");
            }
            Self::RateLimited { round, reset } => {
                warn!(round, reset = %reset, "Failed to tweet randomness: rate limited");
            }
            Self::Failed { round, error } => {
                error!(round, error = %error, "Failed to tweet randomness");
            }
        }
    }
}

/// Format `round`, post it, and log the outcome.
///
/// Never retries and never fails; the outcome is returned for callers that
/// want to inspect it.
pub async fn publish_round(publisher: &dyn Publisher, round: Round) -> PublishOutcome {
    let number = round.number();
    let result = match BeaconPost::from(&round).to_status() {
        Ok(status) => publisher.post(&status).await,
        Err(e) => Err(PublishError::from(e)),
    };

    let outcome = PublishOutcome::from_result(number, result);
    outcome.log();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::subscriber::DefaultGuard;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Keeps every event emitted while installed, with its fields rendered.
    #[derive(Clone, Default)]
    struct CapturedEvents(Arc<Mutex<Vec<(Level, HashMap<String, String>)>>>);

    struct FieldMap<'a>(&'a mut HashMap<String, String>);

    impl Visit for FieldMap<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{value:?}"));
        }
    }

    impl<S: Subscriber> Layer<S> for CapturedEvents {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = HashMap::new();
            event.record(&mut FieldMap(&mut fields));
            self.0.lock().unwrap().push((*event.metadata().level(), fields));
        }
    }

    impl CapturedEvents {
        fn install() -> (Self, DefaultGuard) {
            let events = Self::default();
            let subscriber = tracing_subscriber::registry().with(events.clone());
            (events, tracing::subscriber::set_default(subscriber))
        }

        fn single(&self) -> (Level, HashMap<String, String>) {
            let events = self.0.lock().unwrap();
            assert_eq!(events.len(), 1, "expected one event, got {events:?}");
            events[0].clone()
        }
    }

    /// Answers every post with a fixed result and records the statuses.
    struct FixedPublisher {
        result: fn() -> Result<PostLocator, PublishError>,
        statuses: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Publisher for FixedPublisher {
        async fn post(&self, status: &str) -> Result<PostLocator, PublishError> {
            self.statuses.lock().unwrap().push(status.to_string());
            (self.result)()
        }
    }

    fn publisher(result: fn() -> Result<PostLocator, PublishError>) -> FixedPublisher {
        FixedPublisher {
            result,
            statuses: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn test_published() {
        let (events, _guard) = CapturedEvents::install();
        let publisher = publisher(|| {
            Ok(PostLocator {
                id: "1".to_string(),
                handle: "relay".to_string(),
            })
        });

        let outcome = publish_round(&publisher, Round::new(42, vec![0xde, 0xad, 0xbe, 0xef])).await;

        assert!(outcome.is_published());
        assert_eq!(outcome.round(), 42);
        assert_eq!(
            publisher.statuses.lock().unwrap().as_slice(),
            [r#"{"round":42,"signature":"deadbeef"}"#.to_string()]
        );

        let (level, fields) = events.single();
        assert_eq!(level, Level::INFO);
        assert_eq!(fields["round"], "42");
        assert_eq!(fields["location"], "https://twitter.com/relay/status/1");
    }

    #[tokio::test]
    async fn test_rate_limited_is_distinct() {
        let (events, _guard) = CapturedEvents::install();
        let publisher = publisher(|| {
            Err(PublishError::RateLimited {
                reset: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            })
        });

        let outcome = publish_round(&publisher, Round::new(7, vec![1])).await;
        match outcome {
            PublishOutcome::RateLimited { round, reset } => {
                assert_eq!(round, 7);
                assert_eq!(reset.timestamp(), 1_700_000_000);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let (level, fields) = events.single();
        assert_eq!(level, Level::WARN);
        assert_eq!(fields["round"], "7");
        assert_eq!(fields["reset"], "2023-11-14 22:13:20 UTC");
    }

    #[tokio::test]
    async fn test_other_failures() {
        let (events, _guard) = CapturedEvents::install();
        let publisher = publisher(|| Err(PublishError::Transport("connection refused".to_string())));

        let outcome = publish_round(&publisher, Round::new(8, vec![2])).await;
        assert!(matches!(
            outcome,
            PublishOutcome::Failed { round: 8, error: PublishError::Transport(_) }
        ));

        let (level, fields) = events.single();
        assert_eq!(level, Level::ERROR);
        assert!(!fields.contains_key("reset"));
        assert!(fields["error"].contains("connection refused"));
    }
}
