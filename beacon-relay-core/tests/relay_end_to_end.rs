// End-to-end tests: rounds in, tweets out
//
// The Twitter API is a wiremock server; rounds come from a hand-written
// source so the tests control exactly when a subscription closes.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use beacon_relay_core::config::{RelayConfig, TwitterConfig};
use beacon_relay_core::{
    publish_round, ClientCredentials, PublishOutcome, Relay, Round, RoundSource, Subscription,
    TwitterPublisher, UserCredentials,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

// Each call to subscribe plays the next session and then closes it. Once
// the sessions run out, subscriptions stay open and silent.
struct SessionSource {
    sessions: Mutex<VecDeque<Vec<u64>>>,
}

impl SessionSource {
    fn new(sessions: Vec<Vec<u64>>) -> Self {
        Self {
            sessions: Mutex::new(sessions.into()),
        }
    }
}

impl RoundSource for SessionSource {
    fn subscribe(&self, cancel: CancellationToken) -> Subscription {
        let (tx, subscription) = Subscription::channel(cancel.clone());
        let session = self.sessions.lock().unwrap().pop_front();
        tokio::spawn(async move {
            match session {
                Some(rounds) => {
                    for n in rounds {
                        let _ = tx.send(Round::new(n, vec![0xde, 0xad, 0xbe, 0xef])).await;
                    }
                }
                None => cancel.cancelled().await,
            }
        });
        subscription
    }
}

fn publisher_for(server: &MockServer) -> TwitterPublisher {
    let config = TwitterConfig {
        api_base: server.uri(),
        ..TwitterConfig::default()
    };
    TwitterPublisher::authenticate(
        ClientCredentials {
            consumer_key: "consumer-key".to_string(),
            consumer_secret: "consumer-secret".to_string(),
        },
        UserCredentials {
            access_token: "access-token".to_string(),
            access_token_secret: "access-token-secret".to_string(),
        },
        &config,
    )
    .unwrap()
}

async fn mount_update(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/1.1/statuses/update.json"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id_str": "1234567890",
            "user": { "screen_name": "drand_relay" },
            "text": "{}"
        })))
        .mount(server)
        .await;
}

fn status_of(request: &Request) -> String {
    url::form_urlencoded::parse(&request.body)
        .find(|(key, _)| key == "status")
        .map(|(_, value)| value.into_owned())
        .unwrap()
}

#[tokio::test]
async fn test_round_becomes_tweet() {
    let server = MockServer::start().await;
    mount_update(&server).await;
    let publisher = publisher_for(&server);

    let outcome = publish_round(&publisher, Round::new(42, vec![0xde, 0xad, 0xbe, 0xef])).await;

    let PublishOutcome::Published { round, locator } = outcome else {
        panic!("expected a published outcome, got {outcome:?}");
    };
    assert_eq!(round, 42);
    assert_eq!(
        locator.to_string(),
        "https://twitter.com/drand_relay/status/1234567890"
    );

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(status_of(&requests[0]), r#"{"round":42,"signature":"deadbeef"}"#);

    let auth = requests[0].headers.get("authorization").unwrap().to_str().unwrap();
    assert!(auth.starts_with("OAuth "));
    assert!(auth.contains(r#"oauth_consumer_key="consumer-key""#));
    assert!(auth.contains(r#"oauth_token="access-token""#));
}

#[tokio::test]
async fn test_rate_limit_reported_with_reset() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("x-rate-limit-reset", "1700000000")
                .set_body_json(json!({ "errors": [{ "code": 88, "message": "Rate limit exceeded" }] })),
        )
        .mount(&server)
        .await;
    let publisher = publisher_for(&server);

    let outcome = publish_round(&publisher, Round::new(5, vec![1, 2])).await;

    match outcome {
        PublishOutcome::RateLimited { round, reset } => {
            assert_eq!(round, 5);
            assert_eq!(reset.timestamp(), 1_700_000_000);
        }
        other => panic!("expected rate limited, got {other:?}"),
    }
}

#[tokio::test]
async fn test_api_error_does_not_panic() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(
            json!({ "errors": [{ "code": 187, "message": "Status is a duplicate." }] }),
        ))
        .mount(&server)
        .await;
    let publisher = publisher_for(&server);

    let outcome = publish_round(&publisher, Round::new(6, vec![3])).await;
    assert!(matches!(outcome, PublishOutcome::Failed { round: 6, .. }));
}

#[tokio::test]
async fn test_relay_publishes_across_reconnect() {
    let server = MockServer::start().await;
    mount_update(&server).await;

    let source = Arc::new(SessionSource::new(vec![vec![1], vec![2]]));
    let publisher = Arc::new(publisher_for(&server));
    let config = RelayConfig {
        reconnect_delay_ms: 50,
        ..RelayConfig::default()
    };
    let relay = Relay::new(source, publisher, &config);

    let cancel = CancellationToken::new();
    let handle = tokio::spawn({
        let cancel = cancel.clone();
        async move { relay.run(cancel).await }
    });

    let mut statuses = Vec::new();
    for _ in 0..100 {
        let requests = server.received_requests().await.unwrap();
        if requests.len() >= 2 {
            statuses = requests.iter().map(status_of).collect();
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .unwrap()
        .unwrap();

    statuses.sort();
    assert_eq!(
        statuses,
        [
            r#"{"round":1,"signature":"deadbeef"}"#,
            r#"{"round":2,"signature":"deadbeef"}"#,
        ]
    );
}
