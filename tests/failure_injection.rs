//! Failure injection tests for the relay.

use alloy::primitives::U256;
use ballot_relay::relay::RelayError;
use relay_sdk::{RelayClient, SdkError};
use std::sync::Arc;
use std::time::{Duration, Instant};

mod common;

use common::{MockChain, PRESIDENT};

fn api_error(err: SdkError) -> (u16, relay_sdk::ApiError) {
    match err {
        SdkError::Api { status, body } => (status, body),
        other => panic!("expected an API error, got {}", other),
    }
}

#[tokio::test]
async fn test_oracle_timeout_is_retryable_and_submits_nothing() {
    let voter = common::voter();
    let chain = Arc::new(
        MockChain::new().with_oracle_delay(Duration::from_secs(30), Duration::from_millis(200)),
    );
    let addr = common::spawn_server(common::test_config(), chain.clone()).await;
    let client = RelayClient::new(&format!("http://{}", addr));

    let vote = common::signed_vote(&voter, "president", PRESIDENT, 0, 1).await;
    let start = Instant::now();
    let (status, body) = api_error(client.relay(&vote).await.unwrap_err());

    assert!(start.elapsed() < Duration::from_secs(5), "timeout must be bounded");
    assert_eq!(status, 503);
    assert_eq!(body.error, "OracleUnavailable");
    assert!(body.retryable);
    assert_eq!(chain.submissions(), 0);
}

#[tokio::test]
async fn test_insufficient_relayer_funds() {
    let voter = common::voter();
    let chain = Arc::new(MockChain::new().failing_submissions(
        RelayError::InsufficientRelayerFunds("insufficient funds for gas * price + value".into()),
    ));
    let addr = common::spawn_server(common::test_config(), chain.clone()).await;
    let client = RelayClient::new(&format!("http://{}", addr));

    let vote = common::signed_vote(&voter, "president", PRESIDENT, 0, 1).await;
    let (status, body) = api_error(client.relay(&vote).await.unwrap_err());

    assert_eq!(status, 503);
    assert_eq!(body.error, "InsufficientRelayerFunds");
    assert!(!body.retryable);
    assert_eq!(chain.nonce(PRESIDENT, voter.address()), U256::ZERO);
}

#[tokio::test]
async fn test_revert_reason_reaches_caller() {
    let voter = common::voter();
    let chain = Arc::new(
        MockChain::new().failing_submissions(RelayError::SubmissionReverted("Voting has ended".into())),
    );
    let addr = common::spawn_server(common::test_config(), chain).await;
    let client = RelayClient::new(&format!("http://{}", addr));

    let vote = common::signed_vote(&voter, "president", PRESIDENT, 0, 1).await;
    let (status, body) = api_error(client.relay(&vote).await.unwrap_err());

    assert_eq!(status, 422);
    assert_eq!(body.error, "SubmissionReverted");
    assert!(body.message.contains("Voting has ended"));
    assert!(!body.retryable);
}

#[tokio::test]
async fn test_network_failure_during_submission() {
    let voter = common::voter();
    let chain = Arc::new(MockChain::new().failing_submissions(RelayError::NetworkFailure(
        "transaction not confirmed within 60 seconds".into(),
    )));
    let addr = common::spawn_server(common::test_config(), chain).await;
    let client = RelayClient::new(&format!("http://{}", addr));

    let vote = common::signed_vote(&voter, "president", PRESIDENT, 0, 1).await;
    let err = client.relay(&vote).await.unwrap_err();
    assert!(err.is_retryable());

    let (status, body) = api_error(err);
    assert_eq!(status, 502);
    assert_eq!(body.error, "NetworkFailure");
}

#[tokio::test]
async fn test_concurrent_duplicate_votes_relay_once() {
    let voter = common::voter();
    let chain = Arc::new(MockChain::new().with_submit_delay(Duration::from_millis(100)));
    let addr = common::spawn_server(common::test_config(), chain.clone()).await;
    let client = Arc::new(RelayClient::new(&format!("http://{}", addr)));

    let vote = common::signed_vote(&voter, "president", PRESIDENT, 0, 4).await;

    let mut tasks = Vec::new();
    for _ in 0..5 {
        let client = client.clone();
        let vote = vote.clone();
        tasks.push(tokio::spawn(async move { client.relay(&vote).await }));
    }

    let mut successes = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => successes += 1,
            // Losers fail at verification or at the chain's own nonce check.
            Err(err) => {
                let kind = err.kind().map(str::to_string);
                assert!(
                    matches!(kind.as_deref(), Some("StaleNonce") | Some("SubmissionReverted")),
                    "unexpected failure: {}",
                    err
                );
            }
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(chain.submissions(), 1);
    assert_eq!(chain.nonce(PRESIDENT, voter.address()), U256::from(1));
}

#[tokio::test]
async fn test_concurrent_voters_are_independent() {
    let voters = [common::voter(), common::other_voter()];
    let chain = Arc::new(MockChain::new().with_submit_delay(Duration::from_millis(50)));
    let addr = common::spawn_server(common::test_config(), chain.clone()).await;
    let client = Arc::new(RelayClient::new(&format!("http://{}", addr)));

    let mut tasks = Vec::new();
    for voter in &voters {
        let vote = common::signed_vote(voter, "president", PRESIDENT, 0, 1).await;
        let client = client.clone();
        tasks.push(tokio::spawn(async move { client.relay(&vote).await }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(chain.submissions(), 2);
}

#[tokio::test]
async fn test_rate_limit_rejects_bursts() {
    let mut config = common::test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.requests_per_second = 1;
    config.rate_limit.burst_size = 2;
    let chain = Arc::new(MockChain::new());
    let addr = common::spawn_server(config, chain).await;
    let client = common::http_client();

    let mut limited = 0;
    for _ in 0..6 {
        let res = client
            .get(format!("http://{}/api/v1/positions", addr))
            .send()
            .await
            .unwrap();
        if res.status() == 429 {
            limited += 1;
            let body: serde_json::Value = res.json().await.unwrap();
            assert_eq!(body["retryable"], true);
        }
    }
    assert!(limited >= 3, "expected bursts to be limited, got {} rejections", limited);

    // Health probes are never rate limited.
    let res = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
}
