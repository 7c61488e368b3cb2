//! Transfer, deposit and withdrawal integration tests.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::{json, Value};

use tally_service::{ServiceConfig, StoreBackend};
use tally_store::{StoreOp, TransactionLog};

// ============================================================================
// Transfers
// ============================================================================

#[tokio::test]
async fn transfer_charges_fee_to_sender() {
    let harness = TestHarness::new();
    let alice = harness.create_account("alice", "100.00").await;
    let bob = harness.create_account("bob", "0.00").await;

    let response = harness
        .server
        .post("/v1/transfers")
        .json(&json!({ "from_account_id": alice, "to_account_id": bob, "amount": "50.00" }))
        .await;

    response.assert_status_ok();
    let receipt: Value = response.json();
    assert_eq!(receipt["operation"], "transfer");
    assert_eq!(receipt["amount"], "50.00");
    assert_eq!(receipt["fee"], "4.00");
    assert_eq!(receipt["transactions"].as_array().unwrap().len(), 2);

    assert_eq!(harness.balance_of("alice").await, "46.00");
    assert_eq!(harness.balance_of("bob").await, "50.00");
    assert_eq!(harness.balance_of("Bb Marley").await, "4.00");
}

#[tokio::test]
async fn transfer_without_enough_funds_is_refused() {
    let harness = TestHarness::new();
    let alice = harness.create_account("alice", "53.99").await;
    let bob = harness.create_account("bob", "0.00").await;

    let response = harness
        .server
        .post("/v1/transfers")
        .json(&json!({ "from_account_id": alice, "to_account_id": bob, "amount": "50.00" }))
        .await;

    response.assert_status(StatusCode::PAYMENT_REQUIRED);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "insufficient_funds");
    assert_eq!(body["error"]["details"]["balance"], "53.99");
    assert_eq!(body["error"]["details"]["required"], "54.00");
    assert_eq!(harness.balance_of("alice").await, "53.99");
}

#[tokio::test]
async fn transfer_rejects_zero_amount() {
    let harness = TestHarness::new();
    let alice = harness.create_account("alice", "10.00").await;
    let bob = harness.create_account("bob", "0.00").await;

    let response = harness
        .server
        .post("/v1/transfers")
        .json(&json!({ "from_account_id": alice, "to_account_id": bob, "amount": "0" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "invalid_amount");
}

#[tokio::test]
async fn transfer_to_unknown_account_not_found() {
    let harness = TestHarness::new();
    let alice = harness.create_account("alice", "10.00").await;

    let response = harness
        .server
        .post("/v1/transfers")
        .json(&json!({
            "from_account_id": alice,
            "to_account_id": "5b0e2f3c-8f43-4d4b-9a56-6f0f2b7c9d11",
            "amount": "1.00"
        }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn partial_failure_is_reported() {
    let harness = TestHarness::new();
    let alice = harness.create_account("alice", "100.00").await;
    let bob = harness.create_account("bob", "0.00").await;
    harness.fee_collector_id().await;

    harness.store.fail_next(StoreOp::UpsertAccounts);
    let response = harness
        .server
        .post("/v1/transfers")
        .json(&json!({ "from_account_id": alice, "to_account_id": bob, "amount": "10.00" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "partial_failure");
    assert_eq!(body["error"]["details"]["stage"], "balances");

    // The log rows stayed, the balances did not move.
    let transactions: Value = harness.server.get("/v1/transactions").await.json();
    assert_eq!(transactions.as_array().unwrap().len(), 2);
    assert_eq!(harness.balance_of("alice").await, "100.00");
}

#[tokio::test]
async fn timed_out_transfer_still_moves_balances() {
    let harness = TestHarness::with_slow_balances(
        ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            store_backend: StoreBackend::Memory,
            request_timeout_seconds: 1,
            ..ServiceConfig::default()
        },
        Duration::from_millis(1500),
    );
    let alice = harness.create_account("alice", "100.00").await;
    let bob = harness.create_account("bob", "0.00").await;
    harness.fee_collector_id().await;

    let response = harness
        .server
        .post("/v1/transfers")
        .json(&json!({ "from_account_id": alice, "to_account_id": bob, "amount": "10.00" }))
        .await;
    response.assert_status(StatusCode::REQUEST_TIMEOUT);

    // The operation outlives the request and lands both writes.
    tokio::time::sleep(Duration::from_millis(1000)).await;

    let log = harness.store.list_transactions_ordered_by_time_desc().await.unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(harness.balance_of("alice").await, "89.20");
    assert_eq!(harness.balance_of("bob").await, "10.00");
    assert_eq!(harness.balance_of("Bb Marley").await, "0.80");
}

#[tokio::test]
async fn unavailable_fee_collector_is_service_unavailable() {
    let harness = TestHarness::new();
    let alice = harness.create_account("alice", "100.00").await;
    let bob = harness.create_account("bob", "0.00").await;

    harness.store.fail_next(StoreOp::InsertAccount);
    let response = harness
        .server
        .post("/v1/transfers")
        .json(&json!({ "from_account_id": alice, "to_account_id": bob, "amount": "10.00" }))
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "fee_collector_unavailable");
}

// ============================================================================
// Deposits and withdrawals
// ============================================================================

#[tokio::test]
async fn deposit_credits_amount_minus_fee() {
    let harness = TestHarness::new();
    let alice = harness.create_account("alice", "0.00").await;

    let response = harness
        .server
        .post("/v1/deposits")
        .json(&json!({ "account_id": alice, "amount": "20.00" }))
        .await;

    response.assert_status_ok();
    let receipt: Value = response.json();
    assert_eq!(receipt["operation"], "deposit");
    assert_eq!(receipt["fee"], "1.00");

    assert_eq!(harness.balance_of("alice").await, "19.00");
    assert_eq!(harness.balance_of("Bb Marley").await, "1.00");
}

#[tokio::test]
async fn withdraw_until_empty() {
    let harness = TestHarness::new();
    let alice = harness.create_account("alice", "30.00").await;

    harness
        .server
        .post("/v1/withdrawals")
        .json(&json!({ "account_id": alice, "amount": "30.00" }))
        .await
        .assert_status_ok();
    assert_eq!(harness.balance_of("alice").await, "0.00");

    let response = harness
        .server
        .post("/v1/withdrawals")
        .json(&json!({ "account_id": alice, "amount": "0.01" }))
        .await;

    response.assert_status(StatusCode::PAYMENT_REQUIRED);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "insufficient_balance");
}

#[tokio::test]
async fn transactions_are_listed_newest_first() {
    let harness = TestHarness::new();
    let alice = harness.create_account("alice", "50.00").await;

    harness
        .server
        .post("/v1/deposits")
        .json(&json!({ "account_id": alice, "amount": "10.00" }))
        .await
        .assert_status_ok();
    harness
        .server
        .post("/v1/withdrawals")
        .json(&json!({ "account_id": alice, "amount": "5.00" }))
        .await
        .assert_status_ok();

    let transactions: Value = harness.server.get("/v1/transactions").await.json();
    let kinds: Vec<_> = transactions
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["kind"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(kinds, ["withdrawal", "fee", "deposit"]);
}
