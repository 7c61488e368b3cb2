//! Common test utilities for tally service integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use serde_json::{json, Value};

use tally_core::{Account, AccountId, Money, NewAccount, NewTransaction, Transaction};
use tally_service::{create_router, AppState, ServiceConfig, StoreBackend};
use tally_store::{AccountStore, LedgerStore, MemoryStore, TransactionLog};

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The store behind the server, for fault injection and inspection.
    pub store: Arc<MemoryStore>,
}

impl TestHarness {
    /// Create a new test harness with an empty in-memory store.
    pub fn new() -> Self {
        Self::with_config(ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            store_backend: StoreBackend::Memory,
            ..ServiceConfig::default()
        })
    }

    /// Create a harness with a custom configuration.
    pub fn with_config(config: ServiceConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::serve(store.clone(), store, config)
    }

    /// Create a harness whose balance writes stall for `delay` before landing.
    pub fn with_slow_balances(config: ServiceConfig, delay: Duration) -> Self {
        let store = Arc::new(MemoryStore::new());
        let slow = Arc::new(SlowBalances {
            inner: store.clone(),
            delay,
        });
        Self::serve(slow, store, config)
    }

    fn serve(backend: Arc<dyn LedgerStore>, store: Arc<MemoryStore>, config: ServiceConfig) -> Self {
        let state = AppState::new(backend, config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, store }
    }

    /// Create an account and return its ID.
    pub async fn create_account(&self, name: &str, initial_balance: &str) -> String {
        let response = self
            .server
            .post("/v1/accounts")
            .json(&json!({ "name": name, "initial_balance": initial_balance }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: Value = response.json();
        body["id"].as_str().expect("account id").to_string()
    }

    /// Balance of the named account as a decimal string.
    pub async fn balance_of(&self, name: &str) -> String {
        let accounts: Value = self.server.get("/v1/accounts").await.json();
        accounts
            .as_array()
            .expect("account list")
            .iter()
            .find(|a| a["name"] == name)
            .and_then(|a| a["balance"].as_str())
            .expect("account balance")
            .to_string()
    }

    /// ID of the fee collector.
    pub async fn fee_collector_id(&self) -> String {
        let body: Value = self.server.get("/v1/fee-collector").await.json();
        body["id"].as_str().expect("collector id").to_string()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Memory store whose `upsert_accounts` sleeps before writing.
struct SlowBalances {
    inner: Arc<MemoryStore>,
    delay: Duration,
}

#[async_trait]
impl AccountStore for SlowBalances {
    async fn find_account_by_name(&self, name: &str) -> tally_store::Result<Option<Account>> {
        self.inner.find_account_by_name(name).await
    }

    async fn find_account_by_id(&self, id: &AccountId) -> tally_store::Result<Option<Account>> {
        self.inner.find_account_by_id(id).await
    }

    async fn list_accounts_ordered_by_name(&self) -> tally_store::Result<Vec<Account>> {
        self.inner.list_accounts_ordered_by_name().await
    }

    async fn insert_account(&self, account: &NewAccount) -> tally_store::Result<Account> {
        self.inner.insert_account(account).await
    }

    async fn upsert_accounts(&self, accounts: &[Account]) -> tally_store::Result<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.upsert_accounts(accounts).await
    }

    async fn update_account_balance(&self, id: &AccountId, balance: Money) -> tally_store::Result<()> {
        self.inner.update_account_balance(id, balance).await
    }

    async fn delete_account(&self, id: &AccountId) -> tally_store::Result<()> {
        self.inner.delete_account(id).await
    }
}

#[async_trait]
impl TransactionLog for SlowBalances {
    async fn insert_transactions(&self, rows: &[NewTransaction]) -> tally_store::Result<Vec<Transaction>> {
        self.inner.insert_transactions(rows).await
    }

    async fn delete_transactions_by_account(&self, id: &AccountId) -> tally_store::Result<()> {
        self.inner.delete_transactions_by_account(id).await
    }

    async fn list_transactions_ordered_by_time_desc(&self) -> tally_store::Result<Vec<Transaction>> {
        self.inner.list_transactions_ordered_by_time_desc().await
    }
}
