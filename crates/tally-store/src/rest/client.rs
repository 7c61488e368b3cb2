//! PostgREST client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use tally_core::{Account, AccountId, Money, NewAccount, NewTransaction, Transaction};

use super::types::{
    AccountRow, ApiErrorBody, BalancePatch, NewAccountRow, NewTransactionRow, TransactionRow,
};
use crate::error::{Result, StoreError};
use crate::schema::{column, table, UNIQUE_VIOLATION_CODE};
use crate::{AccountStore, TransactionLog};

/// Path prefix of the table API.
const REST_PATH: &str = "rest/v1";

/// Ask the API to echo written rows back.
const RETURN_REPRESENTATION: &str = "return=representation";

/// Upsert on primary-key conflict, without echoing rows.
const MERGE_DUPLICATES: &str = "resolution=merge-duplicates,return=minimal";

/// Options for [`RestStore`].
#[derive(Debug, Clone)]
pub struct RestStoreOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
    /// Accounts table name.
    pub accounts_table: String,
    /// Transactions table name.
    pub transactions_table: String,
}

impl Default for RestStoreOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            accounts_table: table::ACCOUNTS.to_string(),
            transactions_table: table::TRANSACTIONS.to_string(),
        }
    }
}

impl RestStoreOptions {
    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Set the accounts table name.
    #[must_use]
    pub fn with_accounts_table(mut self, name: impl Into<String>) -> Self {
        self.accounts_table = name.into();
        self
    }

    /// Set the transactions table name.
    #[must_use]
    pub fn with_transactions_table(mut self, name: impl Into<String>) -> Self {
        self.transactions_table = name.into();
        self
    }
}

/// Store backed by a PostgREST table API.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
    accounts_table: String,
    transactions_table: String,
}

impl RestStore {
    /// Create a new store client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Project URL (e.g., `"https://project.example.co"`)
    /// * `api_key` - API key, sent both as `apikey` and as a bearer token
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::with_options(base_url, api_key, RestStoreOptions::default())
    }

    /// Create a new store client with custom options.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        options: RestStoreOptions,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            accounts_table: options.accounts_table,
            transactions_table: options.transactions_table,
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let url = format!("{}/{REST_PATH}/{table}", self.base_url);
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn select_accounts(&self, query: &[(&str, String)]) -> Result<Vec<Account>> {
        let response = self
            .request(Method::GET, &self.accounts_table)
            .query(&[("select", "*")])
            .query(query)
            .send()
            .await?;

        let rows: Vec<AccountRow> = handle_response(response).await?;
        Ok(rows.into_iter().map(Account::from).collect())
    }
}

/// Decode a successful response body, or convert the error body.
async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();

    if status.is_success() {
        let body = response.bytes().await?;
        return Ok(serde_json::from_slice(&body)?);
    }

    Err(error_from_response(status, response).await)
}

/// Check a response whose body is not needed.
async fn check_response(response: Response) -> Result<()> {
    let status = response.status();

    if status.is_success() {
        return Ok(());
    }

    Err(error_from_response(status, response).await)
}

async fn error_from_response(status: StatusCode, response: Response) -> StoreError {
    match response.json::<ApiErrorBody>().await {
        Ok(body) if body.code.as_deref() == Some(UNIQUE_VIOLATION_CODE) => {
            StoreError::UniqueViolation(body.details.unwrap_or(body.message))
        }
        Ok(body) => StoreError::Api {
            status: status.as_u16(),
            code: body.code,
            message: body.message,
        },
        Err(_) => StoreError::Api {
            status: status.as_u16(),
            code: None,
            message: format!("HTTP {status}"),
        },
    }
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

fn account_not_found(id: &AccountId) -> StoreError {
    StoreError::NotFound {
        entity: "account",
        id: id.to_string(),
    }
}

#[async_trait]
impl AccountStore for RestStore {
    async fn find_account_by_name(&self, name: &str) -> Result<Option<Account>> {
        let accounts = self
            .select_accounts(&[(column::NAME, eq(name)), ("limit", "1".to_string())])
            .await?;
        Ok(accounts.into_iter().next())
    }

    async fn find_account_by_id(&self, id: &AccountId) -> Result<Option<Account>> {
        let accounts = self
            .select_accounts(&[(column::ID, eq(id)), ("limit", "1".to_string())])
            .await?;
        Ok(accounts.into_iter().next())
    }

    async fn list_accounts_ordered_by_name(&self) -> Result<Vec<Account>> {
        self.select_accounts(&[("order", format!("{}.asc", column::NAME))])
            .await
    }

    async fn insert_account(&self, account: &NewAccount) -> Result<Account> {
        let response = self
            .request(Method::POST, &self.accounts_table)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&[NewAccountRow::from(account)])
            .send()
            .await?;

        let rows: Vec<AccountRow> = handle_response(response).await?;
        let stored = rows
            .into_iter()
            .next()
            .map(Account::from)
            .ok_or_else(|| StoreError::Serialization("insert returned no rows".into()))?;

        tracing::debug!(account_id = %stored.id, name = %stored.name, "Account row inserted");
        Ok(stored)
    }

    async fn upsert_accounts(&self, accounts: &[Account]) -> Result<()> {
        if accounts.is_empty() {
            return Ok(());
        }

        let rows: Vec<_> = accounts.iter().map(AccountRow::from).collect();
        let response = self
            .request(Method::POST, &self.accounts_table)
            .header("Prefer", MERGE_DUPLICATES)
            .json(&rows)
            .send()
            .await?;

        check_response(response).await?;
        tracing::debug!(rows = rows.len(), "Account rows upserted");
        Ok(())
    }

    async fn update_account_balance(&self, id: &AccountId, balance: Money) -> Result<()> {
        let response = self
            .request(Method::PATCH, &self.accounts_table)
            .query(&[(column::ID, eq(id))])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&BalancePatch { balance })
            .send()
            .await?;

        let rows: Vec<AccountRow> = handle_response(response).await?;
        if rows.is_empty() {
            return Err(account_not_found(id));
        }
        Ok(())
    }

    async fn delete_account(&self, id: &AccountId) -> Result<()> {
        let response = self
            .request(Method::DELETE, &self.accounts_table)
            .query(&[(column::ID, eq(id))])
            .header("Prefer", RETURN_REPRESENTATION)
            .send()
            .await?;

        let rows: Vec<AccountRow> = handle_response(response).await?;
        if rows.is_empty() {
            return Err(account_not_found(id));
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionLog for RestStore {
    async fn insert_transactions(&self, rows: &[NewTransaction]) -> Result<Vec<Transaction>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let payload: Vec<_> = rows.iter().map(NewTransactionRow::from).collect();
        let response = self
            .request(Method::POST, &self.transactions_table)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&payload)
            .send()
            .await?;

        let stored: Vec<TransactionRow> = handle_response(response).await?;
        tracing::debug!(rows = stored.len(), "Transaction rows inserted");
        Ok(stored.into_iter().map(Transaction::from).collect())
    }

    async fn delete_transactions_by_account(&self, id: &AccountId) -> Result<()> {
        let filter = format!(
            "({}.eq.{id},{}.eq.{id})",
            column::FROM_ACCOUNT,
            column::TO_ACCOUNT
        );
        let response = self
            .request(Method::DELETE, &self.transactions_table)
            .query(&[("or", filter)])
            .send()
            .await?;

        check_response(response).await
    }

    async fn list_transactions_ordered_by_time_desc(&self) -> Result<Vec<Transaction>> {
        let response = self
            .request(Method::GET, &self.transactions_table)
            .query(&[
                ("select", "*".to_string()),
                ("order", format!("{}.desc", column::CREATED_AT)),
            ])
            .send()
            .await?;

        let rows: Vec<TransactionRow> = handle_response(response).await?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_trims_trailing_slash() {
        let store = RestStore::new("http://localhost:54321/", "key").unwrap();
        assert_eq!(store.base_url, "http://localhost:54321");
    }

    #[test]
    fn options_override_tables() {
        let options = RestStoreOptions::default()
            .with_accounts_table("accounts")
            .with_transactions_table("ledger_rows");
        let store = RestStore::with_options("http://localhost", "key", options).unwrap();
        assert_eq!(store.accounts_table, "accounts");
        assert_eq!(store.transactions_table, "ledger_rows");
    }

    #[test]
    fn default_tables_match_hosted_schema() {
        let options = RestStoreOptions::default();
        assert_eq!(options.accounts_table, "characters");
        assert_eq!(options.transactions_table, "transactions");
        assert_eq!(options.timeout_seconds, 30);
    }
}
