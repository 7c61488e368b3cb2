//! In-memory storage implementation.
//!
//! Mirrors the behaviour of the hosted table API closely enough for tests:
//! the store assigns IDs and timestamps, account names are unique, and
//! updates or deletes of missing rows report `NotFound`. Individual calls can
//! be made to fail with [`MemoryStore::fail_next`].

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use tally_core::{
    Account, AccountId, Money, NewAccount, NewTransaction, Transaction, TransactionId,
};

use crate::error::{Result, StoreError};
use crate::{AccountStore, TransactionLog};

/// Store operations, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// [`AccountStore::find_account_by_name`]
    FindAccountByName,
    /// [`AccountStore::find_account_by_id`]
    FindAccountById,
    /// [`AccountStore::list_accounts_ordered_by_name`]
    ListAccounts,
    /// [`AccountStore::insert_account`]
    InsertAccount,
    /// [`AccountStore::upsert_accounts`]
    UpsertAccounts,
    /// [`AccountStore::update_account_balance`]
    UpdateAccountBalance,
    /// [`AccountStore::delete_account`]
    DeleteAccount,
    /// [`TransactionLog::insert_transactions`]
    InsertTransactions,
    /// [`TransactionLog::delete_transactions_by_account`]
    DeleteTransactionsByAccount,
    /// [`TransactionLog::list_transactions_ordered_by_time_desc`]
    ListTransactions,
}

impl StoreOp {
    const fn is_write(self) -> bool {
        matches!(
            self,
            Self::InsertAccount
                | Self::UpsertAccounts
                | Self::UpdateAccountBalance
                | Self::DeleteAccount
                | Self::InsertTransactions
                | Self::DeleteTransactionsByAccount
        )
    }
}

#[derive(Default)]
struct Tables {
    accounts: HashMap<AccountId, Account>,
    /// Insertion order doubles as time order.
    transactions: Vec<Transaction>,
}

/// In-memory implementation of [`AccountStore`] and [`TransactionLog`].
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    failures: Mutex<HashSet<StoreOp>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `op` fail with a database error.
    pub fn fail_next(&self, op: StoreOp) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(op);
        }
    }

    /// Number of write calls that reached the tables so far.
    ///
    /// Calls failed by [`MemoryStore::fail_next`] are not counted.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Consume a pending failure for `op`, and count the call if it is a write.
    fn begin(&self, op: StoreOp) -> Result<()> {
        let injected = self
            .failures
            .lock()
            .map_err(|_| StoreError::Database("failure registry poisoned".into()))?
            .remove(&op);

        if injected {
            tracing::debug!(?op, "Injected store failure");
            return Err(StoreError::Database(format!("injected failure: {op:?}")));
        }

        if op.is_write() {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Database("tables lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Database("tables lock poisoned".into()))
    }
}

fn name_taken(tables: &Tables, name: &str, except: Option<&AccountId>) -> bool {
    tables
        .accounts
        .values()
        .any(|a| a.name == name && Some(&a.id) != except)
}

fn account_not_found(id: &AccountId) -> StoreError {
    StoreError::NotFound {
        entity: "account",
        id: id.to_string(),
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_account_by_name(&self, name: &str) -> Result<Option<Account>> {
        self.begin(StoreOp::FindAccountByName)?;
        let tables = self.read()?;
        Ok(tables.accounts.values().find(|a| a.name == name).cloned())
    }

    async fn find_account_by_id(&self, id: &AccountId) -> Result<Option<Account>> {
        self.begin(StoreOp::FindAccountById)?;
        let tables = self.read()?;
        Ok(tables.accounts.get(id).cloned())
    }

    async fn list_accounts_ordered_by_name(&self) -> Result<Vec<Account>> {
        self.begin(StoreOp::ListAccounts)?;
        let tables = self.read()?;
        let mut accounts: Vec<_> = tables.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(accounts)
    }

    async fn insert_account(&self, account: &NewAccount) -> Result<Account> {
        self.begin(StoreOp::InsertAccount)?;
        let mut tables = self.write()?;

        if name_taken(&tables, &account.name, None) {
            return Err(StoreError::UniqueViolation(format!(
                "account name already exists: {}",
                account.name
            )));
        }

        let stored = Account {
            id: AccountId::generate(),
            name: account.name.clone(),
            balance: account.balance,
            owner_id: account.owner_id,
        };
        tables.accounts.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn upsert_accounts(&self, accounts: &[Account]) -> Result<()> {
        self.begin(StoreOp::UpsertAccounts)?;
        let mut tables = self.write()?;

        // Validate the whole batch first so a rejected upsert leaves nothing behind.
        for account in accounts {
            if name_taken(&tables, &account.name, Some(&account.id)) {
                return Err(StoreError::UniqueViolation(format!(
                    "account name already exists: {}",
                    account.name
                )));
            }
        }

        for account in accounts {
            tables.accounts.insert(account.id, account.clone());
        }
        Ok(())
    }

    async fn update_account_balance(&self, id: &AccountId, balance: Money) -> Result<()> {
        self.begin(StoreOp::UpdateAccountBalance)?;
        let mut tables = self.write()?;
        let account = tables
            .accounts
            .get_mut(id)
            .ok_or_else(|| account_not_found(id))?;
        account.balance = balance;
        Ok(())
    }

    async fn delete_account(&self, id: &AccountId) -> Result<()> {
        self.begin(StoreOp::DeleteAccount)?;
        let mut tables = self.write()?;
        tables
            .accounts
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| account_not_found(id))
    }
}

#[async_trait]
impl TransactionLog for MemoryStore {
    async fn insert_transactions(&self, rows: &[NewTransaction]) -> Result<Vec<Transaction>> {
        self.begin(StoreOp::InsertTransactions)?;
        let mut tables = self.write()?;
        let created_at = Utc::now();

        let stored: Vec<_> = rows
            .iter()
            .map(|row| Transaction {
                id: TransactionId::generate(),
                from_account_id: row.from_account_id,
                to_account_id: row.to_account_id,
                amount: row.amount,
                kind: row.kind,
                created_at,
            })
            .collect();
        tables.transactions.extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn delete_transactions_by_account(&self, id: &AccountId) -> Result<()> {
        self.begin(StoreOp::DeleteTransactionsByAccount)?;
        let mut tables = self.write()?;
        tables.transactions.retain(|tx| !tx.involves(id));
        Ok(())
    }

    async fn list_transactions_ordered_by_time_desc(&self) -> Result<Vec<Transaction>> {
        self.begin(StoreOp::ListTransactions)?;
        let tables = self.read()?;
        Ok(tables.transactions.iter().rev().cloned().collect())
    }
}
