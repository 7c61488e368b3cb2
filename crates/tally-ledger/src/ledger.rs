//! The ledger engine.

use std::sync::Arc;

use tally_core::{Account, AccountId, Money, NewAccount, NewTransaction, Transaction};
use tally_store::LedgerStore;

use crate::collector::FeeCollector;
use crate::config::{DeletionPolicy, LedgerConfig};
use crate::error::{LedgerError, Result, WriteStage};
use crate::plan::BalancePlan;
use crate::receipt::{Operation, Receipt};
use crate::snapshot::Snapshot;

/// How new balances are written after the log rows.
enum BalanceWrite {
    /// Several accounts in one upsert.
    Batch(Vec<Account>),
    /// One account, by ID.
    Single { account_id: AccountId, balance: Money },
}

/// Applies transfers, deposits and withdrawals to a [`LedgerStore`].
///
/// Every balance-changing operation writes in the same order: first the log
/// rows in one call, then the balances in one call. If the first write fails
/// nothing was written ([`LedgerError::Persistence`]); if the second fails the
/// log has rows whose balance effects are missing
/// ([`LedgerError::PartialFailure`]). There is no rollback and no retry.
pub struct Ledger {
    store: Arc<dyn LedgerStore>,
    config: LedgerConfig,
    collector: FeeCollector,
}

impl Ledger {
    /// Create a ledger over `store`.
    pub fn new(store: Arc<dyn LedgerStore>, config: LedgerConfig) -> Self {
        let collector = FeeCollector::new(config.fee_collector_name.clone());
        Self {
            store,
            config,
            collector,
        }
    }

    /// The ledger configuration.
    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The fee collector ID if it has already been resolved. Never touches the store.
    #[must_use]
    pub fn cached_fee_collector_id(&self) -> Option<AccountId> {
        self.collector.cached_id()
    }

    /// Resolve the fee collector ID, creating the account if needed.
    ///
    /// # Errors
    ///
    /// Returns `FeeCollectorUnavailable` if the account can be neither found
    /// nor created.
    pub async fn fee_collector_id(&self) -> Result<AccountId> {
        self.collector.resolve(self.store.as_ref()).await
    }

    /// The fee collector account with its current balance.
    ///
    /// # Errors
    ///
    /// Returns `FeeCollectorUnavailable` if the account can't be resolved,
    /// or `Persistence` if reading it fails.
    pub async fn fee_collector(&self) -> Result<Account> {
        let id = self.fee_collector_id().await?;
        self.store
            .find_account_by_id(&id)
            .await?
            .ok_or_else(|| LedgerError::FeeCollectorUnavailable {
                reason: format!("account {id} no longer exists"),
            })
    }

    /// Read every account into a [`Snapshot`].
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the read fails.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot::new(self.accounts().await?))
    }

    /// All accounts, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the read fails.
    pub async fn accounts(&self) -> Result<Vec<Account>> {
        Ok(self.store.list_accounts_ordered_by_name().await?)
    }

    /// The transaction log, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the read fails.
    pub async fn transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.store.list_transactions_ordered_by_time_desc().await?)
    }

    /// Create an account. The name is trimmed before it is stored.
    ///
    /// # Errors
    ///
    /// - `EmptyName` / `NegativeBalance` on invalid input.
    /// - `DuplicateAccount` if the name is taken.
    /// - `Persistence` if the insert fails otherwise.
    pub async fn create_account(&self, name: &str, initial_balance: Money) -> Result<Account> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::EmptyName);
        }
        if initial_balance.is_negative() {
            return Err(LedgerError::NegativeBalance {
                balance: initial_balance,
            });
        }

        match self
            .store
            .insert_account(&NewAccount::new(name, initial_balance))
            .await
        {
            Ok(account) => {
                tracing::info!(
                    account_id = %account.id,
                    name = %account.name,
                    balance = %account.balance,
                    "Account created"
                );
                Ok(account)
            }
            Err(e) if e.is_unique_violation() => Err(LedgerError::DuplicateAccount {
                name: name.to_string(),
            }),
            Err(e) => Err(LedgerError::Persistence(e)),
        }
    }

    /// Move `amount` from one account to another, charging the transfer fee.
    ///
    /// The sender pays `amount + fee`; the recipient receives `amount`; the
    /// fee collector receives the fee. Writes a transfer row and a fee row.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount` is not positive.
    /// - `UnknownAccount` if either account is missing from the snapshot.
    /// - `InsufficientFunds` if the sender can't cover amount plus fee.
    /// - `FeeCollectorUnavailable`, `Persistence`, `PartialFailure` on store failures.
    pub async fn transfer(
        &self,
        snapshot: &Snapshot,
        from: AccountId,
        to: AccountId,
        amount: Money,
    ) -> Result<Receipt> {
        ensure_positive(amount)?;
        let sender = snapshot.require(&from)?;
        let recipient = snapshot.require(&to)?;
        let quote = self.config.fees.quote_transfer(amount)?;

        if !sender.has_sufficient_funds(quote.total_deduction) {
            tracing::warn!(
                account_id = %from,
                balance = %sender.balance,
                required = %quote.total_deduction,
                "Transfer rejected: insufficient funds"
            );
            return Err(LedgerError::InsufficientFunds {
                available: sender.balance,
                required: quote.total_deduction,
            });
        }

        let collector = self.collector_account(snapshot).await?;

        let mut plan = BalancePlan::default();
        plan.debit(from, quote.total_deduction)?;
        plan.credit(to, amount)?;
        plan.credit(collector.id, quote.fee)?;
        let (accounts, balances): (Vec<_>, Vec<_>) = plan
            .resolve(&[sender, recipient, &collector])?
            .into_iter()
            .unzip();

        let rows = vec![
            NewTransaction::transfer(from, to, amount),
            NewTransaction::fee(from, collector.id, quote.fee),
        ];
        let transactions = self.commit(rows, BalanceWrite::Batch(accounts)).await?;

        tracing::info!(
            from = %from,
            to = %to,
            amount = %amount,
            fee = %quote.fee,
            "Transfer committed"
        );

        Ok(Receipt {
            operation: Operation::Transfer,
            amount,
            fee: quote.fee,
            transactions,
            balances,
        })
    }

    /// Add `amount` to an account, minus the deposit fee.
    ///
    /// The account receives `amount - fee` and the fee collector receives the
    /// fee. Writes a deposit row and a fee row.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount` is not positive.
    /// - `UnknownAccount` if the account is missing from the snapshot.
    /// - `FeeCollectorUnavailable`, `Persistence`, `PartialFailure` on store failures.
    pub async fn deposit(
        &self,
        snapshot: &Snapshot,
        account_id: AccountId,
        amount: Money,
    ) -> Result<Receipt> {
        ensure_positive(amount)?;
        let account = snapshot.require(&account_id)?;
        let quote = self.config.fees.quote_deposit(amount)?;
        let collector = self.collector_account(snapshot).await?;

        let mut plan = BalancePlan::default();
        plan.credit(account_id, quote.credited)?;
        plan.credit(collector.id, quote.fee)?;
        let (accounts, balances): (Vec<_>, Vec<_>) = plan
            .resolve(&[account, &collector])?
            .into_iter()
            .unzip();

        let rows = vec![
            NewTransaction::deposit(account_id, quote.credited),
            NewTransaction::fee(account_id, collector.id, quote.fee),
        ];
        let transactions = self.commit(rows, BalanceWrite::Batch(accounts)).await?;

        tracing::info!(
            account_id = %account_id,
            amount = %amount,
            fee = %quote.fee,
            credited = %quote.credited,
            "Deposit committed"
        );

        Ok(Receipt {
            operation: Operation::Deposit,
            amount,
            fee: quote.fee,
            transactions,
            balances,
        })
    }

    /// Remove `amount` from an account. Withdrawals carry no fee.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount` is not positive.
    /// - `UnknownAccount` if the account is missing from the snapshot.
    /// - `InsufficientBalance` if the balance is below `amount`.
    /// - `Persistence`, `PartialFailure` on store failures.
    pub async fn withdraw(
        &self,
        snapshot: &Snapshot,
        account_id: AccountId,
        amount: Money,
    ) -> Result<Receipt> {
        ensure_positive(amount)?;
        let account = snapshot.require(&account_id)?;

        if !account.has_sufficient_funds(amount) {
            tracing::warn!(
                account_id = %account_id,
                balance = %account.balance,
                requested = %amount,
                "Withdrawal rejected: insufficient balance"
            );
            return Err(LedgerError::InsufficientBalance {
                available: account.balance,
                requested: amount,
            });
        }

        let mut plan = BalancePlan::default();
        plan.debit(account_id, amount)?;
        let balances: Vec<_> = plan
            .resolve(&[account])?
            .into_iter()
            .map(|(_, change)| change)
            .collect();
        let balance = balances
            .first()
            .map_or(account.balance, |change| change.after);

        let rows = vec![NewTransaction::withdrawal(account_id, amount)];
        let transactions = self
            .commit(
                rows,
                BalanceWrite::Single {
                    account_id,
                    balance,
                },
            )
            .await?;

        tracing::info!(account_id = %account_id, amount = %amount, "Withdrawal committed");

        Ok(Receipt {
            operation: Operation::Withdrawal,
            amount,
            fee: Money::ZERO,
            transactions,
            balances,
        })
    }

    /// Delete an account, handling its history per the configured
    /// [`DeletionPolicy`]. The fee collector cannot be deleted.
    ///
    /// # Errors
    ///
    /// - `UnknownAccount` if the account doesn't exist.
    /// - `ProtectedAccount` if it is the fee collector.
    /// - `Persistence` if the lookup fails.
    /// - `DeletionFailed` naming the step that failed.
    pub async fn delete_account(&self, account_id: AccountId) -> Result<()> {
        let account = self
            .store
            .find_account_by_id(&account_id)
            .await?
            .ok_or(LedgerError::UnknownAccount { account_id })?;

        if self.is_fee_collector(&account) {
            tracing::warn!(account_id = %account_id, "Refusing to delete the fee collector");
            return Err(LedgerError::ProtectedAccount { account_id });
        }

        if self.config.deletion_policy == DeletionPolicy::Cascade {
            self.store
                .delete_transactions_by_account(&account_id)
                .await
                .map_err(|source| LedgerError::DeletionFailed {
                    stage: WriteStage::DeleteHistory,
                    source,
                })?;
        }

        self.store
            .delete_account(&account_id)
            .await
            .map_err(|source| {
                if self.config.deletion_policy == DeletionPolicy::Cascade {
                    tracing::error!(
                        account_id = %account_id,
                        error = %source,
                        "History deleted but account row remains"
                    );
                }
                LedgerError::DeletionFailed {
                    stage: WriteStage::DeleteAccount,
                    source,
                }
            })?;

        tracing::info!(
            account_id = %account_id,
            name = %account.name,
            policy = %self.config.deletion_policy,
            "Account deleted"
        );
        Ok(())
    }

    fn is_fee_collector(&self, account: &Account) -> bool {
        self.collector.cached_id() == Some(account.id) || account.name == self.collector.name()
    }

    /// The collector account, from the snapshot when present.
    async fn collector_account(&self, snapshot: &Snapshot) -> Result<Account> {
        let id = self.fee_collector_id().await?;
        if let Some(account) = snapshot.get(&id) {
            return Ok(account.clone());
        }
        self.fee_collector().await
    }

    /// Write the log rows, then the balances.
    async fn commit(
        &self,
        rows: Vec<NewTransaction>,
        balances: BalanceWrite,
    ) -> Result<Vec<Transaction>> {
        // Sub-cent fees round to zero; a zero-amount row is never logged.
        let rows: Vec<_> = rows
            .into_iter()
            .filter(|row| row.amount.is_positive())
            .collect();

        let transactions = self.store.insert_transactions(&rows).await.map_err(|e| {
            tracing::error!(error = %e, "Transaction log write failed, nothing was written");
            LedgerError::Persistence(e)
        })?;

        let written = match &balances {
            BalanceWrite::Batch(accounts) => self.store.upsert_accounts(accounts).await,
            BalanceWrite::Single {
                account_id,
                balance,
            } => self.store.update_account_balance(account_id, *balance).await,
        };

        if let Err(source) = written {
            tracing::error!(
                error = %source,
                rows = transactions.len(),
                "Transaction rows written but balances were not; ledger is inconsistent"
            );
            return Err(LedgerError::PartialFailure {
                stage: WriteStage::Balances,
                source,
            });
        }

        Ok(transactions)
    }
}

fn ensure_positive(amount: Money) -> Result<()> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(LedgerError::InvalidAmount { amount })
    }
}
