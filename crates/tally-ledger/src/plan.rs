//! Net balance effects of an operation.
//!
//! An operation can touch the same account more than once, e.g. a transfer
//! to the fee collector or a deposit into it. Deltas are summed per account
//! so each account gets exactly one balance write.

use tally_core::{Account, AccountId, Money, MoneyError};

use crate::error::{LedgerError, Result};
use crate::receipt::BalanceChange;

#[derive(Debug, Default)]
pub(crate) struct BalancePlan {
    /// First-touch order, so writes are deterministic.
    deltas: Vec<(AccountId, Money)>,
}

impl BalancePlan {
    pub(crate) fn credit(&mut self, id: AccountId, amount: Money) -> Result<()> {
        self.add(id, amount)
    }

    pub(crate) fn debit(&mut self, id: AccountId, amount: Money) -> Result<()> {
        let negated = Money::ZERO
            .checked_sub(amount)
            .ok_or(MoneyError::Overflow)?;
        self.add(id, negated)
    }

    fn add(&mut self, id: AccountId, delta: Money) -> Result<()> {
        match self.deltas.iter_mut().find(|(account, _)| *account == id) {
            Some((_, total)) => {
                *total = total.checked_add(delta).ok_or(MoneyError::Overflow)?;
            }
            None => self.deltas.push((id, delta)),
        }
        Ok(())
    }

    /// Apply the deltas to the given snapshot accounts.
    ///
    /// Returns the accounts with their new balances, paired with the change.
    pub(crate) fn resolve(self, accounts: &[&Account]) -> Result<Vec<(Account, BalanceChange)>> {
        self.deltas
            .into_iter()
            .map(|(id, delta)| -> Result<(Account, BalanceChange)> {
                let account = accounts
                    .iter()
                    .find(|account| account.id == id)
                    .ok_or(LedgerError::UnknownAccount { account_id: id })?;
                let after = account
                    .balance
                    .checked_add(delta)
                    .ok_or(MoneyError::Overflow)?;
                debug_assert!(!after.is_negative(), "balance of {id} would go negative");

                let change = BalanceChange {
                    account_id: id,
                    before: account.balance,
                    after,
                };
                Ok((account.with_balance(after), change))
            })
            .collect()
    }
}
